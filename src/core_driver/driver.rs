use crate::config::{AccessControlSettings, ServerSettings};
use crate::core_driver::error::DriverError;
use crate::session::UserContext;
use async_trait::async_trait;
use std::sync::Arc;
use tokio_rustls::rustls;

/// Identity and policy supplied by the embedding application.
///
/// `settings`, `access_control_settings` and `tls_config` are called once when
/// the server starts; `welcome`, `auth_user` and `bye` once per session.
#[async_trait]
pub trait ServerDriver: Send + Sync {
    /// Message of the 220 greeting. An error refuses the connection with a 500.
    async fn welcome(&self, ctx: &UserContext) -> Result<String, DriverError>;

    /// Called after QUIT once the session's transfers have drained.
    async fn bye(&self, ctx: &UserContext) -> Result<String, DriverError>;

    async fn auth_user(
        &self,
        ctx: &UserContext,
        user: &str,
        pass: &str,
    ) -> Result<bool, DriverError>;

    async fn settings(&self) -> Result<ServerSettings, DriverError>;

    async fn access_control_settings(&self) -> Result<AccessControlSettings, DriverError>;

    /// `None` leaves the control channel unencrypted.
    async fn tls_config(&self) -> Result<Option<Arc<rustls::ServerConfig>>, DriverError>;
}
