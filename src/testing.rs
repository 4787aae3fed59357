//! In-process harness for command handler tests: a real `ServerContext`
//! backed by a scripted driver, and a session whose control channel is an
//! in-memory duplex pipe.

use crate::config::{AccessControlSettings, PortRange, ServerSettings, ALL_SCOPE};
use crate::core_driver::{DriverError, ServerDriver};
use crate::core_ftpcommand::handlers::{dispatch, initialize_command_handlers, CommandHandlers};
use crate::core_network::network::ControlReader;
use crate::core_network::{ControlStream, ControlWriter};
use crate::server::ServerContext;
use crate::session::{Session, UserContext};
use async_trait::async_trait;
use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncBufReadExt, BufReader, DuplexStream};
use tokio::sync::Mutex;
use tokio_rustls::rustls;

const PORTS_PER_HARNESS: u16 = 20;
static NEXT_PORT_BLOCK: AtomicU16 = AtomicU16::new(31000);

/// Every harness gets its own passive ports so tests running in parallel do
/// not fight over them.
fn next_port_range() -> PortRange {
    let start = NEXT_PORT_BLOCK.fetch_add(PORTS_PER_HARNESS, Ordering::SeqCst);
    PortRange::new(start, start + PORTS_PER_HARNESS - 1).unwrap()
}

/// Accepts password `secret` for any user except `broken`, whose lookup
/// fails as if the backend were down.
pub struct TestDriver {
    settings: ServerSettings,
    access: AccessControlSettings,
    bye_calls: AtomicUsize,
}

impl TestDriver {
    pub fn new(settings: ServerSettings, access: AccessControlSettings) -> Self {
        Self {
            settings,
            access,
            bye_calls: AtomicUsize::new(0),
        }
    }

    pub fn bye_calls(&self) -> usize {
        self.bye_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ServerDriver for TestDriver {
    async fn welcome(&self, _ctx: &UserContext) -> Result<String, DriverError> {
        Ok("Welcome".to_string())
    }

    async fn bye(&self, _ctx: &UserContext) -> Result<String, DriverError> {
        self.bye_calls.fetch_add(1, Ordering::SeqCst);
        Ok("Bye".to_string())
    }

    async fn auth_user(
        &self,
        _ctx: &UserContext,
        user: &str,
        pass: &str,
    ) -> Result<bool, DriverError> {
        if user == "broken" {
            return Err(DriverError::AuthBackend("user store unavailable".to_string()));
        }
        Ok(pass == "secret")
    }

    async fn settings(&self) -> Result<ServerSettings, DriverError> {
        Ok(self.settings.clone())
    }

    async fn access_control_settings(&self) -> Result<AccessControlSettings, DriverError> {
        Ok(self.access.clone())
    }

    async fn tls_config(&self) -> Result<Option<Arc<rustls::ServerConfig>>, DriverError> {
        Ok(None)
    }
}

pub struct TestHarness {
    pub server: Arc<ServerContext>,
    pub driver: Arc<TestDriver>,
    pub session: Arc<Mutex<Session>>,
    pub handlers: CommandHandlers,
    /// Server end of the control channel.
    pub writer: ControlWriter,
    pub reader: ControlReader,
    /// Client end of the control channel.
    pub client: BufReader<DuplexStream>,
    root: TempDir,
}

impl TestHarness {
    /// A fresh, unauthenticated session rooted in a temporary directory.
    pub async fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let public_directory = root.path().to_str().unwrap().to_string();

        let settings = ServerSettings {
            public_directory: public_directory.clone(),
            listening_port: 0,
            public_ip: Ipv4Addr::new(203, 0, 113, 5),
            data_port_range: next_port_range(),
        };
        let mut access = HashMap::new();
        access.insert(ALL_SCOPE.to_string(), vec![format!("{}/", public_directory)]);

        let driver = Arc::new(TestDriver::new(settings, access));
        let server = ServerContext::from_driver(Arc::clone(&driver) as Arc<dyn ServerDriver>)
            .await
            .unwrap();

        let (client, server_end) = tokio::io::duplex(64 * 1024);
        let stream: ControlStream = Box::new(server_end);
        let (reader, writer) = tokio::io::split(stream);

        let session = Session::new(
            &public_directory,
            "127.0.0.1:40000".parse().unwrap(),
            "127.0.0.1:21".parse().unwrap(),
        );

        Self {
            server: Arc::new(server),
            driver,
            session: Arc::new(Mutex::new(session)),
            handlers: initialize_command_handlers(),
            writer: Arc::new(Mutex::new(writer)),
            reader: BufReader::new(reader),
            client: BufReader::new(client),
            root,
        }
    }

    /// A session that already went through USER/PASS.
    pub async fn logged_in() -> Self {
        let h = Self::new().await;
        {
            let mut session = h.session.lock().await;
            session.ctx.user = Some("alice".to_string());
            session.logged_in = true;
        }
        h
    }

    /// Feeds one control line through the dispatcher.
    pub async fn dispatch(&mut self, line: &str) -> bool {
        dispatch(&self.handlers, &self.writer, &self.server, &self.session, line)
            .await
            .unwrap()
    }

    pub fn root(&self) -> String {
        self.root.path().to_str().unwrap().to_string()
    }

    pub fn root_path(&self) -> &Path {
        self.root.path()
    }
}

/// Next reply line from the server, without its line terminator.
pub async fn read_reply(client: &mut BufReader<DuplexStream>) -> String {
    let mut line = String::new();
    tokio::time::timeout(Duration::from_secs(10), client.read_line(&mut line))
        .await
        .expect("timed out waiting for a reply")
        .unwrap();
    line.trim_end().to_string()
}
