use crate::core_network::data_connection::DataMode;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// What the driver gets to see of a connected user.
#[derive(Debug, Clone)]
pub struct UserContext {
    /// Username submitted with USER, cleared again on failed authentication.
    pub user: Option<String>,
    /// Current working directory, always absolute.
    pub cwd: String,
    pub peer_addr: SocketAddr,
}

impl UserContext {
    pub fn new(public_directory: &str, peer_addr: SocketAddr) -> Self {
        Self {
            user: None,
            cwd: public_directory.to_string(),
            peer_addr,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginState {
    Unauthenticated,
    AwaitingPassword,
    LoggedIn,
    Closing,
}

#[derive(Debug)]
pub struct Session {
    pub ctx: UserContext,
    pub logged_in: bool,
    /// Set once QUIT has been received.
    pub closing: bool,
    pub data_mode: DataMode,
    /// Address of the server end of the control connection.
    pub local_addr: SocketAddr,
    transfers: TransferTracker,
}

impl Session {
    pub fn new(public_directory: &str, peer_addr: SocketAddr, local_addr: SocketAddr) -> Self {
        Self {
            ctx: UserContext::new(public_directory, peer_addr),
            logged_in: false,
            closing: false,
            data_mode: DataMode::Undetermined,
            local_addr,
            transfers: TransferTracker::default(),
        }
    }

    pub fn state(&self) -> LoginState {
        if self.closing {
            LoginState::Closing
        } else if self.logged_in {
            LoginState::LoggedIn
        } else if self.ctx.user.is_some() {
            LoginState::AwaitingPassword
        } else {
            LoginState::Unauthenticated
        }
    }

    /// REIN: back to a freshly connected user. The data connection setup and
    /// any transfer already running are left alone.
    pub fn reinitialize(&mut self, public_directory: &str) {
        self.ctx = UserContext::new(public_directory, self.ctx.peer_addr);
        self.logged_in = false;
    }

    pub fn transfers(&self) -> TransferTracker {
        self.transfers.clone()
    }
}

/// Counts the transfers running for one session so QUIT can wait for them.
#[derive(Debug, Clone, Default)]
pub struct TransferTracker {
    in_flight: Arc<AtomicUsize>,
}

impl TransferTracker {
    /// Marks a transfer as started; it counts as running until the guard drops.
    pub fn start(&self) -> TransferGuard {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        TransferGuard {
            in_flight: Arc::clone(&self.in_flight),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight() == 0
    }
}

#[derive(Debug)]
pub struct TransferGuard {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for TransferGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(
            "/srv/ftp",
            "192.0.2.10:50000".parse().unwrap(),
            "192.0.2.1:21".parse().unwrap(),
        )
    }

    #[test]
    fn login_state_follows_session_flags() {
        let mut session = session();
        assert_eq!(session.state(), LoginState::Unauthenticated);

        session.ctx.user = Some("alice".into());
        assert_eq!(session.state(), LoginState::AwaitingPassword);

        session.logged_in = true;
        assert_eq!(session.state(), LoginState::LoggedIn);

        session.closing = true;
        assert_eq!(session.state(), LoginState::Closing);
    }

    #[test]
    fn reinitialize_clears_credentials_and_cwd() {
        let mut session = session();
        session.ctx.user = Some("alice".into());
        session.ctx.cwd = "/srv/ftp/sub".into();
        session.logged_in = true;

        session.reinitialize("/srv/ftp");

        assert_eq!(session.state(), LoginState::Unauthenticated);
        assert_eq!(session.ctx.cwd, "/srv/ftp");
        assert_eq!(session.ctx.peer_addr, "192.0.2.10:50000".parse().unwrap());
    }

    #[test]
    fn tracker_counts_until_guards_drop() {
        let tracker = TransferTracker::default();
        assert!(tracker.is_idle());

        let first = tracker.start();
        let second = tracker.clone().start();
        assert_eq!(tracker.in_flight(), 2);

        drop(first);
        assert!(!tracker.is_idle());
        drop(second);
        assert!(tracker.is_idle());
    }
}
