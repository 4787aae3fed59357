use crate::config::PortRange;
use log::{debug, warn};
use std::collections::VecDeque;
use tokio::sync::Mutex;

/// Ports available for passive data listeners, shared by every session.
///
/// A port is either checked out by exactly one session or sitting once in the
/// free list.
#[derive(Debug)]
pub struct PortPool {
    range: PortRange,
    free: Mutex<VecDeque<u16>>,
}

impl PortPool {
    pub fn new(range: PortRange) -> Self {
        Self {
            range,
            free: Mutex::new(range.ports().collect()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.range.len()
    }

    /// Takes the least recently released port, `None` when all are checked out.
    pub async fn allocate(&self) -> Option<u16> {
        let port = self.free.lock().await.pop_front();
        debug!("Allocated passive port {:?}", port);
        port
    }

    pub async fn release(&self, port: u16) {
        if !self.range.contains(port) {
            warn!("Refusing to release port {} outside of {:?}", port, self.range);
            return;
        }
        let mut free = self.free.lock().await;
        if free.contains(&port) {
            warn!("Port {} released twice", port);
            return;
        }
        free.push_back(port);
        debug!("Released passive port {}", port);
    }

    pub async fn available(&self) -> usize {
        self.free.lock().await.len()
    }
}
