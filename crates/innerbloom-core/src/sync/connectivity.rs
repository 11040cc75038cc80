//! Ambient online/offline signal.

use std::sync::atomic::{AtomicBool, Ordering};

/// Online/offline flag read at entry creation and sync decisions.
#[derive(Debug)]
pub struct Connectivity {
    online: AtomicBool,
}

impl Connectivity {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    /// Update the flag. Returns true only on an offline→online transition,
    /// which is the signal to drain the sync queue.
    pub fn set_online(&self, online: bool) -> bool {
        let was_online = self.online.swap(online, Ordering::SeqCst);
        online && !was_online
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_offline_to_online_is_a_reconnect() {
        let conn = Connectivity::new(false);
        assert!(!conn.is_online());
        assert!(conn.set_online(true));
        assert!(conn.is_online());
        assert!(!conn.set_online(true));
        assert!(!conn.set_online(false));
        assert!(!conn.is_online());
        assert!(conn.set_online(true));
    }
}
