//! Per-connection idle timeout.
//!
//! At most one client is served at a time, and it is dropped once it has
//! been idle for longer than the configured timeout. Every byte received
//! counts as activity, recognized or not.
//!
//! ```text
//!            open(now)              check(now) past deadline
//!   Idle ─────────────────▶ Active ─────────────────────────▶ Expired
//!    ▲                       │  ▲                               │
//!    │        close()        │  │ touch(now)                    │
//!    └───────────────────────┘──┘                               │
//!    └──────────────────────────── close() ─────────────────────┘
//! ```

use log::info;

/// Why a session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// The client closed the connection or the connection failed.
    PeerDisconnect,
    /// The client was idle past the deadline.
    Timeout,
}

/// Session lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No client.
    #[default]
    Idle,
    /// A client is connected and must be active again before `deadline_ms`.
    Active {
        /// Absolute deadline, in clock milliseconds.
        deadline_ms: u64,
    },
    /// The client overstayed its deadline and must be disconnected.
    Expired,
}

/// Idle-timeout tracker for the single client session.
///
/// # Example
///
/// ```rust
/// use tcp_action::{Session, SessionState};
///
/// let mut session = Session::new(30_000);
/// session.open(0);
/// session.touch(20_000);
/// assert!(!session.check(50_000));
/// assert!(session.check(50_001));
/// assert_eq!(session.state(), SessionState::Expired);
/// ```
#[derive(Clone, Debug)]
pub struct Session {
    timeout_ms: u32,
    state: SessionState,
}

impl Session {
    /// Create an idle session with the given idle timeout.
    pub const fn new(timeout_ms: u32) -> Self {
        Self {
            timeout_ms,
            state: SessionState::Idle,
        }
    }

    /// Start a session for a newly accepted client.
    pub fn open(&mut self, now_ms: u64) {
        self.state = SessionState::Active {
            deadline_ms: self.deadline_from(now_ms),
        };
    }

    /// Record client activity, pushing the deadline out by the full timeout.
    ///
    /// Has no effect unless the session is active.
    pub fn touch(&mut self, now_ms: u64) {
        if let SessionState::Active { .. } = self.state {
            self.open(now_ms);
        }
    }

    /// Check the deadline. Returns `true` if the session has just expired
    /// or was already expired.
    pub fn check(&mut self, now_ms: u64) -> bool {
        match self.state {
            SessionState::Active { deadline_ms } if now_ms > deadline_ms => {
                info!("client timed out after {} ms idle", self.timeout_ms);
                self.state = SessionState::Expired;
                true
            }
            SessionState::Expired => true,
            _ => false,
        }
    }

    /// Return to idle after the connection has been closed.
    pub fn close(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Whether a client is currently being served.
    pub fn is_active(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Configured idle timeout.
    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Milliseconds left before expiry, if active.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        match self.state {
            SessionState::Active { deadline_ms } => Some(deadline_ms.saturating_sub(now_ms)),
            _ => None,
        }
    }

    fn deadline_from(&self, now_ms: u64) -> u64 {
        now_ms.saturating_add(u64::from(self.timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Lifecycle Tests
    // =========================================================================

    #[test]
    fn starts_idle() {
        let s = Session::new(1000);
        assert_eq!(s.state(), SessionState::Idle);
        assert!(!s.is_active());
        assert_eq!(s.remaining_ms(0), None);
    }

    #[test]
    fn open_sets_deadline() {
        let mut s = Session::new(1000);
        s.open(500);
        assert_eq!(s.state(), SessionState::Active { deadline_ms: 1500 });
        assert_eq!(s.remaining_ms(700), Some(800));
    }

    #[test]
    fn deadline_is_inclusive() {
        let mut s = Session::new(1000);
        s.open(0);
        assert!(!s.check(1000));
        assert!(s.is_active());
        assert!(s.check(1001));
        assert!(!s.is_active());
    }

    #[test]
    fn touch_extends_by_full_timeout() {
        let mut s = Session::new(1000);
        s.open(0);
        s.touch(900);
        assert!(!s.check(1800));
        assert!(s.check(1901));
    }

    #[test]
    fn touch_ignored_when_not_active() {
        let mut s = Session::new(1000);
        s.touch(10);
        assert_eq!(s.state(), SessionState::Idle);

        s.open(0);
        assert!(s.check(2000));
        s.touch(2000);
        assert_eq!(s.state(), SessionState::Expired);
    }

    #[test]
    fn close_returns_to_idle() {
        let mut s = Session::new(1000);
        s.open(0);
        assert!(s.check(5000));
        s.close();
        assert_eq!(s.state(), SessionState::Idle);
        assert!(!s.check(10_000));
    }

    #[test]
    fn deadline_saturates() {
        let mut s = Session::new(1000);
        s.open(u64::MAX - 10);
        assert_eq!(s.state(), SessionState::Active { deadline_ms: u64::MAX });
        assert!(!s.check(u64::MAX));
    }
}
