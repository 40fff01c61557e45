use crate::error::SinkError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Where the controller stands, derived from the session flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Disabled,
    LockedIdle,
    LockedAttempting,
    Unlocked,
}

/// The one record the controller owns for its lifetime
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession {
    pub enabled: bool,
    pub unlocked: bool,
    pub attempting: bool,
    pub resume_on_visible: bool,
    pub last_error: Option<SinkError>,
    pub listeners_bound: bool,
}

impl PlaybackSession {
    pub fn new(enabled: bool, unlocked: bool) -> Self {
        Self {
            enabled,
            unlocked,
            attempting: false,
            resume_on_visible: false,
            last_error: None,
            listeners_bound: false,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        if !self.enabled {
            SessionPhase::Disabled
        } else if self.unlocked {
            SessionPhase::Unlocked
        } else if self.attempting {
            SessionPhase::LockedAttempting
        } else {
            SessionPhase::LockedIdle
        }
    }

    /// Guard for a new unlock attempt
    pub fn can_attempt(&self) -> bool {
        self.enabled && !self.unlocked && !self.attempting
    }

    pub(crate) fn begin_attempt(&mut self) {
        self.attempting = true;
    }

    pub(crate) fn settle_success(&mut self) {
        self.attempting = false;
        self.unlocked = true;
    }

    pub(crate) fn settle_failure(&mut self, error: SinkError) {
        self.attempting = false;
        self.last_error = Some(error);
    }
}

/// Shared access to the session, handed to the fader so it can check `enabled`.
///
/// The lock is only ever held for flag reads/writes, never across a sink call.
#[derive(Debug, Clone)]
pub struct SessionHandle(Arc<Mutex<PlaybackSession>>);

impl SessionHandle {
    pub fn new(session: PlaybackSession) -> Self {
        Self(Arc::new(Mutex::new(session)))
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, PlaybackSession> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> PlaybackSession {
        self.lock().clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases() {
        let mut session = PlaybackSession::new(true, false);
        assert_eq!(session.phase(), SessionPhase::LockedIdle);
        assert!(session.can_attempt());

        session.begin_attempt();
        assert_eq!(session.phase(), SessionPhase::LockedAttempting);
        assert!(!session.can_attempt());

        session.settle_success();
        assert_eq!(session.phase(), SessionPhase::Unlocked);
        assert!(!session.attempting);

        session.enabled = false;
        assert_eq!(session.phase(), SessionPhase::Disabled);
        assert!(session.unlocked);
    }

    #[test]
    fn test_failure_returns_to_idle_and_keeps_error() {
        let mut session = PlaybackSession::new(true, false);
        session.begin_attempt();
        session.settle_failure(SinkError::NotAllowed);

        assert_eq!(session.phase(), SessionPhase::LockedIdle);
        assert_eq!(session.last_error, Some(SinkError::NotAllowed));
    }

    #[test]
    fn test_disabled_session_never_attempts() {
        let session = PlaybackSession::new(false, false);
        assert!(!session.can_attempt());
    }
}
