use super::{PlaybackPort, SinkCall};
use crate::error::SinkError;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// In-process sink with a browser-style autoplay policy.
///
/// `play()` is refused until a user gesture has been noted (unless autoplay is
/// allowed outright) and always answers asynchronously after `latency`, the
/// way a media element's play promise does.
#[derive(Debug, Clone)]
pub struct SimulatedSink {
    state: Arc<Mutex<SimState>>,
    latency: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    pub paused: bool,
    pub volume: f64,
    pub muted: bool,
    pub current_time: f64,
    pub autoplay_allowed: bool,
    pub gesture_seen: bool,
}

impl SimulatedSink {
    pub fn new(autoplay_allowed: bool, latency: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimState {
                paused: true,
                volume: 1.0,
                muted: false,
                current_time: 0.0,
                autoplay_allowed,
                gesture_seen: false,
            })),
            latency,
        }
    }

    /// User activation is sticky: once seen, later play() calls are allowed
    pub fn note_gesture(&self) {
        self.lock().gesture_seen = true;
    }

    pub fn snapshot(&self) -> SimState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PlaybackPort for SimulatedSink {
    fn play(&self) -> SinkCall {
        // activation is checked when play() is called, not when it settles
        let allowed = {
            let state = self.lock();
            state.autoplay_allowed || state.gesture_seen
        };
        let state = Arc::clone(&self.state);
        let latency = self.latency;

        SinkCall::pending(async move {
            tokio::time::sleep(latency).await;
            if !allowed {
                return Err(SinkError::NotAllowed);
            }
            state.lock().unwrap_or_else(PoisonError::into_inner).paused = false;
            Ok(())
        })
    }

    fn pause(&self) -> SinkCall {
        self.lock().paused = true;
        SinkCall::Done
    }

    fn paused(&self) -> bool {
        self.lock().paused
    }

    fn volume(&self) -> f64 {
        self.lock().volume
    }

    fn set_volume(&self, volume: f64) {
        self.lock().volume = volume.clamp(0.0, 1.0);
    }

    fn current_time(&self) -> f64 {
        self.lock().current_time
    }

    fn set_current_time(&self, seconds: f64) {
        self.lock().current_time = seconds.max(0.0);
    }

    fn muted(&self) -> bool {
        self.lock().muted
    }

    fn set_muted(&self, muted: bool) {
        self.lock().muted = muted;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_blocked_until_gesture() {
        let sink = SimulatedSink::new(false, Duration::from_millis(20));

        assert_eq!(sink.play().settle().await, Err(SinkError::NotAllowed));
        assert!(sink.paused());

        sink.note_gesture();
        assert_eq!(sink.play().settle().await, Ok(()));
        assert!(!sink.paused());
    }

    #[tokio::test(start_paused = true)]
    async fn test_allowed_autoplay_starts_without_gesture() {
        let sink = SimulatedSink::new(true, Duration::from_millis(5));
        assert!(sink.play().settle().await.is_ok());
        assert!(!sink.paused());

        sink.pause().settle().await.unwrap();
        assert!(sink.paused());
    }
}
