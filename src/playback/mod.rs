// Playback port - the audio sink the controller and the fader drive
// The sink itself (decoding, output) lives outside this crate

pub mod sim;

pub use sim::SimulatedSink;

use crate::error::{AudioError, SinkError};
use futures::future::BoxFuture;
use std::fmt;
use tracing::warn;

pub type SinkFuture = BoxFuture<'static, Result<(), SinkError>>;

/// Outcome of a `play()`/`pause()` call on the sink.
///
/// Sinks may answer right away, fail right away, or hand back a future that
/// settles later (browsers answer `play()` with a promise).
pub enum SinkCall {
    Done,
    Failed(SinkError),
    Pending(SinkFuture),
}

impl SinkCall {
    pub fn pending<F>(fut: F) -> Self
    where
        F: std::future::Future<Output = Result<(), SinkError>> + Send + 'static,
    {
        SinkCall::Pending(Box::pin(fut))
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SinkCall::Pending(_))
    }

    /// Wait for the call to settle, whichever way it answered
    pub async fn settle(self) -> Result<(), SinkError> {
        match self {
            SinkCall::Done => Ok(()),
            SinkCall::Failed(e) => Err(e),
            SinkCall::Pending(fut) => fut.await,
        }
    }
}

impl fmt::Debug for SinkCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkCall::Done => f.write_str("Done"),
            SinkCall::Failed(e) => f.debug_tuple("Failed").field(e).finish(),
            SinkCall::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// An audio element-like sink: play/pause plus a handful of mutable properties.
///
/// Methods take `&self`; implementations keep their own interior state so a
/// single sink can be shared by the controller and the fader.
pub trait PlaybackPort: Send + Sync {
    fn play(&self) -> SinkCall;
    fn pause(&self) -> SinkCall;

    fn paused(&self) -> bool;

    /// Linear volume, 0.0 to 1.0
    fn volume(&self) -> f64;
    fn set_volume(&self, volume: f64);

    /// Playback cursor in seconds
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);

    fn muted(&self) -> bool;
    fn set_muted(&self, muted: bool);
}

/// Settle a sink call and swallow the failure, logging it under `label`.
/// Returns whether the call went through.
pub(crate) async fn settle_logged(call: SinkCall, label: &'static str) -> bool {
    match call.settle().await {
        Ok(()) => true,
        Err(source) => {
            warn!("{}", AudioError::SinkOperationFailed { label, source });
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_settle_covers_every_shape() {
        assert_eq!(SinkCall::Done.settle().await, Ok(()));
        assert_eq!(
            SinkCall::Failed(SinkError::Aborted).settle().await,
            Err(SinkError::Aborted)
        );

        let call = SinkCall::pending(async { Err(SinkError::NotAllowed) });
        assert!(call.is_pending());
        assert_eq!(call.settle().await, Err(SinkError::NotAllowed));
    }

    #[tokio::test]
    async fn test_settle_logged_reports_outcome() {
        assert!(settle_logged(SinkCall::pending(async { Ok(()) }), "play").await);
        assert!(!settle_logged(SinkCall::Failed(SinkError::Aborted), "pause").await);
    }
}
