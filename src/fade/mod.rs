// Crossfade sequencer - moves the playback cursor without an audible pop
// Fade out, seek, fade in; or seek, play, fade in when nothing is playing

use crate::config::FadeConfig;
use crate::playback::{settle_logged, PlaybackPort};
use crate::unlock::SessionHandle;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

const CROSSFADE_PLAY_FAILED: &str = "crossfade playback failed";

/// One per sink: every sequencer driving that sink must share it.
///
/// Bumped by every crossfade; ramps holding an older value stop early.
#[derive(Debug, Clone, Default)]
pub struct FadeGuard(Arc<AtomicU64>);

impl FadeGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
pub struct FadeSequencer {
    sink: Option<Arc<dyn PlaybackPort>>,
    session: SessionHandle,
    config: FadeConfig,
    guard: FadeGuard,
}

impl FadeSequencer {
    pub fn new(
        sink: Option<Arc<dyn PlaybackPort>>,
        session: SessionHandle,
        config: FadeConfig,
        guard: FadeGuard,
    ) -> Self {
        Self {
            sink,
            session,
            config,
            guard,
        }
    }

    /// Move the cursor to `target_time` (seconds).
    ///
    /// Paused sink: seek, silence, play, then fade in. Playing sink: fade out,
    /// seek once the fade-out is done, then fade in. Does nothing without a
    /// sink or while background audio is turned off. With
    /// `supersede_in_flight` off, overlapping calls interleave their ramps and
    /// callers must serialize them.
    pub async fn crossfade_to_time(&self, target_time: f64) {
        let Some(sink) = self.sink.as_deref() else {
            return;
        };
        if !self.session.is_enabled() {
            return;
        }

        let ticket = self.guard.claim();
        let target_volume = self.config.target_volume;

        if sink.paused() {
            sink.set_current_time(target_time);
            sink.set_volume(0.0);
            // no retry here, the next gesture goes through the unlock controller
            if !settle_logged(sink.play(), CROSSFADE_PLAY_FAILED).await {
                return;
            }
            self.ramp_on(sink, ticket, 0.0, target_volume, self.config.paused_fade_in())
                .await;
            return;
        }

        let start_volume = sink.volume();
        if !self
            .ramp_on(sink, ticket, start_volume, 0.0, self.config.fade_out())
            .await
        {
            return;
        }
        sink.set_current_time(target_time);
        self.ramp_on(sink, ticket, 0.0, target_volume, self.config.fade_in())
            .await;
    }

    /// Linear volume ramp in a fixed number of steps spread over `duration`.
    /// Resolves once the final step has been applied; returns false if a
    /// newer crossfade took over first.
    pub async fn ramp(&self, from: f64, to: f64, duration: Duration) -> bool {
        let Some(sink) = self.sink.as_deref() else {
            return false;
        };
        let ticket = self.guard.current();
        self.ramp_on(sink, ticket, from, to, duration).await
    }

    async fn ramp_on(
        &self,
        sink: &dyn PlaybackPort,
        ticket: u64,
        from: f64,
        to: f64,
        duration: Duration,
    ) -> bool {
        let steps = self.config.steps.max(1);
        let step_time = duration / steps;

        for step in 1..=steps {
            tokio::time::sleep(step_time).await;

            if self.superseded(ticket) {
                debug!("Volume ramp superseded at step {}/{}", step, steps);
                return false;
            }

            let progress = f64::from(step) / f64::from(steps);
            // lerp form lands exactly on `to` at the last step
            let volume = from * (1.0 - progress) + to * progress;
            sink.set_volume(volume.clamp(0.0, 1.0));
        }

        true
    }

    fn superseded(&self, ticket: u64) -> bool {
        self.config.supersede_in_flight && self.guard.current() != ticket
    }
}

impl std::fmt::Debug for FadeSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FadeSequencer")
            .field("has_sink", &self.sink.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
