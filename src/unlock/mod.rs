// Autoplay unlock - gets background audio going as soon as the environment lets it
// Listens for gestures and visibility changes, and applies the on/off preference

pub mod events;
pub mod session;

pub use events::{
    GestureSource, InteractionKind, ListenerOptions, ToggleBinder, UnlockReason, Visibility,
};
pub use session::{PlaybackSession, SessionHandle, SessionPhase};

use crate::config::FadeConfig;
use crate::error::AudioError;
use crate::fade::{FadeGuard, FadeSequencer};
use crate::playback::{settle_logged, PlaybackPort};
use crate::preference::AudioPreference;
use std::sync::Arc;
use tracing::{debug, info, warn};

const PAUSE_FAILED: &str = "background audio pause failed";
const MUTE_FAILED: &str = "background audio mute failed";
const PLAY_FAILED: &str = "background audio play failed";

/// Owns the playback session and drives the sink from page events.
///
/// Cheap to clone; clones share the same session, so a host can hand one to
/// each event handler. None of the public operations return errors: sink and
/// storage failures are logged and the session is left consistent.
#[derive(Clone)]
pub struct UnlockController {
    session: SessionHandle,
    sink: Option<Arc<dyn PlaybackPort>>,
    preference: AudioPreference,
    gestures: Option<Arc<dyn GestureSource>>,
    toggle: Option<Arc<dyn ToggleBinder>>,
    fade_guard: FadeGuard,
}

impl UnlockController {
    /// Build a controller, reading the stored preference.
    ///
    /// Without a sink there is nothing to unlock, so the session starts unlocked.
    pub fn new(sink: Option<Arc<dyn PlaybackPort>>, preference: AudioPreference) -> Self {
        let enabled = preference.load();
        let unlocked = sink.is_none();

        Self {
            session: SessionHandle::new(PlaybackSession::new(enabled, unlocked)),
            sink,
            preference,
            gestures: None,
            toggle: None,
            fade_guard: FadeGuard::new(),
        }
    }

    pub fn with_gestures(mut self, gestures: Arc<dyn GestureSource>) -> Self {
        self.gestures = Some(gestures);
        self
    }

    pub fn with_toggle(mut self, toggle: Arc<dyn ToggleBinder>) -> Self {
        self.toggle = Some(toggle);
        self
    }

    /// Bind gesture listeners and make the first move: try to play if enabled,
    /// otherwise mute and then pause.
    pub async fn start(&self) {
        let Some(sink) = self.sink.clone() else {
            self.reflect_toggle();
            return;
        };

        self.bind_listeners();

        if self.session.is_enabled() {
            self.attempt_unlock(UnlockReason::Auto).await;
        } else {
            // mute first so a late pause can't leak a blip
            sink.set_muted(true);
            settle_logged(sink.pause(), MUTE_FAILED).await;
        }
        self.reflect_toggle();
    }

    pub fn session(&self) -> PlaybackSession {
        self.session.snapshot()
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.lock().phase()
    }

    pub fn current_enabled_state(&self) -> bool {
        self.session.is_enabled()
    }

    /// A fader sharing this controller's sink, enabled flag and overlap guard
    pub fn fader(&self, config: FadeConfig) -> FadeSequencer {
        FadeSequencer::new(
            self.sink.clone(),
            self.session.clone(),
            config,
            self.fade_guard.clone(),
        )
    }

    /// Entry point for the toggle binder
    pub async fn on_preference_changed(&self, enabled: bool) {
        self.set_preference(enabled).await;
    }

    pub async fn set_preference(&self, enabled: bool) {
        self.session.lock().enabled = enabled;
        info!("Background audio turned {}", if enabled { "on" } else { "off" });

        self.preference.persist(enabled);
        self.reflect_toggle();
        self.apply_preference().await;
    }

    /// A gesture observed by a bound listener
    pub async fn handle_interaction(&self, kind: InteractionKind) {
        {
            let session = self.session.lock();
            if !session.listeners_bound || !session.enabled {
                return;
            }
        }
        self.attempt_unlock(UnlockReason::Interaction(kind)).await;
    }

    pub async fn handle_visibility_change(&self, visibility: Visibility) {
        let Some(sink) = self.sink.clone() else {
            return;
        };

        match visibility {
            Visibility::Hidden => {
                let pause = {
                    let mut session = self.session.lock();
                    session.resume_on_visible = !sink.paused() && session.enabled;
                    session.resume_on_visible
                };
                if pause {
                    debug!("Page hidden while playing, pausing background audio");
                    settle_logged(sink.pause(), PAUSE_FAILED).await;
                }
            }
            Visibility::Visible => {
                let resume = {
                    let mut session = self.session.lock();
                    let resume = session.resume_on_visible && session.enabled;
                    session.resume_on_visible = false;
                    resume
                };
                // an unlocked session plays directly; a bare unlock attempt would no-op
                if resume {
                    self.resume_or_unlock(UnlockReason::Visibility).await;
                }
            }
        }
    }

    /// Try to start playback. No-op unless enabled, still locked and not
    /// already waiting on an earlier attempt.
    pub async fn attempt_unlock(&self, reason: UnlockReason) {
        let Some(sink) = self.sink.clone() else {
            return;
        };

        {
            let mut session = self.session.lock();
            if !session.can_attempt() {
                return;
            }
            session.begin_attempt();
        }
        debug!("Attempting background audio unlock ({})", reason);

        match sink.play().settle().await {
            Ok(()) => {
                let still_enabled = {
                    let mut session = self.session.lock();
                    session.settle_success();
                    session.enabled
                };
                info!("Background audio unlocked ({})", reason);
                self.detach_listeners();

                // preference went off while play() was in flight
                if !still_enabled {
                    self.enforce_disabled(sink.as_ref()).await;
                }
            }
            Err(source) => {
                self.session.lock().settle_failure(source.clone());
                warn!(
                    "background audio blocked: {}",
                    AudioError::UnlockRejected {
                        reason: reason.as_str(),
                        source,
                    }
                );
            }
        }
    }

    async fn apply_preference(&self) {
        let Some(sink) = self.sink.clone() else {
            return;
        };

        if !self.session.is_enabled() {
            self.enforce_disabled(sink.as_ref()).await;
            return;
        }

        sink.set_muted(false);
        self.resume_or_unlock(UnlockReason::Preference).await;
    }

    /// Once unlocked a paused sink can simply be played; before that, go
    /// through the guarded unlock.
    async fn resume_or_unlock(&self, reason: UnlockReason) {
        let Some(sink) = self.sink.clone() else {
            return;
        };

        if self.session.lock().unlocked {
            if sink.paused() {
                settle_logged(sink.play(), PLAY_FAILED).await;
            }
            return;
        }
        self.attempt_unlock(reason).await;
    }

    async fn enforce_disabled(&self, sink: &dyn PlaybackPort) {
        sink.set_muted(true);
        self.session.lock().resume_on_visible = false;
        settle_logged(sink.pause(), MUTE_FAILED).await;
    }

    fn bind_listeners(&self) {
        {
            let mut session = self.session.lock();
            if session.listeners_bound {
                return;
            }
            session.listeners_bound = true;
        }
        if let Some(gestures) = &self.gestures {
            gestures.bind(&InteractionKind::ALL, ListenerOptions { passive: true });
        }
    }

    fn detach_listeners(&self) {
        {
            let mut session = self.session.lock();
            if !session.listeners_bound {
                return;
            }
            session.listeners_bound = false;
        }
        if let Some(gestures) = &self.gestures {
            gestures.unbind(&InteractionKind::ALL);
        }
        debug!("Interaction listeners detached");
    }

    fn reflect_toggle(&self) {
        if let Some(toggle) = &self.toggle {
            toggle.reflect(self.session.is_enabled());
        }
    }
}

impl std::fmt::Debug for UnlockController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnlockController")
            .field("session", &self.session.snapshot())
            .field("has_sink", &self.sink.is_some())
            .field("preference", &self.preference)
            .finish_non_exhaustive()
    }
}
