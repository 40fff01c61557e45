// Test doubles shared by the unit tests

use crate::error::{SinkError, StoreError};
use crate::playback::{PlaybackPort, SinkCall};
use crate::preference::PreferenceStore;
use crate::unlock::{GestureSource, InteractionKind, ListenerOptions, ToggleBinder};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Play,
    Pause,
    Volume(f64),
    Seek(f64),
    Muted(bool),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayMode {
    /// play() succeeds synchronously
    Immediate,
    /// play() hands back a future that rejects
    Reject,
    /// play() hands back a future the test settles with `resolve_next`
    Manual,
}

struct FakeState {
    paused: bool,
    volume: f64,
    muted: bool,
    current_time: f64,
    play_mode: PlayMode,
    pause_fails: bool,
    events: Vec<SinkEvent>,
    pending: VecDeque<oneshot::Sender<Result<(), SinkError>>>,
}

/// Sink that records every command it gets
#[derive(Clone)]
pub struct RecordingSink {
    state: Arc<Mutex<FakeState>>,
}

impl RecordingSink {
    pub fn new(play_mode: PlayMode) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                paused: true,
                volume: 1.0,
                muted: false,
                current_time: 0.0,
                play_mode,
                pause_fails: false,
                events: Vec::new(),
                pending: VecDeque::new(),
            })),
        }
    }

    pub fn shared(play_mode: PlayMode) -> (Self, Arc<dyn PlaybackPort>) {
        let sink = Self::new(play_mode);
        let port: Arc<dyn PlaybackPort> = Arc::new(sink.clone());
        (sink, port)
    }

    pub fn set_play_mode(&self, mode: PlayMode) {
        self.state.lock().unwrap().play_mode = mode;
    }

    pub fn set_pause_fails(&self, fails: bool) {
        self.state.lock().unwrap().pause_fails = fails;
    }

    /// Change playback state/volume/position without recording an event
    pub fn force(&self, paused: bool, volume: f64, current_time: f64) {
        let mut state = self.state.lock().unwrap();
        state.paused = paused;
        state.volume = volume;
        state.current_time = current_time;
    }

    pub fn resolve_next(&self, result: Result<(), SinkError>) {
        let sender = self
            .state
            .lock()
            .unwrap()
            .pending
            .pop_front()
            .expect("no pending play()");
        let _ = sender.send(result);
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.lock().unwrap().events.clear();
    }

    pub fn play_count(&self) -> usize {
        self.events().iter().filter(|e| **e == SinkEvent::Play).count()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                SinkEvent::Volume(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: SinkEvent) {
        self.state.lock().unwrap().events.push(event);
    }
}

impl PlaybackPort for RecordingSink {
    fn play(&self) -> SinkCall {
        let mut state = self.state.lock().unwrap();
        state.events.push(SinkEvent::Play);
        match state.play_mode {
            PlayMode::Immediate => {
                state.paused = false;
                SinkCall::Done
            }
            PlayMode::Reject => SinkCall::pending(async { Err(SinkError::NotAllowed) }),
            PlayMode::Manual => {
                let (tx, rx) = oneshot::channel();
                state.pending.push_back(tx);
                let shared = Arc::clone(&self.state);
                SinkCall::pending(async move {
                    let result = rx.await.unwrap_or(Err(SinkError::Aborted));
                    if result.is_ok() {
                        shared.lock().unwrap().paused = false;
                    }
                    result
                })
            }
        }
    }

    fn pause(&self) -> SinkCall {
        let mut state = self.state.lock().unwrap();
        state.events.push(SinkEvent::Pause);
        if state.pause_fails {
            return SinkCall::Failed(SinkError::Failed("pause refused".to_string()));
        }
        state.paused = true;
        SinkCall::Done
    }

    fn paused(&self) -> bool {
        self.state.lock().unwrap().paused
    }

    fn volume(&self) -> f64 {
        self.state.lock().unwrap().volume
    }

    fn set_volume(&self, volume: f64) {
        self.record(SinkEvent::Volume(volume));
        self.state.lock().unwrap().volume = volume;
    }

    fn current_time(&self) -> f64 {
        self.state.lock().unwrap().current_time
    }

    fn set_current_time(&self, seconds: f64) {
        self.record(SinkEvent::Seek(seconds));
        self.state.lock().unwrap().current_time = seconds;
    }

    fn muted(&self) -> bool {
        self.state.lock().unwrap().muted
    }

    fn set_muted(&self, muted: bool) {
        self.record(SinkEvent::Muted(muted));
        self.state.lock().unwrap().muted = muted;
    }
}

#[derive(Default)]
pub struct RecordingGestures {
    pub bound: Mutex<Vec<InteractionKind>>,
    pub bind_calls: Mutex<Vec<ListenerOptions>>,
    pub unbind_calls: Mutex<usize>,
}

impl GestureSource for RecordingGestures {
    fn bind(&self, kinds: &[InteractionKind], options: ListenerOptions) {
        self.bound.lock().unwrap().extend_from_slice(kinds);
        self.bind_calls.lock().unwrap().push(options);
    }

    fn unbind(&self, kinds: &[InteractionKind]) {
        self.bound.lock().unwrap().retain(|k| !kinds.contains(k));
        *self.unbind_calls.lock().unwrap() += 1;
    }
}

#[derive(Default)]
pub struct RecordingToggle {
    pub values: Mutex<Vec<bool>>,
}

impl RecordingToggle {
    pub fn last(&self) -> Option<bool> {
        self.values.lock().unwrap().last().copied()
    }
}

impl ToggleBinder for RecordingToggle {
    fn reflect(&self, enabled: bool) {
        self.values.lock().unwrap().push(enabled);
    }
}

/// Storage that refuses every read and write
pub struct BrokenStore;

impl PreferenceStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

/// Let spawned tasks run up to their next real suspension point
pub async fn settle_tasks() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}
