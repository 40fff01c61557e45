// backdrop - background audio for pages that block autoplay
// Unlocks playback on the first user gesture, remembers on/off, crossfades seeks

pub mod config;     // settings and fade timings
pub mod error;      // what can go wrong (all of it absorbed and logged)
pub mod fade;       // volume ramps and crossfaded seeks
pub mod playback;   // the sink port plus a simulated sink
pub mod preference; // on/off flag storage
pub mod unlock;     // autoplay unlock state machine

#[cfg(test)]
mod testing;

// Export the stuff hosts actually use
pub use config::{Config, FadeConfig};
pub use error::{AudioError, SinkError, StoreError};
pub use fade::{FadeGuard, FadeSequencer};
pub use playback::{PlaybackPort, SimulatedSink, SinkCall};
pub use preference::{AudioPreference, FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use unlock::{
    GestureSource, InteractionKind, PlaybackSession, SessionPhase, ToggleBinder, UnlockController,
    UnlockReason, Visibility,
};
