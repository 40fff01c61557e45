// Error taxonomy for background audio
// None of these ever escape the controller or the fader - they exist to be logged

use thiserror::Error;

/// What a sink reports when `play()` or `pause()` does not go through
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SinkError {
    /// Autoplay policy refused playback (no user gesture yet)
    #[error("playback not allowed by the environment")]
    NotAllowed,

    /// The call was interrupted by a later pause/load
    #[error("playback request aborted")]
    Aborted,

    #[error("sink failure: {0}")]
    Failed(String),
}

/// Preference storage failures (storage disabled, quota, bad file)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("preference storage unavailable")]
    Unavailable,

    #[error("preference storage io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("preference file is not valid toml: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not encode preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Everything that can go wrong in the subsystem, as it shows up in the logs
#[derive(Debug, Error)]
pub enum AudioError {
    /// Autoplay blocked - expected, retried on the next qualifying event
    #[error("unlock attempt ({reason}) rejected: {source}")]
    UnlockRejected {
        reason: &'static str,
        #[source]
        source: SinkError,
    },

    /// play/pause failed outside the unlock flow
    #[error("{label}: {source}")]
    SinkOperationFailed {
        label: &'static str,
        #[source]
        source: SinkError,
    },

    #[error("preference storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_show_up_in_messages() {
        let err = AudioError::SinkOperationFailed {
            label: "background audio pause failed",
            source: SinkError::Failed("device gone".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "background audio pause failed: sink failure: device gone"
        );

        let err = AudioError::UnlockRejected {
            reason: "keydown",
            source: SinkError::NotAllowed,
        };
        assert!(err.to_string().contains("(keydown)"));
    }
}
