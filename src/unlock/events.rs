use std::fmt;

/// User gestures that count as activation for autoplay purposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    PointerDown,
    TouchStart,
    KeyDown,
}

impl InteractionKind {
    pub const ALL: [InteractionKind; 3] = [
        InteractionKind::PointerDown,
        InteractionKind::TouchStart,
        InteractionKind::KeyDown,
    ];

    pub fn event_name(&self) -> &'static str {
        match self {
            InteractionKind::PointerDown => "pointerdown",
            InteractionKind::TouchStart => "touchstart",
            InteractionKind::KeyDown => "keydown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Why an unlock attempt was made; shows up in the rejection log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockReason {
    Auto,
    Interaction(InteractionKind),
    Visibility,
    Preference,
}

impl UnlockReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnlockReason::Auto => "auto",
            UnlockReason::Interaction(kind) => kind.event_name(),
            UnlockReason::Visibility => "visibility",
            UnlockReason::Preference => "preference",
        }
    }
}

impl fmt::Display for UnlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerOptions {
    /// Listener never blocks scrolling/default handling
    pub passive: bool,
}

/// Where interaction listeners get attached (a document, a window, a test double).
///
/// The host forwards each observed gesture to
/// [`UnlockController::handle_interaction`](super::UnlockController::handle_interaction).
pub trait GestureSource: Send + Sync {
    fn bind(&self, kinds: &[InteractionKind], options: ListenerOptions);
    fn unbind(&self, kinds: &[InteractionKind]);
}

/// A UI control (checkbox, switch) that mirrors the enabled flag
pub trait ToggleBinder: Send + Sync {
    fn reflect(&self, enabled: bool);
}
