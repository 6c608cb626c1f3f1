//! Media element seam.
//!
//! The controller exclusively owns one `MediaElement`.  Commands are plain
//! method calls; outcomes arrive asynchronously as `ElementEvent`s on a
//! channel the host wires up at construction time.  Failures are therefore
//! never returned from these methods — a load that goes wrong surfaces as
//! `ElementEvent::Error` and is routed through the retry engine.

/// Playback device abstraction.  Implementations wrap whatever actually
/// produces audio (an HTML audio element, an mpv handle, a decoder pipeline).
pub trait MediaElement: Send {
    fn set_source(&mut self, url: &str);
    fn clear_source(&mut self);
    /// Force a reload of the current source.
    fn load(&mut self);
    fn play(&mut self);
    fn pause(&mut self);
    /// Volume in [0,1].  Applying volume must not change the mute state.
    fn set_volume(&mut self, volume: f32);
    fn set_muted(&mut self, muted: bool);
}

/// Events emitted by the media element.  Delivered to the controller over
/// an `mpsc` channel; handlers are gated on the controller's intent flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementEvent {
    /// Audio started (or resumed) flowing.
    Playing,
    /// The element paused on its own (not via the controller).
    Paused,
    /// Buffer underrun / stall; the element is waiting for data.
    Waiting,
    /// Playback or load failure, with whatever detail the element had.
    Error(String),
}
