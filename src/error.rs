use thiserror::Error;

/// Errors surfaced to callers of the public handle.  Recoverable playback
/// failures never appear here — they are logged and drive the retry engine;
/// only the `Error` status is user-visible.
#[derive(Debug, Error)]
pub enum PlayerError {
    /// The controller task has exited; the handle is dead.
    #[error("player controller task gone")]
    ControllerGone,
}
