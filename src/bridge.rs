//! OS media-control surface seam.
//!
//! Publishes now-playing metadata and playback state to the host's
//! media-control surface (lock screen, notification area, hardware keys)
//! and funnels remote commands back into the controller.  The surface is an
//! optional capability: hosts without one simply skip the integration, and
//! a failure to register an individual command is logged and otherwise
//! non-fatal.

use tokio::sync::mpsc;

/// Static artist/source label shown alongside the station name.
pub const SOURCE_LABEL: &str = "Internet Radio";

/// Remote commands the surface may deliver.  Play replays the last
/// requested stream; Pause and Stop both invoke the controller's `stop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteCommand {
    Play,
    Pause,
    Stop,
}

/// Playback state as shown on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackIndicator {
    Playing,
    Paused,
}

/// Now-playing metadata published on every play attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NowPlaying {
    /// Station display name.
    pub title: String,
    /// Always [`SOURCE_LABEL`].
    pub source: &'static str,
    /// Station tags joined with ", " (album slot on most surfaces).
    pub album: String,
    pub art_url: Option<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("media-control surface: {0}")]
pub struct SurfaceError(pub String);

/// Host media-control surface.  All methods may fail on flaky platform
/// backends; the controller logs and carries on.
pub trait MediaControlSurface: Send {
    fn set_metadata(&mut self, meta: &NowPlaying) -> Result<(), SurfaceError>;

    fn set_playback(&mut self, state: PlaybackIndicator) -> Result<(), SurfaceError>;

    /// Register a handler for one remote command.  The surface delivers the
    /// command by sending it on `tx`.  Registration failures must not
    /// prevent registering the remaining commands.
    fn register_command(
        &mut self,
        command: RemoteCommand,
        tx: mpsc::Sender<RemoteCommand>,
    ) -> Result<(), SurfaceError>;

    /// Remove all registered handlers.  Called when the controller task
    /// shuts down; idempotent.
    fn unregister_commands(&mut self);
}

/// Build the metadata record for a station.
pub fn now_playing(station: &crate::station::Station) -> NowPlaying {
    NowPlaying {
        title: station.name.clone(),
        source: SOURCE_LABEL,
        album: station.tags.join(", "),
        art_url: station.cover_url.clone(),
    }
}
