//! Adaptive (segmented) streaming seam.
//!
//! The engine is an optional injected capability: hosts that have one pass
//! it at construction, everyone else silently degrades to direct streaming.
//! One session exists at a time and is exclusively owned by the controller.
//!
//! Session events are tagged with the request generation that created the
//! session.  The controller discards events whose generation is older than
//! its live counter — that is the sole cancellation mechanism; a superseded
//! session is closed but its in-flight callbacks are merely suppressed.

use crate::element::MediaElement;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Tuning applied to every fresh session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaptiveTuning {
    /// Decode on a background worker.
    #[serde(default = "default_worker")]
    pub worker: bool,
    #[serde(default = "default_low_latency")]
    pub low_latency: bool,
    /// Manifest-load retries handled inside the engine itself.
    #[serde(default = "default_manifest_retries")]
    pub manifest_max_retries: u32,
}

fn default_worker() -> bool {
    true
}

fn default_low_latency() -> bool {
    true
}

fn default_manifest_retries() -> u32 {
    3
}

impl Default for AdaptiveTuning {
    fn default() -> Self {
        Self {
            worker: default_worker(),
            low_latency: default_low_latency(),
            manifest_max_retries: default_manifest_retries(),
        }
    }
}

/// Category of a fatal session error.  Network and media failures are
/// recovered inside the session; anything else escalates to the retry
/// engine as a hard failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamErrorKind {
    Network,
    Media,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEventKind {
    /// Manifest fetched and parsed; playback may start.
    ManifestParsed,
    FatalError(StreamErrorKind),
}

/// A session-level event, tagged with the generation of the play request
/// that created the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub generation: u64,
    pub kind: SessionEventKind,
}

/// Factory + capability query for adaptive streaming.
pub trait AdaptiveStreamEngine: Send {
    /// Whether adaptive playback is usable in this environment.  Checked on
    /// every play request.
    fn is_supported(&self) -> bool;

    /// Construct a fresh session.  All events the session emits must carry
    /// `generation` so the controller can fence stale callbacks.
    fn create_session(
        &mut self,
        tuning: &AdaptiveTuning,
        generation: u64,
        events: mpsc::Sender<SessionEvent>,
    ) -> Box<dyn AdaptiveSession>;
}

/// One segmented-streaming session.
pub trait AdaptiveSession: Send {
    /// Begin fetching and parsing the manifest at `url`.
    fn load_manifest(&mut self, url: &str);

    /// Attach the session's output to the media element.
    fn attach(&mut self, element: &mut dyn MediaElement);

    /// Restart loading after a network-category fatal error.
    fn resume_loading(&mut self);

    /// Attempt internal recovery after a media-category fatal error.
    fn recover_media(&mut self);

    /// Tear the session down.  Idempotent and never fails; closing an
    /// already-dead session is a no-op.
    fn close(&mut self);
}
