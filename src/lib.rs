//! Streaming playback controller for internet-radio front-ends.
//!
//! The crate is built around one actor, the [`controller::PlayerHandle`]:
//! it owns playback intent, picks between adaptive (segmented) and direct
//! streaming per URL, retries failures with bounded exponential backoff,
//! and mirrors playback state to the OS media-control surface.  Host
//! capabilities — the media element, the adaptive engine, the control
//! surface and the preference store — are injected at construction, so the
//! controller runs unchanged against a real backend or test fakes.

pub mod adaptive;
pub mod bridge;
pub mod config;
pub mod controller;
pub mod element;
pub mod error;
pub mod prefs;
pub mod retry;
pub mod state;
pub mod station;
pub mod strategy;

pub use config::PlayerConfig;
pub use controller::{PlayerHandle, PlayerParts};
pub use error::PlayerError;
pub use state::{PlayerState, PlayerStatus};
pub use station::Station;
