use crate::station::Station;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Detailed playback status — reflects what the controller believes the
/// underlying element is doing.  Derived from play/stop intents and element
/// events; never set directly by callers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum PlayerStatus {
    /// Nothing loaded / no URL.
    #[default]
    Idle,
    /// Load started or stream stalled; waiting for audio to flow.
    Loading,
    /// Audio flowing.
    Playing,
    /// Explicitly stopped, or the element paused while we did not want to play.
    Paused,
    /// Retries exhausted — requires a fresh `play()` to recover.
    Error,
    /// Host reported loss of connectivity.
    Offline,
}

/// Observable snapshot of the controller.  `rev` is a monotonically
/// increasing counter incremented on every change; readers can use it to
/// detect missed updates.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PlayerState {
    #[serde(default)]
    pub rev: u64,
    pub status: PlayerStatus,
    pub volume: f32,
    pub current_station: Option<Station>,
    /// URL of the last load attempt (also the retry target).
    pub last_url: Option<String>,
}

/// Shared handle to the controller's observable state.  The controller task
/// is the only writer; anything may read.
#[derive(Clone)]
pub struct StateHandle {
    state: Arc<RwLock<PlayerState>>,
}

impl StateHandle {
    pub fn new(volume: f32) -> Self {
        let state = PlayerState {
            rev: 1,
            volume,
            ..PlayerState::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub async fn snapshot(&self) -> PlayerState {
        self.state.read().await.clone()
    }

    pub async fn status(&self) -> PlayerStatus {
        self.state.read().await.status
    }

    pub async fn volume(&self) -> f32 {
        self.state.read().await.volume
    }

    pub(crate) async fn set_status(&self, status: PlayerStatus) {
        let mut state = self.state.write().await;
        state.status = status;
        state.rev += 1;
    }

    pub(crate) async fn set_volume(&self, volume: f32) {
        let mut state = self.state.write().await;
        state.volume = volume;
        state.rev += 1;
    }

    pub(crate) async fn set_loading(&self, station: Option<Station>, url: String) {
        let mut state = self.state.write().await;
        if station.is_some() {
            state.current_station = station;
        }
        state.last_url = Some(url);
        state.status = PlayerStatus::Loading;
        state.rev += 1;
    }
}
