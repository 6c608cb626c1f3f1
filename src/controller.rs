//! The playback controller actor.
//!
//! Architecture (single input funnel):
//!
//! ```text
//!   PlayerHandle ──┐
//!   element events ─┤
//!   session events ─┼──mpsc──▶ controller task (owns element, session,
//!   retry timers  ──┤           generation, retry counter, intent flag)
//!   remote surface ─┘
//! ```
//!
//! All mutation happens on the controller task, so the cross-callback
//! counters (request generation, retry counter, "should be playing" flag)
//! need no locking.  Every play request bumps the generation; adaptive
//! callbacks and retry timers carry the generation of the load that created
//! them and are discarded when stale.  That suppression is the sole
//! cancellation mechanism — in-flight work is never truly aborted.
//!
//! `stop()` always wins over in-flight completions because it bumps the
//! generation before tearing anything down.

use crate::adaptive::{
    AdaptiveSession, AdaptiveStreamEngine, SessionEvent, SessionEventKind, StreamErrorKind,
};
use crate::bridge::{self, MediaControlSurface, PlaybackIndicator, RemoteCommand};
use crate::config::PlayerConfig;
use crate::element::{ElementEvent, MediaElement};
use crate::error::PlayerError;
use crate::prefs::{self, PreferenceStore, VOLUME_KEY};
use crate::retry::backoff_delay;
use crate::state::{PlayerState, PlayerStatus, StateHandle};
use crate::station::Station;
use crate::strategy::{select_strategy, Strategy};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Everything the controller needs from the host environment.  `engine`
/// and `surface` are optional capabilities; absence degrades silently.
pub struct PlayerParts {
    pub element: Box<dyn MediaElement>,
    /// Event stream of the media element.
    pub element_events: mpsc::Receiver<ElementEvent>,
    pub engine: Option<Box<dyn AdaptiveStreamEngine>>,
    pub surface: Option<Box<dyn MediaControlSurface>>,
    pub prefs: Box<dyn PreferenceStore>,
}

#[derive(Debug)]
enum Command {
    Play {
        station: Option<Station>,
        url: Option<String>,
    },
    Stop,
    SetVolume(f32),
    SetOnline(bool),
}

enum Msg {
    Command(Command),
    Element(ElementEvent),
    Session(SessionEvent),
    RetryFire { generation: u64, url: String },
    Remote(RemoteCommand),
    Shutdown,
}

/// Cheaply cloneable handle to the controller task.
#[derive(Clone)]
pub struct PlayerHandle {
    tx: mpsc::Sender<Msg>,
    state: StateHandle,
}

impl PlayerHandle {
    /// Spawn the controller.  Volume is read once from the preference
    /// store; remote-command handlers are registered before the task starts
    /// (per-command failures are logged and skipped).
    pub fn spawn(mut parts: PlayerParts, config: PlayerConfig) -> Self {
        let volume = prefs::load_volume(parts.prefs.as_ref());
        let state = StateHandle::new(volume);

        let (tx, rx) = mpsc::channel::<Msg>(64);

        // Element events funnel.
        let mut element_events = parts.element_events;
        let element_tx = tx.clone();
        tokio::spawn(async move {
            while let Some(ev) = element_events.recv().await {
                if element_tx.send(Msg::Element(ev)).await.is_err() {
                    break;
                }
            }
        });

        // Session events funnel.  One channel outlives individual sessions;
        // each session gets a clone of the sender.
        let (session_tx, mut session_rx) = mpsc::channel::<SessionEvent>(16);
        let session_fwd = tx.clone();
        tokio::spawn(async move {
            while let Some(ev) = session_rx.recv().await {
                if session_fwd.send(Msg::Session(ev)).await.is_err() {
                    break;
                }
            }
        });

        // Remote commands from the OS media-control surface.
        let (remote_tx, mut remote_rx) = mpsc::channel::<RemoteCommand>(8);
        if let Some(surface) = parts.surface.as_mut() {
            for command in [RemoteCommand::Play, RemoteCommand::Pause, RemoteCommand::Stop] {
                if let Err(e) = surface.register_command(command, remote_tx.clone()) {
                    warn!("bridge: failed to register {:?} handler: {}", command, e);
                }
            }
        }
        let remote_fwd = tx.clone();
        tokio::spawn(async move {
            while let Some(cmd) = remote_rx.recv().await {
                if remote_fwd.send(Msg::Remote(cmd)).await.is_err() {
                    break;
                }
            }
        });

        let controller = Controller {
            config,
            state: state.clone(),
            element: parts.element,
            engine: parts.engine,
            session: None,
            surface: parts.surface,
            prefs: parts.prefs,
            session_tx,
            msg_tx: tx.clone(),
            intent: false,
            generation: 0,
            retries: 0,
            volume,
            current_station: None,
            last_url: None,
        };
        tokio::spawn(controller.run(rx));

        Self { tx, state }
    }

    pub async fn play(&self, station: Station) -> Result<(), PlayerError> {
        self.send(Msg::Command(Command::Play {
            station: Some(station),
            url: None,
        }))
        .await
    }

    /// Play a raw URL, keeping the current station for metadata purposes.
    pub async fn play_url(&self, url: impl Into<String>) -> Result<(), PlayerError> {
        self.send(Msg::Command(Command::Play {
            station: None,
            url: Some(url.into()),
        }))
        .await
    }

    pub async fn stop(&self) -> Result<(), PlayerError> {
        self.send(Msg::Command(Command::Stop)).await
    }

    /// Set the volume.  The value is NOT clamped here — callers are
    /// responsible for keeping it in [0,1].
    pub async fn set_volume(&self, volume: f32) -> Result<(), PlayerError> {
        self.send(Msg::Command(Command::SetVolume(volume))).await
    }

    /// Connectivity notification from the host.  Offline flips the status;
    /// coming back online reloads the last URL when playback is wanted.
    pub async fn set_online(&self, online: bool) -> Result<(), PlayerError> {
        self.send(Msg::Command(Command::SetOnline(online))).await
    }

    /// Stop the controller task and unregister remote-command handlers.
    pub async fn shutdown(&self) -> Result<(), PlayerError> {
        self.send(Msg::Shutdown).await
    }

    pub async fn status(&self) -> PlayerStatus {
        self.state.status().await
    }

    pub async fn volume(&self) -> f32 {
        self.state.volume().await
    }

    pub async fn state(&self) -> PlayerState {
        self.state.snapshot().await
    }

    async fn send(&self, msg: Msg) -> Result<(), PlayerError> {
        self.tx.send(msg).await.map_err(|_| PlayerError::ControllerGone)
    }
}

// ── controller task ───────────────────────────────────────────────────────────

struct Controller {
    config: PlayerConfig,
    state: StateHandle,
    element: Box<dyn MediaElement>,
    engine: Option<Box<dyn AdaptiveStreamEngine>>,
    session: Option<Box<dyn AdaptiveSession>>,
    surface: Option<Box<dyn MediaControlSurface>>,
    prefs: Box<dyn PreferenceStore>,
    session_tx: mpsc::Sender<SessionEvent>,
    msg_tx: mpsc::Sender<Msg>,
    /// "Should be playing" — independent of the element's transient state.
    intent: bool,
    /// Totally orders play attempts; stale callbacks are discarded.
    generation: u64,
    retries: u32,
    volume: f32,
    current_station: Option<Station>,
    last_url: Option<String>,
}

impl Controller {
    async fn run(mut self, mut rx: mpsc::Receiver<Msg>) {
        while let Some(msg) = rx.recv().await {
            match msg {
                Msg::Command(cmd) => self.handle_command(cmd).await,
                Msg::Element(ev) => self.handle_element(ev).await,
                Msg::Session(ev) => self.handle_session(ev).await,
                Msg::RetryFire { generation, url } => {
                    self.handle_retry_fire(generation, url).await
                }
                Msg::Remote(cmd) => self.handle_remote(cmd).await,
                Msg::Shutdown => break,
            }
        }
        if let Some(mut session) = self.session.take() {
            session.close();
        }
        if let Some(surface) = self.surface.as_mut() {
            surface.unregister_commands();
        }
        debug!("controller: task exiting");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Play { station, url } => {
                let url = match (&url, &station) {
                    (Some(u), _) => u.clone(),
                    (None, Some(s)) => s.url.clone(),
                    (None, None) => {
                        warn!("play: no station and no URL");
                        return;
                    }
                };
                if let Some(station) = station {
                    self.current_station = Some(station);
                }
                // A fresh explicit play always gets a full retry budget.
                self.retries = 0;
                self.start_load(url).await;
            }
            Command::Stop => self.cmd_stop().await,
            Command::SetVolume(v) => self.cmd_set_volume(v).await,
            Command::SetOnline(online) => self.cmd_set_online(online).await,
        }
    }

    /// The play path.  Bumps the generation, raises intent, publishes
    /// metadata and kicks off the selected strategy.
    async fn start_load(&mut self, url: String) {
        self.generation += 1;
        self.intent = true;
        self.last_url = Some(url.clone());
        self.state
            .set_loading(self.current_station.clone(), url.clone())
            .await;
        self.publish_metadata();

        let supported = self.engine.as_ref().map_or(false, |e| e.is_supported());
        match select_strategy(&url, supported) {
            Strategy::Adaptive => self.start_adaptive(&url),
            Strategy::Direct => self.start_direct(&url),
        }
    }

    fn start_adaptive(&mut self, url: &str) {
        // Any prior session is torn down first; close is idempotent.
        if let Some(mut old) = self.session.take() {
            old.close();
        }
        // Selector only picks Adaptive when an engine reported support,
        // but guard anyway rather than panic.
        let mut session = match self.engine.as_mut() {
            Some(engine) => engine.create_session(
                &self.config.adaptive,
                self.generation,
                self.session_tx.clone(),
            ),
            None => {
                self.start_direct(url);
                return;
            }
        };
        debug!("adaptive: created session gen={} url={}", self.generation, url);
        session.load_manifest(url);
        session.attach(self.element.as_mut());
        self.session = Some(session);
        // Guarantee audible output after a reload.
        self.element.set_volume(self.volume);
        self.element.set_muted(false);
    }

    fn start_direct(&mut self, url: &str) {
        if let Some(mut old) = self.session.take() {
            old.close();
        }
        debug!("direct: loading gen={} url={}", self.generation, url);
        self.element.set_source(url);
        self.element.load();
        self.element.set_volume(self.volume);
        self.element.set_muted(false);
        self.element.play();
    }

    async fn cmd_stop(&mut self) {
        // Bump first so any in-flight callback or pending retry is stale
        // before teardown begins.
        self.generation += 1;
        self.intent = false;
        if let Some(mut session) = self.session.take() {
            session.close();
        }
        self.element.pause();
        self.element.clear_source();
        self.state.set_status(PlayerStatus::Paused).await;
        self.publish_playback(PlaybackIndicator::Paused);
        info!("playback stopped");
    }

    async fn cmd_set_volume(&mut self, volume: f32) {
        self.volume = volume;
        // Never touches mute; mute is only cleared on the play path.
        self.element.set_volume(volume);
        self.state.set_volume(volume).await;
        if let Err(e) = self.prefs.set(VOLUME_KEY, &volume.to_string()) {
            warn!("prefs: failed to persist volume: {e:#}");
        }
    }

    async fn cmd_set_online(&mut self, online: bool) {
        if !online {
            info!("host went offline");
            self.state.set_status(PlayerStatus::Offline).await;
            return;
        }
        if self.intent {
            if let Some(url) = self.last_url.clone() {
                info!("back online, reloading {}", url);
                self.start_load(url).await;
            }
        } else if self.state.status().await == PlayerStatus::Offline {
            self.state.set_status(PlayerStatus::Idle).await;
        }
    }

    async fn handle_element(&mut self, ev: ElementEvent) {
        match ev {
            ElementEvent::Playing => {
                if !self.intent {
                    debug!("element: playing while not wanted, ignoring");
                    return;
                }
                self.retries = 0;
                self.state.set_status(PlayerStatus::Playing).await;
                self.publish_playback(PlaybackIndicator::Playing);
                info!("playback started");
            }
            ElementEvent::Paused => {
                // Only honored while we do not want to play.  A pause the
                // controller did not request is left to the error/waiting
                // paths while intent is up.
                if !self.intent {
                    self.state.set_status(PlayerStatus::Paused).await;
                }
            }
            ElementEvent::Waiting => {
                if self.intent {
                    self.state.set_status(PlayerStatus::Loading).await;
                }
            }
            ElementEvent::Error(detail) => {
                if !self.intent {
                    debug!("element: error while not wanted, ignoring: {}", detail);
                    return;
                }
                warn!("element: playback error: {}", detail);
                self.handle_failure().await;
            }
        }
    }

    async fn handle_session(&mut self, ev: SessionEvent) {
        if ev.generation != self.generation {
            debug!(
                "session: stale event gen={} (live {}), ignoring",
                ev.generation, self.generation
            );
            return;
        }
        if !self.intent {
            return;
        }
        match ev.kind {
            SessionEventKind::ManifestParsed => {
                debug!("session: manifest parsed, starting playback");
                self.element.play();
            }
            SessionEventKind::FatalError(kind) => match kind {
                StreamErrorKind::Network => {
                    warn!("session: fatal network error, resuming load");
                    if let Some(session) = self.session.as_mut() {
                        session.resume_loading();
                    }
                }
                StreamErrorKind::Media => {
                    warn!("session: fatal media error, attempting recovery");
                    if let Some(session) = self.session.as_mut() {
                        session.recover_media();
                    }
                }
                StreamErrorKind::Other => {
                    warn!("session: unrecoverable fatal error");
                    self.handle_failure().await;
                }
            },
        }
    }

    /// Bounded-backoff reaction to a hard failure while playback is wanted.
    async fn handle_failure(&mut self) {
        let Some(url) = self.last_url.clone() else {
            self.intent = false;
            self.state.set_status(PlayerStatus::Error).await;
            return;
        };
        self.retries += 1;
        if self.retries >= self.config.retry.max_retries {
            warn!("giving up after {} consecutive failures", self.retries);
            self.intent = false;
            self.state.set_status(PlayerStatus::Error).await;
            return;
        }
        let delay = backoff_delay(&self.config.retry, self.retries);
        info!(
            "scheduling retry {}/{} in {:?}",
            self.retries, self.config.retry.max_retries, delay
        );
        let tx = self.msg_tx.clone();
        let generation = self.generation;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Msg::RetryFire { generation, url }).await;
        });
    }

    async fn handle_retry_fire(&mut self, generation: u64, url: String) {
        // Re-check at fire time: a stop or a newer play supersedes us.
        if generation != self.generation || !self.intent {
            debug!("retry: superseded or cancelled, ignoring");
            return;
        }
        info!("retrying {}", url);
        self.start_load(url).await;
    }

    async fn handle_remote(&mut self, cmd: RemoteCommand) {
        debug!("remote command: {:?}", cmd);
        match cmd {
            RemoteCommand::Play => {
                if let Some(url) = self.last_url.clone() {
                    self.retries = 0;
                    self.start_load(url).await;
                } else {
                    debug!("remote play with nothing loaded");
                }
            }
            RemoteCommand::Pause | RemoteCommand::Stop => self.cmd_stop().await,
        }
    }

    fn publish_metadata(&mut self) {
        let (Some(surface), Some(station)) = (self.surface.as_mut(), self.current_station.as_ref())
        else {
            return;
        };
        if let Err(e) = surface.set_metadata(&bridge::now_playing(station)) {
            warn!("bridge: failed to publish metadata: {}", e);
        }
    }

    fn publish_playback(&mut self, state: PlaybackIndicator) {
        if let Some(surface) = self.surface.as_mut() {
            if let Err(e) = surface.set_playback(state) {
                warn!("bridge: failed to publish playback state: {}", e);
            }
        }
    }
}
