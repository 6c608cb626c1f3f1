//! Shared fakes for controller integration tests.
//!
//! Each fake records the calls it receives behind an `Arc<Mutex<_>>` the
//! test keeps, and exposes the channels the controller wired up so tests
//! can inject element/session/remote events.

#![allow(dead_code)]

use radio_player::adaptive::{
    AdaptiveSession, AdaptiveStreamEngine, AdaptiveTuning, SessionEvent,
};
use radio_player::bridge::{MediaControlSurface, NowPlaying, PlaybackIndicator, RemoteCommand, SurfaceError};
use radio_player::element::{ElementEvent, MediaElement};
use radio_player::prefs::{MemoryPreferences, PreferenceStore};
use radio_player::{PlayerConfig, PlayerHandle, PlayerParts};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// ── media element fake ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ElementCall {
    SetSource(String),
    ClearSource,
    Load,
    Play,
    Pause,
    SetVolume(f32),
    SetMuted(bool),
}

#[derive(Clone, Default)]
pub struct ElementLog(Arc<Mutex<Vec<ElementCall>>>);

impl ElementLog {
    pub fn calls(&self) -> Vec<ElementCall> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&ElementCall) -> bool) -> usize {
        self.0.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn sources(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .filter_map(|c| match c {
                ElementCall::SetSource(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }
}

pub struct FakeElement {
    log: ElementLog,
}

impl MediaElement for FakeElement {
    fn set_source(&mut self, url: &str) {
        self.log.0.lock().unwrap().push(ElementCall::SetSource(url.to_string()));
    }
    fn clear_source(&mut self) {
        self.log.0.lock().unwrap().push(ElementCall::ClearSource);
    }
    fn load(&mut self) {
        self.log.0.lock().unwrap().push(ElementCall::Load);
    }
    fn play(&mut self) {
        self.log.0.lock().unwrap().push(ElementCall::Play);
    }
    fn pause(&mut self) {
        self.log.0.lock().unwrap().push(ElementCall::Pause);
    }
    fn set_volume(&mut self, volume: f32) {
        self.log.0.lock().unwrap().push(ElementCall::SetVolume(volume));
    }
    fn set_muted(&mut self, muted: bool) {
        self.log.0.lock().unwrap().push(ElementCall::SetMuted(muted));
    }
}

// ── adaptive engine fake ──────────────────────────────────────────────────────

#[derive(Default)]
pub struct EngineState {
    pub sessions_created: u32,
    pub sessions_closed: u32,
    pub last_generation: u64,
    pub last_manifest: Option<String>,
    pub attached: u32,
    pub resumed: u32,
    pub recovered: u32,
    /// Event sender of the most recent session, for injecting events.
    pub event_tx: Option<mpsc::Sender<SessionEvent>>,
}

#[derive(Clone, Default)]
pub struct EngineLog(pub Arc<Mutex<EngineState>>);

impl EngineLog {
    pub async fn emit(&self, generation: u64, kind: radio_player::adaptive::SessionEventKind) {
        let tx = self.0.lock().unwrap().event_tx.clone().expect("no session yet");
        tx.send(SessionEvent { generation, kind }).await.unwrap();
    }
}

pub struct FakeEngine {
    pub supported: bool,
    pub log: EngineLog,
}

impl AdaptiveStreamEngine for FakeEngine {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create_session(
        &mut self,
        _tuning: &AdaptiveTuning,
        generation: u64,
        events: mpsc::Sender<SessionEvent>,
    ) -> Box<dyn AdaptiveSession> {
        let mut state = self.log.0.lock().unwrap();
        state.sessions_created += 1;
        state.last_generation = generation;
        state.event_tx = Some(events);
        Box::new(FakeSession {
            log: self.log.clone(),
            closed: false,
        })
    }
}

pub struct FakeSession {
    log: EngineLog,
    closed: bool,
}

impl AdaptiveSession for FakeSession {
    fn load_manifest(&mut self, url: &str) {
        self.log.0.lock().unwrap().last_manifest = Some(url.to_string());
    }
    fn attach(&mut self, _element: &mut dyn MediaElement) {
        self.log.0.lock().unwrap().attached += 1;
    }
    fn resume_loading(&mut self) {
        self.log.0.lock().unwrap().resumed += 1;
    }
    fn recover_media(&mut self) {
        self.log.0.lock().unwrap().recovered += 1;
    }
    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.log.0.lock().unwrap().sessions_closed += 1;
        }
    }
}

// ── media-control surface fake ────────────────────────────────────────────────

#[derive(Default)]
pub struct SurfaceState {
    pub metadata: Vec<NowPlaying>,
    pub playback: Vec<PlaybackIndicator>,
    pub registered: Vec<(RemoteCommand, mpsc::Sender<RemoteCommand>)>,
    pub unregistered: bool,
}

#[derive(Clone, Default)]
pub struct SurfaceLog(pub Arc<Mutex<SurfaceState>>);

impl SurfaceLog {
    pub fn registered_commands(&self) -> Vec<RemoteCommand> {
        self.0.lock().unwrap().registered.iter().map(|(c, _)| *c).collect()
    }

    /// Simulate the OS delivering a remote command.
    pub async fn press(&self, command: RemoteCommand) {
        let tx = self
            .0
            .lock()
            .unwrap()
            .registered
            .iter()
            .find(|(c, _)| *c == command)
            .map(|(_, tx)| tx.clone())
            .expect("command not registered");
        tx.send(command).await.unwrap();
    }
}

pub struct FakeSurface {
    pub log: SurfaceLog,
    /// Registration of this command fails, to exercise partial registration.
    pub fail_register: Option<RemoteCommand>,
}

impl MediaControlSurface for FakeSurface {
    fn set_metadata(&mut self, meta: &NowPlaying) -> Result<(), SurfaceError> {
        self.log.0.lock().unwrap().metadata.push(meta.clone());
        Ok(())
    }

    fn set_playback(&mut self, state: PlaybackIndicator) -> Result<(), SurfaceError> {
        self.log.0.lock().unwrap().playback.push(state);
        Ok(())
    }

    fn register_command(
        &mut self,
        command: RemoteCommand,
        tx: mpsc::Sender<RemoteCommand>,
    ) -> Result<(), SurfaceError> {
        if self.fail_register == Some(command) {
            return Err(SurfaceError(format!("{command:?} not available")));
        }
        self.log.0.lock().unwrap().registered.push((command, tx));
        Ok(())
    }

    fn unregister_commands(&mut self) {
        let mut state = self.log.0.lock().unwrap();
        state.registered.clear();
        state.unregistered = true;
    }
}

// ── shared preference store ───────────────────────────────────────────────────

/// `PreferenceStore` delegating to a shared `MemoryPreferences`, so tests
/// can inspect the store after handing it to the controller.
#[derive(Clone)]
pub struct SharedPrefs(pub Arc<MemoryPreferences>);

impl SharedPrefs {
    pub fn new() -> Self {
        Self(Arc::new(MemoryPreferences::new()))
    }

    pub fn stored(&self, key: &str) -> Option<String> {
        self.0.get(key)
    }
}

impl PreferenceStore for SharedPrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key)
    }
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.0.set(key, value)
    }
}

// ── harness ───────────────────────────────────────────────────────────────────

pub struct TestPlayer {
    pub handle: PlayerHandle,
    pub element_tx: mpsc::Sender<ElementEvent>,
    pub element: ElementLog,
    pub engine: EngineLog,
    pub surface: SurfaceLog,
    pub prefs: SharedPrefs,
}

pub struct TestPlayerOptions {
    pub config: PlayerConfig,
    pub engine_supported: Option<bool>,
    pub surface: bool,
    pub fail_register: Option<RemoteCommand>,
    pub prefs: SharedPrefs,
}

impl Default for TestPlayerOptions {
    fn default() -> Self {
        Self {
            config: PlayerConfig::default(),
            engine_supported: Some(true),
            surface: true,
            fail_register: None,
            prefs: SharedPrefs::new(),
        }
    }
}

pub fn spawn_player(options: TestPlayerOptions) -> TestPlayer {
    let element_log = ElementLog::default();
    let engine_log = EngineLog::default();
    let surface_log = SurfaceLog::default();
    let (element_tx, element_rx) = mpsc::channel(16);

    let parts = PlayerParts {
        element: Box::new(FakeElement {
            log: element_log.clone(),
        }),
        element_events: element_rx,
        engine: options.engine_supported.map(|supported| {
            Box::new(FakeEngine {
                supported,
                log: engine_log.clone(),
            }) as Box<dyn AdaptiveStreamEngine>
        }),
        surface: options.surface.then(|| {
            Box::new(FakeSurface {
                log: surface_log.clone(),
                fail_register: options.fail_register,
            }) as Box<dyn MediaControlSurface>
        }),
        prefs: Box::new(options.prefs.clone()),
    };

    TestPlayer {
        handle: PlayerHandle::spawn(parts, options.config),
        element_tx,
        element: element_log,
        engine: engine_log,
        surface: surface_log,
        prefs: options.prefs,
    }
}

/// Let the controller task drain its channel.  Tests run on the
/// current-thread runtime, so a handful of yields is deterministic.
pub async fn settle() {
    for _ in 0..32 {
        tokio::task::yield_now().await;
    }
}

/// Opt-in log output while debugging a test: `RUST_LOG=debug cargo test`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
