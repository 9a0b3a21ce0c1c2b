// ─── Launch Session Controller ───
// Owns at most one engine session and turns its events into UI updates
// and host-shell signals.
//
//   Idle → Starting → Downloading ⇄ Verifying → Patching → Ready → Running → Idle
//                         (any non-idle phase) → Errored
//
// Updates go out on a broadcast channel; window and taskbar signals go to
// the injected `HostShell`; game output goes to the injected `LogBuffer`.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::engine::{EngineEvent, EngineSession, LaunchEngine};
use super::progress::{
    format_eta, format_speed, ProgressSnapshot, ProgressStage, ProgressTracker,
};
use super::request::LaunchRequest;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::logging::{LogBuffer, LogLevel, GAME_SOURCE};
use crate::core::settings::ClosePolicy;

const UPDATE_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LaunchPhase {
    Idle,
    Starting,
    Downloading,
    Verifying,
    Patching,
    Ready,
    Running,
    Errored,
}

impl LaunchPhase {
    /// A session is owned in every phase except these two.
    pub fn is_active(self) -> bool {
        !matches!(self, LaunchPhase::Idle | LaunchPhase::Errored)
    }
}

/// What the UI is told while a session runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LaunchUpdate {
    Phase { phase: LaunchPhase },
    ControlsEnabled { enabled: bool },
    Progress(ProgressSnapshot),
    /// `text` is the display form, e.g. `2.00 Mb/s`.
    Speed { bytes_per_second: f64, text: String },
    /// `text` is the display form, e.g. `0h 1m 30s`.
    Estimated { seconds: f64, text: String },
    Status { message: String },
    ProgressCleared,
    Exited { code: i32 },
    Failed { message: String },
}

/// Signals for the window hosting the launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellSignal {
    WindowHide,
    WindowShow,
    DownloadProgress { current: u64, total: u64 },
    ProgressReset,
}

pub trait HostShell: Send + Sync {
    fn signal(&self, signal: ShellSignal);
}

/// Shell that ignores every signal; for headless use.
pub struct NoopShell;

impl HostShell for NoopShell {
    fn signal(&self, _signal: ShellSignal) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Exited(i32),
    Failed(String),
}

/// Handle on a started session. Dropping it leaves the session running.
pub struct SessionHandle {
    id: Uuid,
    task: JoinHandle<SessionOutcome>,
}

impl SessionHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the session to reach a terminal state.
    pub async fn finished(self) -> SessionOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => SessionOutcome::Failed(format!("session task aborted: {e}")),
        }
    }
}

struct Shared {
    shell: Arc<dyn HostShell>,
    logs: LogBuffer,
    phase: Mutex<LaunchPhase>,
    updates: broadcast::Sender<LaunchUpdate>,
}

impl Shared {
    fn phase_guard(&self) -> MutexGuard<'_, LaunchPhase> {
        self.phase.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn emit(&self, update: LaunchUpdate) {
        // No subscribers is fine.
        let _ = self.updates.send(update);
    }

    fn set_phase(&self, phase: LaunchPhase) {
        {
            let mut current = self.phase_guard();
            if *current == phase {
                return;
            }
            debug!("Launch phase {:?} -> {:?}", *current, phase);
            *current = phase;
        }
        self.emit(LaunchUpdate::Phase { phase });
    }

    fn fail(&self, message: String) {
        error!("Launch failed: {}", message);
        self.set_phase(LaunchPhase::Errored);
        self.emit(LaunchUpdate::Failed { message });
        self.emit(LaunchUpdate::ControlsEnabled { enabled: true });
    }
}

pub struct LaunchController {
    engine: Arc<dyn LaunchEngine>,
    handshake_timeout: Duration,
    shared: Arc<Shared>,
}

impl LaunchController {
    pub fn new(
        engine: Arc<dyn LaunchEngine>,
        shell: Arc<dyn HostShell>,
        logs: LogBuffer,
        handshake_timeout: Duration,
    ) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            engine,
            handshake_timeout,
            shared: Arc::new(Shared {
                shell,
                logs,
                phase: Mutex::new(LaunchPhase::Idle),
                updates,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LaunchUpdate> {
        self.shared.updates.subscribe()
    }

    pub fn phase(&self) -> LaunchPhase {
        *self.shared.phase_guard()
    }

    /// Start a session for `request`.
    ///
    /// Rejected with `SessionActive` while another session is live. The
    /// engine must accept the request and report its first event within the
    /// handshake timeout, otherwise the attempt is errored. Dropping the
    /// returned future before the handshake completes errors the attempt too.
    pub async fn launch(&self, request: LaunchRequest) -> LauncherResult<SessionHandle> {
        {
            let mut phase = self.shared.phase_guard();
            if phase.is_active() {
                warn!("Launch rejected, session already in {:?}", *phase);
                return Err(LauncherError::SessionActive);
            }
            *phase = LaunchPhase::Starting;
        }
        self.shared.emit(LaunchUpdate::Phase {
            phase: LaunchPhase::Starting,
        });
        self.shared
            .emit(LaunchUpdate::ControlsEnabled { enabled: false });
        let mut pending = PendingStart::new(Arc::clone(&self.shared));

        let id = Uuid::new_v4();
        let close_policy = request.close_policy;
        info!(
            "Starting launch session {} for {} ({})",
            id, request.version, request.loader.loader_type
        );

        let attempt = handshake(self.engine.as_ref(), request);
        let started = match tokio::time::timeout(self.handshake_timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(LauncherError::HandshakeTimeout(self.handshake_timeout)),
        };
        pending.disarm();
        let (session, first) = match started {
            Ok(started) => started,
            Err(e) => {
                self.shared.fail(e.to_string());
                return Err(e);
            }
        };

        let run = SessionRun::new(Arc::clone(&self.shared), close_policy);
        let task = tokio::spawn(run.pump(session, first));
        Ok(SessionHandle { id, task })
    }
}

/// Errors the attempt if `launch` is dropped while still in the handshake.
struct PendingStart {
    shared: Arc<Shared>,
    armed: bool,
}

impl PendingStart {
    fn new(shared: Arc<Shared>) -> Self {
        Self {
            shared,
            armed: true,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for PendingStart {
    fn drop(&mut self) {
        if self.armed {
            self.shared
                .fail("launch abandoned before the engine answered".into());
        }
    }
}

/// Start the engine and wait for its first event.
async fn handshake(
    engine: &dyn LaunchEngine,
    request: LaunchRequest,
) -> LauncherResult<(EngineSession, EngineEvent)> {
    let mut session = engine.start(request).await?;
    match session.next_event().await {
        Some(first) => Ok((session, first)),
        None => Err(LauncherError::LaunchEngine(
            "engine session ended before reporting any event".into(),
        )),
    }
}

/// Per-attempt state; dropped when the session ends.
struct SessionRun {
    shared: Arc<Shared>,
    close_policy: ClosePolicy,
    tracker: ProgressTracker,
    window_hidden: bool,
    game_started: bool,
}

impl SessionRun {
    fn new(shared: Arc<Shared>, close_policy: ClosePolicy) -> Self {
        Self {
            shared,
            close_policy,
            tracker: ProgressTracker::new(),
            window_hidden: false,
            game_started: false,
        }
    }

    async fn pump(mut self, mut session: EngineSession, first: EngineEvent) -> SessionOutcome {
        let mut pending = Some(first);
        loop {
            let event = match pending.take() {
                Some(event) => event,
                None => match session.next_event().await {
                    Some(event) => event,
                    None => EngineEvent::Error("engine session ended without a close event".into()),
                },
            };
            if let Some(outcome) = self.handle(event) {
                return outcome;
            }
        }
    }

    fn handle(&mut self, event: EngineEvent) -> Option<SessionOutcome> {
        let now = Instant::now();
        match event {
            EngineEvent::Extract(what) => {
                debug!("Extracting {}", what);
                if self.shared_phase() == LaunchPhase::Starting {
                    self.shared.set_phase(LaunchPhase::Downloading);
                }
            }
            EngineEvent::Progress { current, total } => {
                self.shared.set_phase(LaunchPhase::Downloading);
                let snapshot = self.tracker.record(ProgressStage::Download, current, total, now);
                self.shared.shell.signal(ShellSignal::DownloadProgress {
                    current: snapshot.current,
                    total: snapshot.total,
                });
                self.shared.emit(LaunchUpdate::Progress(snapshot));
            }
            EngineEvent::Check { current, total } => {
                self.shared.set_phase(LaunchPhase::Verifying);
                let snapshot = self.tracker.record(ProgressStage::Verify, current, total, now);
                self.shared.emit(LaunchUpdate::Progress(snapshot));
            }
            EngineEvent::Estimated { seconds } => {
                let seconds = self.tracker.record_estimate(seconds, now);
                self.shared.emit(LaunchUpdate::Estimated {
                    seconds,
                    text: format_eta(seconds),
                });
            }
            EngineEvent::Speed { bytes_per_second } => {
                self.shared.emit(LaunchUpdate::Speed {
                    bytes_per_second,
                    text: format_speed(bytes_per_second),
                });
            }
            EngineEvent::Patch(step) => {
                debug!("Patching: {}", step);
                self.shared.set_phase(LaunchPhase::Patching);
                self.shared.emit(LaunchUpdate::Status {
                    message: "Patching...".into(),
                });
            }
            EngineEvent::Data(line) => {
                if !self.game_started {
                    self.enter_running();
                }
                self.shared
                    .logs
                    .push_message(LogLevel::Info, GAME_SOURCE, line);
            }
            EngineEvent::Close { code } => {
                info!("Game exited with code {}", code);
                self.clear_progress();
                self.restore_window();
                self.shared.set_phase(LaunchPhase::Idle);
                self.shared.emit(LaunchUpdate::Exited { code });
                self.shared
                    .emit(LaunchUpdate::ControlsEnabled { enabled: true });
                return Some(SessionOutcome::Exited(code));
            }
            EngineEvent::Error(message) => {
                self.clear_progress();
                self.restore_window();
                self.shared.fail(message.clone());
                return Some(SessionOutcome::Failed(message));
            }
        }
        None
    }

    fn shared_phase(&self) -> LaunchPhase {
        *self.shared.phase_guard()
    }

    fn enter_running(&mut self) {
        self.game_started = true;
        self.shared.set_phase(LaunchPhase::Ready);
        self.clear_progress();
        if self.close_policy.hides_window() {
            self.shared.shell.signal(ShellSignal::WindowHide);
            self.window_hidden = true;
        }
        self.shared.emit(LaunchUpdate::Status {
            message: "Starting game...".into(),
        });
        self.shared.set_phase(LaunchPhase::Running);
    }

    fn clear_progress(&mut self) {
        self.tracker.reset();
        self.shared.shell.signal(ShellSignal::ProgressReset);
        self.shared.emit(LaunchUpdate::ProgressCleared);
    }

    fn restore_window(&mut self) {
        if self.window_hidden {
            self.shared.shell.signal(ShellSignal::WindowShow);
            self.window_hidden = false;
        }
    }
}
