#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream;

use historion_lib::core::auth::{self, Account};
use historion_lib::core::error::{LauncherError, LauncherResult};
use historion_lib::core::launch::{
    EngineEvent, EngineSession, HostShell, LaunchEngine, LaunchRequest, LauncherProfile,
    ShellSignal,
};
use historion_lib::core::logging::LogBuffer;
use historion_lib::core::mods::{CatalogSource, ModCatalog};
use historion_lib::core::paths::InstallPaths;
use historion_lib::core::state::AppState;

/// Replays `script` on every start and keeps the requests it was given.
#[derive(Default)]
pub struct ScriptedEngine {
    script: Vec<EngineEvent>,
    requests: Mutex<Vec<LaunchRequest>>,
}

impl ScriptedEngine {
    pub fn new(script: Vec<EngineEvent>) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<LaunchRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LaunchEngine for ScriptedEngine {
    async fn start(&self, request: LaunchRequest) -> LauncherResult<EngineSession> {
        self.requests.lock().unwrap().push(request);
        Ok(EngineSession::new(stream::iter(self.script.clone())))
    }
}

#[derive(Default)]
pub struct RecordingShell {
    signals: Mutex<Vec<ShellSignal>>,
}

impl RecordingShell {
    pub fn signals(&self) -> Vec<ShellSignal> {
        self.signals.lock().unwrap().clone()
    }
}

impl HostShell for RecordingShell {
    fn signal(&self, signal: ShellSignal) {
        self.signals.lock().unwrap().push(signal);
    }
}

/// Catalog served from memory; `None` behaves like an unreachable server.
#[derive(Default)]
pub struct StaticCatalog {
    current: Mutex<Option<ModCatalog>>,
}

impl StaticCatalog {
    pub fn serving(catalog: ModCatalog) -> Self {
        Self {
            current: Mutex::new(Some(catalog)),
        }
    }

    pub fn set(&self, catalog: Option<ModCatalog>) {
        *self.current.lock().unwrap() = catalog;
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch(&self) -> LauncherResult<ModCatalog> {
        self.current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| LauncherError::CatalogUnavailable("connection refused".into()))
    }
}

pub struct Harness {
    pub temp: tempfile::TempDir,
    pub state: AppState,
    pub engine: Arc<ScriptedEngine>,
    pub shell: Arc<RecordingShell>,
    pub catalog: Arc<StaticCatalog>,
}

impl Harness {
    pub async fn new(script: Vec<EngineEvent>) -> Self {
        let temp = tempfile::tempdir().unwrap();
        let engine = Arc::new(ScriptedEngine::new(script));
        let shell = Arc::new(RecordingShell::default());
        let catalog = Arc::new(StaticCatalog::default());

        let state = AppState::with_paths(
            InstallPaths::at(temp.path()),
            LauncherProfile::default(),
            engine.clone(),
            shell.clone(),
            LogBuffer::new(64),
        )
        .await
        .unwrap()
        .with_catalog(catalog.clone());

        Self {
            temp,
            state,
            engine,
            shell,
            catalog,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.root().join("mods")
    }

    pub fn touch_mod(&self, file_name: &str) -> PathBuf {
        std::fs::create_dir_all(self.mods_dir()).unwrap();
        let path = self.mods_dir().join(file_name);
        std::fs::write(&path, b"jar").unwrap();
        path
    }

    /// Store an account and select it.
    pub async fn sign_in(&self, name: &str) -> Account {
        let account = Account::offline(name);
        auth::save_account(&self.state.settings, &account).await.unwrap();
        auth::select_account(&self.state.settings, &account.uuid)
            .await
            .unwrap();
        account
    }
}
