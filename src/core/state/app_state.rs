use std::sync::Arc;

use reqwest::Client;
use tracing::info;

use crate::core::error::LauncherResult;
use crate::core::http::build_http_client;
use crate::core::launch::{HostShell, LaunchController, LaunchEngine, LauncherProfile};
use crate::core::logging::LogBuffer;
use crate::core::mods::{CatalogClient, CatalogSource, ModReconciler};
use crate::core::paths::InstallPaths;
use crate::core::settings::{JsonFileStore, SettingsRepository};

/// Everything the UI-boundary operations need, built once at startup.
pub struct AppState {
    pub paths: InstallPaths,
    pub profile: LauncherProfile,
    pub http_client: Client,
    pub settings: SettingsRepository,
    pub catalog: Arc<dyn CatalogSource>,
    pub mods: ModReconciler,
    pub launcher: LaunchController,
    pub logs: LogBuffer,
}

impl AppState {
    /// Wire the state for the platform install directory named by `profile`.
    pub async fn new(
        profile: LauncherProfile,
        engine: Arc<dyn LaunchEngine>,
        shell: Arc<dyn HostShell>,
        logs: LogBuffer,
    ) -> LauncherResult<Self> {
        let paths = InstallPaths::for_platform(&profile.data_directory)?;
        Self::with_paths(paths, profile, engine, shell, logs).await
    }

    pub async fn with_paths(
        paths: InstallPaths,
        mut profile: LauncherProfile,
        engine: Arc<dyn LaunchEngine>,
        shell: Arc<dyn HostShell>,
        logs: LogBuffer,
    ) -> LauncherResult<Self> {
        let http_client = build_http_client()?;

        if profile.java.is_none() {
            let bundled = paths.bundled_java();
            if tokio::fs::try_exists(&bundled).await.unwrap_or(false) {
                info!("Using bundled runtime {:?}", bundled);
                profile.java = Some(bundled);
            }
        }

        let settings = SettingsRepository::new(Arc::new(JsonFileStore::new(paths.settings_dir())));
        settings.ensure_defaults().await?;

        let catalog: Arc<dyn CatalogSource> = Arc::new(CatalogClient::new(
            http_client.clone(),
            profile.catalog_url.clone(),
        ));
        let mods = ModReconciler::new(paths.mods_config_file(), paths.mods_dir());
        let launcher =
            LaunchController::new(engine, shell, logs.clone(), profile.handshake_timeout());

        info!("Launcher state ready at {:?}", paths.root());

        Ok(Self {
            paths,
            profile,
            http_client,
            settings,
            catalog,
            mods,
            launcher,
            logs,
        })
    }

    /// Replace the catalog source, e.g. with a mirror or a fixed catalog.
    pub fn with_catalog(mut self, catalog: Arc<dyn CatalogSource>) -> Self {
        self.catalog = catalog;
        self
    }
}
