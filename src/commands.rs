// ─── UI Commands ───
// Operations the launcher panels call. Each takes the shared `AppState`
// and returns a serializable payload or a `LauncherError`.

use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

use crate::core::auth::{self, AccountRemoval};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::launch::{request, LaunchPhase};
use crate::core::logging::LogLine;
use crate::core::mods::{files, DiskChange, ModListing};
use crate::core::settings::{
    self, ClosePolicy, FilePicker, JavaPathChoice, JvmArgs, JvmArgsRecord, LauncherRecord,
    MemoryBounds, MemoryRecord, Resolution, ScreenRecord,
};
use crate::core::state::AppState;
use crate::core::system::MemoryInfo;

// ── Mods panel ──────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModsPanel {
    /// Catalog could not be fetched; local state was left alone.
    Unavailable { reason: String },
    /// Nothing installed yet; mods arrive with the first launch.
    NotDownloaded,
    Ready { mods: Vec<ModListing> },
}

/// Fetch the catalog, reconcile local state and describe the optional mods.
pub async fn open_mods_panel(state: &AppState) -> LauncherResult<ModsPanel> {
    let catalog = match state.catalog.fetch().await {
        Ok(catalog) => catalog,
        Err(e) => {
            warn!("Mods panel unavailable: {}", e);
            return Ok(ModsPanel::Unavailable {
                reason: e.to_string(),
            });
        }
    };

    let current = state.mods.reconcile(&catalog).await?;

    if !files::has_any_file(state.mods.mods_dir()).await? {
        return Ok(ModsPanel::NotDownloaded);
    }

    let mods = state.mods.listings(&catalog, &current).await?;
    Ok(ModsPanel::Ready { mods })
}

#[derive(Debug, Serialize)]
pub struct ToggleOutcome {
    pub id: String,
    pub enabled: bool,
    /// Path of the mod file after the toggle, if one exists.
    pub file: Option<PathBuf>,
}

pub async fn toggle_mod(state: &AppState, id: &str, enabled: bool) -> LauncherResult<ToggleOutcome> {
    let file = match state.mods.set_enabled(id, enabled).await? {
        DiskChange::NoFile => None,
        DiskChange::Unchanged(path) => Some(path),
        DiskChange::Renamed { to, .. } => Some(to),
    };
    Ok(ToggleOutcome {
        id: id.to_string(),
        enabled,
        file,
    })
}

// ── Launch ──────────────────────────────────────────────

/// Build a request from the persisted settings and start a session.
///
/// Returns the session id; progress arrives on `LaunchController::subscribe`.
pub async fn play(state: &AppState) -> LauncherResult<Uuid> {
    if state.launcher.phase().is_active() {
        return Err(LauncherError::SessionActive);
    }

    let settings = state.settings.launch_settings().await?;
    let account = auth::selected_account(&state.settings).await?;
    let request = request::build(&state.profile, &state.paths, &settings, account.as_ref())
        .inspect_err(|e| warn!("Launch blocked: {}", e))?;

    let session = state.launcher.launch(request).await?;
    Ok(session.id())
}

pub fn launch_phase(state: &AppState) -> LaunchPhase {
    state.launcher.phase()
}

// ── Accounts ────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub name: String,
    pub uuid: String,
    pub selected: bool,
}

/// Accounts for the switcher, without their tokens.
pub async fn accounts(state: &AppState) -> LauncherResult<Vec<AccountSummary>> {
    let selected = state.settings.launch_settings().await?.selected_account;
    Ok(auth::list_accounts(&state.settings)
        .await?
        .into_iter()
        .map(|account| AccountSummary {
            selected: selected.as_deref() == Some(account.uuid.as_str()),
            name: account.name,
            uuid: account.uuid,
        })
        .collect())
}

pub async fn select_account(state: &AppState, uuid: &str) -> LauncherResult<()> {
    auth::select_account(&state.settings, uuid).await
}

pub async fn delete_account(state: &AppState, uuid: &str) -> LauncherResult<AccountRemoval> {
    auth::delete_account(&state.settings, uuid).await
}

// ── Settings ────────────────────────────────────────────

pub async fn update_memory(state: &AppState, min_gb: u32, max_gb: u32) -> LauncherResult<()> {
    let bounds = MemoryBounds::new(min_gb, max_gb)?;
    state.settings.save(&MemoryRecord::from(bounds)).await?;
    info!("Memory set to {}-{} GB", min_gb, max_gb);
    Ok(())
}

/// Store the extra JVM arguments typed by the user; returns what was kept.
pub async fn update_java_args(state: &AppState, text: &str) -> LauncherResult<Vec<String>> {
    let args = JvmArgs::parse(text);
    state.settings.save(&JvmArgsRecord::from(&args)).await?;
    Ok(args.as_slice().to_vec())
}

pub async fn update_resolution(state: &AppState, resolution: Resolution) -> LauncherResult<()> {
    if let Resolution::Fixed { width, height } = resolution {
        Resolution::fixed(width, height)?;
    }
    state.settings.save(&ScreenRecord::from(resolution)).await
}

pub async fn update_close_policy(state: &AppState, policy: ClosePolicy) -> LauncherResult<()> {
    state.settings.save(&LauncherRecord::with_policy(policy)).await
}

pub async fn choose_java_path(
    state: &AppState,
    picker: &dyn FilePicker,
) -> LauncherResult<JavaPathChoice> {
    settings::choose_java_path(picker, &state.settings).await
}

pub async fn reset_java_path(state: &AppState) -> LauncherResult<()> {
    settings::reset_java_path(&state.settings).await
}

pub fn memory_info() -> MemoryInfo {
    MemoryInfo::detect()
}

// ── Console ─────────────────────────────────────────────

pub fn logs(state: &AppState) -> Vec<LogLine> {
    state.logs.snapshot()
}

pub fn clear_logs(state: &AppState) {
    state.logs.clear();
}
