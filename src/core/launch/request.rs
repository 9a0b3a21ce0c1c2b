// ─── Launch Request ───
// Assembles the engine request from the profile and the persisted settings.

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use super::profile::{LauncherProfile, LoaderDescriptor};
use crate::core::auth::Account;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::paths::InstallPaths;
use crate::core::settings::{ClosePolicy, JavaOverride, LaunchSettings, Resolution};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemoryPair {
    pub min: String,
    pub max: String,
}

/// Everything the engine needs for one launch attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    pub url: String,
    pub authenticator: Account,
    pub timeout: u64,
    pub path: PathBuf,
    pub version: String,
    pub detached: bool,
    pub download_file_multiple: u32,
    pub loader: LoaderDescriptor,
    pub verify: bool,
    pub ignored: Vec<String>,
    pub java: Option<PathBuf>,
    pub memory: MemoryPair,
    pub jvm_args: Vec<String>,
    pub screen: Resolution,
    /// Not sent to the engine; drives the window signals.
    #[serde(skip)]
    pub close_policy: ClosePolicy,
}

/// Build a request from what is currently persisted.
///
/// Fails with `LaunchValidation` for unusable settings so the engine is
/// never started with them.
pub fn build(
    profile: &LauncherProfile,
    paths: &InstallPaths,
    settings: &LaunchSettings,
    account: Option<&Account>,
) -> LauncherResult<LaunchRequest> {
    let account = account
        .ok_or_else(|| LauncherError::LaunchValidation("no account selected".into()))?;

    let memory = settings.memory.bounds()?;
    if memory.max_gb() < profile.min_max_memory_gb {
        return Err(LauncherError::LaunchValidation(format!(
            "at least {} GB of maximum memory is required, {} GB configured",
            profile.min_max_memory_gb,
            memory.max_gb()
        )));
    }
    let (min, max) = memory.to_engine_pair();

    let java = match &settings.java_path {
        Some(path) => Some(
            JavaOverride::new(path.clone())
                .map_err(|e| LauncherError::LaunchValidation(e.to_string()))?
                .into_path(),
        ),
        None => profile.java.clone(),
    };

    let screen = settings.screen.resolution()?;

    let request = LaunchRequest {
        url: profile.data_url.clone(),
        authenticator: account.clone().sanitized(),
        timeout: profile.handshake_timeout_ms,
        path: paths.root().to_path_buf(),
        version: profile.game_version.clone(),
        detached: settings.close_policy.detached(),
        download_file_multiple: profile.download_concurrency,
        loader: profile.loader.clone(),
        verify: profile.verify,
        ignored: profile.ignored.clone(),
        java,
        memory: MemoryPair { min, max },
        jvm_args: settings.jvm_args.as_slice().to_vec(),
        screen,
        close_policy: settings.close_policy,
    };

    debug!(
        "Launch request: version={} memory={}/{} detached={}",
        request.version, request.memory.min, request.memory.max, request.detached
    );
    Ok(request)
}
