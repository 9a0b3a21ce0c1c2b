// ─── Launcher Profile ───
// Static configuration of the game this launcher serves.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::{LauncherError, LauncherResult};

/// Mod loader the engine installs on top of the game version.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoaderType {
    Vanilla,
    Forge,
    Fabric,
    NeoForge,
    Quilt,
}

impl std::fmt::Display for LoaderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoaderType::Vanilla => write!(f, "vanilla"),
            LoaderType::Forge => write!(f, "forge"),
            LoaderType::Fabric => write!(f, "fabric"),
            LoaderType::NeoForge => write!(f, "neoforge"),
            LoaderType::Quilt => write!(f, "quilt"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoaderDescriptor {
    #[serde(rename = "type")]
    pub loader_type: LoaderType,
    pub build: String,
    #[serde(rename = "enable")]
    pub enabled: bool,
}

impl Default for LoaderDescriptor {
    fn default() -> Self {
        Self {
            loader_type: LoaderType::Forge,
            build: "latest".into(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct LauncherProfile {
    /// Install directory name (dot-prefixed off macOS).
    pub data_directory: String,
    pub game_version: String,
    pub loader: LoaderDescriptor,
    pub verify: bool,
    /// Paths under the install directory the engine must not verify or delete.
    pub ignored: Vec<String>,
    /// Endpoint the engine pulls game files from.
    pub data_url: String,
    pub catalog_url: String,
    /// Java the engine should use when the user set no override.
    pub java: Option<PathBuf>,
    pub download_concurrency: u32,
    pub handshake_timeout_ms: u64,
    /// Lowest max-memory setting, in GB, that the game runs with.
    pub min_max_memory_gb: u32,
}

impl Default for LauncherProfile {
    fn default() -> Self {
        Self {
            data_directory: "historion".into(),
            game_version: "1.20.1".into(),
            loader: LoaderDescriptor::default(),
            verify: true,
            ignored: vec![
                "config".into(),
                "logs".into(),
                "saves".into(),
                "options.txt".into(),
                "launcher_config".into(),
            ],
            data_url: "https://launcher.historion.wstr.fr/panel/data".into(),
            catalog_url: "https://launcher.historion.wstr.fr/api/mods.json".into(),
            java: None,
            download_concurrency: 20,
            handshake_timeout_ms: 15_000,
            min_max_memory_gb: 3,
        }
    }
}

impl LauncherProfile {
    /// Read a profile file; a missing file yields the defaults.
    pub async fn load(path: &Path) -> LauncherResult<Self> {
        let raw = match tokio::fs::read_to_string(path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("No launcher profile at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(LauncherError::io(path, e)),
        };

        let profile: Self = serde_json::from_str(&raw)?;
        info!(
            "Loaded profile: {} {} ({})",
            profile.game_version, profile.loader.loader_type, profile.loader.build
        );
        Ok(profile)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_millis(self.handshake_timeout_ms)
    }
}
