// ─── Install Paths ───
// Where the launcher keeps the game, its mods and its own bookkeeping.

use std::path::{Path, PathBuf};

use crate::core::error::{LauncherError, LauncherResult};

const MODS_DIR: &str = "mods";
const LAUNCHER_CONFIG_DIR: &str = "launcher_config";
const MODS_CONFIG_FILE: &str = "mods_config.json";
const RUNTIME_DIR: &str = "runtime";

/// Filesystem layout of one launcher installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPaths {
    root: PathBuf,
}

impl InstallPaths {
    /// Layout rooted at an explicit directory (tests, portable installs).
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Platform default for a launcher whose data directory is `name`.
    ///
    /// macOS keeps `~/Library/Application Support/<name>`; every other
    /// platform uses a dot-prefixed `<base>/.<name>`.
    pub fn for_platform(name: &str) -> LauncherResult<Self> {
        let base = platform_base_dir().ok_or_else(|| {
            LauncherError::Other("Cannot determine the user data directory".into())
        })?;
        Ok(Self::at(base.join(install_dir_name(name))))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.root.join(MODS_DIR)
    }

    pub fn launcher_config_dir(&self) -> PathBuf {
        self.root.join(LAUNCHER_CONFIG_DIR)
    }

    /// The optional-mods state file.
    pub fn mods_config_file(&self) -> PathBuf {
        self.launcher_config_dir().join(MODS_CONFIG_FILE)
    }

    /// Runtime shipped alongside the game.
    pub fn bundled_runtime_dir(&self) -> PathBuf {
        self.root.join(RUNTIME_DIR)
    }

    pub fn bundled_java(&self) -> PathBuf {
        let bin = self.bundled_runtime_dir().join("bin");
        if cfg!(target_os = "windows") {
            bin.join("java.exe")
        } else {
            bin.join("java")
        }
    }

    /// Settings store directory.
    pub fn settings_dir(&self) -> PathBuf {
        self.launcher_config_dir().join("settings")
    }
}

fn install_dir_name(name: &str) -> String {
    if cfg!(target_os = "macos") {
        name.to_string()
    } else {
        format!(".{name}")
    }
}

/// `%APPDATA%` on Windows, `~/Library/Application Support` on macOS, `$HOME` elsewhere.
fn platform_base_dir() -> Option<PathBuf> {
    if cfg!(any(target_os = "windows", target_os = "macos")) {
        dirs::data_dir()
    } else {
        dirs::home_dir()
    }
}

/// Replace `path` with `contents` through a sibling temp file, so a reader
/// sees either the old or the new document and never a partial one. Parent
/// directories are created as needed.
pub async fn write_atomic(path: &Path, contents: &str) -> LauncherResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| LauncherError::io(parent, e))?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| LauncherError::io(&tmp, e))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(LauncherError::io(path, e));
    }
    Ok(())
}
