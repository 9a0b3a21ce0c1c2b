// ─── Mod Files ───
// Mod jars on disk. A mod is enabled when its file carries the plain
// extension (`name.jar`) and disabled when the marker is appended
// (`name.jar.disabled`). Installs made by older launchers used
// `name.jar-disable`; those files count as disabled and move to the current
// suffix on their next rename. Files are matched to mod ids by filename
// prefix so version suffixes (`name-1.4.2.jar`) are tolerated.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::core::error::{LauncherError, LauncherResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Active,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModFile {
    pub path: PathBuf,
    pub status: FileStatus,
}

/// Result of aligning one mod's file with a desired enabled flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiskChange {
    /// No file for this id yet.
    NoFile,
    /// File already carried the wanted suffix.
    Unchanged(PathBuf),
    Renamed { from: PathBuf, to: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModFileNaming {
    extension: String,
    disabled_marker: String,
    legacy_marker: String,
}

impl Default for ModFileNaming {
    fn default() -> Self {
        Self::new("jar", "disabled")
    }
}

impl ModFileNaming {
    pub fn new(extension: &str, disabled_marker: &str) -> Self {
        Self {
            extension: extension.trim_start_matches('.').to_string(),
            disabled_marker: disabled_marker.trim_start_matches('.').to_string(),
            legacy_marker: "disable".into(),
        }
    }

    fn active_suffix(&self) -> String {
        format!(".{}", self.extension)
    }

    fn disabled_suffix(&self) -> String {
        format!(".{}.{}", self.extension, self.disabled_marker)
    }

    fn legacy_suffix(&self) -> String {
        format!(".{}-{}", self.extension, self.legacy_marker)
    }

    /// Status implied by a file name, `None` for files that are not mods.
    pub fn classify(&self, file_name: &str) -> Option<FileStatus> {
        if file_name.ends_with(&self.disabled_suffix())
            || file_name.ends_with(&self.legacy_suffix())
        {
            Some(FileStatus::Disabled)
        } else if file_name.ends_with(&self.active_suffix()) {
            Some(FileStatus::Active)
        } else {
            None
        }
    }

    /// Name part before the active/disabled suffix.
    fn stem<'a>(&self, file_name: &'a str) -> &'a str {
        file_name
            .strip_suffix(&self.disabled_suffix())
            .or_else(|| file_name.strip_suffix(&self.legacy_suffix()))
            .or_else(|| file_name.strip_suffix(&self.active_suffix()))
            .unwrap_or(file_name)
    }

    /// How well `file_name` matches `id`: exact stem (0), or prefix followed
    /// by a separator such as `id-1.2` (1). `mapwriter` never matches `map`.
    fn match_rank(&self, id: &str, file_name: &str) -> Option<u8> {
        if id.is_empty() {
            return None;
        }
        let stem = self.stem(file_name);
        match stem.strip_prefix(id)?.chars().next() {
            None => Some(0),
            Some(c) if !c.is_alphanumeric() => Some(1),
            Some(_) => None,
        }
    }

    /// Whether a longer id from `known` also matches `file_name`, in which
    /// case the file is that id's, e.g. `map-extras-1.0.jar` for `map`.
    fn claimed_by_other(&self, id: &str, file_name: &str, known: &BTreeSet<String>) -> bool {
        known
            .iter()
            .filter(|other| other.len() > id.len() && other.starts_with(id))
            .any(|other| self.match_rank(other, file_name).is_some())
    }

    /// Locate the file for `id`, ignoring files that belong to another id in
    /// `known`. A missing directory means no file.
    pub async fn find(
        &self,
        dir: &Path,
        id: &str,
        known: &BTreeSet<String>,
    ) -> LauncherResult<Option<ModFile>> {
        let mut best: Option<(u8, String, FileStatus)> = None;

        for name in list_file_names(dir).await? {
            let Some(status) = self.classify(&name) else {
                continue;
            };
            let Some(rank) = self.match_rank(id, &name) else {
                continue;
            };
            if self.claimed_by_other(id, &name, known) {
                continue;
            }
            let better = match &best {
                None => true,
                Some((best_rank, best_name, _)) => (rank, &name) < (*best_rank, best_name),
            };
            if better {
                best = Some((rank, name, status));
            }
        }

        Ok(best.map(|(_, name, status)| ModFile {
            path: dir.join(name),
            status,
        }))
    }

    /// Path the file should have for the wanted flag, `None` if already there.
    pub fn target_path(&self, file: &ModFile, enabled: bool) -> Option<PathBuf> {
        let name = file.path.file_name()?.to_string_lossy().to_string();
        let stem = self.stem(&name);
        let renamed = match (file.status, enabled) {
            (FileStatus::Disabled, true) => format!("{stem}{}", self.active_suffix()),
            (FileStatus::Disabled, false) if name.ends_with(&self.legacy_suffix()) => {
                format!("{stem}{}", self.disabled_suffix())
            }
            (FileStatus::Active, false) => format!("{stem}{}", self.disabled_suffix()),
            _ => return None,
        };
        Some(file.path.with_file_name(renamed))
    }

    /// Rename the file for `id` so its suffix reflects `enabled`.
    ///
    /// The rename is the only mutation. It refuses to overwrite an existing
    /// file, and on failure the original name is left in place.
    pub async fn apply(
        &self,
        dir: &Path,
        id: &str,
        enabled: bool,
        known: &BTreeSet<String>,
    ) -> LauncherResult<DiskChange> {
        let Some(file) = self.find(dir, id, known).await? else {
            return Ok(DiskChange::NoFile);
        };
        let Some(target) = self.target_path(&file, enabled) else {
            return Ok(DiskChange::Unchanged(file.path));
        };

        rename_no_clobber(&file.path, &target).await?;
        debug!("Renamed {:?} -> {:?}", file.path, target);
        Ok(DiskChange::Renamed {
            from: file.path,
            to: target,
        })
    }
}

/// Whether the directory exists and holds at least one entry.
pub async fn has_any_file(dir: &Path) -> LauncherResult<bool> {
    Ok(!list_file_names(dir).await?.is_empty())
}

async fn list_file_names(dir: &Path) -> LauncherResult<Vec<String>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(LauncherError::io(dir, e)),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| LauncherError::io(dir, e))?
    {
        names.push(entry.file_name().to_string_lossy().to_string());
    }
    Ok(names)
}

async fn rename_no_clobber(from: &Path, to: &Path) -> LauncherResult<()> {
    let failed = |source| LauncherError::FileRenameFailed {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    match tokio::fs::try_exists(to).await {
        Ok(false) => {}
        Ok(true) => {
            return Err(failed(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "target file already exists",
            )))
        }
        Err(e) => return Err(failed(e)),
    }

    tokio::fs::rename(from, to).await.map_err(failed)
}
