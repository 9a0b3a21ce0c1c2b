// ─── Mod Reconciler ───
// Keeps the optional-mod state file aligned with the remote catalog and with
// the jar suffixes in the mods directory.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::catalog::ModCatalog;
use super::files::{DiskChange, FileStatus, ModFileNaming};
use super::state::{self, ModState};
use crate::core::error::{LauncherError, LauncherResult};

/// One row of the optional-mods list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModListing {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon_url: Option<String>,
    pub recommended: bool,
    pub enabled: bool,
    /// File present in the mods directory, with its current suffix.
    pub file_status: Option<FileStatus>,
    /// The catalog listed the id without metadata.
    pub degraded: bool,
}

/// Owns one state file and the mods directory it describes.
///
/// `reconcile` and `set_enabled` both read-modify-write the state file; they
/// are serialized behind a single lock so they never interleave. The lock
/// also holds the ids of the last reconciled catalog, which bound what
/// `set_enabled` accepts.
pub struct ModReconciler {
    state_file: PathBuf,
    mods_dir: PathBuf,
    naming: ModFileNaming,
    catalog_ids: Mutex<Option<BTreeSet<String>>>,
}

impl ModReconciler {
    pub fn new(state_file: impl Into<PathBuf>, mods_dir: impl Into<PathBuf>) -> Self {
        Self {
            state_file: state_file.into(),
            mods_dir: mods_dir.into(),
            naming: ModFileNaming::default(),
            catalog_ids: Mutex::new(None),
        }
    }

    pub fn state_file(&self) -> &Path {
        &self.state_file
    }

    pub fn mods_dir(&self) -> &Path {
        &self.mods_dir
    }

    /// Align the state file with `catalog`.
    ///
    /// 1. Load the state; if missing or unreadable, regenerate it with every
    ///    catalog id enabled and persist that first.
    /// 2. Drop ids the catalog no longer lists. A dropped id that was disabled
    ///    gets its jar renamed back to active before it leaves our control.
    /// 3. Add new catalog ids as enabled.
    /// 4. Persist, even when nothing changed.
    pub async fn reconcile(&self, catalog: &ModCatalog) -> LauncherResult<ModState> {
        let mut catalog_ids = self.catalog_ids.lock().await;
        let ids = id_set(catalog);

        let mut current = match state::load(&self.state_file).await {
            Ok(current) => current,
            Err(e) => {
                warn!("Regenerating mod state from catalog: {}", e);
                let fresh: ModState = catalog
                    .optional_mods
                    .iter()
                    .map(|id| (id.clone(), true))
                    .collect();
                state::save(&self.state_file, &fresh).await?;
                fresh
            }
        };

        let stale: Vec<(String, bool)> = current
            .iter()
            .filter(|(id, _)| !catalog.contains(id))
            .map(|(id, enabled)| (id.clone(), *enabled))
            .collect();

        // Stale ids still own their files while being restored.
        let known: BTreeSet<String> = ids.iter().chain(current.keys()).cloned().collect();
        for (id, enabled) in stale {
            if !enabled {
                self.restore_dropped(&id, &known).await;
            }
            current.remove(&id);
            info!("Pruned mod '{}' no longer listed as optional", id);
        }

        for id in &catalog.optional_mods {
            current.entry(id.clone()).or_insert(true);
        }

        state::save(&self.state_file, &current).await?;
        *catalog_ids = Some(ids);
        debug!("Mod state reconciled: {} entries", current.len());
        Ok(current)
    }

    async fn restore_dropped(&self, id: &str, known: &BTreeSet<String>) {
        match self.naming.apply(&self.mods_dir, id, true, known).await {
            Ok(DiskChange::Renamed { to, .. }) => info!("Re-enabled dropped mod file {:?}", to),
            Ok(_) => {}
            Err(e) => warn!("Could not re-enable dropped mod '{}': {}", id, e),
        }
    }

    /// Enable or disable one mod.
    ///
    /// Renames the mod's jar if one exists, then records the preference. With
    /// no jar on disk only the preference is stored; it is honored once the
    /// file shows up. A failed rename returns `FileRenameFailed` and leaves the
    /// state file as it was.
    ///
    /// Only ids of the last reconciled catalog are accepted; before the first
    /// reconcile, the ids already in the state file. Anything else is
    /// `UnknownMod` and touches neither disk nor state.
    pub async fn set_enabled(&self, id: &str, enabled: bool) -> LauncherResult<DiskChange> {
        let catalog_ids = self.catalog_ids.lock().await;
        let known = match catalog_ids.as_ref() {
            Some(ids) => ids.clone(),
            None => self.recorded_ids().await,
        };
        if id.is_empty() || !known.contains(id) {
            warn!("Refusing to toggle unknown mod '{}'", id);
            return Err(LauncherError::UnknownMod(id.to_string()));
        }

        let change = self
            .naming
            .apply(&self.mods_dir, id, enabled, &known)
            .await?;

        let mut current = match state::load(&self.state_file).await {
            Ok(current) => current,
            Err(e) => {
                warn!("Mod state unreadable while toggling '{}': {}", id, e);
                ModState::new()
            }
        };
        current.insert(id.to_string(), enabled);
        state::save(&self.state_file, &current).await?;

        info!(
            "Mod '{}' {}",
            id,
            if enabled { "enabled" } else { "disabled" }
        );
        Ok(change)
    }

    async fn recorded_ids(&self) -> BTreeSet<String> {
        state::load(&self.state_file)
            .await
            .map(|current| current.into_keys().collect())
            .unwrap_or_default()
    }

    /// Rows for the optional-mods list, in catalog order.
    pub async fn listings(
        &self,
        catalog: &ModCatalog,
        current: &ModState,
    ) -> LauncherResult<Vec<ModListing>> {
        let known = id_set(catalog);
        let mut rows = Vec::new();
        for entry in catalog.entries() {
            let file = self.naming.find(&self.mods_dir, &entry.id, &known).await?;
            let enabled = current.get(&entry.id).copied().unwrap_or(true);
            let degraded = entry.is_degraded();
            let details = entry.details.unwrap_or_default();

            rows.push(ModListing {
                name: if details.name.is_empty() {
                    entry.id.clone()
                } else {
                    details.name
                },
                description: details.description,
                icon_url: Some(details.icon_url).filter(|url| !url.is_empty()),
                recommended: details.recommended,
                enabled,
                file_status: file.map(|f| f.status),
                degraded,
                id: entry.id,
            });
        }
        Ok(rows)
    }
}

fn id_set(catalog: &ModCatalog) -> BTreeSet<String> {
    catalog.optional_mods.iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mods::catalog::ModDetails;

    struct Fixture {
        _temp: tempfile::TempDir,
        mods: PathBuf,
        reconciler: ModReconciler,
    }

    fn fixture() -> Fixture {
        let temp = tempfile::tempdir().unwrap();
        let mods = temp.path().join("mods");
        std::fs::create_dir_all(&mods).unwrap();
        let reconciler = ModReconciler::new(
            temp.path().join("launcher_config").join("mods_config.json"),
            &mods,
        );
        Fixture {
            _temp: temp,
            mods,
            reconciler,
        }
    }

    fn read_state(f: &Fixture) -> String {
        std::fs::read_to_string(f.reconciler.state_file()).unwrap()
    }

    #[tokio::test]
    async fn reconcile_is_idempotent() {
        let f = fixture();
        let catalog = ModCatalog::from_ids(["b", "a"]);

        f.reconciler.reconcile(&catalog).await.unwrap();
        let first = read_state(&f);
        f.reconciler.reconcile(&catalog).await.unwrap();
        assert_eq!(read_state(&f), first);
    }

    #[tokio::test]
    async fn corrupt_state_is_regenerated() {
        let f = fixture();
        std::fs::create_dir_all(f.reconciler.state_file().parent().unwrap()).unwrap();
        std::fs::write(f.reconciler.state_file(), "{{{").unwrap();

        let state = f
            .reconciler
            .reconcile(&ModCatalog::from_ids(["a"]))
            .await
            .unwrap();
        assert_eq!(state, ModState::from([("a".to_string(), true)]));
    }

    #[tokio::test]
    async fn new_ids_default_to_enabled_and_existing_prefs_survive() {
        let f = fixture();
        f.reconciler
            .reconcile(&ModCatalog::from_ids(["a"]))
            .await
            .unwrap();
        f.reconciler.set_enabled("a", false).await.unwrap();

        let state = f
            .reconciler
            .reconcile(&ModCatalog::from_ids(["a", "c"]))
            .await
            .unwrap();
        assert_eq!(state.get("a"), Some(&false));
        assert_eq!(state.get("c"), Some(&true));
    }

    #[tokio::test]
    async fn pruned_enabled_mod_keeps_its_file() {
        let f = fixture();
        std::fs::write(f.mods.join("a.jar"), b"").unwrap();
        f.reconciler
            .reconcile(&ModCatalog::from_ids(["a"]))
            .await
            .unwrap();

        let state = f
            .reconciler
            .reconcile(&ModCatalog::from_ids(Vec::<String>::new()))
            .await
            .unwrap();
        assert!(state.is_empty());
        assert!(f.mods.join("a.jar").exists());
    }

    #[tokio::test]
    async fn toggle_without_file_only_records_preference() {
        let f = fixture();
        f.reconciler
            .reconcile(&ModCatalog::from_ids(["y"]))
            .await
            .unwrap();

        let change = f.reconciler.set_enabled("y", false).await.unwrap();
        assert_eq!(change, DiskChange::NoFile);
        assert!(read_state(&f).contains("\"y\": false"));
        assert_eq!(std::fs::read_dir(&f.mods).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn failed_rename_leaves_state_untouched() {
        let f = fixture();
        std::fs::write(f.mods.join("x.jar"), b"").unwrap();
        std::fs::write(f.mods.join("x.jar.disabled"), b"").unwrap();
        f.reconciler
            .reconcile(&ModCatalog::from_ids(["x"]))
            .await
            .unwrap();
        let before = read_state(&f);

        let err = f.reconciler.set_enabled("x", false).await.unwrap_err();
        assert!(matches!(err, LauncherError::FileRenameFailed { .. }));
        assert_eq!(read_state(&f), before);
    }

    #[tokio::test]
    async fn listings_mark_degraded_and_installed_entries() {
        let f = fixture();
        std::fs::write(f.mods.join("atlas-2.1.jar.disabled"), b"").unwrap();
        let mut catalog = ModCatalog::from_ids(["atlas", "ghost"]);
        catalog.mods.insert(
            "atlas".into(),
            ModDetails {
                name: "Atlas".into(),
                description: "World map".into(),
                icon_url: "https://cdn.example/atlas.png".into(),
                recommended: true,
            },
        );

        let state = f.reconciler.reconcile(&catalog).await.unwrap();
        let rows = f.reconciler.listings(&catalog, &state).await.unwrap();

        assert_eq!(rows[0].name, "Atlas");
        assert!(rows[0].recommended);
        assert_eq!(rows[0].file_status, Some(FileStatus::Disabled));
        assert!(!rows[0].degraded);
        assert_eq!(rows[1].name, "ghost");
        assert!(rows[1].degraded);
        assert!(rows[1].icon_url.is_none());
        assert_eq!(rows[1].file_status, None);
    }

    #[tokio::test]
    async fn toggling_map_leaves_mapwriter_alone() {
        let f = fixture();
        std::fs::write(f.mods.join("mapwriter.jar"), b"").unwrap();
        f.reconciler
            .reconcile(&ModCatalog::from_ids(["map", "mapwriter"]))
            .await
            .unwrap();

        let change = f.reconciler.set_enabled("map", false).await.unwrap();
        assert_eq!(change, DiskChange::NoFile);
        assert!(f.mods.join("mapwriter.jar").exists());
        assert!(!f.mods.join("mapwriter.jar.disabled").exists());

        let state = state::load(f.reconciler.state_file()).await.unwrap();
        assert_eq!(state.get("map"), Some(&false));
        assert_eq!(state.get("mapwriter"), Some(&true));
    }

    #[tokio::test]
    async fn unknown_and_empty_ids_are_rejected() {
        let f = fixture();
        std::fs::write(f.mods.join("atlas.jar"), b"").unwrap();
        f.reconciler
            .reconcile(&ModCatalog::from_ids(["atlas"]))
            .await
            .unwrap();
        let before = read_state(&f);

        for id in ["", "zoom", "atl"] {
            let err = f.reconciler.set_enabled(id, false).await.unwrap_err();
            assert!(matches!(err, LauncherError::UnknownMod(ref rejected) if rejected == id));
        }
        assert_eq!(read_state(&f), before);
        assert!(f.mods.join("atlas.jar").exists());
    }

    #[tokio::test]
    async fn before_first_reconcile_only_recorded_ids_toggle() {
        let f = fixture();
        let state = ModState::from([("atlas".to_string(), true)]);
        state::save(f.reconciler.state_file(), &state).await.unwrap();

        assert!(f.reconciler.set_enabled("atlas", false).await.is_ok());
        assert!(matches!(
            f.reconciler.set_enabled("zoom", false).await,
            Err(LauncherError::UnknownMod(_))
        ));
    }

    #[tokio::test]
    async fn legacy_disabled_jar_is_restored_when_dropped() {
        let f = fixture();
        std::fs::write(f.mods.join("shaders-0.9.jar-disable"), b"").unwrap();
        let state = ModState::from([("shaders".to_string(), false)]);
        state::save(f.reconciler.state_file(), &state).await.unwrap();

        f.reconciler
            .reconcile(&ModCatalog::from_ids(Vec::<String>::new()))
            .await
            .unwrap();
        assert!(f.mods.join("shaders-0.9.jar").exists());
        assert!(!f.mods.join("shaders-0.9.jar-disable").exists());
    }
}
