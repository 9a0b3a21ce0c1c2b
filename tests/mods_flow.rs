mod common;

use std::collections::BTreeMap;

use common::Harness;
use historion_lib::commands::{self, ModsPanel};
use historion_lib::core::error::LauncherError;
use historion_lib::core::mods::{FileStatus, ModCatalog};

fn state_file(h: &Harness) -> BTreeMap<String, bool> {
    let raw = std::fs::read_to_string(h.root().join("launcher_config/mods_config.json")).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[tokio::test]
async fn catalog_change_restores_disabled_jar_and_prunes_it() {
    let h = Harness::new(Vec::new()).await;
    h.touch_mod("a.jar");
    h.catalog.set(Some(ModCatalog::from_ids(["a", "b"])));

    let ModsPanel::Ready { mods } = commands::open_mods_panel(&h.state).await.unwrap() else {
        panic!("expected the mods list");
    };
    assert_eq!(mods.len(), 2);
    assert!(mods.iter().all(|m| m.enabled));
    assert_eq!(
        state_file(&h),
        BTreeMap::from([("a".to_string(), true), ("b".to_string(), true)])
    );

    let toggled = commands::toggle_mod(&h.state, "a", false).await.unwrap();
    assert_eq!(toggled.file, Some(h.mods_dir().join("a.jar.disabled")));
    assert!(h.mods_dir().join("a.jar.disabled").exists());
    assert!(!h.mods_dir().join("a.jar").exists());
    assert_eq!(
        state_file(&h),
        BTreeMap::from([("a".to_string(), false), ("b".to_string(), true)])
    );

    h.catalog.set(Some(ModCatalog::from_ids(["b"])));
    let ModsPanel::Ready { mods } = commands::open_mods_panel(&h.state).await.unwrap() else {
        panic!("expected the mods list");
    };
    assert_eq!(mods.len(), 1);
    assert_eq!(mods[0].id, "b");
    assert!(h.mods_dir().join("a.jar").exists());
    assert!(!h.mods_dir().join("a.jar.disabled").exists());
    assert_eq!(state_file(&h), BTreeMap::from([("b".to_string(), true)]));
}

#[tokio::test]
async fn unreachable_catalog_leaves_state_untouched() {
    let h = Harness::new(Vec::new()).await;
    h.touch_mod("a.jar");
    h.catalog.set(Some(ModCatalog::from_ids(["a"])));
    commands::open_mods_panel(&h.state).await.unwrap();
    commands::toggle_mod(&h.state, "a", false).await.unwrap();
    let before = state_file(&h);

    h.catalog.set(None);
    let panel = commands::open_mods_panel(&h.state).await.unwrap();

    assert!(matches!(panel, ModsPanel::Unavailable { .. }));
    assert_eq!(state_file(&h), before);
    assert!(h.mods_dir().join("a.jar.disabled").exists());
}

#[tokio::test]
async fn empty_mods_directory_reports_not_downloaded() {
    let h = Harness::new(Vec::new()).await;
    h.catalog.set(Some(ModCatalog::from_ids(["a"])));

    let panel = commands::open_mods_panel(&h.state).await.unwrap();

    assert!(matches!(panel, ModsPanel::NotDownloaded));
    // State is still reconciled for when the files arrive.
    assert_eq!(state_file(&h), BTreeMap::from([("a".to_string(), true)]));
}

#[tokio::test]
async fn toggling_a_mod_without_a_file_only_records_the_preference() {
    let h = Harness::new(Vec::new()).await;
    h.touch_mod("other.jar");
    h.catalog.set(Some(ModCatalog::from_ids(["shaders"])));
    commands::open_mods_panel(&h.state).await.unwrap();

    let toggled = commands::toggle_mod(&h.state, "shaders", false).await.unwrap();

    assert_eq!(toggled.file, None);
    assert_eq!(state_file(&h)["shaders"], false);
    assert!(h.mods_dir().join("other.jar").exists());

    let ModsPanel::Ready { mods } = commands::open_mods_panel(&h.state).await.unwrap() else {
        panic!("expected the mods list");
    };
    assert!(!mods[0].enabled);
    assert_eq!(mods[0].file_status, None);
    assert!(mods[0].degraded);
}

#[tokio::test]
async fn listing_reports_file_suffix_per_mod() {
    let h = Harness::new(Vec::new()).await;
    h.touch_mod("minimap-1.4.2.jar");
    h.touch_mod("shaders-0.9.jar.disabled");
    h.catalog.set(Some(ModCatalog::from_ids(["minimap", "shaders"])));

    let ModsPanel::Ready { mods } = commands::open_mods_panel(&h.state).await.unwrap() else {
        panic!("expected the mods list");
    };

    let status = |id: &str| mods.iter().find(|m| m.id == id).unwrap().file_status;
    assert_eq!(status("minimap"), Some(FileStatus::Active));
    assert_eq!(status("shaders"), Some(FileStatus::Disabled));
}

#[tokio::test]
async fn toggling_rejects_ids_outside_the_catalog() {
    let h = Harness::new(Vec::new()).await;
    h.touch_mod("map-1.2.jar");
    h.touch_mod("mapwriter.jar");
    h.catalog.set(Some(ModCatalog::from_ids(["map", "mapwriter"])));
    commands::open_mods_panel(&h.state).await.unwrap();
    let before = state_file(&h);

    for id in ["", "minimap"] {
        let err = commands::toggle_mod(&h.state, id, false).await.unwrap_err();
        assert!(matches!(err, LauncherError::UnknownMod(_)));
    }
    assert_eq!(state_file(&h), before);

    let toggled = commands::toggle_mod(&h.state, "map", false).await.unwrap();
    assert_eq!(toggled.file, Some(h.mods_dir().join("map-1.2.jar.disabled")));
    assert!(h.mods_dir().join("mapwriter.jar").exists());
}

#[tokio::test]
async fn jars_disabled_by_older_launchers_are_listed_and_migrated() {
    let h = Harness::new(Vec::new()).await;
    h.touch_mod("shaders-0.9.jar-disable");
    h.catalog.set(Some(ModCatalog::from_ids(["shaders"])));

    let ModsPanel::Ready { mods } = commands::open_mods_panel(&h.state).await.unwrap() else {
        panic!("expected the mods list");
    };
    assert_eq!(mods[0].file_status, Some(FileStatus::Disabled));

    let toggled = commands::toggle_mod(&h.state, "shaders", false).await.unwrap();
    assert_eq!(toggled.file, Some(h.mods_dir().join("shaders-0.9.jar.disabled")));
    assert!(!h.mods_dir().join("shaders-0.9.jar-disable").exists());
}
