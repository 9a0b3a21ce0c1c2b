mod common;

use std::path::PathBuf;

use async_trait::async_trait;
use common::Harness;
use historion_lib::commands;
use historion_lib::core::auth::{self, Account, AccountRemoval};
use historion_lib::core::error::LauncherError;
use historion_lib::core::settings::{FilePicker, JavaPathChoice, JavaPathRecord};

struct Picker(Option<PathBuf>);

#[async_trait]
impl FilePicker for Picker {
    async fn pick_file(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

fn online(name: &str, uuid: &str) -> Account {
    Account {
        uuid: uuid.into(),
        ..Account::offline(name)
    }
}

#[tokio::test]
async fn deleting_the_selected_account_selects_the_next_one() {
    let h = Harness::new(Vec::new()).await;
    let settings = &h.state.settings;
    auth::save_account(settings, &online("Alex", "uuid-alex")).await.unwrap();
    auth::save_account(settings, &online("Steve", "uuid-steve")).await.unwrap();
    commands::select_account(&h.state, "uuid-steve").await.unwrap();

    let removal = commands::delete_account(&h.state, "uuid-steve").await.unwrap();
    assert_eq!(removal, AccountRemoval::Reselected("uuid-alex".into()));

    let listed = commands::accounts(&h.state).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].selected);

    let removal = commands::delete_account(&h.state, "uuid-alex").await.unwrap();
    assert_eq!(removal, AccountRemoval::NoAccountsLeft);
}

#[tokio::test]
async fn selecting_an_unknown_account_fails() {
    let h = Harness::new(Vec::new()).await;
    let err = commands::select_account(&h.state, "nobody").await.unwrap_err();
    assert!(matches!(err, LauncherError::AccountNotFound(_)));
}

#[tokio::test]
async fn java_picker_dismissal_keeps_previous_override() {
    let h = Harness::new(Vec::new()).await;
    let java = PathBuf::from("/opt/jdk-17/bin/java");

    let choice = commands::choose_java_path(&h.state, &Picker(Some(java.clone())))
        .await
        .unwrap();
    assert_eq!(choice, JavaPathChoice::Selected(java.clone()));

    let choice = commands::choose_java_path(&h.state, &Picker(None)).await.unwrap();
    assert_eq!(choice, JavaPathChoice::Cancelled);

    let err = commands::choose_java_path(&h.state, &Picker(Some("/usr/bin/python3".into())))
        .await
        .unwrap_err();
    assert!(matches!(err, LauncherError::InvalidJavaPath(_)));

    let stored: JavaPathRecord = h.state.settings.load_or_default().await.unwrap();
    assert_eq!(stored.path, Some(java));

    commands::reset_java_path(&h.state).await.unwrap();
    let stored: JavaPathRecord = h.state.settings.load_or_default().await.unwrap();
    assert_eq!(stored.path, None);
}

#[tokio::test]
async fn settings_survive_a_restart() {
    let h = Harness::new(Vec::new()).await;
    commands::update_memory(&h.state, 4, 8).await.unwrap();

    let reopened = historion_lib::core::settings::SettingsRepository::new(std::sync::Arc::new(
        historion_lib::core::settings::JsonFileStore::new(
            h.root().join("launcher_config").join("settings"),
        ),
    ));
    let settings = reopened.launch_settings().await.unwrap();
    assert_eq!(settings.memory.bounds().unwrap().max_gb(), 8);
}
