// ─── Accounts ───
// Authenticator payloads stored by the login panel, plus the selected-account
// pointer the launch builder resolves.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::settings::{SelectedAccountRecord, SettingsRepository};

pub const ACCOUNTS_COLLECTION: &str = "accounts";

const OFFLINE_UUID: &str = "00000000-0000-0000-0000-000000000000";
const OFFLINE_TOKEN: &str = "offline_access_token";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountMeta {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub online: bool,
}

/// Authenticator payload handed to the launch engine as-is.
///
/// Fields the launcher does not interpret are kept in `extra` so the
/// payload survives a read/write cycle untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub name: String,
    pub uuid: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub client_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<AccountMeta>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Account {
    pub fn offline(name: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            uuid: OFFLINE_UUID.into(),
            access_token: OFFLINE_TOKEN.into(),
            client_token: String::new(),
            meta: Some(AccountMeta {
                kind: "Mojang".into(),
                online: false,
            }),
            extra: Map::new(),
        }
    }

    pub fn sanitized(mut self) -> Self {
        if self.name.trim().is_empty() {
            self.name = "Player".into();
        }
        if self.uuid.trim().is_empty() {
            self.uuid = OFFLINE_UUID.into();
        }
        if self.access_token.trim().is_empty() {
            self.access_token = OFFLINE_TOKEN.into();
        }
        self
    }
}

/// Outcome of removing an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "uuid", rename_all = "snake_case")]
pub enum AccountRemoval {
    /// Another account was selected; selection unchanged.
    Removed,
    /// The selected account was removed and this one took its place.
    Reselected(String),
    /// Nothing left to select; the shell should go back to login.
    NoAccountsLeft,
}

pub async fn list_accounts(settings: &SettingsRepository) -> LauncherResult<Vec<Account>> {
    let mut accounts = Vec::new();
    for (id, value) in settings.store().list(ACCOUNTS_COLLECTION).await? {
        match serde_json::from_value::<Account>(value) {
            Ok(account) => accounts.push(account),
            Err(e) => warn!("Skipping unreadable account {}: {}", id, e),
        }
    }
    Ok(accounts)
}

pub async fn save_account(settings: &SettingsRepository, account: &Account) -> LauncherResult<()> {
    let value = serde_json::to_value(account)?;
    settings
        .store()
        .put(ACCOUNTS_COLLECTION, &account.uuid, value)
        .await
}

pub async fn find_account(
    settings: &SettingsRepository,
    uuid: &str,
) -> LauncherResult<Option<Account>> {
    let Some(value) = settings.store().get(ACCOUNTS_COLLECTION, uuid).await? else {
        return Ok(None);
    };
    match serde_json::from_value(value) {
        Ok(account) => Ok(Some(account)),
        Err(e) => {
            warn!("Account {} is unreadable: {}", uuid, e);
            Ok(None)
        }
    }
}

/// The account the next launch will use, if the selection still resolves.
pub async fn selected_account(settings: &SettingsRepository) -> LauncherResult<Option<Account>> {
    let selection = settings.load_or_default::<SelectedAccountRecord>().await?;
    match selection.selected {
        Some(uuid) => find_account(settings, &uuid).await,
        None => Ok(None),
    }
}

pub async fn select_account(settings: &SettingsRepository, uuid: &str) -> LauncherResult<()> {
    if find_account(settings, uuid).await?.is_none() {
        return Err(LauncherError::AccountNotFound(uuid.to_string()));
    }
    settings
        .save(&SelectedAccountRecord {
            selected: Some(uuid.to_string()),
        })
        .await?;
    info!("Selected account {}", uuid);
    Ok(())
}

/// Remove an account, moving the selection to the first remaining one if needed.
pub async fn delete_account(
    settings: &SettingsRepository,
    uuid: &str,
) -> LauncherResult<AccountRemoval> {
    settings.store().delete(ACCOUNTS_COLLECTION, uuid).await?;

    let remaining = list_accounts(settings).await?;
    let Some(first) = remaining.first() else {
        settings.save(&SelectedAccountRecord::default()).await?;
        info!("Deleted account {}, no accounts left", uuid);
        return Ok(AccountRemoval::NoAccountsLeft);
    };

    let selection = settings.load_or_default::<SelectedAccountRecord>().await?;
    if selection.selected.as_deref() != Some(uuid) {
        return Ok(AccountRemoval::Removed);
    }

    settings
        .save(&SelectedAccountRecord {
            selected: Some(first.uuid.clone()),
        })
        .await?;
    info!("Deleted selected account {}, switched to {}", uuid, first.uuid);
    Ok(AccountRemoval::Reselected(first.uuid.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::MemoryStore;
    use serde_json::json;
    use std::sync::Arc;

    fn account(uuid: &str, name: &str) -> Account {
        Account {
            uuid: uuid.into(),
            ..Account::offline(name)
        }
    }

    async fn repository_with(accounts: &[Account]) -> SettingsRepository {
        let repo = SettingsRepository::new(Arc::new(MemoryStore::new()));
        for a in accounts {
            save_account(&repo, a).await.unwrap();
        }
        repo
    }

    #[test]
    fn unknown_payload_fields_survive_roundtrip() {
        let raw = json!({
            "name": "Steve",
            "uuid": "abc",
            "access_token": "t",
            "user_properties": "{}",
            "meta": { "type": "Xbox", "online": true }
        });
        let parsed: Account = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(parsed.extra["user_properties"], "{}");
        assert_eq!(serde_json::to_value(&parsed).unwrap()["user_properties"], "{}");
    }

    #[test]
    fn sanitized_fills_blank_fields() {
        let account = Account {
            name: " ".into(),
            uuid: String::new(),
            access_token: String::new(),
            ..Account::offline("x")
        }
        .sanitized();
        assert_eq!(account.name, "Player");
        assert_eq!(account.uuid, OFFLINE_UUID);
        assert_eq!(account.access_token, OFFLINE_TOKEN);
    }

    #[tokio::test]
    async fn selecting_unknown_account_fails() {
        let repo = repository_with(&[account("a", "Alex")]).await;
        assert!(matches!(
            select_account(&repo, "zzz").await,
            Err(LauncherError::AccountNotFound(_))
        ));
        select_account(&repo, "a").await.unwrap();
        assert_eq!(selected_account(&repo).await.unwrap().unwrap().name, "Alex");
    }

    #[tokio::test]
    async fn deleting_selected_account_reselects_first_remaining() {
        let repo = repository_with(&[account("a", "Alex"), account("b", "Bea")]).await;
        select_account(&repo, "b").await.unwrap();

        let outcome = delete_account(&repo, "b").await.unwrap();
        assert_eq!(outcome, AccountRemoval::Reselected("a".into()));
        assert_eq!(selected_account(&repo).await.unwrap().unwrap().uuid, "a");
    }

    #[tokio::test]
    async fn deleting_other_account_keeps_selection() {
        let repo = repository_with(&[account("a", "Alex"), account("b", "Bea")]).await;
        select_account(&repo, "a").await.unwrap();

        assert_eq!(delete_account(&repo, "b").await.unwrap(), AccountRemoval::Removed);
        assert_eq!(selected_account(&repo).await.unwrap().unwrap().uuid, "a");
    }

    #[tokio::test]
    async fn deleting_last_account_clears_selection() {
        let repo = repository_with(&[account("a", "Alex")]).await;
        select_account(&repo, "a").await.unwrap();

        assert_eq!(
            delete_account(&repo, "a").await.unwrap(),
            AccountRemoval::NoAccountsLeft
        );
        assert!(selected_account(&repo).await.unwrap().is_none());
    }
}
