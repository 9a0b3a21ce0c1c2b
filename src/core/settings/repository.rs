use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::records::{
    ClosePolicy, JavaPathRecord, JvmArgs, JvmArgsRecord, LauncherRecord, MemoryRecord, Record,
    ScreenRecord, SelectedAccountRecord, SINGLETON_ID,
};
use super::store::SettingsStore;
use crate::core::error::LauncherResult;

/// Launch-relevant settings as currently persisted.
///
/// Values are kept in their stored form; the launch builder is the single
/// place where they are validated into typed values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchSettings {
    pub memory: MemoryRecord,
    pub java_path: Option<PathBuf>,
    pub jvm_args: JvmArgs,
    pub screen: ScreenRecord,
    pub close_policy: ClosePolicy,
    pub selected_account: Option<String>,
}

/// Typed access to the settings store.
#[derive(Clone)]
pub struct SettingsRepository {
    store: Arc<dyn SettingsStore>,
}

impl SettingsRepository {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    /// Load a singleton record; undecodable records read as absent.
    pub async fn load<R: Record>(&self) -> LauncherResult<Option<R>> {
        let Some(value) = self.store.get(R::COLLECTION, SINGLETON_ID).await? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!("Ignoring malformed '{}' settings record: {}", R::COLLECTION, e);
                Ok(None)
            }
        }
    }

    pub async fn load_or_default<R: Record + Default>(&self) -> LauncherResult<R> {
        Ok(self.load::<R>().await?.unwrap_or_default())
    }

    pub async fn save<R: Record>(&self, record: &R) -> LauncherResult<()> {
        let value: Value = serde_json::to_value(record)?;
        self.store.put(R::COLLECTION, SINGLETON_ID, value).await
    }

    /// Write first-run defaults for every record that is missing.
    pub async fn ensure_defaults(&self) -> LauncherResult<()> {
        self.ensure::<SelectedAccountRecord>().await?;
        self.ensure::<JavaPathRecord>().await?;
        self.ensure::<JvmArgsRecord>().await?;
        self.ensure::<LauncherRecord>().await?;
        self.ensure::<MemoryRecord>().await?;
        self.ensure::<ScreenRecord>().await?;
        Ok(())
    }

    async fn ensure<R: Record + Default>(&self) -> LauncherResult<()> {
        if self.store.get(R::COLLECTION, SINGLETON_ID).await?.is_none() {
            info!("Writing default '{}' settings", R::COLLECTION);
            self.save(&R::default()).await?;
        }
        Ok(())
    }

    /// Snapshot of everything the launch builder reads.
    pub async fn launch_settings(&self) -> LauncherResult<LaunchSettings> {
        let memory = self.load_or_default::<MemoryRecord>().await?;
        let java_path = self.load_or_default::<JavaPathRecord>().await?.path;
        let jvm_args = self.load_or_default::<JvmArgsRecord>().await?.jvm_args();
        let screen = self.load_or_default::<ScreenRecord>().await?;
        let close_policy = self.load_or_default::<LauncherRecord>().await?.launcher.close;
        let selected_account = self
            .load_or_default::<SelectedAccountRecord>()
            .await?
            .selected;

        Ok(LaunchSettings {
            memory,
            java_path,
            jvm_args,
            screen,
            close_policy,
            selected_account,
        })
    }
}
