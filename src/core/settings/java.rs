// ─── Java Override Selection ───

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{info, warn};

use super::records::{JavaOverride, JavaPathRecord};
use super::repository::SettingsRepository;
use crate::core::error::LauncherResult;

/// Native file dialog owned by the hosting shell.
#[async_trait]
pub trait FilePicker: Send + Sync {
    /// Resolves once the user picks a file, or with `None` if the dialog is dismissed.
    async fn pick_file(&self) -> Option<PathBuf>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavaPathChoice {
    Selected(PathBuf),
    Cancelled,
}

/// Let the user choose a java executable and persist it as the override.
///
/// A dismissed dialog changes nothing. A file that is not a java binary is
/// rejected with `InvalidJavaPath` and the previous override is kept.
pub async fn choose_java_path(
    picker: &dyn FilePicker,
    settings: &SettingsRepository,
) -> LauncherResult<JavaPathChoice> {
    let Some(picked) = picker.pick_file().await else {
        return Ok(JavaPathChoice::Cancelled);
    };

    let java = JavaOverride::new(picked).inspect_err(|e| warn!("{}", e))?;
    settings
        .save(&JavaPathRecord {
            path: Some(java.path().to_path_buf()),
        })
        .await?;

    info!("Java override set to {:?}", java.path());
    Ok(JavaPathChoice::Selected(java.into_path()))
}

/// Go back to the runtime bundled with the launcher.
pub async fn reset_java_path(settings: &SettingsRepository) -> LauncherResult<()> {
    settings.save(&JavaPathRecord::default()).await
}
