// ─── Mod State File ───
// `{ "<mod id>": <enabled> }`, written sorted with two-space indentation so
// identical state always produces identical bytes.

use std::collections::BTreeMap;
use std::path::Path;

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::paths::write_atomic;

pub type ModState = BTreeMap<String, bool>;

/// Read the state file.
///
/// A missing file or undecodable content is reported as `StateFileCorrupt`;
/// other IO failures are plain `Io` errors.
pub async fn load(path: &Path) -> LauncherResult<ModState> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LauncherError::StateFileCorrupt {
                path: path.to_path_buf(),
                reason: "file does not exist".into(),
            })
        }
        Err(e) => return Err(LauncherError::io(path, e)),
    };

    serde_json::from_str(&raw).map_err(|e| LauncherError::StateFileCorrupt {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Replace the state file atomically, creating its directory if needed.
pub async fn save(path: &Path, state: &ModState) -> LauncherResult<()> {
    let json = serde_json::to_string_pretty(state)?;
    write_atomic(path, &json).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_and_garbage_files_are_corrupt() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("mods_config.json");

        assert!(matches!(
            load(&path).await,
            Err(LauncherError::StateFileCorrupt { .. })
        ));

        std::fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            load(&path).await,
            Err(LauncherError::StateFileCorrupt { .. })
        ));

        std::fs::write(&path, r#"{ "a": "yes" }"#).unwrap();
        assert!(matches!(
            load(&path).await,
            Err(LauncherError::StateFileCorrupt { .. })
        ));
    }

    #[tokio::test]
    async fn save_creates_parent_and_sorts_keys() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("launcher_config").join("mods_config.json");
        let state = ModState::from([("zoom".to_string(), false), ("atlas".to_string(), true)]);

        save(&path, &state).await.unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "{\n  \"atlas\": true,\n  \"zoom\": false\n}");
        assert_eq!(load(&path).await.unwrap(), state);
        assert!(!path.with_file_name("mods_config.json.tmp").exists());
    }
}
