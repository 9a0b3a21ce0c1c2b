// ─── Settings Records ───
// Stored shapes of the launch settings and the typed values built from them.
//
// Stored records keep the launcher database format (string gigabytes,
// `"<auto>"` screen width, `path: false`); typed values enforce invariants
// and are only produced through their constructors.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::core::error::{LauncherError, LauncherResult};

/// Id under which single-record collections are stored.
pub const SINGLETON_ID: &str = "1234";

/// Width value the screen record uses to ask for engine-managed sizing.
pub const AUTO_RESOLUTION: &str = "<auto>";

/// Argument tokens reserved for the launcher; never forwarded from user input.
pub const RESERVED_JVM_TOKENS: [&str; 2] = ["--server", "--port"];

/// A persisted settings record living in one collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;
}

// ── Memory ──────────────────────────────────────────────

/// Memory bounds in whole gigabytes, `0 < min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryBounds {
    min_gb: u32,
    max_gb: u32,
}

impl MemoryBounds {
    pub fn new(min_gb: u32, max_gb: u32) -> LauncherResult<Self> {
        if min_gb == 0 || max_gb == 0 {
            return Err(LauncherError::LaunchValidation(
                "memory bounds must be positive".into(),
            ));
        }
        if min_gb > max_gb {
            return Err(LauncherError::LaunchValidation(format!(
                "minimum memory ({min_gb} GB) exceeds maximum ({max_gb} GB)"
            )));
        }
        Ok(Self { min_gb, max_gb })
    }

    pub fn min_gb(&self) -> u32 {
        self.min_gb
    }

    pub fn max_gb(&self) -> u32 {
        self.max_gb
    }

    /// Engine memory strings, e.g. `("1024M", "3072M")`.
    pub fn to_engine_pair(&self) -> (String, String) {
        (megabytes(self.min_gb), megabytes(self.max_gb))
    }
}

fn megabytes(gb: u32) -> String {
    format!("{}M", u64::from(gb) * 1024)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    #[serde(rename = "ramMin", deserialize_with = "string_or_number")]
    pub ram_min: String,
    #[serde(rename = "ramMax", deserialize_with = "string_or_number")]
    pub ram_max: String,
}

impl Default for MemoryRecord {
    fn default() -> Self {
        Self {
            ram_min: "1".into(),
            ram_max: "3".into(),
        }
    }
}

impl Record for MemoryRecord {
    const COLLECTION: &'static str = "ram";
}

impl MemoryRecord {
    pub fn bounds(&self) -> LauncherResult<MemoryBounds> {
        MemoryBounds::new(
            parse_gigabytes("minimum", &self.ram_min)?,
            parse_gigabytes("maximum", &self.ram_max)?,
        )
    }
}

impl From<MemoryBounds> for MemoryRecord {
    fn from(bounds: MemoryBounds) -> Self {
        Self {
            ram_min: bounds.min_gb.to_string(),
            ram_max: bounds.max_gb.to_string(),
        }
    }
}

fn parse_gigabytes(label: &str, raw: &str) -> LauncherResult<u32> {
    raw.trim().parse::<u32>().map_err(|_| {
        LauncherError::LaunchValidation(format!(
            "{label} memory must be a whole number of gigabytes, got {raw:?}"
        ))
    })
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a string or a number, got {other}"
        ))),
    }
}

// ── Java override ───────────────────────────────────────

/// Path to a user-chosen java executable (`java`, `javaw`, optionally `.exe`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaOverride(PathBuf);

impl JavaOverride {
    pub fn new(path: impl Into<PathBuf>) -> LauncherResult<Self> {
        let path = path.into();
        if is_java_executable(&path) {
            Ok(Self(path))
        } else {
            Err(LauncherError::InvalidJavaPath(path))
        }
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn into_path(self) -> PathBuf {
        self.0
    }
}

fn is_java_executable(path: &Path) -> bool {
    let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_lowercase()) else {
        return false;
    };
    let stem = name.strip_suffix(".exe").unwrap_or(&name);
    stem.ends_with("java") || stem.ends_with("javaw")
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaPathRecord {
    #[serde(default, with = "java_path_field")]
    pub path: Option<PathBuf>,
}

impl Record for JavaPathRecord {
    const COLLECTION: &'static str = "java-path";
}

/// `path` is stored as `false` when no override is set.
mod java_path_field {
    use super::*;

    pub fn serialize<S: Serializer>(path: &Option<PathBuf>, s: S) -> Result<S::Ok, S::Error> {
        match path {
            Some(path) => path.serialize(s),
            None => s.serialize_bool(false),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<PathBuf>, D::Error> {
        match Value::deserialize(d)? {
            Value::String(s) if !s.trim().is_empty() => Ok(Some(PathBuf::from(s))),
            Value::String(_) | Value::Bool(_) | Value::Null => Ok(None),
            other => Err(de::Error::custom(format!("unexpected java path {other}"))),
        }
    }
}

// ── JVM arguments ───────────────────────────────────────

/// Extra JVM arguments with the reserved tokens removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JvmArgs(Vec<String>);

impl JvmArgs {
    /// Split free-form input on whitespace.
    pub fn parse(input: &str) -> Self {
        Self::from_tokens(input.split_whitespace())
    }

    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            tokens
                .into_iter()
                .map(|t| t.as_ref().trim().to_string())
                .filter(|t| !t.is_empty() && !RESERVED_JVM_TOKENS.contains(&t.as_str()))
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for JvmArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" "))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JvmArgsRecord {
    #[serde(default)]
    pub args: Vec<String>,
}

impl Record for JvmArgsRecord {
    const COLLECTION: &'static str = "java-args";
}

impl JvmArgsRecord {
    pub fn jvm_args(&self) -> JvmArgs {
        JvmArgs::from_tokens(&self.args)
    }
}

impl From<&JvmArgs> for JvmArgsRecord {
    fn from(args: &JvmArgs) -> Self {
        Self {
            args: args.0.clone(),
        }
    }
}

// ── Resolution ──────────────────────────────────────────

/// Game window size: left to the engine, or an explicit pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Resolution {
    Auto,
    Fixed { width: u32, height: u32 },
}

impl Resolution {
    pub fn fixed(width: u32, height: u32) -> LauncherResult<Self> {
        if width == 0 || height == 0 {
            return Err(LauncherError::LaunchValidation(format!(
                "invalid resolution {width}x{height}"
            )));
        }
        Ok(Resolution::Fixed { width, height })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredScreen {
    #[serde(deserialize_with = "string_or_number")]
    pub width: String,
    #[serde(deserialize_with = "string_or_number")]
    pub height: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenRecord {
    pub screen: StoredScreen,
}

impl Default for ScreenRecord {
    fn default() -> Self {
        Self {
            screen: StoredScreen {
                width: "1280".into(),
                height: "720".into(),
            },
        }
    }
}

impl Record for ScreenRecord {
    const COLLECTION: &'static str = "screen";
}

impl ScreenRecord {
    pub fn resolution(&self) -> LauncherResult<Resolution> {
        if self.screen.width.trim() == AUTO_RESOLUTION {
            return Ok(Resolution::Auto);
        }
        let parse = |raw: &str| {
            raw.trim().parse::<u32>().map_err(|_| {
                LauncherError::LaunchValidation(format!("invalid screen dimension {raw:?}"))
            })
        };
        Resolution::fixed(parse(&self.screen.width)?, parse(&self.screen.height)?)
    }
}

impl From<Resolution> for ScreenRecord {
    fn from(resolution: Resolution) -> Self {
        let (width, height) = match resolution {
            Resolution::Auto => (AUTO_RESOLUTION.to_string(), AUTO_RESOLUTION.to_string()),
            Resolution::Fixed { width, height } => (width.to_string(), height.to_string()),
        };
        Self {
            screen: StoredScreen { width, height },
        }
    }
}

// ── Close policy ────────────────────────────────────────

/// What happens to the launcher window around a running game.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClosePolicy {
    /// Hide the launcher while the game runs, show it again on exit.
    #[default]
    #[serde(rename = "close-launcher")]
    CloseLauncher,
    /// Keep the game attached so closing the launcher ends both.
    #[serde(rename = "close-all")]
    CloseAll,
    #[serde(rename = "open-launcher", alias = "stay-open")]
    StayOpen,
}

impl ClosePolicy {
    /// Whether the game process outlives the launcher.
    pub fn detached(self) -> bool {
        !matches!(self, ClosePolicy::CloseAll)
    }

    pub fn hides_window(self) -> bool {
        matches!(self, ClosePolicy::CloseLauncher)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherBehaviour {
    #[serde(default)]
    pub close: ClosePolicy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LauncherRecord {
    #[serde(default)]
    pub launcher: LauncherBehaviour,
}

impl Record for LauncherRecord {
    const COLLECTION: &'static str = "launcher";
}

impl LauncherRecord {
    pub fn with_policy(close: ClosePolicy) -> Self {
        Self {
            launcher: LauncherBehaviour { close },
        }
    }
}

// ── Selected account ────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedAccountRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
}

impl Record for SelectedAccountRecord {
    const COLLECTION: &'static str = "accounts-selected";
}
