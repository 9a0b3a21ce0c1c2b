pub mod java;
pub mod records;
pub mod repository;
pub mod store;

pub use java::{choose_java_path, reset_java_path, FilePicker, JavaPathChoice};
pub use records::{
    ClosePolicy, JavaOverride, JavaPathRecord, JvmArgs, JvmArgsRecord, LauncherRecord,
    MemoryBounds, MemoryRecord, Record, Resolution, ScreenRecord, SelectedAccountRecord,
    AUTO_RESOLUTION, SINGLETON_ID,
};
pub use repository::{LaunchSettings, SettingsRepository};
pub use store::{JsonFileStore, MemoryStore, SettingsStore};
