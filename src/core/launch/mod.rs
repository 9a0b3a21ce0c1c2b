pub mod controller;
pub mod engine;
pub mod profile;
pub mod progress;
pub mod request;

pub use controller::{
    HostShell, LaunchController, LaunchPhase, LaunchUpdate, NoopShell, SessionHandle,
    SessionOutcome, ShellSignal,
};
pub use engine::{EngineEvent, EngineSession, LaunchEngine};
pub use profile::{LauncherProfile, LoaderDescriptor, LoaderType};
pub use progress::{
    format_eta, format_percent, format_speed, ProgressSnapshot, ProgressStage, ProgressTracker,
};
pub use request::{LaunchRequest, MemoryPair};
