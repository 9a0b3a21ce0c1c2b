// ─── Historion Launcher Core ───
// Backend for the Historion launcher: optional-mod reconciliation and the
// launch session pipeline.
//
// Architecture:
//   core/
//     settings/  Key-value store, typed records, java picker
//     auth/      Stored accounts + selection
//     mods/      Catalog client, state file, jar suffixes, reconciler
//     launch/    Profile, request builder, engine boundary, progress, controller
//     logging    Ring buffer feeding the console panel
//     system     Physical memory figures
//     state/     Application state wiring

pub mod auth;
pub mod error;
pub mod http;
pub mod launch;
pub mod logging;
pub mod mods;
pub mod paths;
pub mod settings;
pub mod state;
pub mod system;
