pub mod catalog;
pub mod files;
pub mod reconciler;
pub mod state;

pub use catalog::{CatalogClient, CatalogEntry, CatalogSource, ModCatalog, ModDetails};
pub use files::{DiskChange, FileStatus, ModFile, ModFileNaming};
pub use reconciler::{ModListing, ModReconciler};
pub use state::ModState;
