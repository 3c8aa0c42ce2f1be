//! Patch data - stored CC values per channel and their JSON file format

mod file;
mod store;

pub use file::{load_patch, save_patch, PatchFile};
pub use store::{ValueStore, DEFAULT_VALUE};
