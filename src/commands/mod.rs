pub mod ask;
pub mod eval;
pub mod index;
pub mod search;
pub mod status;
pub mod validate;
pub mod verse;

use std::path::PathBuf;

pub const DEFAULT_INDEX_PATH: &str = "gita_index.db";
pub const DEFAULT_DATASET_PATH: &str = "gita_dataset.json";

/// Resolve the index and dataset paths from optional CLI overrides.
pub fn resolve_paths(db: Option<PathBuf>, dataset: Option<PathBuf>) -> (PathBuf, PathBuf) {
    (
        db.unwrap_or_else(|| PathBuf::from(DEFAULT_INDEX_PATH)),
        dataset.unwrap_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH)),
    )
}
