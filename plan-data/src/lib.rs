mod loader;

pub use loader::{SnapshotLoadError, SnapshotLoader};
