//! Dataset loading, the per-problem driver, and result/summary reporting —
//! out-of-core-scope collaborators (spec §1, §6) that are nonetheless the
//! only consumer of the core engine's public API.

pub mod loader;
pub mod result;
pub mod runner;
pub mod summary;

pub use loader::{DatasetError, JsonlProblemLoader, ProblemLoader};
pub use result::{ResultRecord, RunDetail};
pub use runner::{run_dataset, DatasetRunConfig};
