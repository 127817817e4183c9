mod config;
mod debug_log;
mod metric;
mod multi;
mod persist;
mod probe;
pub mod registry;
pub mod runner;
mod tvm;

pub use config::*;
pub use debug_log::*;
pub use metric::*;
pub use multi::*;
pub use persist::*;
pub use probe::*;
pub use runner::ScoredLearner;
pub use tvm::TvmOptimizer;
