//! # Pipeline Engine
//!
//! Runs a linear chain of stages concurrently.
//!
//! Responsibilities:
//! - Allocate one conduit per stage boundary (N stages ⇒ N+1 conduits)
//! - Spawn every stage on Tokio and close its output once it returns
//! - Drain the terminal conduit so the last stage never blocks
//! - Close the input conduit once every stage finished
//! - Resume stage panics on the caller (`run`), or report them (`try_run`)
//!
//! ## Usage Example
//!
//! ```ignore
//! use pipeline_engine::{FlatMapStage, MapStage, Pipeline};
//! use contracts::EngineSettings;
//!
//! let report = Pipeline::<u32>::new(EngineSettings::named("numbers"))
//!     .stage(FlatMapStage::new("triple", |x: u32| vec![x; 3]))
//!     .stage(MapStage::new("label", |x: u32| format!("#{x}")))
//!     .run_with_input(0..10)
//!     .await;
//!
//! assert_eq!(report.drained, 30);
//! ```

mod error;
mod handle;
mod pipeline;
mod stages;
mod state;

// Re-exports
pub use contracts::{EngineSettings, Inlet, Outlet, Stage};
pub use error::PipelineError;
pub use handle::{PipelineHandle, RunReport};
pub use pipeline::Pipeline;
pub use stages::{FlatMapStage, IterSource, MapStage};
pub use state::{PipelineState, StateWatch};
