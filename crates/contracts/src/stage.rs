//! Stage trait - the contract every pipeline stage satisfies
//!
//! The engine composes stages without knowing what they do; all it relies on is
//! this trait.

use crate::{Inlet, Outlet};

/// Pipeline stage
///
/// A stage is invoked exactly once per run with one input and one output conduit.
///
/// Contract:
/// - read `input` until it yields `None` before returning
/// - write zero or more items to `output`, per input item or buffered
/// - never close `output`; the engine closes it once `run` returns
///
/// Returning while `input` still has pending items is a contract violation the
/// engine does not detect.
#[trait_variant::make(Stage: Send)]
pub trait LocalStage {
    /// Item type read from the upstream conduit
    type Input;

    /// Item type written to the downstream conduit
    type Output;

    /// Stage name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Consume `input` until exhausted, producing into `output`
    async fn run(&mut self, input: Inlet<Self::Input>, output: Outlet<Self::Output>);
}
