//! Pipeline lifecycle state

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use tracing::trace;

/// Lifecycle of one pipeline run
///
/// Transitions only move forward: Building → Running → Draining → Complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum PipelineState {
    /// Conduits allocated, tasks not yet launched
    Building = 0,
    /// Stage, drain and completion tasks launched
    Running = 1,
    /// Every stage finished; the drain task may still hold trailing items
    Draining = 2,
    /// Terminal conduit closed and every task joined
    Complete = 3,
}

impl PipelineState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Building,
            1 => Self::Running,
            2 => Self::Draining,
            _ => Self::Complete,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Building => "building",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Complete => "complete",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared, forward-only state cell
#[derive(Debug, Default)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn load(&self) -> PipelineState {
        PipelineState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Move to `next` unless the run is already past it
    ///
    /// Returns whether the state changed.
    pub(crate) fn advance(&self, next: PipelineState) -> bool {
        let prev = self.0.fetch_max(next as u8, Ordering::AcqRel);
        let changed = prev < next as u8;
        if changed {
            trace!(from = %PipelineState::from_u8(prev), to = %next, "pipeline state changed");
        }
        changed
    }
}

/// Read-only view of a run's state that outlives its [`PipelineHandle`](crate::PipelineHandle)
#[derive(Debug, Clone)]
pub struct StateWatch(Arc<StateCell>);

impl StateWatch {
    pub(crate) fn new(cell: Arc<StateCell>) -> Self {
        Self(cell)
    }

    pub fn current(&self) -> PipelineState {
        self.0.load()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_building() {
        assert_eq!(StateCell::default().load(), PipelineState::Building);
    }

    #[test]
    fn test_never_moves_backwards() {
        let cell = StateCell::default();
        assert!(cell.advance(PipelineState::Draining));
        assert!(!cell.advance(PipelineState::Running));
        assert_eq!(cell.load(), PipelineState::Draining);
        assert!(cell.advance(PipelineState::Complete));
        assert!(!cell.advance(PipelineState::Complete));
    }

    #[test]
    fn test_watch_follows_cell() {
        let cell = Arc::new(StateCell::default());
        let watch = StateWatch::new(Arc::clone(&cell));
        cell.advance(PipelineState::Running);
        assert_eq!(watch.clone().current(), PipelineState::Running);
    }

    #[test]
    fn test_display() {
        assert_eq!(PipelineState::Running.to_string(), "running");
    }
}
