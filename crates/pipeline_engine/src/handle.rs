//! Handle to a running pipeline

use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{Closer, Outlet};
use observability::record_run_completed;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::{PipelineError, TaskFailure};
use crate::state::{PipelineState, StateCell, StateWatch};

/// Summary of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Pipeline name
    pub pipeline: String,
    /// Number of stages
    pub stages: usize,
    /// Number of conduits (stages + 1)
    pub conduits: usize,
    /// Items discarded by the drain task
    pub drained: u64,
    /// Wall time from start to completion
    pub elapsed: Duration,
    /// State when the report was taken, always [`PipelineState::Complete`]
    pub state: PipelineState,
}

/// Running pipeline
///
/// Returned by [`Pipeline::start`](crate::Pipeline::start). Gives access to the
/// input conduit for external feeding; the caller closes it when done.
pub struct PipelineHandle<I> {
    name: Arc<str>,
    stages: usize,
    conduits: usize,
    input: Outlet<I>,
    input_closer: Closer<I>,
    drain: JoinHandle<u64>,
    completion: JoinHandle<Option<TaskFailure>>,
    state: Arc<StateCell>,
    started: Instant,
}

impl<I: Send + 'static> PipelineHandle<I> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        name: Arc<str>,
        stages: usize,
        conduits: usize,
        input: Outlet<I>,
        input_closer: Closer<I>,
        drain: JoinHandle<u64>,
        completion: JoinHandle<Option<TaskFailure>>,
        state: Arc<StateCell>,
        started: Instant,
    ) -> Self {
        Self {
            name,
            stages,
            conduits,
            input,
            input_closer,
            drain,
            completion,
            state,
            started,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state
    pub fn state(&self) -> PipelineState {
        self.state.load()
    }

    /// State view that stays readable after the handle is consumed by `wait`
    pub fn watch(&self) -> StateWatch {
        StateWatch::new(Arc::clone(&self.state))
    }

    /// Write endpoint of the input conduit
    pub fn input(&self) -> Outlet<I> {
        self.input.clone()
    }

    /// Close the input conduit
    ///
    /// Returns `false` if it was already closed.
    pub fn close_input(&self) -> bool {
        self.input_closer.close()
    }

    /// Spawn a feeder that sends `items` into the input conduit and then closes it
    ///
    /// The feeder stops early if the input conduit closes first. Resolves to the
    /// number of items sent.
    pub fn feed<It>(&self, items: It) -> JoinHandle<u64>
    where
        It: IntoIterator<Item = I>,
        It::IntoIter: Send + 'static,
    {
        let items = items.into_iter();
        let input = self.input.clone();
        let closer = self.input_closer.clone();

        tokio::spawn(async move {
            let mut sent = 0u64;
            for item in items {
                if input.send(item).await.is_err() {
                    debug!(sent, "Input conduit closed before feed finished");
                    break;
                }
                sent += 1;
            }
            closer.close();
            sent
        })
    }

    /// Wait for completion
    ///
    /// Resumes the panic of the first failed stage, so a failing stage takes
    /// the caller down with it.
    pub async fn wait(self) -> RunReport {
        match self.join().await {
            Ok(report) => report,
            Err(failure) => failure.resume(),
        }
    }

    /// Wait for completion, turning a stage panic into [`PipelineError`]
    pub async fn try_wait(self) -> Result<RunReport, PipelineError> {
        self.join().await.map_err(PipelineError::from)
    }

    async fn join(self) -> Result<RunReport, TaskFailure> {
        let Self {
            name,
            stages,
            conduits,
            input,
            input_closer,
            drain,
            completion,
            state,
            started,
        } = self;
        drop(input);
        drop(input_closer);

        let drained = match drain.await {
            Ok(drained) => drained,
            Err(err) => return Err(TaskFailure::new(0, "drain", err)),
        };
        let failure = match completion.await {
            Ok(failure) => failure,
            Err(err) => Some(TaskFailure::new(0, "completion", err)),
        };
        state.advance(PipelineState::Complete);

        let elapsed = started.elapsed();
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        record_run_completed(&name, drained, elapsed_ms);

        if let Some(failure) = failure {
            return Err(failure);
        }

        info!(
            pipeline = %name,
            drained,
            elapsed_ms = format!("{elapsed_ms:.2}"),
            "Pipeline complete"
        );

        Ok(RunReport {
            pipeline: name.to_string(),
            stages,
            conduits,
            drained,
            elapsed,
            state: state.load(),
        })
    }
}
