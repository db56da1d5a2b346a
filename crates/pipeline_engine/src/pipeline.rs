//! Pipeline builder and conduit wiring

use std::sync::Arc;
use std::time::Instant;

use contracts::{Closer, Conduit, EngineSettings, Inlet, Stage};
use observability::{record_run_started, record_stage_finished};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, info_span, trace, Instrument};

use crate::error::{PipelineError, TaskFailure};
use crate::handle::{PipelineHandle, RunReport};
use crate::state::{PipelineState, StateCell};

type Wire<I, O> = Box<dyn FnOnce(Inlet<I>, &mut Wiring) -> Inlet<O> + Send>;

/// Linear chain of stages from input type `I` to output type `O`
///
/// Each [`stage`](Self::stage) call appends one stage and changes the output
/// type, so adjacent stages are type-checked at compile time. Nothing runs
/// until the pipeline is started; starting consumes it.
///
/// # Example
///
/// ```ignore
/// let pipeline = Pipeline::<String>::new(EngineSettings::named("spam-check"))
///     .stage(DeriveUser::new(stats.clone()))
///     .stage(ExpandMessages::new(stats.clone(), 3));
///
/// pipeline.run().await;
/// ```
pub struct Pipeline<I, O = I> {
    settings: EngineSettings,
    stage_names: Vec<String>,
    wire: Wire<I, O>,
}

impl<I: Send + 'static> Pipeline<I, I> {
    /// Empty pipeline; running it as-is completes immediately
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            stage_names: Vec::new(),
            wire: Box::new(|inlet, _| inlet),
        }
    }
}

impl<I, O> Pipeline<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Append a stage reading this pipeline's current output
    pub fn stage<S>(self, stage: S) -> Pipeline<I, S::Output>
    where
        S: Stage<Input = O> + 'static,
        S::Output: Send + 'static,
    {
        let Self {
            settings,
            mut stage_names,
            wire,
        } = self;
        stage_names.push(stage.name().to_string());

        Pipeline {
            settings,
            stage_names,
            wire: Box::new(move |inlet, wiring| {
                let upstream = wire(inlet, wiring);
                wiring.launch(stage, upstream)
            }),
        }
    }

    /// Number of stages appended so far
    pub fn stage_count(&self) -> usize {
        self.stage_names.len()
    }

    /// Stage names in pipeline order
    pub fn stage_names(&self) -> &[String] {
        &self.stage_names
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Launch every task and return without waiting
    ///
    /// Allocates N+1 conduits, spawns one task per stage, one drain task on
    /// the terminal conduit and one completion task that closes the input
    /// conduit after every stage finished.
    ///
    /// Must be called within a Tokio runtime.
    pub fn start(self) -> PipelineHandle<I> {
        let Self {
            settings,
            stage_names,
            wire,
        } = self;
        let started = Instant::now();
        let name: Arc<str> = Arc::from(settings.name.as_str());
        let state = Arc::new(StateCell::default());

        let span = info_span!("pipeline_run", pipeline = %name, stages = stage_names.len());
        let _entered = span.enter();

        let entry = Conduit::new(settings.conduit_capacity);
        let feed = entry.outlet();
        let entry_closer = entry.closer();
        let first = entry.inlet();
        drop(entry);

        let mut wiring = Wiring::new(Arc::clone(&name), settings.conduit_capacity);
        let terminal = wire(first, &mut wiring);
        let Wiring {
            tasks, conduits, ..
        } = wiring;

        // Input conduit doubles as the terminal conduit; nothing may pass through it.
        if tasks.is_empty() && entry_closer.close() {
            debug!("No stages, input conduit closed at start");
        }

        let drain = tokio::spawn(drain_terminal(terminal).in_current_span());
        let completion = tokio::spawn(
            await_stages(
                Arc::clone(&name),
                tasks,
                entry_closer.clone(),
                Arc::clone(&state),
            )
            .in_current_span(),
        );
        state.advance(PipelineState::Running);

        record_run_started(&name, stage_names.len());
        info!(
            stages = stage_names.len(),
            conduits,
            capacity = settings.conduit_capacity,
            "Pipeline running"
        );

        PipelineHandle::new(
            name,
            stage_names.len(),
            conduits,
            feed,
            entry_closer,
            drain,
            completion,
            state,
            started,
        )
    }

    /// Run to completion
    ///
    /// Blocks until every item reached the terminal conduit and every stage
    /// finished. A panicking stage is not isolated: the panic is resumed here.
    ///
    /// Nothing is ever written to the input conduit, and it is only closed
    /// after every stage returned. The first stage must therefore be a source
    /// that ignores its input; a first stage that reads its input waits
    /// forever. Use [`run_with_input`](Self::run_with_input) or
    /// [`start`](Self::start) to feed the input conduit instead.
    pub async fn run(self) {
        self.start().wait().await;
    }

    /// Feed `items` into the input conduit, close it, and run to completion
    pub async fn run_with_input<It>(self, items: It) -> RunReport
    where
        It: IntoIterator<Item = I>,
        It::IntoIter: Send + 'static,
    {
        let handle = self.start();
        let _feeder = handle.feed(items);
        handle.wait().await
    }

    /// Run to completion, reporting a stage panic as an error instead of
    /// resuming it
    pub async fn try_run(self) -> Result<RunReport, PipelineError> {
        self.start().try_wait().await
    }
}

/// Stage task spawned by the engine
pub(crate) struct StageTask {
    index: usize,
    name: String,
    handle: JoinHandle<()>,
}

/// Accumulates stage tasks while the chain is wired
struct Wiring {
    pipeline: Arc<str>,
    capacity: usize,
    /// Conduits allocated so far, including the input conduit
    conduits: usize,
    tasks: Vec<StageTask>,
}

impl Wiring {
    fn new(pipeline: Arc<str>, capacity: usize) -> Self {
        Self {
            pipeline,
            capacity,
            conduits: 1,
            tasks: Vec::new(),
        }
    }

    /// Allocate the stage's output conduit and spawn the stage on it
    fn launch<S>(&mut self, mut stage: S, input: Inlet<S::Input>) -> Inlet<S::Output>
    where
        S: Stage + 'static,
        S::Input: Send + 'static,
        S::Output: Send + 'static,
    {
        let index = self.tasks.len() + 1;
        let name = stage.name().to_string();

        let conduit = Conduit::new(self.capacity);
        let output = conduit.outlet();
        let downstream = conduit.inlet();
        let guard = CloseOnExit(conduit.closer());
        drop(conduit);
        self.conduits += 1;

        let span = info_span!(
            "pipeline_stage",
            pipeline = %self.pipeline,
            stage = %name,
            index
        );
        let handle = tokio::spawn(
            async move {
                let _guard = guard;
                debug!("Stage started");
                stage.run(input, output).await;
                debug!("Stage finished");
            }
            .instrument(span),
        );

        self.tasks.push(StageTask {
            index,
            name,
            handle,
        });
        downstream
    }
}

/// Closes the stage's output conduit when the stage task ends, including by panic
struct CloseOnExit<T>(Closer<T>);

impl<T> Drop for CloseOnExit<T> {
    fn drop(&mut self) {
        if self.0.close() {
            trace!("Output conduit closed");
        }
    }
}

/// Read and discard the terminal conduit until it closes
async fn drain_terminal<T>(terminal: Inlet<T>) -> u64 {
    let mut drained = 0u64;
    while terminal.recv().await.is_some() {
        drained += 1;
    }
    debug!(drained, "Terminal conduit closed");
    drained
}

/// Join every stage task in order, then close the input conduit
async fn await_stages<I>(
    pipeline: Arc<str>,
    tasks: Vec<StageTask>,
    entry: Closer<I>,
    state: Arc<StateCell>,
) -> Option<TaskFailure> {
    let mut failure = None;

    for task in tasks {
        match task.handle.await {
            Ok(()) => record_stage_finished(&pipeline, &task.name, false),
            Err(err) => {
                record_stage_finished(&pipeline, &task.name, true);
                error!(stage = %task.name, index = task.index, error = %err, "Stage task failed");
                if failure.is_none() {
                    failure = Some(TaskFailure::new(task.index, task.name, err));
                }
            }
        }
    }

    state.advance(PipelineState::Draining);
    if entry.close() {
        debug!("Input conduit closed after all stages finished");
    }
    failure
}
