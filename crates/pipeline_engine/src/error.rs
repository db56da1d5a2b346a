//! Engine error types

use std::any::Any;

use thiserror::Error;
use tokio::task::JoinError;

/// Failure surfaced by the opt-in supervised entry points (`try_run`, `try_wait`)
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A stage panicked
    #[error("stage {index} '{stage}' panicked: {message}")]
    StagePanicked {
        /// 1-based stage position
        index: usize,
        stage: String,
        message: String,
    },

    /// An engine task was cancelled before finishing
    #[error("task '{task}' aborted: {message}")]
    TaskAborted { task: String, message: String },
}

/// First task failure observed during a run
#[derive(Debug)]
pub(crate) struct TaskFailure {
    /// 1-based stage position, 0 for engine-internal tasks
    pub(crate) index: usize,
    pub(crate) task: String,
    pub(crate) cause: JoinError,
}

impl TaskFailure {
    pub(crate) fn new(index: usize, task: impl Into<String>, cause: JoinError) -> Self {
        Self {
            index,
            task: task.into(),
            cause,
        }
    }

    /// Re-raise the failure on the current thread
    pub(crate) fn resume(self) -> ! {
        if self.cause.is_panic() {
            std::panic::resume_unwind(self.cause.into_panic());
        }
        panic!("pipeline task '{}' aborted: {}", self.task, self.cause);
    }
}

impl From<TaskFailure> for PipelineError {
    fn from(failure: TaskFailure) -> Self {
        if failure.cause.is_panic() {
            let payload = failure.cause.into_panic();
            let message = panic_message(&*payload);
            if failure.index > 0 {
                return Self::StagePanicked {
                    index: failure.index,
                    stage: failure.task,
                    message,
                };
            }
            return Self::TaskAborted {
                task: failure.task,
                message,
            };
        }
        Self::TaskAborted {
            message: failure.cause.to_string(),
            task: failure.task,
        }
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        let static_str: Box<dyn Any + Send> = Box::new("boom");
        let owned: Box<dyn Any + Send> = Box::new(String::from("bang"));
        let other: Box<dyn Any + Send> = Box::new(7u32);

        assert_eq!(panic_message(&*static_str), "boom");
        assert_eq!(panic_message(&*owned), "bang");
        assert_eq!(panic_message(&*other), "non-string panic payload");
    }

    #[test]
    fn test_display() {
        let err = PipelineError::StagePanicked {
            index: 2,
            stage: "classify".into(),
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "stage 2 'classify' panicked: boom");
    }
}
