//! # Spam Stages
//!
//! The spam-check stages and their assembly into a pipeline.
//!
//! Stage chain:
//! `seed_emails → derive_user → expand_messages → classify_spam → aggregate_results`
//!
//! Every stage counts what it processed in a shared [`StatsRegistry`] under the
//! names in [`counters`].

pub mod counters;
pub mod stages;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use contracts::PipelineSettings;
use observability::StatsRegistry;
use pipeline_engine::Pipeline;

pub use stages::{
    user_id, AggregateResults, ClassifySpam, DeriveUser, ExpandMessages, SeedEmails,
};

/// Assembled spam-check pipeline
pub struct SpamCheck {
    /// Seeded five-stage pipeline, ready to run
    pub pipeline: Pipeline<(), String>,
    /// Results collected by the aggregate stage
    pub collected: Arc<AtomicUsize>,
}

/// The four processing stages after `String` emails, without a seed
///
/// Useful when emails are fed through the pipeline's input conduit instead.
pub fn processing_pipeline(
    settings: &PipelineSettings,
    stats: Arc<StatsRegistry>,
) -> (Pipeline<String, String>, Arc<AtomicUsize>) {
    let aggregate = AggregateResults::new(Arc::clone(&stats));
    let collected = aggregate.collected();

    let pipeline = Pipeline::<String>::new(settings.engine.clone())
        .stage(DeriveUser::new(Arc::clone(&stats)))
        .stage(ExpandMessages::new(
            Arc::clone(&stats),
            settings.stages.messages_per_user,
        ))
        .stage(ClassifySpam::new(stats))
        .stage(aggregate);

    (pipeline, collected)
}

/// Seed stage followed by the four processing stages
pub fn spam_check_pipeline(settings: &PipelineSettings, stats: Arc<StatsRegistry>) -> SpamCheck {
    let aggregate = AggregateResults::new(Arc::clone(&stats));
    let collected = aggregate.collected();

    let pipeline = Pipeline::<()>::new(settings.engine.clone())
        .stage(SeedEmails::new(settings.seed.emails.clone()))
        .stage(DeriveUser::new(Arc::clone(&stats)))
        .stage(ExpandMessages::new(
            Arc::clone(&stats),
            settings.stages.messages_per_user,
        ))
        .stage(ClassifySpam::new(stats))
        .stage(aggregate);

    SpamCheck {
        pipeline,
        collected,
    }
}
