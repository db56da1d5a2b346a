//! # Integration Tests
//!
//! End-to-end tests across crates.
//!
//! Covers:
//! - the full spam-check pipeline driven from configuration
//! - counter accuracy across concurrent and repeated runs
//! - completion with empty, filtered and failing pipelines

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{EngineSettings, PipelineSettings};
    use observability::StatsRegistry;
    use pipeline_engine::{
        FlatMapStage, IterSource, MapStage, Pipeline, PipelineError, PipelineState,
    };
    use spam_stages::{counters, processing_pipeline, spam_check_pipeline};

    fn settings_from_toml(toml: &str) -> PipelineSettings {
        ConfigLoader::load_from_str(toml, ConfigFormat::Toml).unwrap()
    }

    /// End-to-end test: config -> seed -> derive -> expand -> classify -> aggregate
    #[tokio::test]
    async fn test_e2e_two_emails_from_config() {
        let settings = settings_from_toml(
            r#"
            [engine]
            name = "spam-check"

            [seed]
            emails = ["alice@example.com", "bob@example.com"]
            "#,
        );
        let stats = Arc::new(counters::registry());
        let check = spam_check_pipeline(&settings, Arc::clone(&stats));

        let report = check.pipeline.try_run().await.unwrap();

        assert_eq!(report.pipeline, "spam-check");
        assert_eq!(report.stages, 5);
        assert_eq!(report.drained, 6);
        assert_eq!(check.collected.load(Ordering::Relaxed), 6);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.get(counters::DERIVE_USER), 2);
        assert_eq!(snapshot.get(counters::EXPAND_USERS), 2);
        assert_eq!(snapshot.get(counters::EXPAND_MESSAGES), 6);
        assert_eq!(snapshot.get(counters::CLASSIFY_SPAM), 6);
        assert_eq!(snapshot.get(counters::AGGREGATE_RESULTS), 6);
    }

    #[tokio::test]
    async fn test_empty_input_leaves_counters_at_zero() {
        let stats = Arc::new(counters::registry());
        let (pipeline, collected) =
            processing_pipeline(&PipelineSettings::default(), Arc::clone(&stats));

        let report = tokio::time::timeout(
            Duration::from_secs(5),
            pipeline.run_with_input(Vec::<String>::new()),
        )
        .await
        .expect("empty pipeline should finish promptly");

        assert_eq!(report.drained, 0);
        assert_eq!(collected.load(Ordering::Relaxed), 0);
        assert_eq!(stats.snapshot().total(), 0);
    }

    #[tokio::test]
    async fn test_total_filter_still_terminates() {
        let report = Pipeline::<u32>::new(EngineSettings::named("filter"))
            .stage(FlatMapStage::new("drop_all", |_: u32| None::<u32>))
            .stage(MapStage::new("double", |n: u32| n * 2))
            .run_with_input(0..100)
            .await;

        assert_eq!(report.drained, 0);
    }

    #[tokio::test]
    async fn test_two_runs_share_one_registry() {
        let stats = Arc::new(counters::registry());
        let mut settings = PipelineSettings::default();
        settings.seed.emails = vec!["a@x.io".into()];

        for _ in 0..2 {
            spam_check_pipeline(&settings, Arc::clone(&stats))
                .pipeline
                .run()
                .await;
        }

        assert_eq!(stats.get(counters::DERIVE_USER), Some(2));
        assert_eq!(stats.get(counters::EXPAND_MESSAGES), Some(6));
        assert_eq!(stats.get(counters::AGGREGATE_RESULTS), Some(6));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_runs_count_exactly() {
        let stats = Arc::new(counters::registry());
        let mut settings = PipelineSettings::default();
        settings.engine.conduit_capacity = 4;
        settings.seed.emails = (0..25).map(|i| format!("user{i}@x.io")).collect();

        let runs: Vec<_> = (0..4)
            .map(|_| {
                let check = spam_check_pipeline(&settings, Arc::clone(&stats));
                tokio::spawn(check.pipeline.try_run())
            })
            .collect();

        for run in runs {
            let report = run.await.unwrap().unwrap();
            assert_eq!(report.drained, 75);
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.get(counters::DERIVE_USER), 100);
        assert_eq!(snapshot.get(counters::EXPAND_USERS), 100);
        assert_eq!(snapshot.get(counters::EXPAND_MESSAGES), 300);
        assert_eq!(snapshot.get(counters::CLASSIFY_SPAM), 300);
        assert_eq!(snapshot.get(counters::AGGREGATE_RESULTS), 300);
    }

    #[tokio::test]
    async fn test_generic_stages_with_registry() {
        let stats = Arc::new(StatsRegistry::new(["seen"]));
        let probe = Arc::clone(&stats);

        let report = Pipeline::<()>::new(EngineSettings::named("generic"))
            .stage(IterSource::new("numbers", 1..=10u64))
            .stage(MapStage::new("count", move |n: u64| {
                probe.increment("seen");
                n
            }))
            .stage(FlatMapStage::new("evens", |n: u64| {
                (n % 2 == 0).then_some(n)
            }))
            .try_run()
            .await
            .unwrap();

        assert_eq!(report.drained, 5);
        assert_eq!(stats.get("seen"), Some(10));
    }

    #[tokio::test]
    async fn test_handle_reports_complete_after_wait() {
        let handle = Pipeline::<u32>::new(EngineSettings::named("handle"))
            .stage(MapStage::new("inc", |n: u32| n + 1))
            .start();
        assert_eq!(handle.state(), PipelineState::Running);
        let watch = handle.watch();

        let input = handle.input();
        for n in 0..3 {
            input.send(n).await.unwrap();
        }
        handle.close_input();

        let report = handle.wait().await;
        assert_eq!(report.drained, 3);
        assert_eq!(report.state, PipelineState::Complete);
        assert_eq!(watch.current(), PipelineState::Complete);
    }

    #[tokio::test]
    async fn test_panicking_stage_reported_by_try_run() {
        let stats = Arc::new(counters::registry());
        let mut settings = PipelineSettings::default();
        settings.seed.emails = vec!["a@x.io".into(), "b@x.io".into()];
        let (processing, _) = processing_pipeline(&settings, stats);

        let run = processing
            .stage(MapStage::new("reject", |_: String| -> String {
                panic!("rejected verdict")
            }))
            .run_with_input(settings.seed.emails.clone());

        let result = tokio::spawn(run).await;
        assert!(result.is_err(), "run_with_input must resume the panic");

        let stats = Arc::new(counters::registry());
        let (processing, _) = processing_pipeline(&settings, stats);
        let handle = processing
            .stage(MapStage::new("reject", |_: String| -> String {
                panic!("rejected verdict")
            }))
            .start();
        let _feeder = handle.feed(settings.seed.emails.clone());

        match handle.try_wait().await {
            Err(PipelineError::StagePanicked {
                index,
                stage,
                message,
            }) => {
                assert_eq!(index, 5);
                assert_eq!(stage, "reject");
                assert!(message.contains("rejected verdict"));
            }
            other => panic!("expected StagePanicked, got {other:?}"),
        }
    }
}
