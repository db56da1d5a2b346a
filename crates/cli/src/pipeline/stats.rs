//! Pipeline statistics and summary output.

use std::time::Duration;

use observability::StatsSnapshot;
use serde::{Serialize, Serializer};

/// Statistics from a pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineStats {
    /// Pipeline name
    pub pipeline: String,

    /// Number of stages
    pub stages: usize,

    /// Items discarded at the terminal conduit
    pub drained: u64,

    /// Results collected by the aggregate stage
    pub collected: usize,

    /// Total duration of the pipeline run
    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,

    /// Per-stage counters
    pub counters: StatsSnapshot,
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(duration.as_secs_f64() * 1000.0)
}

impl PipelineStats {
    /// Items per second at the terminal conduit
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.drained as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Pipeline Statistics ===\n");

        println!("Overview");
        println!("   ├─ Pipeline: {}", self.pipeline);
        println!("   ├─ Stages: {}", self.stages);
        println!("   ├─ Duration: {:.2}ms", self.duration.as_secs_f64() * 1000.0);
        println!("   ├─ Results collected: {}", self.collected);
        println!("   ├─ Items drained: {}", self.drained);
        println!("   └─ Throughput: {:.2} items/s", self.throughput());

        if !self.counters.is_empty() {
            println!("\nStage Counters");
            let last = self.counters.counters.len() - 1;
            for (i, (name, value)) in self.counters.counters.iter().enumerate() {
                let branch = if i == last { "└─" } else { "├─" };
                println!("   {} {}: {}", branch, name, value);
            }
        }

        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(duration: Duration) -> PipelineStats {
        PipelineStats {
            pipeline: "test".into(),
            stages: 5,
            drained: 6,
            collected: 6,
            duration,
            counters: StatsSnapshot::default(),
        }
    }

    #[test]
    fn test_throughput() {
        assert_eq!(stats(Duration::ZERO).throughput(), 0.0);
        assert_eq!(stats(Duration::from_secs(2)).throughput(), 3.0);
    }

    #[test]
    fn test_json_uses_millis() {
        let json = serde_json::to_value(stats(Duration::from_millis(1500))).unwrap();
        assert_eq!(json["duration_ms"], 1500.0);
        assert_eq!(json["drained"], 6);
    }
}
