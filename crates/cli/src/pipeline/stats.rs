//! Statistics of a routing run.

use std::time::Duration;

use contracts::DispatchStrategy;
use dispatcher::{ConsumerReport, DispatchSnapshot};
use observability::LatencySummary;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    pub strategy: DispatchStrategy,

    /// Lines read from the input
    pub records_read: u64,

    /// Dispatches that failed without cancelling the run
    pub dispatch_failures: u64,

    /// The run was stopped by Ctrl+C, SIGTERM or the timeout
    pub cancelled: bool,

    /// Poison reached every channel
    pub poison_sent: bool,

    /// Routing outcome counters (content_based only)
    pub dispatch: Option<DispatchSnapshot>,

    /// One report per consumer, in configuration order
    pub consumers: Vec<ConsumerReport>,

    /// Per-record dispatch latency
    pub latency: LatencySummary,

    pub duration: Duration,
}

impl PipelineStats {
    /// Records read per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records_read as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Records written by all consumers together
    pub fn records_written(&self) -> u64 {
        self.consumers.iter().map(|c| c.written).sum()
    }

    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Routing Statistics                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📊 Overview");
        println!("   ├─ Strategy: {:?}", self.strategy);
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Records read: {}", self.records_read);
        println!("   ├─ Records written: {}", self.records_written());
        println!("   ├─ Throughput: {:.2} records/s", self.throughput());
        println!("   ├─ Dispatch latency: {}", self.latency);
        println!("   ├─ Dispatch failures: {}", self.dispatch_failures);
        if self.cancelled {
            println!("   └─ Outcome: cancelled");
        } else if self.poison_sent {
            println!("   └─ Outcome: completed");
        } else {
            println!("   └─ Outcome: poison not delivered");
        }

        if let Some(snapshot) = &self.dispatch {
            println!("\n🔀 Routing");
            println!("   ├─ Matched a route: {}", snapshot.routed_count);
            println!("   ├─ Default channel: {}", snapshot.defaulted_count);
            println!("   └─ Dropped (no match): {}", snapshot.dropped_count);
        }

        if !self.consumers.is_empty() {
            println!("\n📤 Consumers ({})", self.consumers.len());
            for (i, report) in self.consumers.iter().enumerate() {
                let prefix = if i == self.consumers.len() - 1 {
                    "└─"
                } else {
                    "├─"
                };
                println!(
                    "   {} {}: {} written, {} failed{}",
                    prefix,
                    report.name,
                    report.written,
                    report.failures,
                    if report.poisoned { "" } else { " (no poison)" }
                );
            }
        }

        println!();
    }
}
