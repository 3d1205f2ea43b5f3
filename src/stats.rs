use log::info;
use std::time::{Duration, Instant};

/// Counts and phase timings of a single bridge cycle.
///
/// Returned by [`crate::BridgeProcessor::processing_after_callback`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BridgeStats {
    /// Registered bridge candidates.
    pub bridges: usize,
    /// Objects that got a scan record.
    pub objects: usize,
    /// Colors created, pass-through colors included.
    pub colors: usize,
    /// References into opaque classes that were skipped.
    pub ignored: usize,
    /// SCCs handed to the embedder.
    pub sccs: usize,
    /// Edges handed to the embedder.
    pub xrefs: usize,

    pub setup_time: Duration,
    pub tarjan_time: Duration,
    pub scc_setup_time: Duration,
    pub gather_xref_time: Duration,
    pub xref_setup_time: Duration,
    pub cleanup_time: Duration,
}

impl BridgeStats {
    pub fn total_time(&self) -> Duration {
        self.setup_time
            + self.tarjan_time
            + self.scc_setup_time
            + self.gather_xref_time
            + self.xref_setup_time
            + self.cleanup_time
    }

    pub fn log_summary(&self) {
        info!(
            target: "tarjan_bridge",
            "GC_TAR_BRIDGE bridges {} objects {} colors {} ignored {} sccs {} xref {} setup {:.2}ms tarjan {:.2}ms scc-setup {:.2}ms gather-xref {:.2}ms xref-setup {:.2}ms cleanup {:.2}ms",
            self.bridges,
            self.objects,
            self.colors,
            self.ignored,
            self.sccs,
            self.xrefs,
            millis(self.setup_time),
            millis(self.tarjan_time),
            millis(self.scc_setup_time),
            millis(self.gather_xref_time),
            millis(self.xref_setup_time),
            millis(self.cleanup_time),
        );
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Running totals over every cycle a processor has completed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BridgeMetrics {
    /// Cycles that had at least one registered bridge.
    pub cycles: u64,
    /// Average time of the tarjan phase in microseconds.
    pub tarjan_avg_time: u64,
    /// Largest number of objects visited in a single cycle.
    pub max_objects: usize,
    pub total_sccs: u64,
    pub total_xrefs: u64,
}

impl BridgeMetrics {
    pub fn record(&mut self, stats: &BridgeStats) {
        if stats.bridges == 0 {
            return;
        }

        self.cycles += 1;
        self.tarjan_avg_time = update_avg_u64(
            self.tarjan_avg_time,
            stats.tarjan_time.as_micros() as u64,
            self.cycles,
        );
        self.max_objects = self.max_objects.max(stats.objects);
        self.total_sccs += stats.sccs as u64;
        self.total_xrefs += stats.xrefs as u64;
    }
}

pub fn update_avg_u64(avg: u64, new_value: u64, sample_size: u64) -> u64 {
    let update = new_value.abs_diff(avg) / sample_size;

    if avg > new_value {
        avg - update
    } else {
        avg + update
    }
}

/// Phase clock, every step returns the time since the previous one.
pub struct StepTimer {
    last: Instant,
}

impl StepTimer {
    pub fn start() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    pub fn step(&mut self) -> Duration {
        let now = Instant::now();
        let diff = now.duration_since(self.last);

        self.last = now;
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn running_average() {
        let mut avg = 0;

        avg = update_avg_u64(avg, 10, 1);
        assert_eq!(avg, 10);

        avg = update_avg_u64(avg, 20, 2);
        assert_eq!(avg, 15);

        avg = update_avg_u64(avg, 6, 3);
        assert_eq!(avg, 12);
    }

    #[test]
    fn empty_cycles_are_not_recorded() {
        let mut metrics = BridgeMetrics::default();

        metrics.record(&BridgeStats::default());

        assert_eq!(metrics.cycles, 0);
    }

    #[test]
    fn record_accumulates() {
        let mut metrics = BridgeMetrics::default();
        let stats = BridgeStats {
            bridges: 2,
            objects: 7,
            sccs: 2,
            xrefs: 1,
            ..Default::default()
        };

        metrics.record(&stats);
        metrics.record(&BridgeStats {
            objects: 3,
            ..stats.clone()
        });

        assert_eq!(metrics.cycles, 2);
        assert_eq!(metrics.max_objects, 7);
        assert_eq!(metrics.total_sccs, 4);
        assert_eq!(metrics.total_xrefs, 2);
    }

    #[test]
    fn total_time_sums_phases() {
        let stats = BridgeStats {
            setup_time: Duration::from_millis(1),
            tarjan_time: Duration::from_millis(2),
            cleanup_time: Duration::from_millis(3),
            ..Default::default()
        };

        assert_eq!(stats.total_time(), Duration::from_millis(6));
    }

    #[test]
    fn step_timer_is_monotonic() {
        let mut timer = StepTimer::start();
        let a = timer.step();
        let b = timer.step();

        assert!(a >= Duration::ZERO);
        assert!(b >= Duration::ZERO);
    }
}
