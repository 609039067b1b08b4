//! Search statistics tracking.

use std::time::Instant;

use log::debug;

/// Counters for one bot invocation.
#[derive(Debug, Default, Clone)]
pub struct SearchStats {
    /// Calls to the placement rating function
    pub placements_rated: u64,

    /// Calls to the move rating function, at any depth
    pub moves_rated: u64,

    /// Moves tentatively applied to look at their follow-ups
    pub follow_ups: u64,

    /// Quick junction checks performed
    pub junction_checks: u64,

    /// Flood fills run, by junction checks or the root direction bonus
    pub flood_fills: u64,

    /// Deepest recursion level reached
    pub max_depth: u32,

    start_time: Option<Instant>,
}

impl SearchStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    #[inline]
    pub fn record_depth(&mut self, depth: u32) {
        self.max_depth = self.max_depth.max(depth);
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start_time.map(|s| s.elapsed().as_secs_f64()).unwrap_or(0.0)
    }

    /// Dump the counters through the log at debug level.
    pub fn log_summary(&self) {
        debug!(
            "search finished in {:.3}s: placements={} moves={} follow_ups={} junction_checks={} flood_fills={} depth={}",
            self.elapsed_secs(),
            self.placements_rated,
            self.moves_rated,
            self.follow_ups,
            self.junction_checks,
            self.flood_fills,
            self.max_depth,
        );
    }
}
