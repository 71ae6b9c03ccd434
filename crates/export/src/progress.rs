use std::fmt;
use std::time::Duration;

use tileslicer_tileset::WrittenManifest;

/// Progress reported after every scheduler tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Tiles with a final outcome.
    pub done: usize,
    pub total: usize,
    pub label: String,
}

impl Progress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.done as f64 / self.total as f64
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.label, self.done, self.total)
    }
}

/// Per-outcome tile counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TileCounts {
    pub exported: usize,
    /// No object overlapped the tile.
    pub skipped: usize,
    /// Objects overlapped but the clip left no triangles.
    pub skipped_empty: usize,
    /// Exporter failed and the failure policy let the run continue.
    pub failed: usize,
}

impl TileCounts {
    pub fn visited(&self) -> usize {
        self.exported + self.skipped + self.skipped_empty + self.failed
    }
}

/// Final result of a completed export.
#[derive(Debug, Clone)]
pub struct ExportReport {
    pub name: String,
    pub counts: TileCounts,
    pub total: usize,
    pub manifest: WrittenManifest,
    /// Mean over every timed tile of the run.
    pub average_tile_time: Duration,
    /// Mean over the most recent tiles only.
    pub recent_tile_time: Duration,
    pub worst_tile_time: Duration,
    pub elapsed: Duration,
}

impl ExportReport {
    pub fn summary(&self) -> String {
        format!(
            "Exported {} of {} tiles",
            self.counts.exported,
            self.counts.visited()
        )
    }
}

/// Tile timing: rolling average over the last `capacity` tiles, plus run-wide
/// average and worst.
#[derive(Debug)]
pub struct TileTimer {
    history: Vec<Duration>,
    capacity: usize,
    index: usize,
    filled: bool,
    worst: Duration,
    total: Duration,
    samples: u32,
}

impl TileTimer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            history: vec![Duration::ZERO; capacity],
            capacity,
            index: 0,
            filled: false,
            worst: Duration::ZERO,
            total: Duration::ZERO,
            samples: 0,
        }
    }

    pub fn record(&mut self, dt: Duration) {
        self.history[self.index] = dt;
        self.index = (self.index + 1) % self.capacity;
        if self.index == 0 {
            self.filled = true;
        }
        self.worst = self.worst.max(dt);
        self.total += dt;
        self.samples = self.samples.saturating_add(1);
    }

    pub fn count(&self) -> usize {
        if self.filled {
            self.capacity
        } else {
            self.index
        }
    }

    /// Average of the recent window.
    pub fn average(&self) -> Duration {
        let count = self.count();
        if count == 0 {
            return Duration::ZERO;
        }
        let total: Duration = self.history[..count].iter().sum();
        total / count as u32
    }

    /// Average of every tile recorded since the timer was created.
    pub fn run_average(&self) -> Duration {
        if self.samples == 0 {
            return Duration::ZERO;
        }
        self.total / self.samples
    }

    /// Slowest tile since the timer was created, including evicted samples.
    pub fn worst(&self) -> Duration {
        self.worst
    }
}

impl Default for TileTimer {
    fn default() -> Self {
        Self::new(64)
    }
}
