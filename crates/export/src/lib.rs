//! Tick-driven tile export.
//!
//! [`ExportPlan`] measures the target collection and plans the grid once.
//! [`ExportScheduler`] then visits every tile in row-major order, a bounded
//! batch per tick, handing non-empty tiles to a [`TileExporter`] and writing
//! the tileset manifest after the last tile.

mod collaborator;
mod error;
mod plan;
mod progress;
mod scheduler;
mod settings;

#[cfg(test)]
mod testing;

pub use collaborator::{ExporterError, TileExport, TileExporter, TileJob, TileWorkspace};
pub use error::{DegenerateReason, ExportError};
pub use plan::ExportPlan;
pub use progress::{ExportReport, Progress, TileCounts, TileTimer};
pub use scheduler::{CancelHandle, ExportScheduler, SchedulerState, SchedulerStatus};
pub use settings::{ExportSettings, FailurePolicy, SettingsError};

pub fn crate_info() -> &'static str {
    concat!("tileslicer-export v", env!("CARGO_PKG_VERSION"))
}
