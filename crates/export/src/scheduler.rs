use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use glam::IVec3;
use tileslicer_common::SceneSource;
use tileslicer_tileset::{ManifestWriter, TilesetManifest, tile_asset_name};

use crate::collaborator::{TileExport, TileExporter, TileJob, TileWorkspace};
use crate::error::ExportError;
use crate::plan::ExportPlan;
use crate::progress::{ExportReport, Progress, TileCounts, TileTimer};
use crate::settings::{ExportSettings, FailurePolicy};

/// Where the scheduler is in its run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// The next tick starts at this tile.
    Processing(IVec3),
    /// Every tile has an outcome; the next tick writes the manifest.
    Finalizing,
    Done,
    Cancelled,
    Failed,
}

/// What one tick produced.
#[derive(Debug, Clone)]
pub enum SchedulerStatus {
    Running(Progress),
    Done(ExportReport),
    Cancelled(Progress),
}

/// Shared flag a host can flip to stop an export between ticks.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Walks every tile of a planned grid, a bounded batch per [`tick`](Self::tick).
///
/// Tiles are visited x outermost, then y, then z. Every tile before the
/// current one already has its final `src`. The manifest is only written after
/// the last tile, and is discarded if the run is cancelled or fails.
pub struct ExportScheduler<H, E: TileExporter<H>> {
    plan: ExportPlan<H>,
    settings: ExportSettings,
    exporter: E,
    workspace: TileWorkspace<E::Scratch>,
    manifest: Option<TilesetManifest>,
    manifest_path: PathBuf,
    state: SchedulerState,
    counts: TileCounts,
    timer: TileTimer,
    cancel: CancelHandle,
    label: String,
    started: Instant,
    report: Option<ExportReport>,
}

impl<H: Copy + PartialEq, E: TileExporter<H>> ExportScheduler<H, E> {
    /// Plan an export of `settings.collection` and get ready to visit tile (0,0,0).
    ///
    /// Fails without side effects when no target is selected or its bounds
    /// cannot be tiled.
    pub fn start<S>(scene: &S, settings: ExportSettings, exporter: E) -> Result<Self, ExportError>
    where
        S: SceneSource<Handle = H>,
    {
        let plan = ExportPlan::build(scene, &settings)?;
        Ok(Self::from_plan(plan, settings, exporter))
    }

    pub fn from_plan(plan: ExportPlan<H>, settings: ExportSettings, exporter: E) -> Self {
        let manifest = TilesetManifest::new(
            plan.name.clone(),
            &plan.grid,
            settings.tile_format,
            settings.origin_mode,
        );
        let state = match plan.grid.indices().next() {
            Some(first) => SchedulerState::Processing(first),
            None => SchedulerState::Finalizing,
        };
        tracing::info!(
            name = %plan.name,
            objects = plan.table.len(),
            size = ?plan.grid.size,
            tiles = plan.grid.tile_count(),
            "export started"
        );
        Self {
            manifest_path: settings.manifest_path(),
            label: format!("Slicing {}", plan.name),
            plan,
            settings,
            exporter,
            workspace: TileWorkspace::default(),
            manifest: Some(manifest),
            state,
            counts: TileCounts::default(),
            timer: TileTimer::default(),
            cancel: CancelHandle::default(),
            started: Instant::now(),
            report: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn plan(&self) -> &ExportPlan<H> {
        &self.plan
    }

    pub fn counts(&self) -> TileCounts {
        self.counts
    }

    /// The in-memory manifest. `None` after cancellation or failure.
    pub fn manifest(&self) -> Option<&TilesetManifest> {
        self.manifest.as_ref()
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Change where the manifest is written. Used to retry after a write failure.
    pub fn set_manifest_path(&mut self, path: impl Into<PathBuf>) {
        self.manifest_path = path.into();
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn progress(&self) -> Progress {
        Progress {
            done: self.counts.visited(),
            total: self.plan.grid.tile_count(),
            label: self.label.clone(),
        }
    }

    /// Do one batch of work and return to the caller.
    ///
    /// Cancellation is only observed at the start of a tick while tiles are
    /// still being processed. After a manifest write failure the scheduler
    /// stays in `Finalizing`, so ticking again retries the write.
    pub fn tick(&mut self) -> Result<SchedulerStatus, ExportError> {
        self.tick_with(|_| {})
    }

    /// Like [`tick`](Self::tick), handing progress to `on_tile` after every
    /// tile of the batch.
    pub fn tick_with(
        &mut self,
        mut on_tile: impl FnMut(&Progress),
    ) -> Result<SchedulerStatus, ExportError> {
        let _span = tracing::info_span!("export_tick", state = ?self.state).entered();

        match self.state {
            SchedulerState::Done => {
                return self
                    .report
                    .clone()
                    .map(SchedulerStatus::Done)
                    .ok_or(ExportError::Halted);
            }
            SchedulerState::Cancelled => return Ok(SchedulerStatus::Cancelled(self.progress())),
            SchedulerState::Failed => return Err(ExportError::Halted),
            SchedulerState::Processing(_) | SchedulerState::Finalizing => {}
        }

        if matches!(self.state, SchedulerState::Processing(_)) && self.cancel.is_cancelled() {
            self.manifest = None;
            self.state = SchedulerState::Cancelled;
            self.label = "Cancelled".into();
            tracing::info!(visited = self.counts.visited(), "export cancelled");
            return Ok(SchedulerStatus::Cancelled(self.progress()));
        }

        match self.state {
            SchedulerState::Processing(first) => {
                let mut index = first;
                for _ in 0..self.settings.tiles_per_tick {
                    if let Err(e) = self.process_tile(index) {
                        self.manifest = None;
                        self.state = SchedulerState::Failed;
                        tracing::error!(error = %e, "export failed");
                        return Err(e);
                    }
                    on_tile(&self.progress());
                    match self.plan.grid.next_index(index) {
                        Some(next) => {
                            index = next;
                            self.state = SchedulerState::Processing(next);
                        }
                        None => {
                            self.state = SchedulerState::Finalizing;
                            self.label = "Writing manifest".into();
                            break;
                        }
                    }
                }
                Ok(SchedulerStatus::Running(self.progress()))
            }
            _ => self.finalize().map(SchedulerStatus::Done),
        }
    }

    /// Tick until the export finishes, handing progress to `on_progress` after
    /// every tile.
    pub fn run(
        &mut self,
        mut on_progress: impl FnMut(&Progress),
    ) -> Result<ExportReport, ExportError> {
        loop {
            match self.tick_with(&mut on_progress)? {
                SchedulerStatus::Running(_) => {}
                SchedulerStatus::Done(report) => return Ok(report),
                SchedulerStatus::Cancelled(_) => return Err(ExportError::Cancelled),
            }
        }
    }

    fn process_tile(&mut self, index: IVec3) -> Result<(), ExportError> {
        let started = Instant::now();
        let bounds = self.plan.grid.tile_bounds(index);
        let objects = self.plan.table.objects_in_tile(bounds.min, bounds.max);

        let src = if objects.is_empty() {
            self.counts.skipped += 1;
            tracing::debug!(?index, "tile has no objects");
            None
        } else {
            let asset_name =
                tile_asset_name(&self.settings.output_prefix, index, self.settings.swizzle_yz);
            self.workspace.cutter = bounds.aabb();
            self.workspace.cursor = self.settings.origin_mode.pick(&bounds);
            let job = TileJob {
                index,
                bounds,
                asset_name: &asset_name,
                output_dir: &self.settings.output_dir,
                objects: &objects,
            };

            match self.exporter.export_tile(&job, &mut self.workspace) {
                Ok(TileExport::Written { asset, triangles }) => {
                    self.counts.exported += 1;
                    tracing::debug!(?index, %asset, triangles, "tile exported");
                    Some(asset)
                }
                Ok(TileExport::Empty) => {
                    self.counts.skipped_empty += 1;
                    tracing::debug!(?index, objects = objects.len(), "tile empty after clip");
                    None
                }
                Err(source) => match self.settings.failure_policy {
                    FailurePolicy::Abort => {
                        return Err(ExportError::ExternalExportFailure { index, source });
                    }
                    FailurePolicy::SkipAndContinue => {
                        self.counts.failed += 1;
                        tracing::warn!(?index, error = %source, "tile export failed, skipping");
                        None
                    }
                },
            }
        };

        if let Some(tile) = self.manifest.as_mut().and_then(|m| m.tile_mut(index)) {
            tile.src = src;
        }
        self.timer.record(started.elapsed());
        Ok(())
    }

    fn finalize(&mut self) -> Result<ExportReport, ExportError> {
        let manifest = self.manifest.as_ref().ok_or(ExportError::Halted)?;
        let output: Cow<'_, TilesetManifest> = if self.settings.swizzle_yz {
            Cow::Owned(manifest.swizzled())
        } else {
            Cow::Borrowed(manifest)
        };

        let written = ManifestWriter::new(self.settings.compact_json)
            .write(&output, &self.manifest_path)
            .map_err(|source| ExportError::ManifestWriteFailure {
                path: self.manifest_path.clone(),
                source,
            })?;

        if let Cow::Owned(swizzled) = output {
            self.manifest = Some(swizzled);
        }

        let report = ExportReport {
            name: self.plan.name.clone(),
            counts: self.counts,
            total: self.plan.grid.tile_count(),
            manifest: written,
            average_tile_time: self.timer.run_average(),
            recent_tile_time: self.timer.average(),
            worst_tile_time: self.timer.worst(),
            elapsed: self.started.elapsed(),
        };
        self.state = SchedulerState::Done;
        self.label = report.summary();
        tracing::info!(
            exported = report.counts.exported,
            skipped = report.counts.skipped,
            skipped_empty = report.counts.skipped_empty,
            failed = report.counts.failed,
            elapsed = ?report.elapsed,
            "{}",
            report.summary()
        );
        self.report = Some(report.clone());
        Ok(report)
    }
}
