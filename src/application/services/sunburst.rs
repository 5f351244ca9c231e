//! Sunburst pipeline service
//!
//! Table → records → tree → partition → zoom state.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    BuildStats, Extractor, Partition, PathKey, Record, RenderItem, Table, TreeBuilder, ZoomState,
};
use crate::infrastructure::traits::FileSystem;

/// A laid-out chart and where its records came from.
#[derive(Debug)]
pub struct Chart {
    /// Extraction strategy used, or `"records"` when built from records
    pub strategy: &'static str,
    pub stats: BuildStats,
    pub state: ZoomState,
}

/// One sampled transition frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub progress: f64,
    pub items: Vec<RenderItem>,
}

/// Service building charts from tables and driving zoom transitions.
pub struct SunburstService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
    extractor: Extractor,
}

impl SunburstService {
    /// Create a service with the default strategy priority.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self::with_extractor(fs, settings, Extractor::default())
    }

    pub fn with_extractor(
        fs: Arc<dyn FileSystem>,
        settings: Arc<Settings>,
        extractor: Extractor,
    ) -> Self {
        Self {
            fs,
            settings,
            extractor,
        }
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Read a JSON table (`{"columns": [...], "rows": [[...]]}`).
    #[instrument(level = "debug", skip(self))]
    pub fn load_table(&self, path: &Path) -> ApplicationResult<Table> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::TableNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read table", path)?;
        let table: Table =
            serde_json::from_str(&content).map_err(|source| ApplicationError::InvalidTable {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(
            "loaded table: columns={}, rows={}",
            table.columns.len(),
            table.rows.len()
        );
        Ok(table)
    }

    /// Load a table file and lay it out.
    pub fn open(&self, path: &Path) -> ApplicationResult<Chart> {
        let table = self.load_table(path)?;
        self.chart_from_table(&table)
    }

    pub fn chart_from_table(&self, table: &Table) -> ApplicationResult<Chart> {
        let (strategy, records) = self.extractor.extract(table)?;
        let (stats, state) = self.lay_out(&records)?;
        Ok(Chart {
            strategy,
            stats,
            state,
        })
    }

    pub fn chart_from_records(&self, records: &[Record]) -> ApplicationResult<Chart> {
        let (stats, state) = self.lay_out(records)?;
        Ok(Chart {
            strategy: "records",
            stats,
            state,
        })
    }

    /// Replace the chart's data; an in-flight transition is discarded.
    #[instrument(level = "debug", skip(self, chart, table))]
    pub fn refresh(&self, chart: &mut Chart, table: &Table) -> ApplicationResult<()> {
        let (strategy, records) = self.extractor.extract(table)?;
        let (stats, partition) = self.partition(&records)?;
        chart.state.rebuild(partition);
        chart.strategy = strategy;
        chart.stats = stats;
        Ok(())
    }

    /// Zoom to `focus` and sample the transition, ending settled.
    ///
    /// Returns the focus actually used (root when `focus` is unknown).
    #[instrument(level = "debug", skip(self, chart, focus), fields(focus = %focus))]
    pub fn zoom(&self, chart: &mut Chart, focus: &PathKey) -> (PathKey, Vec<Frame>) {
        let focused = chart.state.focus_on(focus);
        let generation = chart.state.generation();
        let count = self.settings.frames.max(1);

        let frames = (0..=count)
            .map(|i| {
                let progress = i as f64 / count as f64;
                chart.state.advance_for(generation, progress);
                Frame {
                    progress,
                    items: chart.state.render_list(),
                }
            })
            .collect();
        (focused, frames)
    }

    fn partition(&self, records: &[Record]) -> ApplicationResult<(BuildStats, Partition)> {
        let mut builder = TreeBuilder::new();
        builder.extend(records);
        let stats = builder.stats();
        let tree = builder.finalize();
        info!(
            "built hierarchy: nodes={}, depth={}, skipped={}",
            tree.len().saturating_sub(1),
            tree.depth(),
            stats.skipped
        );
        let partition = Partition::layout(tree, self.settings.partition_config())?;
        Ok((stats, partition))
    }

    fn lay_out(&self, records: &[Record]) -> ApplicationResult<(BuildStats, ZoomState)> {
        let (stats, partition) = self.partition(records)?;
        Ok((
            stats,
            ZoomState::with_label_rule(partition, self.settings.label_rule()),
        ))
    }
}
