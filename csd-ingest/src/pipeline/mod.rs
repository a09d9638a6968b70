use std::fmt;

use csd_client::domain::{Asset, GenerationByFuel, Interchange, Summary};
use serde_json::Value;
use time::PrimitiveDateTime;

use crate::transform;

#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("source error: {0}")]
    Source(String),
    #[error("transform error: {0}")]
    Transform(String),
    #[error("schema error: {0}")]
    Schema(String),
    #[error("sink error: {0}")]
    Sink(String),
}

/// The two CSD reports fetched on every run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Report {
    Summary,
    Assets,
}

impl Report {
    pub fn path(self) -> &'static str {
        match self {
            Report::Summary => "/report/v1/csd/summary/current",
            Report::Assets => "/report/v1/csd/generation/assets/current",
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Summary => write!(f, "summary"),
            Report::Assets => write!(f, "assets"),
        }
    }
}

#[async_trait::async_trait]
pub trait Source: Send + Sync {
    async fn fetch(&self, report: Report) -> Result<Value, PipelineError>;
}

#[async_trait::async_trait]
pub trait SchemaManager: Send + Sync {
    async fn ensure_schema(&self) -> Result<(), PipelineError>;
}

/// Durable write of one record. An `Ok` means the record is committed.
#[async_trait::async_trait]
pub trait Sink<T>: Send + Sync {
    async fn write(&self, record: &T) -> Result<(), PipelineError>;
}

/// Position of a run in its fixed sequence of steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Start,
    FetchSummary,
    FetchAssets,
    EnsureSchema,
    DecodeReports,
    WriteFuelRows,
    WriteInterchangeRows,
    WriteSummaryRow,
    WriteAssetRows,
    Done,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStage::Start => "start",
            RunStage::FetchSummary => "fetch_summary",
            RunStage::FetchAssets => "fetch_assets",
            RunStage::EnsureSchema => "ensure_schema",
            RunStage::DecodeReports => "decode_reports",
            RunStage::WriteFuelRows => "write_fuel_rows",
            RunStage::WriteInterchangeRows => "write_interchange_rows",
            RunStage::WriteSummaryRow => "write_summary_row",
            RunStage::WriteAssetRows => "write_asset_rows",
            RunStage::Done => "done",
        };
        f.write_str(s)
    }
}

/// Rows committed by a run, per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub fuel_rows: usize,
    pub interchange_rows: usize,
    pub summary_rows: usize,
    pub asset_rows: usize,
}

impl RunReport {
    pub fn total(&self) -> usize {
        self.fuel_rows + self.interchange_rows + self.summary_rows + self.asset_rows
    }
}

/// A run that stopped early. Rows counted in `written` stay committed.
#[derive(thiserror::Error, Debug)]
#[error("run aborted at {stage} after {} committed rows: {error}", .written.total())]
pub struct RunError {
    pub stage: RunStage,
    pub written: RunReport,
    #[source]
    pub error: PipelineError,
}

/// One fetch-and-store cycle.
///
/// Every record is committed on its own. A failure stops the run at once:
/// records not yet reached are never written and nothing already committed is
/// undone, so a failed run can leave fuel or interchange rows without the
/// summary row of the same run.
pub struct Pipeline<S, K> {
    pub source: S,
    pub sink: K,
}

struct Progress {
    stage: RunStage,
    written: RunReport,
}

impl Progress {
    fn enter(&mut self, stage: RunStage) {
        tracing::debug!(%stage, "entering stage");
        self.stage = stage;
    }

    fn abort(&self, error: PipelineError) -> RunError {
        RunError {
            stage: self.stage,
            written: self.written,
            error,
        }
    }
}

impl<S, K> Pipeline<S, K>
where
    S: Source,
    K: SchemaManager + Sink<GenerationByFuel> + Sink<Interchange> + Sink<Summary> + Sink<Asset>,
{
    pub async fn run(&self, run_time: PrimitiveDateTime) -> Result<RunReport, RunError> {
        let mut progress = Progress {
            stage: RunStage::Start,
            written: RunReport::default(),
        };

        progress.enter(RunStage::FetchSummary);
        let summary_json = self
            .source
            .fetch(Report::Summary)
            .await
            .map_err(|e| progress.abort(e))?;

        progress.enter(RunStage::FetchAssets);
        let assets_json = self
            .source
            .fetch(Report::Assets)
            .await
            .map_err(|e| progress.abort(e))?;

        progress.enter(RunStage::EnsureSchema);
        self.sink.ensure_schema().await.map_err(|e| progress.abort(e))?;

        progress.enter(RunStage::DecodeReports);
        let summary_report =
            transform::SummaryReport::from_json(summary_json).map_err(|e| progress.abort(e))?;
        let assets_report =
            transform::AssetsReport::from_json(assets_json).map_err(|e| progress.abort(e))?;
        let summary_updated = summary_report.last_updated().map_err(|e| progress.abort(e))?;
        let assets_updated = assets_report.last_updated().map_err(|e| progress.abort(e))?;
        let summary = summary_report.to_summary(run_time, summary_updated);

        progress.enter(RunStage::WriteFuelRows);
        let fuel_entries = summary_report.generation_entries().map_err(|e| progress.abort(e))?;
        for entry in fuel_entries {
            let fuel = transform::map_generation_by_fuel(entry, run_time, summary_updated)
                .map_err(|e| progress.abort(e))?;
            <K as Sink<GenerationByFuel>>::write(&self.sink, &fuel)
                .await
                .map_err(|e| progress.abort(e))?;
            progress.written.fuel_rows += 1;
        }

        progress.enter(RunStage::WriteInterchangeRows);
        let interchange_entries = summary_report.interchange_entries().map_err(|e| progress.abort(e))?;
        for entry in interchange_entries {
            let interchange = transform::map_interchange(entry, run_time, summary_updated)
                .map_err(|e| progress.abort(e))?;
            <K as Sink<Interchange>>::write(&self.sink, &interchange)
                .await
                .map_err(|e| progress.abort(e))?;
            progress.written.interchange_rows += 1;
        }

        progress.enter(RunStage::WriteSummaryRow);
        <K as Sink<Summary>>::write(&self.sink, &summary)
            .await
            .map_err(|e| progress.abort(e))?;
        progress.written.summary_rows += 1;

        progress.enter(RunStage::WriteAssetRows);
        let asset_entries = assets_report.asset_entries().map_err(|e| progress.abort(e))?;
        for entry in asset_entries {
            let asset = transform::map_asset(entry, run_time, assets_updated)
                .map_err(|e| progress.abort(e))?;
            <K as Sink<Asset>>::write(&self.sink, &asset)
                .await
                .map_err(|e| progress.abort(e))?;
            progress.written.asset_rows += 1;
        }

        progress.enter(RunStage::Done);
        Ok(progress.written)
    }
}
