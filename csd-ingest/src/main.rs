use anyhow::Result;
use csd_ingest::{
    config::AppConfig,
    observability,
    pipeline::Pipeline,
    sinks::PostgresSink,
    sources::AesoReportSource,
};
use sqlx::postgres::PgPoolOptions;
use time::{OffsetDateTime, PrimitiveDateTime};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    observability::init_tracing();

    let cfg = AppConfig::load()?;
    tracing::debug!(config = ?cfg, "configuration resolved");

    let source = AesoReportSource::new(&cfg)?;

    // Connects on first use, after both reports are fetched.
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&cfg.database_url)?;

    let pipeline = Pipeline {
        source,
        sink: PostgresSink::new(pool),
    };

    let now = OffsetDateTime::now_utc();
    let run_time = PrimitiveDateTime::new(now.date(), now.time());

    match pipeline.run(run_time).await {
        Ok(report) => {
            tracing::info!(
                %run_time,
                fuel_rows = report.fuel_rows,
                interchange_rows = report.interchange_rows,
                summary_rows = report.summary_rows,
                asset_rows = report.asset_rows,
                "run complete"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                %run_time,
                stage = %e.stage,
                fuel_rows = e.written.fuel_rows,
                interchange_rows = e.written.interchange_rows,
                summary_rows = e.written.summary_rows,
                asset_rows = e.written.asset_rows,
                error = %e.error,
                "run aborted"
            );
            Err(e.into())
        }
    }
}
