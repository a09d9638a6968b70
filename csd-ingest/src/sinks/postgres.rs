use csd_client::{
    db::{
        self,
        schema::{ASSETS_TABLE, GENLIST_TABLE, INTERCHANGE_TABLE, SUMMARY_TABLE},
    },
    domain::{Asset, GenerationByFuel, Interchange, Summary},
};
use sqlx::{postgres::PgPool, Postgres, QueryBuilder};

use crate::pipeline::{PipelineError, SchemaManager, Sink};

/// A record that maps onto one row of a report table.
pub trait InsertRow: Send + Sync {
    const TABLE: &'static str;

    fn insert_query(&self) -> QueryBuilder<'_, Postgres>;
}

impl InsertRow for Summary {
    const TABLE: &'static str = SUMMARY_TABLE;

    fn insert_query(&self) -> QueryBuilder<'_, Postgres> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO summary (rowtime, last_updated_datetime_utc, total_max_generation_capability, \
             total_net_generation, net_to_grid_generation, net_actual_interchange, alberta_internal_load, \
             contingency_reserve_required, dispatched_contigency_reserve_total, dispatched_contingency_reserve_gen, \
             dispatched_contingency_reserve_other, lssi_armed_dispatch, lssi_offered_volume) ",
        );
        builder.push_values(std::iter::once(self), |mut b, s| {
            b.push_bind(s.rowtime)
                .push_bind(s.last_updated_datetime_utc)
                .push_bind(s.total_max_generation_capability)
                .push_bind(s.total_net_generation)
                .push_bind(s.net_to_grid_generation)
                .push_bind(s.net_actual_interchange)
                .push_bind(s.alberta_internal_load)
                .push_bind(s.contingency_reserve_required)
                .push_bind(s.dispatched_contigency_reserve_total)
                .push_bind(s.dispatched_contingency_reserve_gen)
                .push_bind(s.dispatched_contingency_reserve_other)
                .push_bind(s.lssi_armed_dispatch)
                .push_bind(s.lssi_offered_volume);
        });
        builder
    }
}

impl InsertRow for GenerationByFuel {
    const TABLE: &'static str = GENLIST_TABLE;

    fn insert_query(&self) -> QueryBuilder<'_, Postgres> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO genlist (rowtime, last_updated_datetime_utc, fuel_type, aggregated_maximum_capability, \
             aggregated_net_generation, aggregated_dispatched_contingency_reserve) ",
        );
        builder.push_values(std::iter::once(self), |mut b, g| {
            b.push_bind(g.rowtime)
                .push_bind(g.last_updated_datetime_utc)
                .push_bind(&g.fuel_type)
                .push_bind(g.aggregated_maximum_capability)
                .push_bind(g.aggregated_net_generation)
                .push_bind(g.aggregated_dispatched_contingency_reserve);
        });
        builder
    }
}

impl InsertRow for Interchange {
    const TABLE: &'static str = INTERCHANGE_TABLE;

    fn insert_query(&self) -> QueryBuilder<'_, Postgres> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO interchange (rowtime, last_updated_datetime_utc, location, actual_flow) ",
        );
        builder.push_values(std::iter::once(self), |mut b, i| {
            b.push_bind(i.rowtime)
                .push_bind(i.last_updated_datetime_utc)
                .push_bind(&i.location)
                .push_bind(i.actual_flow);
        });
        builder
    }
}

impl InsertRow for Asset {
    const TABLE: &'static str = ASSETS_TABLE;

    fn insert_query(&self) -> QueryBuilder<'_, Postgres> {
        let mut builder = QueryBuilder::<Postgres>::new(
            "INSERT INTO assets (rowtime, last_updated_datetime_utc, asset, fuel_type, sub_fuel_type, \
             maximum_capability, net_generation, dispatched_contingency_reserve) ",
        );
        builder.push_values(std::iter::once(self), |mut b, a| {
            b.push_bind(a.rowtime)
                .push_bind(a.last_updated_datetime_utc)
                .push_bind(&a.asset)
                .push_bind(&a.fuel_type)
                .push_bind(&a.sub_fuel_type)
                .push_bind(a.maximum_capability)
                .push_bind(a.net_generation)
                .push_bind(a.dispatched_contingency_reserve);
        });
        builder
    }
}

/// Writes report rows to PostgreSQL, one transaction per row.
pub struct PostgresSink {
    pool: PgPool,
}

impl PostgresSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SchemaManager for PostgresSink {
    async fn ensure_schema(&self) -> Result<(), PipelineError> {
        db::ensure_schema(&self.pool)
            .await
            .map_err(|e| PipelineError::Schema(format!("{e:#}")))?;
        tracing::info!("report tables ensured");
        Ok(())
    }
}

#[async_trait::async_trait]
impl<T: InsertRow> Sink<T> for PostgresSink {
    async fn write(&self, record: &T) -> Result<(), PipelineError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| PipelineError::Sink(format!("failed to open transaction for {}: {e}", T::TABLE)))?;

        let mut builder = record.insert_query();
        let res = builder.build().execute(&mut *tx).await;

        match res {
            Ok(_) => {
                tx.commit()
                    .await
                    .map_err(|e| PipelineError::Sink(format!("commit into {} failed: {e}", T::TABLE)))?;
                metrics::counter!("csd_rows_inserted_total", "table" => T::TABLE).increment(1);
                Ok(())
            }
            Err(e) => {
                if let Err(rb) = tx.rollback().await {
                    tracing::warn!(table = T::TABLE, error = %rb, "rollback failed");
                }
                tracing::error!(table = T::TABLE, error = %e, "insert failed, transaction rolled back");
                metrics::counter!("csd_sink_errors_total", "table" => T::TABLE).increment(1);
                Err(PipelineError::Sink(format!("insert into {} failed: {e}", T::TABLE)))
            }
        }
    }
}
