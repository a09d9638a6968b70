//! Table definitions for the CSD report tables.
//!
//! Tables are created if absent and never altered afterwards. A change in the
//! report's field set needs a manual migration.
use anyhow::{Context, Result};
use sqlx::PgPool;

pub const SUMMARY_TABLE: &str = "summary";
pub const GENLIST_TABLE: &str = "genlist";
pub const INTERCHANGE_TABLE: &str = "interchange";
pub const ASSETS_TABLE: &str = "assets";

const CREATE_SUMMARY: &str = r#"
    CREATE TABLE IF NOT EXISTS summary (
        summary_id                            SERIAL PRIMARY KEY,
        rowtime                               TIMESTAMP NOT NULL,
        last_updated_datetime_utc             TIMESTAMP NOT NULL,
        total_max_generation_capability       BIGINT    NOT NULL,
        total_net_generation                  BIGINT    NOT NULL,
        net_to_grid_generation                BIGINT    NOT NULL,
        net_actual_interchange                BIGINT    NOT NULL,
        alberta_internal_load                 BIGINT    NOT NULL,
        contingency_reserve_required          BIGINT    NOT NULL,
        dispatched_contigency_reserve_total   BIGINT    NOT NULL,
        dispatched_contingency_reserve_gen    BIGINT    NOT NULL,
        dispatched_contingency_reserve_other  BIGINT    NOT NULL,
        lssi_armed_dispatch                   BIGINT    NOT NULL,
        lssi_offered_volume                   BIGINT    NOT NULL
    )
"#;

const CREATE_GENLIST: &str = r#"
    CREATE TABLE IF NOT EXISTS genlist (
        genlist_id                                 SERIAL PRIMARY KEY,
        rowtime                                    TIMESTAMP NOT NULL,
        last_updated_datetime_utc                  TIMESTAMP NOT NULL,
        fuel_type                                  VARCHAR   NOT NULL,
        aggregated_maximum_capability              BIGINT    NOT NULL,
        aggregated_net_generation                  BIGINT    NOT NULL,
        aggregated_dispatched_contingency_reserve  BIGINT    NOT NULL
    )
"#;

const CREATE_INTERCHANGE: &str = r#"
    CREATE TABLE IF NOT EXISTS interchange (
        interchange_id             SERIAL PRIMARY KEY,
        rowtime                    TIMESTAMP NOT NULL,
        last_updated_datetime_utc  TIMESTAMP NOT NULL,
        location                   VARCHAR   NOT NULL,
        actual_flow                BIGINT    NOT NULL
    )
"#;

const CREATE_ASSETS: &str = r#"
    CREATE TABLE IF NOT EXISTS assets (
        assets_id                       SERIAL PRIMARY KEY,
        rowtime                         TIMESTAMP NOT NULL,
        last_updated_datetime_utc       TIMESTAMP NOT NULL,
        asset                           VARCHAR   NOT NULL,
        fuel_type                       VARCHAR   NOT NULL,
        sub_fuel_type                   VARCHAR   NOT NULL,
        maximum_capability              BIGINT    NOT NULL,
        net_generation                  BIGINT    NOT NULL,
        dispatched_contingency_reserve  BIGINT    NOT NULL
    )
"#;

/// DDL for every table, in creation order.
pub fn statements() -> [(&'static str, &'static str); 4] {
    [
        (SUMMARY_TABLE, CREATE_SUMMARY),
        (GENLIST_TABLE, CREATE_GENLIST),
        (INTERCHANGE_TABLE, CREATE_INTERCHANGE),
        (ASSETS_TABLE, CREATE_ASSETS),
    ]
}

/// Create the four report tables if they do not exist yet.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for (table, ddl) in statements() {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .with_context(|| format!("failed to create table '{table}'"))?;
        tracing::debug!(table, "table ensured");
    }

    Ok(())
}
