use time::PrimitiveDateTime;

/// One row per run: the system-wide totals of the CSD summary report.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Summary {
    pub rowtime: PrimitiveDateTime,
    pub last_updated_datetime_utc: PrimitiveDateTime,
    pub total_max_generation_capability: i64,
    pub total_net_generation: i64,
    pub net_to_grid_generation: i64,
    pub net_actual_interchange: i64,
    pub alberta_internal_load: i64,
    pub contingency_reserve_required: i64,
    // Misspelled upstream; kept so the column matches the report key.
    pub dispatched_contigency_reserve_total: i64,
    pub dispatched_contingency_reserve_gen: i64,
    pub dispatched_contingency_reserve_other: i64,
    pub lssi_armed_dispatch: i64,
    pub lssi_offered_volume: i64,
}
