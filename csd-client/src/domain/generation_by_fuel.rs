use time::PrimitiveDateTime;

/// Aggregated generation for one fuel type, stored in the `genlist` table.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct GenerationByFuel {
    pub rowtime: PrimitiveDateTime,
    pub last_updated_datetime_utc: PrimitiveDateTime,
    pub fuel_type: String,
    pub aggregated_maximum_capability: i64,
    pub aggregated_net_generation: i64,
    pub aggregated_dispatched_contingency_reserve: i64,
}
