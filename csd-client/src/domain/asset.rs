use time::PrimitiveDateTime;

/// A single generating asset as listed by the CSD assets report.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Asset {
    pub rowtime: PrimitiveDateTime,
    pub last_updated_datetime_utc: PrimitiveDateTime,
    pub asset: String,
    pub fuel_type: String,
    pub sub_fuel_type: String,
    pub maximum_capability: i64,
    pub net_generation: i64,
    pub dispatched_contingency_reserve: i64,
}
