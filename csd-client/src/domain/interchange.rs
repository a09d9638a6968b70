use time::PrimitiveDateTime;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Interchange {
    pub rowtime: PrimitiveDateTime,
    pub last_updated_datetime_utc: PrimitiveDateTime,
    pub location: String,
    /// Positive for imports, negative for exports.
    pub actual_flow: i64,
}
