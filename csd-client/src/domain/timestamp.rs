use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
    PrimitiveDateTime, Time, UtcOffset,
};

#[derive(thiserror::Error, Debug)]
#[error("invalid last-updated timestamp '{value}': {source}")]
pub struct TimestampError {
    pub value: String,
    #[source]
    pub source: time::error::Parse,
}

/// Parse the `last_updated_datetime_utc` value of a CSD report.
///
/// The report publishes `YYYY-MM-DD HH:MM`. Seconds, fractional seconds, a `T`
/// separator and a bare date are accepted as well. A value carrying an offset
/// is converted to UTC; the result never carries a zone.
pub fn parse_last_updated(value: &str) -> Result<PrimitiveDateTime, TimestampError> {
    let s = value.trim();

    let naive = PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .or_else(|_| {
            PrimitiveDateTime::parse(
                s,
                format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
            )
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(
                s,
                format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
            )
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(s, format_description!("[year]-[month]-[day]T[hour]:[minute]"))
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(
                s,
                format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
            )
        })
        .or_else(|_| {
            PrimitiveDateTime::parse(
                s,
                format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"),
            )
        })
        .or_else(|_| {
            Date::parse(s, format_description!("[year]-[month]-[day]"))
                .map(|d| PrimitiveDateTime::new(d, Time::MIDNIGHT))
        });

    if let Ok(ts) = naive {
        return Ok(ts);
    }

    OffsetDateTime::parse(s, &Rfc3339)
        .map(|dt| {
            let utc = dt.to_offset(UtcOffset::UTC);
            PrimitiveDateTime::new(utc.date(), utc.time())
        })
        .map_err(|source| TimestampError {
            value: value.to_string(),
            source,
        })
}
