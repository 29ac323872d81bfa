use chrono::{DateTime, Months, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Calendar-month subtraction, saturating at the earliest representable instant.
pub fn months_before(at: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    at.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
