use chrono::{DateTime, FixedOffset, Utc};

pub fn utc_to_fixed_offset(utc_dt: &DateTime<Utc>) -> DateTime<FixedOffset> {
    utc_dt.fixed_offset()
}

/// Current instant in the representation the database columns use.
pub fn now_fixed() -> DateTime<FixedOffset> {
    utc_to_fixed_offset(&Utc::now())
}
