//! Spreadsheet serial dates
//!
//! The host passes dates as serial numbers: days since the epoch 1899-12-30,
//! with the fractional part holding the time of day. Serial 1.0 is
//! 1899-12-31 and serial 61.0 is 1900-03-01, so the phantom 1900-02-29 never
//! needs special handling here.

use chrono::{Duration, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Smallest serial the host accepts (exclusive), 0100-01-01
pub const MIN_SERIAL: f64 = -657_435.0;

/// Largest serial the host accepts (exclusive), 10000-01-01
pub const MAX_SERIAL: f64 = 2_958_466.0;

fn epoch() -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1899, 12, 30).map(|d| d.and_time(chrono::NaiveTime::MIN))
}

/// Convert a serial number into a date/time
///
/// Rounds to the nearest millisecond. For negative serials the integer part
/// counts days backwards but the fraction is still a positive time of day, so
/// `-1.25` is 1899-12-29 06:00.
///
/// Returns `None` for NaN and for serials outside (`MIN_SERIAL`, `MAX_SERIAL`).
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !(serial < MAX_SERIAL && serial > MIN_SERIAL) {
        return None;
    }

    let half = if serial >= 0.0 { 0.5 } else { -0.5 };
    let mut millis = (serial * MILLIS_PER_DAY as f64 + half) as i64;
    if millis < 0 {
        millis -= (millis % MILLIS_PER_DAY) * 2;
    }

    epoch()?.checked_add_signed(Duration::milliseconds(millis))
}
