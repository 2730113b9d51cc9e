//! Cell value coercion
//!
//! Converts a raw cell handed over by the host into a value of a declared
//! type. Numbers bound to date/time targets are read as spreadsheet serial
//! dates; everything else follows a generic "change type" conversion.
//!
//! Numbers converted to text use the shortest round-trip digits. Magnitudes
//! of 1e15 and above, or below 1e-5, switch to exponent form (`1E+21`,
//! `1.5E-07`), the way the host formats doubles.

use crate::cell::CellValue;
use crate::date::serial_to_datetime;
use crate::error::ConversionError;
use crate::types::{Value, ValueType};
use chrono::{NaiveDate, NaiveDateTime};

type ConversionResult = std::result::Result<Value, ConversionError>;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Convert a cell into a value of `target`
pub fn coerce(raw: &CellValue, target: &ValueType) -> ConversionResult {
    let fail = |reason: &str| Err(ConversionError::new(raw.type_name(), target, reason));

    match raw {
        CellValue::Empty => return fail("cell is empty"),
        CellValue::Error(e) => return fail(e.as_str()),
        _ => {}
    }

    match target {
        ValueType::DateTime => to_datetime(raw).map(Value::DateTime).map_or_else(
            || fail("not a date serial or date string"),
            Ok,
        ),
        ValueType::Double => match raw {
            CellValue::Number(n) => Ok(Value::Double(*n)),
            CellValue::Boolean(b) => Ok(Value::Double(if *b { 1.0 } else { 0.0 })),
            CellValue::String(s) => match s.as_str().trim().parse::<f64>() {
                Ok(n) => Ok(Value::Double(n)),
                Err(_) => fail("not a number"),
            },
            _ => fail("incompatible type"),
        },
        ValueType::Int32 => {
            let n = to_integer(raw, i64::from(i32::MIN), i64::from(i32::MAX))
                .map_err(|reason| ConversionError::new(raw.type_name(), target, reason))?;
            Ok(Value::Int32(n as i32))
        }
        ValueType::Int64 => {
            let n = to_integer(raw, i64::MIN, i64::MAX)
                .map_err(|reason| ConversionError::new(raw.type_name(), target, reason))?;
            Ok(Value::Int64(n))
        }
        ValueType::String => match raw {
            CellValue::String(s) => Ok(Value::String(s.as_str().to_string())),
            CellValue::Number(n) => Ok(Value::String(format_number(*n))),
            CellValue::Boolean(b) => Ok(Value::String(if *b { "True" } else { "False" }.into())),
            CellValue::DateTime(dt) => Ok(Value::String(raw_datetime_text(dt))),
            _ => fail("incompatible type"),
        },
        ValueType::Boolean => match raw {
            CellValue::Boolean(b) => Ok(Value::Boolean(*b)),
            CellValue::Number(n) => Ok(Value::Boolean(*n != 0.0)),
            CellValue::String(s) => {
                let text = s.as_str().trim();
                if text.eq_ignore_ascii_case("true") {
                    Ok(Value::Boolean(true))
                } else if text.eq_ignore_ascii_case("false") {
                    Ok(Value::Boolean(false))
                } else {
                    fail("not a boolean")
                }
            }
            _ => fail("incompatible type"),
        },
        ValueType::CellArray
        | ValueType::Record(_)
        | ValueType::Sequence(_)
        | ValueType::Generic { .. } => fail("target is not a scalar type"),
    }
}

fn to_datetime(raw: &CellValue) -> Option<NaiveDateTime> {
    match raw {
        CellValue::Number(serial) => serial_to_datetime(*serial),
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::String(s) => parse_datetime(s.as_str().trim()),
        _ => None,
    }
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn raw_datetime_text(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Round half to even, then range check against `min..=max`
fn to_integer(raw: &CellValue, min: i64, max: i64) -> std::result::Result<i64, &'static str> {
    let n = match raw {
        CellValue::Number(n) => round_half_even(*n),
        CellValue::Boolean(b) => return Ok(i64::from(*b)),
        CellValue::String(s) => {
            return s
                .as_str()
                .trim()
                .parse::<i64>()
                .map_err(|_| "not an integer")
                .and_then(|n| {
                    if n < min || n > max {
                        Err("value out of range")
                    } else {
                        Ok(n)
                    }
                })
        }
        _ => return Err("incompatible type"),
    };

    // `max + 1` is a power of two, so `-min` is exact as an f64 where `max` is not.
    if n.is_nan() || n < min as f64 || n >= -(min as f64) {
        return Err("value out of range");
    }
    Ok(n as i64)
}

/// Shortest round-trip text for a double, in exponent form outside 1e-5..1e15
fn format_number(n: f64) -> String {
    if !n.is_finite() || n == 0.0 {
        return n.to_string();
    }
    let magnitude = n.abs();
    if (1e-5..1e15).contains(&magnitude) {
        return n.to_string();
    }
    let scientific = format!("{n:e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}E{sign}{digits:0>2}")
        }
        None => scientific,
    }
}

fn round_half_even(n: f64) -> f64 {
    let rounded = n.round();
    if (n - n.trunc()).abs() == 0.5 && rounded % 2.0 != 0.0 {
        rounded - n.signum()
    } else {
        rounded
    }
}
