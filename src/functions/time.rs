//! Date and time functions.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, Timelike, Utc};

use super::check_args;
use crate::{error::EvalError, value::Value};

/// Call a date/time function. Returns None if function not found.
pub fn call(name: &str, args: &[Value]) -> Result<Option<Value>, EvalError> {
    let result = match name {
        "now" => {
            check_args(name, args, 0, 0)?;
            Some(Value::Text(Local::now().to_rfc3339()))
        }

        "utc" => {
            check_args(name, args, 0, 0)?;
            Some(Value::Text(Utc::now().to_rfc3339()))
        }

        "year" => date_part(name, args, |dt| dt.year() as i64)?,
        "month" => date_part(name, args, |dt| dt.month() as i64)?,
        "day" => date_part(name, args, |dt| dt.day() as i64)?,
        "hour" => date_part(name, args, |dt| dt.hour() as i64)?,
        "minute" => date_part(name, args, |dt| dt.minute() as i64)?,
        "second" => date_part(name, args, |dt| dt.second() as i64)?,

        _ => None,
    };

    Ok(result)
}

/// A component of a date argument, or -1 if it does not read as a date.
fn date_part<F>(name: &str, args: &[Value], part: F) -> Result<Option<Value>, EvalError>
where
    F: Fn(&NaiveDateTime) -> i64,
{
    check_args(name, args, 1, 1)?;
    let value = args[0]
        .as_text()
        .and_then(parse_datetime)
        .map_or(-1, |dt| part(&dt));
    Ok(Some(Value::from(value)))
}

/// Date/time as written: offsets are kept rather than converted.
fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_and_utc_are_rfc3339() {
        for name in ["now", "utc"] {
            let Some(Value::Text(stamp)) = call(name, &[]).unwrap() else {
                panic!("{} should return text", name);
            };
            assert!(DateTime::parse_from_rfc3339(&stamp).is_ok(), "{}", stamp);
        }
    }

    #[test]
    fn test_date_parts() {
        let stamp = Value::from("2021-03-04T05:06:07Z");
        assert_eq!(call("year", &[stamp.clone()]).unwrap(), Some(Value::from(2021)));
        assert_eq!(call("month", &[stamp.clone()]).unwrap(), Some(Value::from(3)));
        assert_eq!(call("day", &[stamp.clone()]).unwrap(), Some(Value::from(4)));
        assert_eq!(call("hour", &[stamp.clone()]).unwrap(), Some(Value::from(5)));
        assert_eq!(call("minute", &[stamp.clone()]).unwrap(), Some(Value::from(6)));
        assert_eq!(call("second", &[stamp]).unwrap(), Some(Value::from(7)));
    }

    #[test]
    fn test_other_formats() {
        assert_eq!(
            call("hour", &[Value::from("2021-03-04 22:10:00")]).unwrap(),
            Some(Value::from(22))
        );
        assert_eq!(
            call("day", &[Value::from("2021-03-04")]).unwrap(),
            Some(Value::from(4))
        );
        assert_eq!(
            call("second", &[Value::from("2021-03-04T05:06:07.250")]).unwrap(),
            Some(Value::from(7))
        );
    }

    #[test]
    fn test_malformed_date_is_minus_one() {
        assert_eq!(call("year", &[Value::from("yesterday")]).unwrap(), Some(Value::from(-1)));
        assert_eq!(call("month", &[Value::Null]).unwrap(), Some(Value::from(-1)));
    }
}
