//! Text functions.

use super::{check_args, int_arg};
use crate::{error::EvalError, value::Value};

/// Call a text function. Returns None if function not found.
pub fn call(name: &str, args: &[Value]) -> Result<Option<Value>, EvalError> {
    let result = match name {
        "sub" => {
            check_args(name, args, 2, 3)?;
            let Some(s) = args[0].as_text() else {
                return Ok(Some(Value::Null));
            };
            let len = if args.len() == 3 {
                Some(int_arg(args, 2))
            } else {
                None
            };
            Some(Value::Text(substring(s, int_arg(args, 1), len)))
        }

        "rtrim" => map_text(name, args, |s| s.trim_end().to_string())?,
        "ltrim" => map_text(name, args, |s| s.trim_start().to_string())?,
        "trim" => map_text(name, args, |s| s.trim().to_string())?,
        "upper" => map_text(name, args, str::to_uppercase)?,
        "lower" => map_text(name, args, str::to_lowercase)?,

        "starts" => {
            check_args(name, args, 2, 3)?;
            let ignore_case = args.get(2).is_some_and(Value::as_bool);
            let starts = match (args[0].as_text(), args[1].as_text()) {
                (Some(s), Some(prefix)) if ignore_case => {
                    s.to_lowercase().starts_with(&prefix.to_lowercase())
                }
                (Some(s), Some(prefix)) => s.starts_with(prefix),
                _ => false,
            };
            Some(Value::Boolean(starts))
        }

        "split" => {
            check_args(name, args, 2, 2)?;
            let parts = match args[0].as_text() {
                Some(s) => {
                    let separator = args[1].as_string();
                    if separator.is_empty() {
                        vec![Value::from(s)]
                    } else {
                        s.split(separator.as_str()).map(Value::from).collect()
                    }
                }
                None => Vec::new(),
            };
            Some(Value::Array(parts))
        }

        "join" => {
            check_args(name, args, 2, 2)?;
            let separator = args[0].as_string();
            let joined = match &args[1] {
                Value::Array(items) => items
                    .iter()
                    .map(Value::as_string)
                    .collect::<Vec<_>>()
                    .join(&separator),
                other => other.as_string(),
            };
            Some(Value::Text(joined))
        }

        _ => None,
    };

    Ok(result)
}

fn map_text<F>(name: &str, args: &[Value], f: F) -> Result<Option<Value>, EvalError>
where
    F: Fn(&str) -> String,
{
    check_args(name, args, 1, 1)?;
    Ok(Some(match args[0].as_text() {
        Some(s) => Value::Text(f(s)),
        None => Value::Null,
    }))
}

/// Character-indexed substring. A start outside the text gives `""`; the
/// length is clamped to what is left.
fn substring(s: &str, start: i64, len: Option<i64>) -> String {
    let count = s.chars().count() as i64;
    if start < 0 || start > count {
        return String::new();
    }

    let available = count - start;
    let take = len.map_or(available, |n| n.clamp(0, available));
    s.chars().skip(start as usize).take(take as usize).collect()
}
