//! Built-in functions available to every query, whatever the store.
//!
//! Names match case-insensitively. A name that is not built in is left to
//! the store's [`execute`](crate::store::DocumentStore::execute).

mod sequence;
mod text;
mod time;

use crate::{error::EvalError, value::Value};

/// Call a built-in function by name.
///
/// Returns `Ok(None)` if there is no built-in with that name.
pub fn call(name: &str, args: &[Value]) -> Result<Option<Value>, EvalError> {
    let lower_name = name.to_ascii_lowercase();

    if let Some(result) = text::call(&lower_name, args)? {
        return Ok(Some(result));
    }

    if let Some(result) = sequence::call(&lower_name, args)? {
        return Ok(Some(result));
    }

    time::call(&lower_name, args)
}

/// True if `name` is handled here rather than by the store.
pub fn is_builtin(name: &str) -> bool {
    NAMES.contains(&name.to_ascii_lowercase().as_str())
}

/// Every built-in name.
pub const NAMES: &[&str] = &[
    "sub", "rtrim", "ltrim", "trim", "upper", "lower", "starts", "split", "join", "any",
    "first", "last", "at", "length", "now", "utc", "year", "month", "day", "hour", "minute",
    "second",
];

fn check_args(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), EvalError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{} argument(s)", min)
        } else {
            format!("{} to {} arguments", min, max)
        };
        return Err(EvalError::invalid_argument(
            name,
            format!("expects {}, got {}", expected, args.len()),
        ));
    }
    Ok(())
}

/// Whole-number argument; anything non-numeric reads as 0.
fn int_arg(args: &[Value], index: usize) -> i64 {
    use rust_decimal::prelude::ToPrimitive;

    args.get(index)
        .map(|v| v.to_number().trunc().to_i64().unwrap_or(0))
        .unwrap_or(0)
}
