//! Sequence functions. Multi-node path results arrive as arrays.

use super::{check_args, int_arg};
use crate::{error::EvalError, value::Value};

/// Call a sequence function. Returns None if function not found.
pub fn call(name: &str, args: &[Value]) -> Result<Option<Value>, EvalError> {
    let result = match name {
        "any" => {
            check_args(name, args, 1, 1)?;
            let any = args[0].as_array().is_some_and(|items| !items.is_empty());
            Some(Value::Boolean(any))
        }

        "first" => {
            check_args(name, args, 1, 1)?;
            Some(element(&args[0], |items| items.first()))
        }

        "last" => {
            check_args(name, args, 1, 1)?;
            Some(element(&args[0], |items| items.last()))
        }

        "at" => {
            check_args(name, args, 2, 2)?;
            let index = int_arg(args, 1);
            Some(element(&args[0], |items| {
                usize::try_from(index).ok().and_then(|i| items.get(i))
            }))
        }

        "length" => {
            check_args(name, args, 1, 1)?;
            let length = match &args[0] {
                Value::Array(items) => Some(items.len()),
                Value::Object(fields) => Some(fields.len()),
                Value::Text(s) => Some(s.chars().count()),
                _ => None,
            };
            Some(length.map_or(Value::Null, |n| Value::from(n as i64)))
        }

        _ => None,
    };

    Ok(result)
}

fn element<F>(value: &Value, pick: F) -> Value
where
    F: for<'v> Fn(&'v [Value]) -> Option<&'v Value>,
{
    value
        .as_array()
        .and_then(pick)
        .cloned()
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles() -> Value {
        Value::Array(vec![Value::from("dev"), Value::from("manager")])
    }

    #[test]
    fn test_any() {
        assert_eq!(call("any", &[roles()]).unwrap(), Some(Value::from(true)));
        assert_eq!(
            call("any", &[Value::Array(vec![])]).unwrap(),
            Some(Value::from(false))
        );
        assert_eq!(call("any", &[Value::Null]).unwrap(), Some(Value::from(false)));
    }

    #[test]
    fn test_element_access() {
        assert_eq!(call("first", &[roles()]).unwrap(), Some(Value::from("dev")));
        assert_eq!(call("last", &[roles()]).unwrap(), Some(Value::from("manager")));
        assert_eq!(
            call("at", &[roles(), Value::from(1)]).unwrap(),
            Some(Value::from("manager"))
        );
        assert_eq!(call("at", &[roles(), Value::from(5)]).unwrap(), Some(Value::Null));
        assert_eq!(call("first", &[Value::from("x")]).unwrap(), Some(Value::Null));
    }

    #[test]
    fn test_length() {
        assert_eq!(call("length", &[roles()]).unwrap(), Some(Value::from(2)));
        assert_eq!(call("length", &[Value::from("héllo")]).unwrap(), Some(Value::from(5)));
        assert_eq!(call("length", &[Value::Null]).unwrap(), Some(Value::Null));
    }
}
