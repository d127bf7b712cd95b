//! Stable multi-key ordering with lazily evaluated keys.

use std::{cell::OnceCell, cmp::Ordering};

use crate::{error::EvalError, value::Value};

/// A document paired with its ORDER BY keys. A key is evaluated the first
/// time a comparison needs it and reused after that.
pub(crate) struct SortKeys<D> {
    document: D,
    keys: Vec<OnceCell<Value>>,
}

impl<D> SortKeys<D> {
    pub(crate) fn new(document: D, key_count: usize) -> Self {
        SortKeys {
            document,
            keys: (0..key_count).map(|_| OnceCell::new()).collect(),
        }
    }

    pub(crate) fn into_document(self) -> D {
        self.document
    }

    /// Key `index`, computing it with `evaluate` if this is the first use.
    pub(crate) fn key<F>(&self, index: usize, evaluate: F) -> Result<&Value, EvalError>
    where
        F: FnOnce(&D) -> Result<Value, EvalError>,
    {
        let cell = &self.keys[index];
        if let Some(value) = cell.get() {
            return Ok(value);
        }
        let value = evaluate(&self.document)?;
        Ok(cell.get_or_init(|| value))
    }
}

/// Stable merge sort with a comparator that may fail.
///
/// The first comparator error aborts the sort. Elements the comparator
/// reports as equal keep their input order.
pub(crate) fn stable_sort<T, F>(items: Vec<T>, mut compare: F) -> Result<Vec<T>, EvalError>
where
    F: FnMut(&T, &T) -> Result<Ordering, EvalError>,
{
    merge_sort(items, &mut compare)
}

fn merge_sort<T, F>(mut items: Vec<T>, compare: &mut F) -> Result<Vec<T>, EvalError>
where
    F: FnMut(&T, &T) -> Result<Ordering, EvalError>,
{
    if items.len() <= 1 {
        return Ok(items);
    }

    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare)?;
    let right = merge_sort(right, compare)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter();
    let mut right = right.into_iter();
    let mut next_left = left.next();
    let mut next_right = right.next();

    loop {
        match (next_left.take(), next_right.take()) {
            (Some(l), Some(r)) => {
                // right goes first only when strictly smaller
                if compare(&l, &r)? == Ordering::Greater {
                    merged.push(r);
                    next_left = Some(l);
                    next_right = right.next();
                } else {
                    merged.push(l);
                    next_left = left.next();
                    next_right = Some(r);
                }
            }
            (Some(l), None) => {
                merged.push(l);
                merged.extend(left);
                break;
            }
            (None, Some(r)) => {
                merged.push(r);
                merged.extend(right);
                break;
            }
            (None, None) => break,
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_is_stable() {
        let items = vec![(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd'), (0, 'e')];
        let sorted = stable_sort(items, |a, b| Ok(a.0.cmp(&b.0))).unwrap();
        assert_eq!(sorted, vec![(0, 'e'), (1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')]);
    }

    #[test]
    fn test_sort_stops_on_error() {
        let items = vec![3, 1, 2];
        let err = stable_sort(items, |_, _| {
            Err(EvalError::invalid_argument("boom", "no ordering"))
        })
        .unwrap_err();
        assert!(matches!(err, EvalError::InvalidArgument { .. }));
    }

    #[test]
    fn test_keys_are_evaluated_once() {
        let keyed = SortKeys::new(10, 1);
        let mut calls = 0;
        for _ in 0..3 {
            let value = keyed
                .key(0, |d| {
                    calls += 1;
                    Ok(Value::from(*d))
                })
                .unwrap();
            assert_eq!(value, &Value::from(10));
        }
        assert_eq!(calls, 1);
        assert_eq!(keyed.into_document(), 10);
    }
}
