//! Running state for the SELECT aggregates.

use rust_decimal::Decimal;

use crate::ast::AggregateKind;

/// One aggregate's fold state.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Accumulator {
    Count(Decimal),
    Sum(Decimal),
    /// `None` until the first value arrives
    Min(Option<Decimal>),
    Max(Decimal),
    Avg { sum: Decimal, count: Decimal },
}

impl Accumulator {
    pub(crate) fn new(kind: AggregateKind) -> Self {
        match kind {
            AggregateKind::Count => Accumulator::Count(Decimal::ZERO),
            AggregateKind::Sum => Accumulator::Sum(Decimal::ZERO),
            AggregateKind::Min => Accumulator::Min(None),
            AggregateKind::Max => Accumulator::Max(Decimal::ZERO),
            AggregateKind::Avg => Accumulator::Avg {
                sum: Decimal::ZERO,
                count: Decimal::ZERO,
            },
        }
    }

    pub(crate) fn add(&mut self, value: Decimal) {
        match self {
            Accumulator::Count(count) => *count = saturating_add(*count, Decimal::ONE),
            Accumulator::Sum(sum) => *sum = saturating_add(*sum, value),
            Accumulator::Min(min) => {
                if min.is_none_or(|current| value < current) {
                    *min = Some(value);
                }
            }
            Accumulator::Max(max) => {
                if value > *max {
                    *max = value;
                }
            }
            Accumulator::Avg { sum, count } => {
                *sum = saturating_add(*sum, value);
                *count = saturating_add(*count, Decimal::ONE);
            }
        }
    }

    /// The value to report. Aggregates that saw no rows report 0.
    pub(crate) fn result(&self) -> Decimal {
        match self {
            Accumulator::Count(n) | Accumulator::Sum(n) | Accumulator::Max(n) => *n,
            Accumulator::Min(min) => min.unwrap_or(Decimal::ZERO),
            Accumulator::Avg { sum, count } => sum.checked_div(*count).unwrap_or(Decimal::ZERO),
        }
    }
}

fn saturating_add(a: Decimal, b: Decimal) -> Decimal {
    a.checked_add(b).unwrap_or(if b.is_sign_negative() {
        Decimal::MIN
    } else {
        Decimal::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold(kind: AggregateKind, values: &[i64]) -> Decimal {
        let mut accumulator = Accumulator::new(kind);
        for v in values {
            accumulator.add(Decimal::from(*v));
        }
        accumulator.result()
    }

    #[test]
    fn test_folds() {
        let ages = [23, 45, 45];
        assert_eq!(fold(AggregateKind::Count, &ages), Decimal::from(3));
        assert_eq!(fold(AggregateKind::Sum, &ages), Decimal::from(113));
        assert_eq!(fold(AggregateKind::Min, &ages), Decimal::from(23));
        assert_eq!(fold(AggregateKind::Max, &ages), Decimal::from(45));
        assert_eq!(
            fold(AggregateKind::Avg, &ages).round_dp(2),
            Decimal::new(3767, 2)
        );
    }

    #[test]
    fn test_empty_input_reports_zero() {
        for kind in [
            AggregateKind::Count,
            AggregateKind::Sum,
            AggregateKind::Min,
            AggregateKind::Max,
            AggregateKind::Avg,
        ] {
            assert_eq!(fold(kind, &[]), Decimal::ZERO, "{}", kind);
        }
    }

    #[test]
    fn test_min_of_negatives() {
        assert_eq!(fold(AggregateKind::Min, &[-3, -7]), Decimal::from(-7));
    }
}
