use crate::{
    model::Value,
    query::predicate::{CompareOp, ComparePredicate, Predicate},
    store::Record,
};
use std::cmp::Ordering;

// Evaluate against a present, non-null field. A null or missing field
// yields `None` (SQL unknown).
fn on_value<R: Record + ?Sized>(
    row: &R,
    field: &str,
    f: impl FnOnce(&Value) -> bool,
) -> Option<bool> {
    row.field(field)
        .filter(|value| !value.is_null())
        .map(|value| f(&value))
}

///
/// Evaluate a predicate against a single row.
///
/// This is pure runtime evaluation used by in-memory adapters. Comparisons
/// follow SQL three-valued semantics: a null or missing field makes every
/// comparison unknown, `Not` keeps it unknown, and only rows that evaluate
/// to true are selected. `IsNull` is the one test that selects such a row.
///
#[must_use]
pub fn eval<R: Record + ?Sized>(row: &R, predicate: &Predicate) -> bool {
    eval_tri(row, predicate) == Some(true)
}

// Kleene logic over `Option<bool>`, `None` being unknown.
fn eval_tri<R: Record + ?Sized>(row: &R, predicate: &Predicate) -> Option<bool> {
    match predicate {
        Predicate::True => Some(true),
        Predicate::False => Some(false),

        Predicate::And(children) => {
            let mut result = Some(true);
            for child in children {
                match eval_tri(row, child) {
                    Some(false) => return Some(false),
                    None => result = None,
                    Some(true) => {}
                }
            }
            result
        }
        Predicate::Or(children) => {
            let mut result = Some(false);
            for child in children {
                match eval_tri(row, child) {
                    Some(true) => return Some(true),
                    None => result = None,
                    Some(false) => {}
                }
            }
            result
        }
        Predicate::Not(inner) => eval_tri(row, inner).map(|value| !value),

        Predicate::Compare(cmp) => eval_compare(row, cmp),

        Predicate::In { field, values } => on_value(row, field, |actual| {
            values.iter().any(|v| actual.strict_cmp(v) == Some(Ordering::Equal))
        }),
        Predicate::NotIn { field, values } => on_value(row, field, |actual| {
            values.iter().all(|v| actual.strict_cmp(v) != Some(Ordering::Equal))
        }),

        Predicate::Between { field, low, high } => on_value(row, field, |actual| {
            actual.strict_cmp(low).is_some_and(Ordering::is_ge)
                && actual.strict_cmp(high).is_some_and(Ordering::is_le)
        }),

        Predicate::IsNull { field } => Some(row.field(field).is_none_or(|value| value.is_null())),
        Predicate::IsNotNull { field } => Some(on_value(row, field, |_| true).is_some()),

        Predicate::Matches { field, pattern } => on_value(row, field, |actual| {
            actual.as_text().is_some_and(|text| pattern.matches(text))
        }),
        Predicate::NotMatches { field, pattern } => on_value(row, field, |actual| {
            actual.as_text().is_some_and(|text| !pattern.matches(text))
        }),
    }
}

///
/// Evaluate a single comparison predicate against a row.
///
/// Unknown if the field is missing or null; `false` if the comparison is
/// not defined between the two values.
///
fn eval_compare<R: Record + ?Sized>(row: &R, cmp: &ComparePredicate) -> Option<bool> {
    let ComparePredicate { field, op, value } = cmp;

    on_value(row, field, |actual| match op {
        CompareOp::Eq => actual.strict_cmp(value) == Some(Ordering::Equal),
        CompareOp::Ne => actual.strict_cmp(value).is_some_and(Ordering::is_ne),

        CompareOp::Lt => actual.strict_cmp(value).is_some_and(Ordering::is_lt),
        CompareOp::Lte => actual.strict_cmp(value).is_some_and(Ordering::is_le),
        CompareOp::Gt => actual.strict_cmp(value).is_some_and(Ordering::is_gt),
        CompareOp::Gte => actual.strict_cmp(value).is_some_and(Ordering::is_ge),

        CompareOp::Contains => text_op(actual, value, |a, b| a.contains(b)),
        CompareOp::StartsWith => text_op(actual, value, |a, b| a.starts_with(b)),
        CompareOp::EndsWith => text_op(actual, value, |a, b| a.ends_with(b)),
    })
}

fn text_op(actual: &Value, needle: &Value, f: impl FnOnce(&str, &str) -> bool) -> bool {
    match (actual.as_text(), needle.as_text()) {
        (Some(actual), Some(needle)) => f(actual, needle),
        _ => false,
    }
}
