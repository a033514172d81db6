//! Translates a keyset cursor into a "strictly after this row" predicate.
//!
//! The predicate is the lexicographic expansion over the sort-key tuple plus
//! the `id` tie-break, with per-column direction:
//!
//! ```text
//! after(k1) OR (k1 == v1 AND (after(k2) OR (k2 == v2 AND id > vid)))
//! ```
//!
//! Equality steps use `IS NOT DISTINCT FROM` so NULL keys tie with NULL
//! rows. The strict step for a non-null value also admits NULL rows (they
//! order last under the NULLS LAST plan); after a NULL value only the
//! tie-break chain continues, since NULL is the final position for that
//! column.

use crate::query::{
    ast::expr::{BinaryOp, BinaryOperator, Expr},
    ident,
};
use model::{
    core::value::Value,
    pagination::cursor::{KeysetCursor, parse_key_value},
    search::sort::{KeyDir, SortKey},
};

/// A cursor with its key values parsed back into typed SQL parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct KeysetBound {
    pub keys: Vec<(SortKey, Option<Value>)>,
    pub id: String,
}

impl KeysetBound {
    /// Parses a well-formed cursor's string keys into typed values.
    /// Returns `None` when any non-null key fails to parse as its declared
    /// kind — the caller treats that cursor as absent.
    pub fn from_cursor(cursor: &KeysetCursor) -> Option<Self> {
        let columns = cursor.s.key_columns();
        if cursor.k.len() != columns.len() || cursor.id.is_empty() {
            return None;
        }

        let mut keys = Vec::with_capacity(columns.len());
        for (key, raw) in columns.iter().zip(&cursor.k) {
            let value = match raw {
                Some(raw) => Some(parse_key_value(key.kind, raw)?),
                None => None,
            };
            keys.push((*key, value));
        }

        Some(Self {
            keys,
            id: cursor.id.clone(),
        })
    }
}

/// Builds the strictly-after predicate for a parsed cursor bound.
pub fn keyset_predicate(bound: &KeysetBound) -> Expr {
    // Innermost link: the unique tie-break.
    let mut pred = binop(
        ident("id"),
        BinaryOperator::Gt,
        Expr::Value(Value::String(bound.id.clone())),
    );

    for (key, value) in bound.keys.iter().rev() {
        let eq = match value {
            Some(v) => binop(
                ident(key.column),
                BinaryOperator::NotDistinctFrom,
                Expr::Value(v.clone()),
            ),
            None => is_null(key.column),
        };
        let eq_and_rest = binop(eq, BinaryOperator::And, pred);

        pred = match value {
            Some(v) => {
                let cmp = match key.dir {
                    KeyDir::Asc => BinaryOperator::Gt,
                    KeyDir::Desc => BinaryOperator::Lt,
                };
                let strict = binop(
                    binop(ident(key.column), cmp, Expr::Value(v.clone())),
                    BinaryOperator::Or,
                    is_null(key.column),
                );
                binop(strict, BinaryOperator::Or, eq_and_rest)
            }
            // NULL is the last position for this column, so there is no
            // strict step, only the tie-break continuation.
            None => eq_and_rest,
        };
    }

    pred
}

fn binop(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::BinaryOp(Box::new(BinaryOp { left, op, right }))
}

fn is_null(column: &str) -> Expr {
    Expr::IsNull {
        expr: Box::new(ident(column)),
        negated: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::renderer::render_postgres;
    use bigdecimal::BigDecimal;
    use chrono::{TimeZone, Utc};
    use model::search::sort::SortMode;
    use std::str::FromStr;

    fn cursor(sort: SortMode, k: Vec<Option<&str>>, id: &str) -> KeysetCursor {
        KeysetCursor::new(
            sort,
            k.into_iter().map(|v| v.map(String::from)).collect(),
            id.to_string(),
        )
    }

    #[test]
    fn test_recommended_predicate_expansion() {
        let bound = KeysetBound::from_cursor(&cursor(
            SortMode::Recommended,
            vec![Some("85.5"), Some("2026-01-02T03:04:05Z")],
            "abc",
        ))
        .unwrap();

        let (sql, params) = render_postgres(&keyset_predicate(&bound));
        assert_eq!(
            sql,
            "(((\"recommended_score\" < $1) OR \"recommended_score\" IS NULL) OR \
             ((\"recommended_score\" IS NOT DISTINCT FROM $2) AND \
             (((\"listing_created_at\" < $3) OR \"listing_created_at\" IS NULL) OR \
             ((\"listing_created_at\" IS NOT DISTINCT FROM $4) AND (\"id\" > $5)))))"
        );

        let score = Value::Decimal(BigDecimal::from_str("85.5").unwrap());
        let ts = Value::Timestamp(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap());
        assert_eq!(
            params,
            vec![
                score.clone(),
                score,
                ts.clone(),
                ts,
                Value::String("abc".into())
            ]
        );
    }

    #[test]
    fn test_ascending_column_compares_greater() {
        let bound = KeysetBound::from_cursor(&cursor(
            SortMode::PriceAsc,
            vec![Some("120"), Some("2026-01-02T03:04:05Z")],
            "abc",
        ))
        .unwrap();

        let (sql, _) = render_postgres(&keyset_predicate(&bound));
        assert!(sql.contains("(\"price\" > $1)"));
        assert!(sql.contains("(\"listing_created_at\" < $3)"));
    }

    #[test]
    fn test_null_key_drops_strict_step() {
        let bound = KeysetBound::from_cursor(&cursor(
            SortMode::Rating,
            vec![None, Some("12"), Some("2026-01-02T03:04:05Z")],
            "abc",
        ))
        .unwrap();

        let (sql, params) = render_postgres(&keyset_predicate(&bound));
        assert!(sql.starts_with("(\"avg_rating\" IS NULL AND "));
        assert!(!sql.contains("\"avg_rating\" <"));
        // review_count still gets its strict + equality steps.
        assert!(sql.contains("(\"review_count\" < $1)"));
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn test_unparseable_key_invalidates_the_bound() {
        let bad = cursor(SortMode::Newest, vec![Some("not a timestamp")], "abc");
        assert_eq!(KeysetBound::from_cursor(&bad), None);

        let bad_int = cursor(
            SortMode::Rating,
            vec![Some("4.5"), Some("not an int"), Some("2026-01-02T03:04:05Z")],
            "abc",
        );
        assert_eq!(KeysetBound::from_cursor(&bad_int), None);
    }

    #[test]
    fn test_single_key_mode_still_tuple_compares() {
        let bound = KeysetBound::from_cursor(&cursor(
            SortMode::Newest,
            vec![Some("2026-01-02T03:04:05Z")],
            "abc",
        ))
        .unwrap();

        let (sql, _) = render_postgres(&keyset_predicate(&bound));
        // Not merely id > $n: the created_at key participates.
        assert!(sql.contains("\"listing_created_at\""));
        assert!(sql.contains("(\"id\" > $3)"));
    }
}
