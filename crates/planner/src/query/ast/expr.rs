//! Defines the AST for SQL expressions.

use model::core::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A column or table identifier, e.g., `listings` or `listings.id`.
    Identifier(Ident),

    /// A literal value bound as a query parameter.
    Value(Value),

    /// A binary operation, e.g., `price <= $1` or `a AND b`.
    BinaryOp(Box<BinaryOp>),

    /// A function call, e.g., `COUNT(*)` or `unnest(amenities)`.
    FunctionCall(FunctionCall),

    /// An aliased expression, e.g. `COUNT(*) AS total_count`.
    Alias { expr: Box<Expr>, alias: String },

    /// A raw SQL fragment emitted verbatim. Only ever built from constants,
    /// never from request data — request data goes through `Value`.
    Literal(String),

    /// A parenthesized row value, e.g. `($1, $2, $3)`.
    Tuple(Vec<Expr>),

    /// `expr IS NULL` / `expr IS NOT NULL`.
    IsNull { expr: Box<Expr>, negated: bool },
}

impl Expr {
    /// Number of bind parameters this expression contributes, in render
    /// order. Used to address a parameter from a later clause (e.g. the
    /// full-text rank term referencing the query parameter by index).
    pub fn param_count(&self) -> usize {
        match self {
            Expr::Identifier(_) | Expr::Literal(_) => 0,
            Expr::Value(_) => 1,
            Expr::BinaryOp(op) => op.left.param_count() + op.right.param_count(),
            Expr::FunctionCall(call) => call.args.iter().map(Expr::param_count).sum(),
            Expr::Alias { expr, .. } => expr.param_count(),
            Expr::Tuple(items) => items.iter().map(Expr::param_count).sum(),
            Expr::IsNull { expr, .. } => expr.param_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub qualifier: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub left: Expr,
    pub op: BinaryOperator,
    pub right: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: Vec<Expr>,
    pub wildcard: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BinaryOperator {
    // Comparison
    Eq,    // =
    NotEq, // <>
    Lt,    // <
    LtEq,  // <=
    Gt,    // >
    GtEq,  // >=

    /// NULL-safe equality, `IS NOT DISTINCT FROM`.
    NotDistinctFrom,

    // Logical
    And,
    Or,

    /// Full-text match, `@@`.
    TsMatch,

    /// Array containment, `@>`.
    Contains,
}

/// Folds a list of predicates into one AND chain. `None` when empty.
pub fn and_all(mut exprs: Vec<Expr>) -> Option<Expr> {
    if exprs.is_empty() {
        return None;
    }
    let first = exprs.remove(0);
    Some(exprs.into_iter().fold(first, |acc, e| {
        Expr::BinaryOp(Box::new(BinaryOp {
            left: acc,
            op: BinaryOperator::And,
            right: e,
        }))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ident, value};

    #[test]
    fn test_param_count_walks_the_tree() {
        let expr = Expr::BinaryOp(Box::new(BinaryOp {
            left: Expr::BinaryOp(Box::new(BinaryOp {
                left: ident("price"),
                op: BinaryOperator::GtEq,
                right: value(Value::Int(10)),
            })),
            op: BinaryOperator::And,
            right: Expr::Tuple(vec![value(Value::Int(1)), value(Value::Int(2))]),
        }));
        assert_eq!(expr.param_count(), 3);
        assert_eq!(ident("price").param_count(), 0);
    }

    #[test]
    fn test_and_all_folds_left() {
        assert_eq!(and_all(vec![]), None);

        let single = and_all(vec![ident("a")]).unwrap();
        assert_eq!(single, ident("a"));

        let folded = and_all(vec![ident("a"), ident("b"), ident("c")]).unwrap();
        match folded {
            Expr::BinaryOp(op) => {
                assert_eq!(op.op, BinaryOperator::And);
                assert_eq!(op.right, ident("c"));
            }
            other => panic!("expected BinaryOp, got {other:?}"),
        }
    }
}
