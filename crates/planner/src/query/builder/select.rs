//! Provides a type-safe, fluent builder for constructing `Select` ASTs.

// Typestate marker structs: zero-sized types that ensure clauses are added
// in valid SQL order at compile time.

use crate::query::ast::{
    common::TableRef,
    expr::{BinaryOp, BinaryOperator, Expr},
    select::{FromClause, OrderByExpr, Select},
};

/// The initial state of the builder before any clauses have been added.
#[derive(Debug, Default, Clone)]
pub struct InitialState;

/// The state after the `SELECT` clause has been added.
#[derive(Debug, Default, Clone)]
pub struct SelectState;

/// The state after the `FROM` clause has been added.
#[derive(Debug, Default, Clone)]
pub struct FromState;

#[derive(Debug, Clone)]
pub struct SelectBuilder<State> {
    pub ast: Select,
    state: State,
}

impl SelectBuilder<InitialState> {
    pub fn new() -> Self {
        Self {
            ast: Select::default(),
            state: InitialState,
        }
    }

    /// Adds a `SELECT` clause with a list of columns.
    pub fn select(mut self, columns: Vec<Expr>) -> SelectBuilder<SelectState> {
        self.ast.columns = columns;
        SelectBuilder {
            ast: self.ast,
            state: SelectState,
        }
    }
}

impl Default for SelectBuilder<InitialState> {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectBuilder<SelectState> {
    /// Adds a `FROM` clause specifying the primary table.
    pub fn from(mut self, table: TableRef, alias: Option<&str>) -> SelectBuilder<FromState> {
        self.ast.from = Some(FromClause {
            table,
            alias: alias.map(String::from),
        });
        SelectBuilder {
            ast: self.ast,
            state: FromState,
        }
    }
}

impl SelectBuilder<FromState> {
    /// Sets the `WHERE` clause, replacing any existing condition.
    pub fn where_clause(mut self, condition: Expr) -> Self {
        self.ast.where_clause = Some(condition);
        self
    }

    /// ANDs a condition onto the existing `WHERE` clause, or sets it when
    /// none exists yet.
    pub fn and_where(mut self, condition: Expr) -> Self {
        self.ast.where_clause = match self.ast.where_clause.take() {
            Some(existing) => Some(Expr::BinaryOp(Box::new(BinaryOp {
                left: existing,
                op: BinaryOperator::And,
                right: condition,
            }))),
            None => Some(condition),
        };
        self
    }

    /// Appends one `ORDER BY` term.
    pub fn order_by(mut self, term: OrderByExpr) -> Self {
        self.ast.order_by.push(term);
        self
    }

    /// Appends a full `ORDER BY` plan.
    pub fn order_by_all(mut self, terms: Vec<OrderByExpr>) -> Self {
        self.ast.order_by.extend(terms);
        self
    }

    /// Adds a `LIMIT` clause.
    pub fn limit(mut self, limit: Expr) -> Self {
        self.ast.limit = Some(limit);
        self
    }

    /// Adds an `OFFSET` clause.
    pub fn offset(mut self, offset: Expr) -> Self {
        self.ast.offset = Some(offset);
        self
    }

    /// Finalizes and returns the constructed `Select` AST.
    pub fn build(self) -> Select {
        self.ast
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        query::{ident, value},
        table_ref,
    };
    use model::core::value::Value;

    #[test]
    fn test_build_simple_select() {
        let ast = SelectBuilder::new()
            .select(vec![ident("id"), ident("title")])
            .from(table_ref!("listing_search_docs"), None)
            .build();

        assert_eq!(ast.columns.len(), 2);
        assert_eq!(ast.from.unwrap().table.name, "listing_search_docs");
        assert!(ast.where_clause.is_none());
    }

    #[test]
    fn test_and_where_merges_conditions() {
        let ast = SelectBuilder::new()
            .select(vec![ident("id")])
            .from(table_ref!("listing_search_docs"), None)
            .and_where(Expr::BinaryOp(Box::new(BinaryOp {
                left: ident("status"),
                op: BinaryOperator::Eq,
                right: value(Value::String("active".into())),
            })))
            .and_where(Expr::BinaryOp(Box::new(BinaryOp {
                left: ident("price"),
                op: BinaryOperator::LtEq,
                right: value(Value::Int(200)),
            })))
            .build();

        match ast.where_clause.unwrap() {
            Expr::BinaryOp(op) => assert_eq!(op.op, BinaryOperator::And),
            other => panic!("expected AND chain, got {other:?}"),
        }
    }

    #[test]
    fn test_build_with_limit_and_offset() {
        let ast = SelectBuilder::new()
            .select(vec![ident("id")])
            .from(table_ref!("listing_search_docs"), None)
            .limit(value(Value::Int(21)))
            .offset(value(Value::Int(40)))
            .build();

        assert_eq!(ast.limit, Some(value(Value::Int(21))));
        assert_eq!(ast.offset, Some(value(Value::Int(40))));
    }
}
