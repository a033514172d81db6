//! List and map query construction for the three pagination shapes.

use crate::queries::{SEARCH_DOCS_TABLE, filters::build_filter};
use connectors::{row::RowData, store::SqlStatement};
use model::{
    core::value::Value,
    pagination::cursor::CursorRowData,
    search::{
        filter::{BoundingBox, SearchFilter},
        sort::SortMode,
    },
};
use planner::{
    query::{
        ast::{
            common::OrderDir,
            expr::Expr,
            select::OrderByExpr,
        },
        builder::select::SelectBuilder,
        ident,
        keyset::{KeysetBound, keyset_predicate},
        order_by::order_by_plan,
        renderer::render_postgres,
    },
    table_ref,
};

/// Which pagination shape a listing query takes.
#[derive(Debug, Clone, PartialEq)]
pub enum PageMode {
    /// First page of keyset pagination (no resume point yet).
    KeysetFirst,
    /// Continuation strictly after a decoded cursor bound.
    KeysetAfter(KeysetBound),
    /// Legacy page-number pagination.
    Offset { page: u64 },
}

impl PageMode {
    pub fn is_keyset(&self) -> bool {
        !matches!(self, PageMode::Offset { .. })
    }
}

const DISPLAY_COLUMNS: &[&str] = &[
    "id",
    "title",
    "price",
    "room_type",
    "avg_rating",
    "review_count",
    "recommended_score",
    "lat",
    "lng",
    "listing_created_at",
];

fn display_columns() -> Vec<Expr> {
    let mut columns: Vec<Expr> = DISPLAY_COLUMNS.iter().map(|c| ident(c)).collect();
    columns.push(Expr::Alias {
        expr: Box::new(Expr::Literal("COUNT(*) OVER ()".to_string())),
        alias: "total_count".to_string(),
    });
    columns
}

/// Builds the list query for one page. The limit is always `page_size + 1`:
/// the extra row is the look-ahead that tells the service whether a next
/// page exists, and is trimmed before the response is shaped.
pub fn listing_statement(
    filter: &SearchFilter,
    bounds: Option<&BoundingBox>,
    sort: SortMode,
    mode: &PageMode,
    page_size: usize,
) -> SqlStatement {
    let pred = build_filter(filter, bounds, None);

    let mut builder = SelectBuilder::new()
        .select(display_columns())
        .from(table_ref!(SEARCH_DOCS_TABLE), None);

    if let Some(expr) = pred.expr {
        builder = builder.and_where(expr);
    }
    if let PageMode::KeysetAfter(bound) = mode {
        builder = builder.and_where(keyset_predicate(bound));
    }

    builder = builder.order_by_all(order_by_plan(sort, pred.fts_param, mode.is_keyset()));
    builder = builder.limit(Expr::Value(Value::Int(page_size as i64 + 1)));

    if let PageMode::Offset { page } = mode {
        let offset = page.saturating_sub(1) * page_size as u64;
        builder = builder.offset(Expr::Value(Value::Int(offset as i64)));
    }

    let (sql, params) = render_postgres(&builder.build());
    SqlStatement::new(sql, params)
}

/// Builds the map query: every matching pin up to the cap, no pagination.
pub fn map_statement(
    filter: &SearchFilter,
    bounds: Option<&BoundingBox>,
    cap: usize,
) -> SqlStatement {
    let pred = build_filter(filter, bounds, None);

    let mut builder = SelectBuilder::new()
        .select(vec![
            ident("id"),
            ident("lat"),
            ident("lng"),
            ident("price"),
        ])
        .from(table_ref!(SEARCH_DOCS_TABLE), None);

    if let Some(expr) = pred.expr {
        builder = builder.and_where(expr);
    }

    builder = builder
        .order_by(OrderByExpr::new(ident("id"), Some(OrderDir::Asc)))
        .limit(Expr::Value(Value::Int(cap as i64)));

    let (sql, params) = render_postgres(&builder.build());
    SqlStatement::new(sql, params)
}

/// Projects the cursor-relevant fields out of a result row, preserving
/// NULLs.
pub fn cursor_row(row: &RowData) -> CursorRowData {
    CursorRowData {
        id: row.get_string("id").unwrap_or_default(),
        listing_created_at: row.get_timestamp("listing_created_at"),
        recommended_score: row.get_decimal("recommended_score"),
        price: row.get_decimal("price"),
        avg_rating: row.get_decimal("avg_rating"),
        review_count: row.get_i64("review_count"),
    }
}
