//! Maps a sort mode to its ORDER BY plan.
//!
//! Every plan terminates in `id ASC` so the ordering is total. A full-text
//! relevance term participates only for offset pagination: rank is relative
//! to the query, so it cannot be reconstructed from a stored cursor value,
//! and including it in keyset mode would order page 1 and page 2 by
//! different criteria.

use crate::query::{
    ast::{
        common::{NullsOrder, OrderDir},
        expr::Expr,
        select::OrderByExpr,
    },
    ident,
    renderer::{Render, Renderer},
};
use model::search::sort::{KeyDir, SortMode};

/// Builds the ORDER BY terms for a sort mode.
///
/// `fts_param` is the 1-based placeholder number of an already-bound
/// full-text query parameter; when present and `keyset` is false, a
/// `ts_rank_cd` term leads the ordering. DESC keyset columns order
/// `NULLS LAST` so NULL sorts after every value in every mode.
pub fn order_by_plan(sort: SortMode, fts_param: Option<usize>, keyset: bool) -> Vec<OrderByExpr> {
    let mut terms = Vec::new();

    if let Some(param) = fts_param
        && !keyset
    {
        terms.push(OrderByExpr::new(
            Expr::Literal(format!(
                "ts_rank_cd(\"search_vector\", websearch_to_tsquery('english', ${param}))"
            )),
            Some(OrderDir::Desc),
        ));
    }

    for key in sort.key_columns() {
        let term = match key.dir {
            KeyDir::Asc => OrderByExpr::new(ident(key.column), Some(OrderDir::Asc)),
            KeyDir::Desc => OrderByExpr::new(ident(key.column), Some(OrderDir::Desc))
                .nulls(NullsOrder::Last),
        };
        terms.push(term);
    }

    terms.push(OrderByExpr::new(ident("id"), Some(OrderDir::Asc)));
    terms
}

/// Renders the plan as a bare ORDER BY fragment (without the keyword).
pub fn order_by_sql(sort: SortMode, fts_param: Option<usize>, keyset: bool) -> String {
    let mut renderer = Renderer::new();
    for (i, term) in order_by_plan(sort, fts_param, keyset).iter().enumerate() {
        if i > 0 {
            renderer.push(", ");
        }
        term.render(&mut renderer);
    }
    renderer.finish().0
}
