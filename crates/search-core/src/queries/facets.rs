//! Facet-count query construction.
//!
//! Each facet query wraps an inner projection of the matching documents
//! (filtered with the facet's own dimension suppressed) in a constant
//! aggregate shell. Everything user-influenced flows through the inner
//! SELECT's bound parameters; the shells contain no request data.

use crate::queries::{
    SEARCH_DOCS_TABLE,
    filters::{FacetDimension, build_filter},
};
use connectors::store::SqlStatement;
use model::search::filter::{BoundingBox, SearchFilter};
use planner::{
    query::{
        ast::{
            expr::{Expr, FunctionCall},
            select::Select,
        },
        builder::select::SelectBuilder,
        ident,
        renderer::{Render, Renderer, render_postgres},
    },
    table_ref,
};

/// Inner projection: one `value` column from the docs table under the given
/// predicate.
fn docs_select(column: Expr, pred: Option<Expr>) -> Select {
    let builder = SelectBuilder::new()
        .select(vec![Expr::Alias {
            expr: Box::new(column),
            alias: "value".to_string(),
        }])
        .from(table_ref!(SEARCH_DOCS_TABLE), None);
    match pred {
        Some(expr) => builder.where_clause(expr).build(),
        None => builder.build(),
    }
}

fn unnest(column: &str) -> Expr {
    Expr::FunctionCall(FunctionCall {
        name: "unnest".to_string(),
        args: vec![ident(column)],
        wildcard: false,
    })
}

/// `value -> count` aggregation over an inner projection.
struct ValueCountQuery {
    inner: Select,
    skip_nulls: bool,
}

impl Render for ValueCountQuery {
    fn render(&self, r: &mut Renderer) {
        r.push("SELECT x.\"value\" AS \"value\", COUNT(*) AS \"count\" FROM (");
        self.inner.render(r);
        r.push(") AS x");
        if self.skip_nulls {
            r.push(" WHERE x.\"value\" IS NOT NULL");
        }
        r.push(" GROUP BY x.\"value\" ORDER BY \"count\" DESC, x.\"value\" ASC");
    }
}

/// MIN/MAX/median over the matching price range.
struct PriceStatsQuery {
    inner: Select,
}

impl Render for PriceStatsQuery {
    fn render(&self, r: &mut Renderer) {
        r.push(
            "SELECT MIN(x.\"value\") AS \"min\", MAX(x.\"value\") AS \"max\", \
             percentile_cont(0.5) WITHIN GROUP (ORDER BY (x.\"value\")::double precision) AS \"median\" FROM (",
        );
        self.inner.render(r);
        r.push(") AS x");
    }
}

/// Ten equal-width price buckets between the observed MIN and MAX. The
/// bucket edges come from a second rendering of the same inner projection,
/// so its parameters appear twice in the statement.
struct PriceHistogramQuery {
    values: Select,
    edges: Select,
}

impl Render for PriceHistogramQuery {
    fn render(&self, r: &mut Renderer) {
        r.push(
            "SELECT LEAST(width_bucket((x.\"value\")::double precision, b.\"lo\", b.\"hi\", 10), 10) \
             AS \"bucket\", COUNT(*) AS \"count\" FROM (",
        );
        self.values.render(r);
        r.push(
            ") AS x, (SELECT MIN((p.\"value\")::double precision) AS \"lo\", \
             MAX((p.\"value\")::double precision) AS \"hi\" FROM (",
        );
        self.edges.render(r);
        r.push(
            ") AS p) AS b WHERE x.\"value\" IS NOT NULL AND b.\"hi\" > b.\"lo\" \
             GROUP BY 1 ORDER BY 1",
        );
    }
}

pub fn amenities_statement(filter: &SearchFilter, bounds: &BoundingBox) -> SqlStatement {
    let pred = build_filter(filter, Some(bounds), Some(FacetDimension::Amenities));
    let query = ValueCountQuery {
        inner: docs_select(unnest("amenities"), pred.expr),
        skip_nulls: false,
    };
    let (sql, params) = render_postgres(&query);
    SqlStatement::new(sql, params)
}

pub fn house_rules_statement(filter: &SearchFilter, bounds: &BoundingBox) -> SqlStatement {
    let pred = build_filter(filter, Some(bounds), Some(FacetDimension::HouseRules));
    let query = ValueCountQuery {
        inner: docs_select(unnest("house_rules"), pred.expr),
        skip_nulls: false,
    };
    let (sql, params) = render_postgres(&query);
    SqlStatement::new(sql, params)
}

pub fn room_types_statement(filter: &SearchFilter, bounds: &BoundingBox) -> SqlStatement {
    let pred = build_filter(filter, Some(bounds), Some(FacetDimension::RoomType));
    let query = ValueCountQuery {
        inner: docs_select(ident("room_type"), pred.expr),
        skip_nulls: true,
    };
    let (sql, params) = render_postgres(&query);
    SqlStatement::new(sql, params)
}

pub fn price_stats_statement(filter: &SearchFilter, bounds: &BoundingBox) -> SqlStatement {
    let pred = build_filter(filter, Some(bounds), Some(FacetDimension::Price));
    let query = PriceStatsQuery {
        inner: docs_select(ident("price"), pred.expr),
    };
    let (sql, params) = render_postgres(&query);
    SqlStatement::new(sql, params)
}

pub fn price_histogram_statement(filter: &SearchFilter, bounds: &BoundingBox) -> SqlStatement {
    let values = build_filter(filter, Some(bounds), Some(FacetDimension::Price));
    let edges = build_filter(filter, Some(bounds), Some(FacetDimension::Price));
    let query = PriceHistogramQuery {
        values: docs_select(ident("price"), values.expr),
        edges: docs_select(ident("price"), edges.expr),
    };
    let (sql, params) = render_postgres(&query);
    SqlStatement::new(sql, params)
}

/// The facet statement group, in the order the service decodes the results:
/// amenities, house rules, room types, price stats, price histogram.
pub fn facet_statements(filter: &SearchFilter, bounds: &BoundingBox) -> Vec<SqlStatement> {
    vec![
        amenities_statement(filter, bounds),
        house_rules_statement(filter, bounds),
        room_types_statement(filter, bounds),
        price_stats_statement(filter, bounds),
        price_histogram_statement(filter, bounds),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn bounds() -> BoundingBox {
        BoundingBox::new(40.6, -74.1, 40.9, -73.7)
    }

    fn filter() -> SearchFilter {
        SearchFilter {
            amenities: vec!["wifi".to_string()],
            house_rules: vec!["pets_allowed".to_string()],
            room_type: Some("private_room".to_string()),
            price_min: Some(bigdecimal::BigDecimal::from_str("50").unwrap()),
            ..SearchFilter::default()
        }
    }

    #[test]
    fn test_amenities_statement_excludes_own_filter_only() {
        let stmt = amenities_statement(&filter(), &bounds());
        assert!(stmt.sql.contains("unnest(\"amenities\")"));
        assert!(!stmt.sql.contains("\"amenities\" @> "));
        assert!(stmt.sql.contains("\"house_rules\" @> "));
        assert!(stmt.sql.contains("\"room_type\" = "));
        assert!(stmt.sql.contains("\"price\" >= "));
    }

    #[test]
    fn test_room_types_statement_excludes_own_filter_and_skips_nulls() {
        let stmt = room_types_statement(&filter(), &bounds());
        assert!(!stmt.sql.contains("\"room_type\" = "));
        assert!(stmt.sql.contains("\"amenities\" @> "));
        assert!(stmt.sql.contains("WHERE x.\"value\" IS NOT NULL"));
    }

    #[test]
    fn test_price_statements_exclude_price_filter() {
        for stmt in [
            price_stats_statement(&filter(), &bounds()),
            price_histogram_statement(&filter(), &bounds()),
        ] {
            assert!(!stmt.sql.contains("\"price\" >= "), "sql: {}", stmt.sql);
            assert!(stmt.sql.contains("\"room_type\" = "));
        }
    }

    #[test]
    fn test_histogram_binds_its_predicate_twice() {
        let stats = price_stats_statement(&filter(), &bounds());
        let histogram = price_histogram_statement(&filter(), &bounds());
        assert_eq!(histogram.params.len(), stats.params.len() * 2);

        // Placeholders keep numbering continuously across both renderings.
        let highest = format!("${}", histogram.params.len());
        assert!(histogram.sql.contains(&highest));
    }

    #[test]
    fn test_bounds_are_always_applied() {
        for stmt in facet_statements(&filter(), &bounds()) {
            assert!(stmt.sql.contains("\"lat\" >= "), "sql: {}", stmt.sql);
            assert!(stmt.sql.contains("\"lng\" <= "), "sql: {}", stmt.sql);
        }
    }

    #[test]
    fn test_group_shape_and_order() {
        let statements = facet_statements(&filter(), &bounds());
        assert_eq!(statements.len(), 5);
        assert!(statements[0].sql.contains("unnest(\"amenities\")"));
        assert!(statements[1].sql.contains("unnest(\"house_rules\")"));
        assert!(statements[2].sql.contains("GROUP BY x.\"value\""));
        assert!(statements[3].sql.contains("percentile_cont(0.5)"));
        assert!(statements[4].sql.contains("width_bucket"));
    }
}
