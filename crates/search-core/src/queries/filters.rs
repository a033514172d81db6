//! Shared WHERE-clause assembly for every read path.
//!
//! There is exactly one filter-assembly function; facet queries pass the
//! dimension whose own predicate must be suppressed. That keeps the
//! facet-exclusion rule (count what this facet would yield if only its own
//! constraint were removed) in one place instead of five diverging copies.

use model::{
    core::value::Value,
    search::filter::{BoundingBox, SearchFilter},
};
use planner::query::{
    ast::expr::{BinaryOp, BinaryOperator, Expr, FunctionCall, and_all},
    ident, value,
};

/// A facet dimension paired with the filter it suppresses in its own count
/// query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetDimension {
    Amenities,
    HouseRules,
    RoomType,
    Price,
}

/// The assembled WHERE predicate plus the 1-based placeholder number of the
/// text-query parameter inside it (needed by the offset-mode rank term).
#[derive(Debug, Clone)]
pub struct FilterPredicate {
    pub expr: Option<Expr>,
    pub fts_param: Option<usize>,
}

pub fn build_filter(
    filter: &SearchFilter,
    bounds: Option<&BoundingBox>,
    exclude: Option<FacetDimension>,
) -> FilterPredicate {
    let mut predicates = vec![cmp(
        "status",
        BinaryOperator::Eq,
        Value::String("active".to_string()),
    )];

    if let Some(b) = bounds {
        predicates.push(cmp("lat", BinaryOperator::GtEq, Value::Float(b.south)));
        predicates.push(cmp("lat", BinaryOperator::LtEq, Value::Float(b.north)));
        predicates.push(cmp("lng", BinaryOperator::GtEq, Value::Float(b.west)));
        predicates.push(cmp("lng", BinaryOperator::LtEq, Value::Float(b.east)));
    }

    if exclude != Some(FacetDimension::Price) {
        if let Some(min) = &filter.price_min {
            predicates.push(cmp(
                "price",
                BinaryOperator::GtEq,
                Value::Decimal(min.clone()),
            ));
        }
        if let Some(max) = &filter.price_max {
            predicates.push(cmp(
                "price",
                BinaryOperator::LtEq,
                Value::Decimal(max.clone()),
            ));
        }
    }

    if exclude != Some(FacetDimension::RoomType)
        && let Some(room_type) = &filter.room_type
    {
        predicates.push(cmp(
            "room_type",
            BinaryOperator::Eq,
            Value::String(room_type.clone()),
        ));
    }

    if exclude != Some(FacetDimension::Amenities) && !filter.amenities.is_empty() {
        predicates.push(cmp(
            "amenities",
            BinaryOperator::Contains,
            Value::StringArray(filter.amenities.clone()),
        ));
    }

    if exclude != Some(FacetDimension::HouseRules) && !filter.house_rules.is_empty() {
        predicates.push(cmp(
            "house_rules",
            BinaryOperator::Contains,
            Value::StringArray(filter.house_rules.clone()),
        ));
    }

    if !filter.languages.is_empty() {
        predicates.push(cmp(
            "host_languages",
            BinaryOperator::Contains,
            Value::StringArray(filter.languages.clone()),
        ));
    }

    // The text predicate goes last so its parameter is the final one in the
    // clause; its placeholder number is then just the clause's param count.
    let has_query = filter.has_text_query();
    if has_query
        && let Some(query) = &filter.query
    {
        predicates.push(Expr::BinaryOp(Box::new(BinaryOp {
            left: ident("search_vector"),
            op: BinaryOperator::TsMatch,
            right: Expr::FunctionCall(FunctionCall {
                name: "websearch_to_tsquery".to_string(),
                args: vec![
                    Expr::Literal("'english'".to_string()),
                    value(Value::String(query.trim().to_string())),
                ],
                wildcard: false,
            }),
        })));
    }

    let expr = and_all(predicates);
    let fts_param = if has_query {
        expr.as_ref().map(Expr::param_count)
    } else {
        None
    };

    FilterPredicate { expr, fts_param }
}

fn cmp(column: &str, op: BinaryOperator, val: Value) -> Expr {
    Expr::BinaryOp(Box::new(BinaryOp {
        left: ident(column),
        op,
        right: value(val),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner::query::renderer::render_postgres;
    use std::str::FromStr;

    fn full_filter() -> SearchFilter {
        SearchFilter {
            bounds: None,
            center: None,
            query: Some("cozy loft".to_string()),
            price_min: Some(bigdecimal::BigDecimal::from_str("50").unwrap()),
            price_max: Some(bigdecimal::BigDecimal::from_str("250").unwrap()),
            room_type: Some("private_room".to_string()),
            amenities: vec!["wifi".to_string(), "kitchen".to_string()],
            house_rules: vec!["pets_allowed".to_string()],
            languages: vec!["en".to_string()],
        }
    }

    fn sql_for(exclude: Option<FacetDimension>) -> String {
        let bounds = BoundingBox::new(40.6, -74.1, 40.9, -73.7);
        let pred = build_filter(&full_filter(), Some(&bounds), exclude);
        render_postgres(&pred.expr.unwrap()).0
    }

    #[test]
    fn test_all_filters_present_without_exclusion() {
        let sql = sql_for(None);
        assert!(sql.contains("\"status\" = "));
        assert!(sql.contains("\"lat\" >= "));
        assert!(sql.contains("\"price\" >= "));
        assert!(sql.contains("\"price\" <= "));
        assert!(sql.contains("\"room_type\" = "));
        assert!(sql.contains("\"amenities\" @> "));
        assert!(sql.contains("\"house_rules\" @> "));
        assert!(sql.contains("\"host_languages\" @> "));
        assert!(sql.contains("\"search_vector\" @@ websearch_to_tsquery('english', "));
    }

    #[test]
    fn test_each_dimension_suppresses_only_itself() {
        let amenities = sql_for(Some(FacetDimension::Amenities));
        assert!(!amenities.contains("\"amenities\" @> "));
        assert!(amenities.contains("\"house_rules\" @> "));
        assert!(amenities.contains("\"price\" >= "));

        let rules = sql_for(Some(FacetDimension::HouseRules));
        assert!(!rules.contains("\"house_rules\" @> "));
        assert!(rules.contains("\"amenities\" @> "));

        let room = sql_for(Some(FacetDimension::RoomType));
        assert!(!room.contains("\"room_type\" = "));
        assert!(room.contains("\"amenities\" @> "));

        let price = sql_for(Some(FacetDimension::Price));
        assert!(!price.contains("\"price\" >= "));
        assert!(!price.contains("\"price\" <= "));
        assert!(price.contains("\"room_type\" = "));
    }

    #[test]
    fn test_fts_param_is_the_last_placeholder() {
        let bounds = BoundingBox::new(40.6, -74.1, 40.9, -73.7);
        let pred = build_filter(&full_filter(), Some(&bounds), None);
        let (sql, params) = render_postgres(&pred.expr.unwrap());
        let n = pred.fts_param.unwrap();
        assert_eq!(n, params.len());
        assert!(sql.contains(&format!("websearch_to_tsquery('english', ${n})")));
    }

    #[test]
    fn test_no_query_means_no_fts_param() {
        let mut filter = full_filter();
        filter.query = None;
        let pred = build_filter(&filter, None, None);
        assert_eq!(pred.fts_param, None);
        let (sql, _) = render_postgres(&pred.expr.unwrap());
        assert!(!sql.contains("websearch_to_tsquery"));
    }

    #[test]
    fn test_empty_filter_still_pins_active_status() {
        let pred = build_filter(&SearchFilter::default(), None, None);
        let (sql, params) = render_postgres(&pred.expr.unwrap());
        assert_eq!(sql, "(\"status\" = $1)");
        assert_eq!(params, vec![Value::String("active".to_string())]);
    }
}
