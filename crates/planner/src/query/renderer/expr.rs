use crate::query::{
    ast::expr::{BinaryOp, BinaryOperator, Expr, FunctionCall, Ident},
    renderer::{Render, Renderer},
};

impl Render for Expr {
    fn render(&self, r: &mut Renderer) {
        match self {
            Expr::Identifier(ident) => ident.render(r),
            Expr::Value(val) => r.bind(val.clone()),
            Expr::BinaryOp(op) => op.render(r),
            Expr::FunctionCall(func) => func.render(r),
            Expr::Alias { expr, alias } => {
                expr.render(r);
                r.push(" AS ");
                r.push_ident(alias);
            }
            Expr::Literal(raw) => r.push(raw),
            Expr::Tuple(items) => {
                r.push("(");
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        r.push(", ");
                    }
                    item.render(r);
                }
                r.push(")");
            }
            Expr::IsNull { expr, negated } => {
                expr.render(r);
                r.push(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
        }
    }
}

impl Render for Ident {
    fn render(&self, r: &mut Renderer) {
        if let Some(qualifier) = &self.qualifier {
            r.push_ident(qualifier);
            r.push(".");
        }
        r.push_ident(&self.name);
    }
}

impl Render for BinaryOp {
    fn render(&self, r: &mut Renderer) {
        r.push("(");
        self.left.render(r);

        let op_str = match self.op {
            BinaryOperator::Eq => " = ",
            BinaryOperator::NotEq => " <> ",
            BinaryOperator::Lt => " < ",
            BinaryOperator::LtEq => " <= ",
            BinaryOperator::Gt => " > ",
            BinaryOperator::GtEq => " >= ",
            BinaryOperator::NotDistinctFrom => " IS NOT DISTINCT FROM ",
            BinaryOperator::And => " AND ",
            BinaryOperator::Or => " OR ",
            BinaryOperator::TsMatch => " @@ ",
            BinaryOperator::Contains => " @> ",
        };
        r.push(op_str);

        self.right.render(r);
        r.push(")");
    }
}

impl Render for FunctionCall {
    fn render(&self, r: &mut Renderer) {
        r.push(&self.name);
        r.push("(");
        if self.wildcard {
            r.push("*");
        } else {
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    r.push(", ");
                }
                arg.render(r);
            }
        }
        r.push(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{ident, renderer::render_postgres, value};
    use model::core::value::Value;

    #[test]
    fn test_render_ts_match_and_contains() {
        let fts = Expr::BinaryOp(Box::new(BinaryOp {
            left: ident("search_vector"),
            op: BinaryOperator::TsMatch,
            right: Expr::FunctionCall(FunctionCall {
                name: "websearch_to_tsquery".to_string(),
                args: vec![
                    Expr::Literal("'english'".to_string()),
                    value(Value::String("cozy loft".into())),
                ],
                wildcard: false,
            }),
        }));
        let (sql, params) = render_postgres(&fts);
        assert_eq!(
            sql,
            r#"("search_vector" @@ websearch_to_tsquery('english', $1))"#
        );
        assert_eq!(params, vec![Value::String("cozy loft".into())]);

        let contains = Expr::BinaryOp(Box::new(BinaryOp {
            left: ident("amenities"),
            op: BinaryOperator::Contains,
            right: value(Value::StringArray(vec!["wifi".into()])),
        }));
        let (sql, _) = render_postgres(&contains);
        assert_eq!(sql, r#"("amenities" @> $1)"#);
    }

    #[test]
    fn test_render_is_null_and_tuple() {
        let expr = Expr::IsNull {
            expr: Box::new(ident("avg_rating")),
            negated: false,
        };
        let (sql, params) = render_postgres(&expr);
        assert_eq!(sql, r#""avg_rating" IS NULL"#);
        assert!(params.is_empty());

        let tuple = Expr::Tuple(vec![value(Value::Int(1)), value(Value::Int(2))]);
        let (sql, params) = render_postgres(&tuple);
        assert_eq!(sql, "($1, $2)");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_qualified_identifier() {
        let expr = Expr::Identifier(Ident {
            qualifier: Some("x".to_string()),
            name: "value".to_string(),
        });
        assert_eq!(render_postgres(&expr).0, r#""x"."value""#);
    }
}
