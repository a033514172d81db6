use crate::query::{
    ast::{
        common::{NullsOrder, OrderDir},
        select::{FromClause, OrderByExpr, Select},
    },
    renderer::{Render, Renderer},
};

impl Render for Select {
    fn render(&self, r: &mut Renderer) {
        r.push("SELECT ");
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                r.push(", ");
            }
            col.render(r);
        }

        if let Some(from) = &self.from {
            r.push(" ");
            from.render(r);
        }

        if let Some(where_clause) = &self.where_clause {
            r.push(" WHERE ");
            where_clause.render(r);
        }

        if !self.order_by.is_empty() {
            r.push(" ORDER BY ");
            for (i, order) in self.order_by.iter().enumerate() {
                if i > 0 {
                    r.push(", ");
                }
                order.render(r);
            }
        }

        if let Some(limit) = &self.limit {
            r.push(" LIMIT ");
            limit.render(r);
        }

        if let Some(offset) = &self.offset {
            r.push(" OFFSET ");
            offset.render(r);
        }
    }
}

impl Render for FromClause {
    fn render(&self, r: &mut Renderer) {
        r.push("FROM ");
        if let Some(schema) = &self.table.schema {
            r.push_ident(schema);
            r.push(".");
        }
        r.push_ident(&self.table.name);
        if let Some(alias) = &self.alias {
            r.push(" AS ");
            r.push_ident(alias);
        }
    }
}

impl Render for OrderByExpr {
    fn render(&self, r: &mut Renderer) {
        self.expr.render(r);
        if let Some(dir) = &self.direction {
            r.push(match dir {
                OrderDir::Asc => " ASC",
                OrderDir::Desc => " DESC",
            });
        }
        if let Some(nulls) = &self.nulls {
            r.push(match nulls {
                NullsOrder::First => " NULLS FIRST",
                NullsOrder::Last => " NULLS LAST",
            });
        }
    }
}
