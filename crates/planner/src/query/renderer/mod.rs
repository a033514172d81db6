//! Renders query ASTs into parameterized Postgres SQL.
//!
//! Every read path in this system targets Postgres (`unnest`, `@@`,
//! `IS NOT DISTINCT FROM`, `width_bucket` all assume it), so the syntax
//! rules live directly in the renderer: identifiers double-quoted, bind
//! parameters numbered `$1..$n` in the order they are bound.

use model::core::value::Value;

pub mod expr;
pub mod select;

/// A trait for any AST node that can be rendered into SQL.
pub trait Render {
    fn render(&self, renderer: &mut Renderer);
}

/// Accumulates the SQL text and bind parameters of one statement.
#[derive(Default)]
pub struct Renderer {
    sql: String,
    params: Vec<Value>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a raw SQL fragment. Callers only ever pass constant text;
    /// request data goes through `bind`.
    pub fn push(&mut self, fragment: &str) {
        self.sql.push_str(fragment);
    }

    /// Appends a double-quoted identifier.
    pub fn push_ident(&mut self, ident: &str) {
        self.sql.push('"');
        self.sql.push_str(ident);
        self.sql.push('"');
    }

    /// Binds one parameter and appends its `$n` placeholder.
    pub fn bind(&mut self, value: Value) {
        self.params.push(value);
        self.sql.push('$');
        self.sql.push_str(&self.params.len().to_string());
    }

    /// Returns the accumulated SQL string and its parameter list.
    pub fn finish(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

/// Renders a complete AST and returns the SQL and its parameter list.
pub fn render_postgres(ast: &impl Render) -> (String, Vec<Value>) {
    let mut renderer = Renderer::new();
    ast.render(&mut renderer);
    renderer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_numbers_placeholders_from_one() {
        let mut r = Renderer::new();
        r.push("SELECT ");
        r.bind(Value::Int(1));
        r.push(", ");
        r.bind(Value::Int(2));
        let (sql, params) = r.finish();
        assert_eq!(sql, "SELECT $1, $2");
        assert_eq!(params, vec![Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_push_ident_double_quotes() {
        let mut r = Renderer::new();
        r.push_ident("price");
        assert_eq!(r.finish().0, "\"price\"");
    }
}
