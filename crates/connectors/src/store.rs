use crate::{error::DbError, row::RowData};
use async_trait::async_trait;
use model::core::value::Value;
use std::time::Duration;

/// One parameterized statement ready for execution.
#[derive(Debug, Clone)]
pub struct SqlStatement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl SqlStatement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// The datastore collaborator consumed by the search core. Implementations
/// must be safe to share across concurrent requests.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Runs one parameterized query and decodes its rows.
    async fn query(&self, statement: &SqlStatement) -> Result<Vec<RowData>, DbError>;

    /// Runs a statement group inside one transaction, with a session-local
    /// statement timeout applied to every statement in the group.
    async fn query_group(
        &self,
        timeout: Duration,
        statements: &[SqlStatement],
    ) -> Result<Vec<Vec<RowData>>, DbError>;
}

/// Renders the `SET LOCAL statement_timeout` prelude for a statement group.
/// The timeout is a configuration constant, so it is rendered as a literal
/// rather than bound as a parameter.
pub fn statement_timeout_sql(timeout: Duration) -> String {
    format!("SET LOCAL statement_timeout = {}", timeout.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_timeout_is_a_literal() {
        let sql = statement_timeout_sql(Duration::from_secs(5));
        assert_eq!(sql, "SET LOCAL statement_timeout = 5000");
        assert!(!sql.contains('$'));
    }
}
