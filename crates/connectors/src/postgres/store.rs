use crate::{
    error::DbError,
    postgres::{params::PgParamStore, row::to_row_data},
    row::RowData,
    store::{SearchStore, SqlStatement, statement_timeout_sql},
};
use async_trait::async_trait;
use std::{sync::Arc, time::Duration};
use tokio::sync::RwLock;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, warn};

/// `SearchStore` backed by a single tokio-postgres client. Reads share the
/// client; transactional groups take the write half for their duration.
#[derive(Clone)]
pub struct PgSearchStore {
    client: Arc<RwLock<Client>>,
}

impl PgSearchStore {
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let (client, connection) = tokio_postgres::connect(url, NoTls)
            .await
            .map_err(|err| DbError::Connection(err.to_string()))?;

        // The connection object drives the socket and must be polled for the
        // client to make progress.
        tokio::spawn(async move {
            if let Err(err) = connection.await {
                warn!("postgres connection terminated: {err}");
            }
        });

        Ok(PgSearchStore {
            client: Arc::new(RwLock::new(client)),
        })
    }
}

#[async_trait]
impl SearchStore for PgSearchStore {
    async fn query(&self, statement: &SqlStatement) -> Result<Vec<RowData>, DbError> {
        let bindings = PgParamStore::from_values(statement.params.clone());
        let client = self.client.read().await;

        debug!(sql = %statement.sql, params = statement.params.len(), "executing query");
        let rows = client.query(&statement.sql, &bindings.as_refs()).await?;
        rows.iter().map(to_row_data).collect()
    }

    async fn query_group(
        &self,
        timeout: Duration,
        statements: &[SqlStatement],
    ) -> Result<Vec<Vec<RowData>>, DbError> {
        let mut client = self.client.write().await;
        let tx = client.transaction().await?;

        // Safety cap on runaway aggregates; a constant, so rendered as a
        // literal and applied once for the whole group.
        tx.batch_execute(&statement_timeout_sql(timeout)).await?;

        let mut results = Vec::with_capacity(statements.len());
        for statement in statements {
            let bindings = PgParamStore::from_values(statement.params.clone());
            debug!(sql = %statement.sql, "executing grouped query");
            let rows = tx.query(&statement.sql, &bindings.as_refs()).await?;
            results.push(rows.iter().map(to_row_data).collect::<Result<Vec<_>, _>>()?);
        }

        tx.commit().await?;
        Ok(results)
    }
}
