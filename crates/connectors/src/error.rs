use thiserror::Error;

/// All errors coming from the datastore layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Any driver-level error, including a fired statement timeout.
    #[error("Postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// A row cell could not be converted into a domain value.
    #[error("Row decode error: {0}")]
    Decode(String),

    /// Connection setup failed.
    #[error("Connection error: {0}")]
    Connection(String),
}
