use thiserror::Error;

#[derive(Error, Debug)]
pub enum HelperError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Parameter store error for {name}: {message}")]
    ParameterStore { name: String, message: String },

    #[error("Insert into {table} did not report a generated id")]
    MissingInsertId { table: String },

    #[error("Invalid {table} row {id}: {reason}")]
    InvalidRecord {
        table: String,
        id: i64,
        reason: String,
    },

    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, HelperError>;
