use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database connection error: {0}")]
    ConnectionFailed(sqlx::Error),

    #[error("Database operation failed: {0}")]
    OperationFailed(sqlx::Error),

    #[error("Row not found: {0}")]
    RowNotFound(sqlx::Error),

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(sqlx::Error),

    #[error("Foreign key constraint violated: {0}")]
    ForeignKeyViolation(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(error: sqlx::Error) -> Self {
        let kind = match &error {
            sqlx::Error::RowNotFound => return Self::RowNotFound(error),
            sqlx::Error::Database(e) => e.kind(),
            _ => return Self::OperationFailed(error),
        };
        match kind {
            ErrorKind::UniqueViolation => Self::UniqueViolation(error),
            ErrorKind::ForeignKeyViolation => Self::ForeignKeyViolation(error),
            _ => Self::OperationFailed(error),
        }
    }
}
