use thiserror::Error;

/// 仓储层错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("invoice not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// 服务层错误
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid page number passed as parameter.")]
    InvalidPage,

    #[error("there is no resource with the specified id")]
    NotFound,

    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Repository(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
