use axum::http::StatusCode;
use thiserror::Error;

/// Failures talking to the key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Connectivity(String),

    #[error("unexpected data at {path}: {reason}")]
    DataShape { path: String, reason: String },

    #[error("local store io: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    pub fn data_shape(path: &str, reason: impl Into<String>) -> Self {
        Self::DataShape {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog api unreachable: {0}")]
    Connectivity(String),

    #[error("malformed catalog response for {source_name}: {reason}")]
    DataShape { source_name: String, reason: String },

    #[error("catalog cache io: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog cache encoding: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
    #[error("product name must not be empty")]
    EmptyProduct,

    #[error("amount must be a positive number, got {0}")]
    InvalidAmount(f64),

    #[error("{product} is counted in whole units, got {amount}")]
    FractionalAmount { product: String, amount: f64 },

    #[error("product name {product:?} must not contain {character:?}")]
    ReservedCharacter { product: String, character: char },

    #[error("product name {product:?} clashes with the ledger key {convention:?}")]
    ReservedAffix {
        product: String,
        convention: &'static str,
    },
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Connectivity(_) => Self::unavailable(err.to_string()),
            StoreError::DataShape { .. } | StoreError::Io(_) => Self::internal(err),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Connectivity(_) => Self::unavailable(err.to_string()),
            _ => Self::internal(err),
        }
    }
}

impl From<DraftError> for AppError {
    fn from(err: DraftError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
