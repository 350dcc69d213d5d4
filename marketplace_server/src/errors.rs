use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use marketplace_engine::{OrderPlacementError, OrderQueryError, ProductApiError, SellerApiError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("{0}")]
    InvalidRequest(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("{0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::UNAUTHORIZED,
                AuthError::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
                AuthError::CouldNotIssueToken(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No bearer token was provided.")]
    MissingToken,
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Could not issue an access token. {0}")]
    CouldNotIssueToken(String),
}

impl From<OrderPlacementError> for ServerError {
    fn from(e: OrderPlacementError) -> Self {
        match e {
            OrderPlacementError::EmptyCart |
            OrderPlacementError::InvalidIdentity(_) |
            OrderPlacementError::InsufficientStock { .. } |
            OrderPlacementError::ValidationFailed(_) => Self::InvalidRequest(e.to_string()),
            OrderPlacementError::ProductNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderPlacementError::Unexpected(s) => Self::BackendError(s),
        }
    }
}

impl From<ProductApiError> for ServerError {
    fn from(e: ProductApiError) -> Self {
        match e {
            ProductApiError::InvalidIdentity(_) | ProductApiError::ValidationFailed(_) => {
                Self::InvalidRequest(e.to_string())
            },
            ProductApiError::ProductNotFound(_) => Self::NoRecordFound(e.to_string()),
            ProductApiError::DatabaseError(s) => Self::BackendError(s),
        }
    }
}

impl From<OrderQueryError> for ServerError {
    fn from(e: OrderQueryError) -> Self {
        match e {
            OrderQueryError::InvalidIdentity(_) | OrderQueryError::InvalidStatusTransition { .. } => {
                Self::InvalidRequest(e.to_string())
            },
            OrderQueryError::OrderNotFound(_) => Self::NoRecordFound(e.to_string()),
            OrderQueryError::DatabaseError(s) => Self::BackendError(s),
        }
    }
}

impl From<SellerApiError> for ServerError {
    fn from(e: SellerApiError) -> Self {
        match e {
            SellerApiError::SellerLocked { .. } => Self::InsufficientPermissions(e.to_string()),
            SellerApiError::DatabaseError(s) => Self::BackendError(s),
        }
    }
}
