/// Error types for post-service
///
/// One taxonomy for everything the service surfaces. Authorization
/// failures are terminal for the attempt and rendered verbatim; store
/// failures are retryable and marked as such in the response body.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Sign in required")]
    AuthRequired,

    #[error("An active block claim is required to post this category")]
    TrustRequired,

    #[error("Pin must be inside your claimed block radius")]
    OutsideClaimRadius,

    #[error("Pin must be within 1 mile of your current location")]
    OutsideLiveRadius,

    #[error("Location permission required to post without a claim")]
    LocationUnavailable,

    #[error("Claim radius must be between 1 and 3 miles")]
    InvalidRadius,

    #[error("No more than 3 block claims can be active at once")]
    ClaimLimitExceeded,

    #[error("Viewport bounds must have south-west strictly below north-east")]
    InvalidBounds,

    #[error("Address {address_id} was created but claiming it failed; the address may be orphaned")]
    ClaimIncomplete { address_id: Uuid },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl AppError {
    /// Stable machine-readable kind, independent of the display text.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::AuthRequired => "auth_required",
            AppError::TrustRequired => "trust_required",
            AppError::OutsideClaimRadius => "outside_claim_radius",
            AppError::OutsideLiveRadius => "outside_live_radius",
            AppError::LocationUnavailable => "location_unavailable",
            AppError::InvalidRadius => "invalid_radius",
            AppError::ClaimLimitExceeded => "claim_limit_exceeded",
            AppError::InvalidBounds => "invalid_bounds",
            AppError::ClaimIncomplete { .. } => "claim_incomplete",
            AppError::Validation(_) => "validation",
            AppError::StoreUnavailable(_) => "store_unavailable",
        }
    }

    /// Whether the caller should retry the same request unchanged.
    pub fn retryable(&self) -> bool {
        matches!(self, AppError::StoreUnavailable(_))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::AuthRequired => StatusCode::UNAUTHORIZED,
            AppError::TrustRequired
            | AppError::OutsideClaimRadius
            | AppError::OutsideLiveRadius => StatusCode::FORBIDDEN,
            AppError::LocationUnavailable => StatusCode::PRECONDITION_FAILED,
            AppError::InvalidRadius | AppError::InvalidBounds | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::ClaimLimitExceeded => StatusCode::CONFLICT,
            AppError::ClaimIncomplete { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "retryable": self.retryable(),
            "status": status.as_u16(),
        }))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::StoreUnavailable(err.to_string())
    }
}

impl From<geo_core::GeoError> for AppError {
    fn from(err: geo_core::GeoError) -> Self {
        AppError::Validation(err.to_string())
    }
}
