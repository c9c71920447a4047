use catalog_core::error::CoreError;

use crate::api::ApiError;

/// Error returned by [`CatalogClient`](crate::CatalogClient) operations.
///
/// Every variant leaves the client's local state as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A domain-level error: validation, unknown field, decode, not found.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The remote API could not be reached or rejected the request.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Convenience type alias for client operation results.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Whether this error was raised before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, ClientError::Core(CoreError::Validation(_)))
    }
}
