use axum::{
    async_trait,
    extract::{FromRequest, Request},
};
use validator::Validate;

use crate::error::{ApiError, ErrorVerbosityProvider, ValidationError};

use super::Extractor;

/// An extractor that validates the data extracted by another extractor.
pub struct Validated<X>(pub X);

#[async_trait]
impl<X, S> FromRequest<S> for Validated<X>
where
    X: FromRequest<S, Rejection = ApiError> + Extractor + Send,
    <X as Extractor>::Extracted: Validate,
    S: Send + Sync + ErrorVerbosityProvider,
{
    type Rejection = ApiError;

    #[tracing::instrument(name = "validated_extractor", skip_all)]
    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let inner = <X as FromRequest<S>>::from_request(req, state).await?;

        match inner.extracted().validate() {
            Ok(_) => {
                tracing::trace!("Validated");

                Ok(Validated(inner))
            }
            Err(errors) => {
                tracing::warn!(?errors, "Validation errors");

                let verbosity = state.error_verbosity();

                Err(ValidationError::from_validation_errors(verbosity, errors).into())
            }
        }
    }
}
