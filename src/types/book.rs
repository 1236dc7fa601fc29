use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A book record.
///
/// The `id` is supplied by the client and is the only lookup key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, ToSchema, Validate)]
pub struct Book {
    pub id: Uuid,
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub title: String,
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub author: String,
    #[validate(length(min = 1, message = "Must not be empty"))]
    pub description: String,
    #[validate(range(min = 0.0, max = 5.0, message = "Must be between 0 and 5"))]
    pub rating: f64,
}
