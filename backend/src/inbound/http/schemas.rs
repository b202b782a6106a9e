//! Response bodies shared by several handler modules.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Plain acknowledgement payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Check your email for confirmation")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
