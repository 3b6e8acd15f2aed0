//! Query parameter types for API handlers.

use serde::Deserialize;

/// `?user__email=` filter for listing a user's perevals.
#[derive(Debug, Deserialize)]
pub struct UserEmailParams {
    #[serde(rename = "user__email")]
    pub user_email: Option<String>,
}
