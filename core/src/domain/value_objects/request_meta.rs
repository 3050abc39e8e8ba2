//! Client metadata recorded alongside each issued refresh token.

use serde::{Deserialize, Serialize};

/// Where a token request came from. Both fields are informational only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMeta {
    /// `User-Agent` header of the request
    pub user_agent: Option<String>,

    /// Client IP address
    pub ip: Option<String>,
}

impl RequestMeta {
    pub fn new(user_agent: Option<String>, ip: Option<String>) -> Self {
        Self { user_agent, ip }
    }
}
