use serde::{Deserialize, Serialize};

/// Authenticated caller, produced by a verified one-time code or an admin login.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl Principal {
    pub fn user(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            is_admin: false,
        }
    }
}
