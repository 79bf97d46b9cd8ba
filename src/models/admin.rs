use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct ApiKeyQuery {
    pub api_key: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct IgnoreQuery {
    pub api_key: Option<String>,
    /// Comma separated torrent ids
    #[serde(default)]
    pub ids: String,
}

impl IgnoreQuery {
    pub fn ids(&self) -> Vec<String> {
        self.ids
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// One torrent id or a list of them
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdSelection {
    One(String),
    Many(Vec<String>),
}

impl IdSelection {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            IdSelection::One(id) => vec![id],
            IdSelection::Many(ids) => ids,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetIgnoreRequest {
    pub ids: IdSelection,
    #[serde(default = "default_ignore")]
    pub ignore: bool,
}

fn default_ignore() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IgnoreResponse {
    pub success: bool,
    /// Ignore flag per requested id, in request order
    pub ignored: Vec<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}
