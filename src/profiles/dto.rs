use serde::{Deserialize, Serialize};

/// Body of POST /api/profile. `skills` is a comma-delimited string.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileRequest {
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub skills: String,
    pub bio: Option<String>,
    #[serde(alias = "githubusername")]
    pub github_username: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub msg: &'static str,
}
