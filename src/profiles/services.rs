use crate::{
    error::{ApiError, FieldError},
    profiles::{dto::ProfileRequest, repo_types::ProfileChanges},
};

/// `"a, b ,c"` becomes `["a", "b", "c"]`; empty entries are dropped.
pub fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

pub fn changes_from_request(req: ProfileRequest) -> Result<ProfileChanges, ApiError> {
    let status = req.status.trim().to_string();
    let skills = parse_skills(&req.skills);

    let mut errors = Vec::new();
    if status.is_empty() {
        errors.push(FieldError::new("status", "Status is required"));
    }
    if skills.is_empty() {
        errors.push(FieldError::new("skills", "Skills is required"));
    }
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    Ok(ProfileChanges {
        company: non_blank(req.company),
        website: non_blank(req.website),
        location: non_blank(req.location),
        status,
        skills,
        bio: non_blank(req.bio),
        github_username: non_blank(req.github_username),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_are_split_and_trimmed_in_order() {
        assert_eq!(parse_skills("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_skills(" rust ,, sql , "), vec!["rust", "sql"]);
        assert!(parse_skills("").is_empty());
    }

    #[test]
    fn status_and_skills_are_both_reported() {
        let err = changes_from_request(ProfileRequest::default()).unwrap_err();
        let ApiError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn blank_optional_fields_are_left_unset() {
        let changes = changes_from_request(ProfileRequest {
            status: "Developer".into(),
            skills: "rust".into(),
            company: Some("   ".into()),
            github_username: Some("ann".into()),
            ..Default::default()
        })
        .unwrap();
        assert!(changes.company.is_none());
        assert_eq!(changes.github_username.as_deref(), Some("ann"));
    }

    #[test]
    fn accepts_legacy_github_field_name() {
        let req: ProfileRequest =
            serde_json::from_str(r#"{"status":"Dev","skills":"x","githubusername":"ann"}"#).unwrap();
        assert_eq!(req.github_username.as_deref(), Some("ann"));
    }
}
