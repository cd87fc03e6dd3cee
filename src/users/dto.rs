use serde::Deserialize;
use uuid::Uuid;

/// Body of PUT /api/users. `id` is only read on the body-addressed route.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub id: Option<Uuid>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<String>,
}
