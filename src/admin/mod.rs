use axum::{extract::State, response::Html, routing::get, Router};
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

mod view;

pub use view::render_user_table;

pub fn router() -> Router<AppState> {
    Router::new().route("/admin/users", get(users_page))
}

#[instrument(skip(state))]
pub async fn users_page(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let users = state.users.list().await?;
    Ok(Html(render_user_table(&users)))
}
