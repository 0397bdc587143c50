use axum::{routing::get, Router};

use crate::{domains::otp::rest::otp_mail_routes, state::SharedAppState};

pub fn create_app(state: SharedAppState) -> Router {
  Router::new()
    .route("/", get(root_handler))
    .nest("/api/v1", otp_mail_routes())
    .with_state(state)
}

pub async fn root_handler() -> &'static str {
  "redigo-mailer"
}
