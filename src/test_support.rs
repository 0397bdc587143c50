use std::sync::Arc;

use async_trait::async_trait;
use axum::{
  body::{Body, Bytes},
  http::{Request, StatusCode},
  Router,
};
use lettre::Message;
use serde::Serialize;
use tower::ServiceExt;

use crate::{
  app::create_app,
  email::{EmailService, Receipt, Transport},
  error::TransportError,
  state::SharedAppState,
};

mockall::mock! {
    pub Transport {}

    #[async_trait]
    impl Transport for Transport {
        async fn verify(&self) -> Result<(), TransportError>;
        async fn send(&self, message: &Message) -> Result<Receipt, TransportError>;
    }
}

pub fn app_with_service(email_service: EmailService) -> Router {
  create_app(SharedAppState::new(Arc::new(email_service)))
}

pub async fn post_json<T: Serialize>(app: Router, uri: &str, body: &T) -> (StatusCode, Bytes) {
  let request = Request::builder()
    .method("POST")
    .uri(uri)
    .header("content-type", "application/json")
    .body(Body::from(serde_json::to_vec(body).expect("serialize request body")))
    .expect("build request");

  send(app, request).await
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, Bytes) {
  let request = Request::builder()
    .method("GET")
    .uri(uri)
    .body(Body::empty())
    .expect("build request");

  send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Bytes) {
  let response = app.oneshot(request).await.expect("handle request");
  let status = response.status();
  let body = axum::body::to_bytes(response.into_body(), usize::MAX)
    .await
    .expect("read response body");
  (status, body)
}
