#![allow(dead_code, unused_macros)]

use actix_web::test::TestRequest;
use crypto_core::JwtKeys;
use serde_json::{json, Value};
use social_api::db::MemoryStore;
use social_api::AppState;
use std::sync::Arc;

pub const TEST_SECRET: &str = "J8Kq2mPvRx4TnZs9YwLcGf7DhBe3Xa6W";

/// Fresh in-memory state; the store handle is returned for direct inspection.
pub fn memory_state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let jwt = Arc::new(JwtKeys::new(TEST_SECRET, 900));
    (AppState::new(store.clone(), jwt), store)
}

pub fn register_req(email: &str, name: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/register")
        .set_json(json!({ "email": email, "name": name, "password": password }))
}

pub fn login_req(email: &str, password: &str) -> TestRequest {
    TestRequest::post()
        .uri("/login")
        .set_json(json!({ "email": email, "password": password }))
}

pub fn bearer(req: TestRequest, token: &str) -> TestRequest {
    req.insert_header(("Authorization", format!("Bearer {}", token)))
}

pub fn parse(body: &[u8]) -> Value {
    serde_json::from_slice(body).expect("response body is JSON")
}

/// Register `email` with password "pw", log in, and yield `(user_id, token)`.
macro_rules! signup {
    ($app:expr, $email:expr) => {{
        let resp = actix_web::test::call_service(
            &$app,
            common::register_req($email, "Someone", "pw").to_request(),
        )
        .await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::CREATED);
        let body = common::parse(&actix_web::test::read_body(resp).await);
        let id = body["id"].as_i64().expect("registered id");

        let resp = actix_web::test::call_service(
            &$app,
            common::login_req($email, "pw").to_request(),
        )
        .await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        let body = common::parse(&actix_web::test::read_body(resp).await);
        let token = body["access_token"]
            .as_str()
            .expect("access token")
            .to_string();
        (id, token)
    }};
}
