use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use bookbazaar::auth::{
    create_access_token, create_refresh_token, decode_jwt, hash_password, verify_password,
};
use bookbazaar::{api, db};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_test_account(db: &DatabaseConnection, username: &str, password: &str) -> i32 {
    let account = bookbazaar::models::account::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(hash_password(password).unwrap()),
        date_joined: Set(chrono::Utc::now().to_rfc3339()),
        ..Default::default()
    };
    account.insert(db).await.expect("Failed to create account").id
}

#[tokio::test]
async fn test_password_hashing() {
    let password = "super_secret_password";
    let hash = hash_password(password).expect("Failed to hash password");

    assert_ne!(password, hash);
    assert!(verify_password(password, &hash).unwrap());
    assert!(!verify_password("wrong_password", &hash).unwrap());
}

#[tokio::test]
async fn test_jwt_creation_and_verification() {
    let token = create_access_token("test_user", 42).expect("Failed to create JWT");
    assert!(!token.is_empty());

    let claims = decode_jwt(&token).expect("Failed to verify JWT");
    assert_eq!(claims.sub, "test_user");
    assert_eq!(claims.account_id, 42);
    assert_eq!(claims.kind, "access");
}

#[tokio::test]
async fn test_token_obtain_pair() {
    let db = setup_test_db().await;
    create_test_account(&db, "alice", "alice_password").await;

    let app = api::api_router(db);

    // Success
    let payload = serde_json::json!({
        "username": "alice",
        "password": "alice_password"
    });
    let req = Request::builder()
        .uri("/token/")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["access"].is_string());
    assert!(json["refresh"].is_string());

    // Wrong password
    let payload = serde_json::json!({
        "username": "alice",
        "password": "wrong"
    });
    let req = Request::builder()
        .uri("/token/")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_refresh_flow() {
    let db = setup_test_db().await;
    let account_id = create_test_account(&db, "bob", "bob_password").await;

    let app = api::api_router(db);

    let refresh = create_refresh_token("bob", account_id).unwrap();
    let payload = serde_json::json!({ "refresh": refresh });
    let req = Request::builder()
        .uri("/token/refresh/")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let access = json["access"].as_str().expect("access token in response");
    let claims = decode_jwt(access).unwrap();
    assert_eq!(claims.kind, "access");
    assert_eq!(claims.account_id, account_id);

    // An access token must not be accepted by the refresh endpoint
    let access_as_refresh = create_access_token("bob", account_id).unwrap();
    let payload = serde_json::json!({ "refresh": access_as_refresh });
    let req = Request::builder()
        .uri("/token/refresh/")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload).unwrap()))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_rejected_as_bearer() {
    let db = setup_test_db().await;
    let account_id = create_test_account(&db, "carol", "carol_password").await;

    let app = api::api_router(db);

    let refresh = create_refresh_token("carol", account_id).unwrap();
    let req = Request::builder()
        .uri("/accounts/me/")
        .method("GET")
        .header("Authorization", format!("Bearer {}", refresh))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_missing_and_malformed_auth_header() {
    let db = setup_test_db().await;
    let app = api::api_router(db);

    // Missing header
    let req = Request::builder()
        .uri("/accounts/me/")
        .method("GET")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Not a Bearer scheme
    let req = Request::builder()
        .uri("/accounts/me/")
        .method("GET")
        .header("Authorization", "Basic abc123")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Garbage token
    let req = Request::builder()
        .uri("/accounts/me/")
        .method("GET")
        .header("Authorization", "Bearer not.a.jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
