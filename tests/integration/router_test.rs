use crate::common::*;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use entity::{class_invitations, sea_orm_active_enums::UserRole};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::{json, Value};
use studiobook::{routes::create_router, services::SubscriptionService, AppState};
use time::{Duration, OffsetDateTime};
use tower::ServiceExt;
use uuid::Uuid;

async fn app() -> (Router, AppState) {
    let db = setup_db().await;
    let state = AppState::with_db(db, test_config()).expect("Failed to build state");
    (create_router(state.clone()), state)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn send_json(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_empty(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_health_is_public() {
    let (app, _) = app().await;

    let (status, body) = send(app, get("/api/v1/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["message"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_unauthenticated() {
    let (app, _) = app().await;

    let (status, body) = send(app, get("/api/v1/credits/balance", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_garbage_token_is_invalid() {
    let (app, _) = app().await;

    let (status, body) = send(app, get("/api/v1/bookings", Some("not-a-jwt"))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_balance_for_authenticated_customer() {
    let (app, state) = app().await;
    let customer = create_customer(&state.db, "Ana", 7).await;
    let token = state
        .jwt_service
        .generate_token(customer.id, UserRole::Customer)
        .unwrap();

    let (status, body) = send(app, get("/api/v1/credits/balance", Some(&token))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["balance"], 7);
}

#[tokio::test]
async fn test_customer_cannot_list_subscribers() {
    let (app, state) = app().await;
    let customer = create_customer(&state.db, "Ana", 0).await;
    let token = state
        .jwt_service
        .generate_token(customer.id, UserRole::Customer)
        .unwrap();

    let (status, body) = send(app, get("/api/v1/subscribers", Some(&token))).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_package_catalog() {
    let (app, _) = app().await;

    let (status, body) = send(app, get("/api/v1/credits/packages", None)).await;

    assert_eq!(status, StatusCode::OK);
    let packages = body["data"].as_array().unwrap();
    assert!(packages.iter().any(|p| p["id"] == "pack-10" && p["credits"] == 10));
}

#[tokio::test]
async fn test_unknown_class_roster_is_not_found() {
    let (app, state) = app().await;
    let instructor = create_instructor(&state.db, "Ines").await;
    let token = state
        .jwt_service
        .generate_token(instructor.id, UserRole::Instructor)
        .unwrap();

    let uri = format!("/api/v1/classes/{}/attendees", Uuid::new_v4());
    let (status, body) = send(app, get(&uri, Some(&token))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_booking_route_statuses() {
    let (app, state) = app().await;
    let (_, activity, class) = create_instructor_class(&state.db, 2, 5).await;
    let second_class = create_class(&state.db, activity.id, None).await;
    let customer = create_customer(&state.db, "Ana", 2).await;
    let token = state
        .jwt_service
        .generate_token(customer.id, UserRole::Customer)
        .unwrap();

    let uri = format!("/api/v1/classes/{}/bookings", class.id);
    let (status, body) = send(app.clone(), post_empty(&uri, &token)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["balance"], 0);
    assert_eq!(body["data"]["booking"]["source"], "direct");
    assert_eq!(body["data"]["booking"]["creditsUsed"], 2);

    let (status, body) = send(app.clone(), post_empty(&uri, &token)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "DUPLICATE_BOOKING");

    let uri = format!("/api/v1/classes/{}/bookings", second_class.id);
    let (status, body) = send(app, post_empty(&uri, &token)).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_FUNDS");
}

#[tokio::test]
async fn test_invitation_routes_end_to_end() {
    let (app, state) = app().await;
    let (instructor, _, class) = create_instructor_class(&state.db, 1, 5).await;
    let customer = create_customer(&state.db, "Ana", 3).await;
    SubscriptionService::new(state.db.clone())
        .subscribe(instructor.id, customer.id)
        .await
        .unwrap();

    let instructor_token = state
        .jwt_service
        .generate_token(instructor.id, UserRole::Instructor)
        .unwrap();
    let customer_token = state
        .jwt_service
        .generate_token(customer.id, UserRole::Customer)
        .unwrap();

    let uri = format!("/api/v1/classes/{}/invitations", class.id);
    let (status, body) = send(
        app.clone(),
        send_json("POST", &uri, &instructor_token, json!({ "customerId": customer.id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "pending");
    let invitation_id: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();

    let (status, body) = send(app.clone(), get(&uri, Some(&instructor_token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let stored = class_invitations::Entity::find_by_id(invitation_id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    let mut overdue: class_invitations::ActiveModel = stored.into();
    overdue.expires_at = Set(OffsetDateTime::now_utc() - Duration::hours(1));
    overdue.update(&state.db).await.unwrap();

    let respond_uri = format!("/api/v1/invitations/{}", invitation_id);
    let (status, body) = send(
        app,
        send_json("PUT", &respond_uri, &customer_token, json!({ "decision": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::GONE);
    assert_eq!(body["error"]["code"], "INVITATION_EXPIRED");
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let (app, state) = app().await;
    let customer = create_customer(&state.db, "Ana", 0).await;
    let token = state
        .jwt_service
        .generate_token(customer.id, UserRole::Customer)
        .unwrap();

    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/v1/invitations/{}", Uuid::new_v4()))
        .header("authorization", format!("Bearer {}", token))
        .header("content-type", "application/json")
        .body(Body::from("{\"decision\":"))
        .unwrap();
    let (status, body) = send(app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_purchase_route_rejects_replayed_key() {
    let (app, state) = app().await;
    let customer = create_customer(&state.db, "Ana", 0).await;
    let token = state
        .jwt_service
        .generate_token(customer.id, UserRole::Customer)
        .unwrap();

    let purchase = json!({ "packageId": "pack-5", "idempotencyKey": "order-1" });

    let (status, body) = send(
        app.clone(),
        send_json("POST", "/api/v1/credits/purchase", &token, purchase.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["creditsAdded"], 5);
    assert_eq!(body["data"]["balance"], 5);

    let (status, body) = send(
        app,
        send_json("POST", "/api/v1/credits/purchase", &token, purchase),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}
