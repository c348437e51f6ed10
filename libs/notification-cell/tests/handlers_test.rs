use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use notification_cell::router::notification_routes;
use notification_cell::services::dispatch::NotificationDispatchService;
use shared_models::events::DomainEvent;
use shared_models::identity::{DirectoryReader, InMemoryDirectory};

fn test_service() -> Arc<NotificationDispatchService> {
    Arc::new(NotificationDispatchService::new(
        Arc::new(InMemoryDirectory::new()) as Arc<dyn DirectoryReader>,
    ))
}

fn create_test_app(service: Arc<NotificationDispatchService>) -> Router {
    notification_routes(service)
}

async fn seed_confirmation(service: &NotificationDispatchService, recipient_id: Uuid) -> Uuid {
    service
        .observe(
            &DomainEvent::AppointmentConfirmed {
                appointment_id: Uuid::new_v4(),
                patient_id: recipient_id,
                provider_id: Uuid::new_v4(),
                start: Utc::now() + Duration::days(1),
            },
            Utc::now(),
        )
        .await
        .expect("Seeding should create a notification")
        .id
}

async fn response_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn get(uri: String) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: String) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_list_and_unread_count_endpoints() {
    let service = test_service();
    let recipient_id = Uuid::new_v4();
    seed_confirmation(&service, recipient_id).await;
    let app = create_test_app(service);

    let response = app
        .clone()
        .oneshot(get(format!("/recipients/{}", recipient_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["count"], 1);

    let response = app
        .oneshot(get(format!("/recipients/{}/unread-count", recipient_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["unread_count"], 1);
}

#[tokio::test]
async fn test_mark_read_endpoint() {
    let service = test_service();
    let recipient_id = Uuid::new_v4();
    let notification_id = seed_confirmation(&service, recipient_id).await;
    let app = create_test_app(service);

    let response = app
        .clone()
        .oneshot(post(format!("/{}/read", notification_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["notification"]["read"], true);

    // Unknown id is a 404.
    let response = app
        .oneshot(post(format!("/{}/read", Uuid::new_v4())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_read_all_endpoint() {
    let service = test_service();
    let recipient_id = Uuid::new_v4();
    seed_confirmation(&service, recipient_id).await;
    seed_confirmation(&service, recipient_id).await;
    let app = create_test_app(service);

    let response = app
        .oneshot(post(format!("/recipients/{}/read-all", recipient_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["marked"], 2);
}

#[tokio::test]
async fn test_delete_endpoint_tombstones() {
    let service = test_service();
    let recipient_id = Uuid::new_v4();
    let notification_id = seed_confirmation(&service, recipient_id).await;
    let app = create_test_app(service);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/{}", notification_id))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Gone for good: the read toggle cannot bring it back.
    let response = app
        .oneshot(post(format!("/{}/read", notification_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
