use std::sync::Arc;

use axum::{routing::get, Router};

use notification_cell::router::notification_routes;
use notification_cell::NotificationDispatchService;
use schedule_cell::router::schedule_routes;
use schedule_cell::AppointmentSchedulingService;
use shared_models::identity::DirectoryReader;
use worklist_cell::router::worklist_routes;
use worklist_cell::ProviderWorklistService;

pub fn create_router(directory: Arc<dyn DirectoryReader>) -> Router {
    // One dispatcher observes both cells; notifications are a projection
    // over their transitions.
    let dispatcher = Arc::new(NotificationDispatchService::new(directory));
    let scheduling = Arc::new(AppointmentSchedulingService::new(Arc::clone(&dispatcher)));
    let worklist = Arc::new(ProviderWorklistService::new(Arc::clone(&dispatcher)));

    Router::new()
        .route("/", get(|| async { "CareLink API is running!" }))
        .nest("/appointments", schedule_routes(scheduling))
        .nest("/tasks", worklist_routes(worklist))
        .nest("/notifications", notification_routes(dispatcher))
}
