//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the API router with versioned endpoints
    let api_v1 = Router::new()
        // Templates and slots
        .route(
            "/templates",
            get(handlers::list_templates).post(handlers::create_template),
        )
        .route("/templates/{template_id}", get(handlers::get_template))
        .route("/templates/{template_id}/preview", get(handlers::preview_slots))
        .route(
            "/templates/{template_id}/slots",
            get(handlers::list_slots).post(handlers::generate_slots),
        )
        .route("/slots/{slot_id}/status", put(handlers::update_slot_status))
        .route("/slots/{slot_id}/contacts", put(handlers::assign_slot_contacts))
        .route(
            "/slots/{slot_id}/contacts/{contact_id}",
            delete(handlers::remove_slot_contact),
        )
        .route("/slots/{slot_id}/groups", put(handlers::assign_slot_groups))
        // Directory
        .route("/contacts", post(handlers::create_contact))
        .route("/families", post(handlers::create_family))
        .route("/groups", post(handlers::create_group))
        .route("/interactions", post(handlers::create_interaction))
        // Reminders
        .route(
            "/reminders",
            get(handlers::list_reminders).post(handlers::create_reminder),
        )
        .route(
            "/reminders/{reminder_id}",
            delete(handlers::delete_reminder),
        )
        .route(
            "/reminders/{reminder_id}/complete",
            post(handlers::complete_reminder),
        )
        // Scores
        .route("/contacts/{contact_id}/score", get(handlers::contact_score))
        .route("/families/{family_id}/score", get(handlers::family_score))
        .route("/groups/scores", get(handlers::group_scores))
        .route("/groups/{group_id}/score", get(handlers::group_score))
        // Dashboard
        .route("/dashboard/birthdays", get(handlers::upcoming_birthdays))
        .route("/dashboard/neglected", get(handlers::neglected_contacts))
        .route("/dashboard/slots", get(handlers::upcoming_slots))
        .route("/dashboard/reminders", get(handlers::reminder_dashboard));

    // Combine all routes
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/v1", api_v1)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
