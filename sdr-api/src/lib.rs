pub mod config;
pub mod database;
pub mod handlers;
pub mod helpers;

pub use database::Database;

use actix_web::{get, web, HttpResponse, Responder};
use sdr_core::KeyValueStore;
use std::sync::Arc;

#[get("/health")]
async fn health(
    db: web::Data<Arc<Database>>,
    store: web::Data<Arc<dyn KeyValueStore>>,
) -> impl Responder {
    let database = db.is_healthy().await;
    let cache = store.is_open();

    let body = serde_json::json!({
        "status": if database && cache { "healthy" } else { "unhealthy" },
        "database": if database { "connected" } else { "disconnected" },
        "cache": if cache { "open" } else { "closed" },
    });
    if database && cache {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

/// Every route the dashboard talks to.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(health)
        .route("/api/dashboard", web::get().to(handlers::dashboard::get_dashboard))
        .route("/api/prospects", web::get().to(handlers::prospects::list_prospects))
        .route("/api/prospects/discover", web::post().to(handlers::prospects::discover_prospects))
        .route("/api/prospects/draft", web::post().to(handlers::prospects::draft_email))
        .route("/api/emails", web::get().to(handlers::emails::list_emails))
        .route("/api/emails/send", web::post().to(handlers::emails::send_email))
        .route("/api/emails/replies", web::get().to(handlers::emails::list_replies))
        .route("/api/emails/replies/fetch", web::post().to(handlers::emails::fetch_replies))
        .route("/api/emails/followups/send", web::post().to(handlers::emails::send_followup))
        .route("/api/emails/{id}/replied", web::post().to(handlers::emails::mark_replied))
        .route("/api/meetings", web::get().to(handlers::meetings::list_meetings))
        .route("/api/meetings/bots", web::post().to(handlers::meetings::add_bot))
        .route("/api/meetings/bots/{id}", web::delete().to(handlers::meetings::remove_bot))
        .route("/api/meetings/refresh", web::post().to(handlers::meetings::refresh_meetings))
        .route("/api/meetings/search", web::post().to(handlers::meetings::search_knowledge_base))
        .route("/api/meetings/{id}/detail", web::get().to(handlers::meetings::get_meeting_detail))
        .route("/api/calendar/events", web::get().to(handlers::calendar::list_events))
        .route("/api/calendar/events", web::post().to(handlers::calendar::create_event))
        .route("/api/account/status", web::get().to(handlers::account::get_status))
        .route("/api/account/connect", web::get().to(handlers::account::connect))
        .route("/api/account/disconnect", web::post().to(handlers::account::disconnect));
}
