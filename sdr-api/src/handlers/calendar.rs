use actix_web::{web, HttpRequest, HttpResponse};
use sdr_core::EngagementCore;
use shared_types::{ListEventsRequest, NewEventForm};
use std::sync::Arc;

use super::{session_from, ApiResult};

pub async fn list_events(
    core: web::Data<Arc<EngagementCore>>,
    query: web::Query<ListEventsRequest>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let session = session_from(&req);
    let view = core
        .calendar
        .list_events(session.as_ref(), query.into_inner().max_results)
        .await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn create_event(
    core: web::Data<Arc<EngagementCore>>,
    request: web::Json<NewEventForm>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let session = session_from(&req);
    let event = core
        .calendar
        .create_event(session.as_ref(), &request.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(event))
}
