use actix_web::{web, HttpRequest, HttpResponse};
use sdr_core::{EngagementCore, RefreshOutcome};
use shared_types::{
    AddBotRequest, KnowledgeBaseQuery, KnowledgeBaseSearchResponse, MeetingsResponse,
};
use std::sync::Arc;

use super::{session_from, ApiResult};

async fn meetings_response(
    core: &EngagementCore,
    message: Option<String>,
) -> MeetingsResponse {
    MeetingsResponse {
        active: core.meetings.active().await,
        completed: core.meetings.completed().await,
        message,
    }
}

pub async fn list_meetings(core: web::Data<Arc<EngagementCore>>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(meetings_response(&core, None).await))
}

pub async fn add_bot(
    core: web::Data<Arc<EngagementCore>>,
    request: web::Json<AddBotRequest>,
) -> ApiResult<HttpResponse> {
    let AddBotRequest { title, meeting_url } = request.into_inner();
    let meeting = core.meetings.add_bot(&meeting_url, Some(title.as_str())).await?;
    Ok(HttpResponse::Created().json(meeting))
}

pub async fn remove_bot(
    core: web::Data<Arc<EngagementCore>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let meeting = core.meetings.remove_bot(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(meeting))
}

pub async fn refresh_meetings(core: web::Data<Arc<EngagementCore>>) -> ApiResult<HttpResponse> {
    let message = match core.meetings.refresh_completed().await? {
        RefreshOutcome::Refreshed(_) | RefreshOutcome::Superseded => None,
        RefreshOutcome::NoMeetings => Some("No new meetings found".to_string()),
    };
    Ok(HttpResponse::Ok().json(meetings_response(&core, message).await))
}

pub async fn get_meeting_detail(
    core: web::Data<Arc<EngagementCore>>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let detail = core.meetings.detail(&path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

pub async fn search_knowledge_base(
    core: web::Data<Arc<EngagementCore>>,
    request: web::Json<KnowledgeBaseQuery>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let session = session_from(&req);
    let KnowledgeBaseQuery { query, max_results } = request.into_inner();

    let answer = core
        .meetings
        .search_knowledge_base(session.as_ref(), &query, max_results)
        .await?;
    let sources = core.meetings.resolve_sources(answer.sources).await;

    Ok(HttpResponse::Ok().json(KnowledgeBaseSearchResponse {
        response: answer.response,
        sources,
    }))
}
