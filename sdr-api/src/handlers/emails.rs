use actix_web::{web, HttpRequest, HttpResponse};
use sdr_core::EngagementCore;
use shared_types::{
    EmailsResponse, MarkRepliedRequest, RepliesResponse, SendEmailRequest, SendFollowupRequest,
};
use std::sync::Arc;

use super::{persist_emails, session_from, ApiResult};
use crate::database::Database;

pub async fn list_emails(core: web::Data<Arc<EngagementCore>>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(EmailsResponse {
        emails: core.emails.emails().await,
    }))
}

pub async fn send_email(
    core: web::Data<Arc<EngagementCore>>,
    db: web::Data<Arc<Database>>,
    request: web::Json<SendEmailRequest>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let session = session_from(&req);
    let SendEmailRequest { to, subject, body } = request.into_inner();

    let record = core
        .emails
        .send_email(session.as_ref(), &to, &subject, &body)
        .await?;
    persist_emails(&db, std::slice::from_ref(&record)).await;

    Ok(HttpResponse::Ok().json(record))
}

/// Replies currently awaiting review
pub async fn list_replies(core: web::Data<Arc<EngagementCore>>) -> ApiResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(RepliesResponse {
        analyzed_emails: core.emails.analyzed_emails().await,
        message: String::new(),
    }))
}

pub async fn fetch_replies(
    core: web::Data<Arc<EngagementCore>>,
    db: web::Data<Arc<Database>>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let session = session_from(&req);

    let sync = core.emails.fetch_replies(session.as_ref()).await?;
    persist_emails(&db, &sync.updated).await;

    Ok(HttpResponse::Ok().json(RepliesResponse {
        analyzed_emails: sync.analyzed_emails,
        message: sync.message,
    }))
}

pub async fn send_followup(
    core: web::Data<Arc<EngagementCore>>,
    db: web::Data<Arc<Database>>,
    request: web::Json<SendFollowupRequest>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let session = session_from(&req);
    let SendFollowupRequest {
        from,
        subject,
        edited_body,
    } = request.into_inner();

    let record = core
        .emails
        .send_followup(session.as_ref(), &from, &subject, edited_body.as_deref())
        .await?;
    persist_emails(&db, std::slice::from_ref(&record)).await;

    Ok(HttpResponse::Ok().json(record))
}

/// Marks a sent email as answered when the reply arrived outside the
/// analyzed inbox.
pub async fn mark_replied(
    core: web::Data<Arc<EngagementCore>>,
    db: web::Data<Arc<Database>>,
    path: web::Path<String>,
    request: web::Json<MarkRepliedRequest>,
) -> ApiResult<HttpResponse> {
    let replied_at = request.into_inner().replied_at.unwrap_or_else(chrono::Utc::now);

    let record = core.emails.mark_replied(&path.into_inner(), replied_at).await?;
    persist_emails(&db, std::slice::from_ref(&record)).await;

    Ok(HttpResponse::Ok().json(record))
}
