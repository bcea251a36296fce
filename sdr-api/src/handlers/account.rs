use actix_web::{web, HttpRequest, HttpResponse};
use sdr_core::EngagementCore;
use shared_types::{AuthUrlResponse, ConnectionStatus};
use std::sync::Arc;

use super::{session_from, ApiResult};

pub async fn get_status(
    core: web::Data<Arc<EngagementCore>>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let session = session_from(&req);
    let status = core.account.status(session.as_ref()).await?;
    Ok(HttpResponse::Ok().json(status))
}

pub async fn connect(
    core: web::Data<Arc<EngagementCore>>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let session = session_from(&req);
    let auth_url = core.account.connect_url(session.as_ref()).await?;
    Ok(HttpResponse::Ok().json(AuthUrlResponse { auth_url }))
}

pub async fn disconnect(
    core: web::Data<Arc<EngagementCore>>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let session = session_from(&req);
    core.account.disconnect(session.as_ref()).await?;
    Ok(HttpResponse::Ok().json(ConnectionStatus::default()))
}
