use actix_web::{web, HttpResponse};
use sdr_core::EngagementCore;
use std::sync::Arc;

use super::ApiResult;

pub async fn get_dashboard(core: web::Data<Arc<EngagementCore>>) -> ApiResult<HttpResponse> {
    let snapshot = core.dashboard().await;
    Ok(HttpResponse::Ok().json(snapshot))
}
