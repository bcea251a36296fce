use actix_web::{web, HttpResponse};
use sdr_core::{DiscoveryOutcome, EngagementCore, ProspectFilter};
use shared_types::{
    DiscoveryPreferences, DiscoveryResponse, DraftCreatedResponse, ListProspectsRequest, Prospect,
    ProspectsResponse, TierCounts,
};
use std::sync::Arc;

use super::{persist_emails, ApiResult};
use crate::database::Database;

pub async fn list_prospects(
    core: web::Data<Arc<EngagementCore>>,
    query: web::Query<ListProspectsRequest>,
) -> ApiResult<HttpResponse> {
    let ListProspectsRequest {
        query,
        min_score,
        sort,
    } = query.into_inner();

    let filter = ProspectFilter {
        query,
        min_score,
        sort: sort.unwrap_or_default(),
    };
    let prospects = core.prospects.filtered(&filter).await;
    let total_count = core.prospects.len().await;

    Ok(HttpResponse::Ok().json(ProspectsResponse {
        tiers: TierCounts::tally(&prospects),
        prospects,
        total_count,
    }))
}

pub async fn discover_prospects(
    core: web::Data<Arc<EngagementCore>>,
    request: web::Json<DiscoveryPreferences>,
) -> ApiResult<HttpResponse> {
    let outcome = core.prospects.discover(request.into_inner()).await?;

    let response = match outcome {
        DiscoveryOutcome::Replaced(_) => DiscoveryResponse::Replaced {
            count: core.prospects.len().await,
        },
        DiscoveryOutcome::NoResults => DiscoveryResponse::NoResults {
            message: "No new prospects found".to_string(),
        },
        DiscoveryOutcome::Superseded => DiscoveryResponse::Superseded {
            count: core.prospects.len().await,
        },
    };

    Ok(HttpResponse::Ok().json(response))
}

pub async fn draft_email(
    core: web::Data<Arc<EngagementCore>>,
    db: web::Data<Arc<Database>>,
    request: web::Json<Prospect>,
) -> ApiResult<HttpResponse> {
    let prospect = request.into_inner();

    let draft = core.emails.request_draft(&prospect).await?;
    let record = core.emails.record_draft(&prospect, &draft).await;
    persist_emails(&db, std::slice::from_ref(&record)).await;

    Ok(HttpResponse::Ok().json(DraftCreatedResponse {
        email: draft,
        record,
    }))
}
