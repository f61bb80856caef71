use crate::{
    database::connection::DbPool,
    middleware::auth::AuthenticatedUser,
    models::{
        campaign::{Campaign, CampaignError, CampaignStatus, CreateCampaign},
        donation::Donation,
        user::UserRole,
    },
    requests::campaign::{CampaignRequest, UpdateCampaignStatusRequest},
    utils::helpers::ApiResponse,
};
use actix_web::{HttpResponse, Result, web};
use tracing::{error, info};
use uuid::Uuid;

pub async fn create(
    pool: web::Data<DbPool>,
    request: web::Json<CampaignRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    info!("Creating campaign for user: {}", user.user_id);

    let create_campaign = CreateCampaign {
        owner_id: user.user_id,
        title: request.title.clone(),
        description: request.description.clone(),
        goal_amount: request.goal_amount,
    };

    match Campaign::create(&pool, create_campaign).await {
        Ok(campaign) => {
            info!("Successfully created campaign with ID: {}", campaign.id);
            Ok(HttpResponse::Created().json(ApiResponse::success(campaign)))
        }
        Err(CampaignError::Database(e)) => {
            error!("Database error creating campaign: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to create campaign".to_string(),
                )),
            )
        }
        Err(e) => {
            error!("Error creating campaign: {}", e);
            Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())))
        }
    }
}

pub async fn get_campaign(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let campaign_id = path.into_inner();

    match Campaign::find_by_id(&pool, campaign_id).await {
        Ok(Some(campaign)) => Ok(HttpResponse::Ok().json(ApiResponse::success(campaign))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error(
            "Campaign not found".to_string(),
        ))),
        Err(e) => {
            error!("Database error getting campaign: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve campaign".to_string(),
                )),
            )
        }
    }
}

pub async fn all(pool: web::Data<DbPool>) -> Result<HttpResponse> {
    match Campaign::find_all(&pool).await {
        Ok(campaigns) => Ok(HttpResponse::Ok().json(ApiResponse::success(campaigns))),
        Err(e) => {
            error!("Database error getting all campaigns: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve campaigns".to_string(),
                )),
            )
        }
    }
}

pub async fn donations(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let campaign_id = path.into_inner();

    match Donation::find_by_campaign(&pool, campaign_id).await {
        Ok(donations) => Ok(HttpResponse::Ok().json(ApiResponse::success(donations))),
        Err(e) => {
            error!("Database error getting campaign donations: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve donations".to_string(),
                )),
            )
        }
    }
}

/// Admins move campaigns between draft, live, and closed. Only live
/// campaigns can take donations.
pub async fn update_status(
    pool: web::Data<DbPool>,
    path: web::Path<Uuid>,
    request: web::Json<UpdateCampaignStatusRequest>,
    user: AuthenticatedUser,
) -> Result<HttpResponse> {
    let campaign_id = path.into_inner();
    info!(
        "Updating status of campaign {} for user: {}",
        campaign_id, user.user_id
    );

    if user.user_role != UserRole::Admin {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::<()>::error(
            "Access denied".to_string(),
        )));
    }

    let status: CampaignStatus = match request.status.parse() {
        Ok(status) => status,
        Err(()) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(format!(
                "Unknown campaign status: {}",
                request.status
            ))));
        }
    };

    match Campaign::set_status(&pool, campaign_id, status).await {
        Ok(campaign) => {
            info!("Campaign {} moved to {:?}", campaign_id, campaign.status);
            Ok(HttpResponse::Ok().json(ApiResponse::success(campaign)))
        }
        Err(CampaignError::NotFound { id }) => Ok(HttpResponse::NotFound().json(
            ApiResponse::<()>::error(format!("Campaign {} not found", id)),
        )),
        Err(e) => {
            error!("Error updating campaign status: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to update campaign".to_string(),
                )),
            )
        }
    }
}
