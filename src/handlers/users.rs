use crate::{
    database::connection::DbPool,
    middleware::auth::AuthenticatedUser,
    models::{donation::Donation, user::User, user::UserRole},
    utils::helpers::ApiResponse,
};
use actix_web::{HttpResponse, Result, web};
use tracing::error;

pub async fn index(pool: web::Data<DbPool>, user: AuthenticatedUser) -> Result<HttpResponse> {
    if user.user_role != UserRole::Admin {
        return Ok(HttpResponse::Forbidden().json(ApiResponse::<()>::error(
            "Access denied".to_string(),
        )));
    }

    let users = User::find_all(&pool).await.map_err(|e| {
        error!("Failed to fetch users: {}", e);
        actix_web::error::ErrorInternalServerError("Failed to fetch users")
    })?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(users)))
}

/// The caller's own donation history.
pub async fn my_donations(pool: web::Data<DbPool>, user: AuthenticatedUser) -> Result<HttpResponse> {
    match Donation::find_by_user(&pool, user.user_id).await {
        Ok(donations) => Ok(HttpResponse::Ok().json(ApiResponse::success(donations))),
        Err(e) => {
            error!("Database error getting user donations: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve donations".to_string(),
                )),
            )
        }
    }
}
