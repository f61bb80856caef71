use crate::models::user::UserRole;
use crate::services::auth::AuthService;
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::http::header;
use actix_web::{Error, FromRequest, HttpRequest, dev::Payload};
use futures_util::future::{Ready, ready};
use tracing::error;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
    pub user_role: UserRole,
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let result = match token {
            None => Err(ErrorUnauthorized("Missing bearer token")),
            Some(token) => AuthService::new()
                .map_err(|e| {
                    error!("Failed to create auth service: {}", e);
                    ErrorInternalServerError("Authentication service error")
                })
                .and_then(|service| {
                    service
                        .decode_token(token)
                        .map_err(|_| ErrorUnauthorized("Invalid or expired token"))
                })
                .map(|claims| AuthenticatedUser {
                    user_id: claims.sub,
                    email: claims.email,
                    user_role: claims.role,
                }),
        };

        ready(result)
    }
}
