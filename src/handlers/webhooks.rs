use crate::{
    config::Settings,
    database::connection::DbPool,
    services::{
        reconciler::{self, WebhookEnvelope},
        signature,
    },
    utils::helpers::ApiResponse,
};
use actix_web::{HttpRequest, HttpResponse, Result, web};
use serde_json::json;
use tracing::{error, info, warn};

const SIGNATURE_HEADER: &str = "X-Razorpay-Signature";

/// Gateway webhook ingestion. The signature is checked over the raw request
/// bytes before anything is parsed; every reconcile outcome short of a
/// storage failure is acknowledged with 200 so the gateway only retries
/// deliveries that can still make progress.
pub async fn razorpay(
    pool: web::Data<DbPool>,
    settings: web::Data<Settings>,
    request: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let signature = match request
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    {
        Some(signature) => signature,
        None => {
            warn!("Webhook delivery without a signature header");
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
                "Missing signature header".to_string(),
            )));
        }
    };

    if !signature::verify_webhook_signature(&body, signature, &settings.gateway.webhook_secret) {
        warn!("Webhook signature verification failed, rejecting delivery");
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "Invalid webhook signature".to_string(),
        )));
    }

    let envelope: WebhookEnvelope = match serde_json::from_slice(&body) {
        Ok(envelope) => envelope,
        Err(e) => {
            error!("Authentic webhook with unparseable body: {}", e);
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
                "Malformed webhook payload".to_string(),
            )));
        }
    };

    match reconciler::reconcile(&pool, &envelope).await {
        Ok(outcome) => {
            info!("Webhook {} reconciled: {:?}", envelope.event, outcome);
            Ok(HttpResponse::Ok().json(json!({ "status": "ok" })))
        }
        Err(e) => {
            // Non-2xx so the gateway redelivers once storage recovers.
            error!("Reconciliation failed, delivery will be retried: {}", e);
            Ok(HttpResponse::InternalServerError().json(json!({ "status": "error" })))
        }
    }
}
