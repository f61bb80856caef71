use crate::{
    config::Settings,
    database::connection::DbPool,
    models::{
        campaign::Campaign,
        donation::{CreateDonation, Donation, PaymentEvent, Payer, Transition},
        user::User,
    },
    requests::donation::{CreateOrderRequest, VerifyPaymentRequest},
    services::{gateway::PaymentGateway, signature},
    utils::{helpers::ApiResponse, validation},
};
use actix_web::{HttpResponse, Result, web};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: String,
    pub donation_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub key_id: String,
}

/// Open a payment intent for a pledge. Validation runs before the gateway is
/// touched, and the local donation row is only written once the gateway has
/// acknowledged the order, so a gateway failure leaves nothing behind.
pub async fn create_order(
    pool: web::Data<DbPool>,
    gateway: web::Data<dyn PaymentGateway>,
    settings: web::Data<Settings>,
    request: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = validation::validate_amount(request.amount) {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())));
    }

    let campaign = match Campaign::find_by_id(&pool, request.project_id).await {
        Ok(Some(campaign)) => campaign,
        Ok(None) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(format!(
                "Campaign {} not found",
                request.project_id
            ))));
        }
        Err(e) => {
            error!("Database error looking up campaign: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to verify campaign".to_string(),
                )),
            );
        }
    };

    if !campaign.is_fundable() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "Campaign is not accepting donations".to_string(),
        )));
    }

    if let Err(e) =
        validation::validate_guest_identity(request.guest_email.as_deref(), request.guest_pan.as_deref())
    {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(e.to_string())));
    }

    let payer = if let (Some(email), Some(pan)) = (&request.guest_email, &request.guest_pan) {
        Payer::Guest {
            email: email.clone(),
            pan: pan.clone(),
        }
    } else {
        let Some(email) = &request.email else {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
                "Payer email is required".to_string(),
            )));
        };
        match User::find_by_email(&pool, email).await {
            Ok(Some(user)) => Payer::Registered(user.id),
            Ok(None) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
                    "No account exists for the payer email".to_string(),
                )));
            }
            Err(e) => {
                error!("Database error resolving payer: {}", e);
                return Ok(
                    HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                        "Failed to resolve payer".to_string(),
                    )),
                );
            }
        }
    };

    let receipt = format!("rcpt_{}", Uuid::new_v4().simple());
    let order = match gateway
        .create_order(request.amount, &settings.gateway.currency, &receipt)
        .await
    {
        Ok(order) => order,
        Err(e) => {
            error!("Gateway order creation failed: {}", e);
            return Ok(HttpResponse::BadGateway().json(ApiResponse::<()>::error(
                "Payment gateway is unavailable".to_string(),
            )));
        }
    };

    let create_donation = CreateDonation {
        campaign_id: campaign.id,
        amount: request.amount,
        currency: order.currency.clone(),
        gateway_order_id: order.order_id.clone(),
        payer,
    };

    match Donation::create(&pool, create_donation).await {
        Ok(donation) => {
            info!(
                "Donation {} created for campaign {} with order {}",
                donation.id, campaign.id, order.order_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(OrderResponse {
                order_id: order.order_id,
                donation_id: donation.id,
                amount: order.amount,
                currency: order.currency,
                key_id: gateway.key_id().to_string(),
            })))
        }
        Err(e) => {
            error!("Database error recording donation: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to record donation".to_string(),
                )),
            )
        }
    }
}

/// Client-side confirmation path. Applies the same terminal-state idempotency
/// as the webhook reconciler, so a checkout confirmation racing a webhook
/// delivery credits the campaign exactly once.
pub async fn verify_payment(
    pool: web::Data<DbPool>,
    settings: web::Data<Settings>,
    request: web::Json<VerifyPaymentRequest>,
) -> Result<HttpResponse> {
    let authentic = signature::verify_payment_signature(
        &request.razorpay_order_id,
        &request.razorpay_payment_id,
        &request.razorpay_signature,
        &settings.gateway.key_secret,
    );

    if !authentic {
        warn!(
            "Payment signature mismatch for order {}",
            request.razorpay_order_id
        );
        return Ok(HttpResponse::BadRequest().json(ApiResponse::<()>::error(
            "Invalid payment signature".to_string(),
        )));
    }

    let donation = match Donation::find_by_order_id(&pool, &request.razorpay_order_id).await {
        Ok(Some(donation)) => donation,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error(
                "No donation matches the order".to_string(),
            )));
        }
        Err(e) => {
            error!("Database error looking up donation: {}", e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve donation".to_string(),
                )),
            );
        }
    };

    if let Transition::Apply(_) = donation.status.transition(PaymentEvent::Captured) {
        if let Err(e) = donation.mark_paid(&pool, &request.razorpay_payment_id).await {
            error!("Failed to apply payment to donation {}: {}", donation.id, e);
            return Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to confirm payment".to_string(),
                )),
            );
        }
    }

    match Donation::find_by_id(&pool, donation.id).await {
        Ok(Some(donation)) => Ok(HttpResponse::Ok().json(ApiResponse::success(donation))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error(
            "Donation not found".to_string(),
        ))),
        Err(e) => {
            error!("Database error re-reading donation: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve donation".to_string(),
                )),
            )
        }
    }
}

pub async fn get_donation(pool: web::Data<DbPool>, path: web::Path<Uuid>) -> Result<HttpResponse> {
    let donation_id = path.into_inner();

    match Donation::find_by_id(&pool, donation_id).await {
        Ok(Some(donation)) => Ok(HttpResponse::Ok().json(ApiResponse::success(donation))),
        Ok(None) => Ok(HttpResponse::NotFound().json(ApiResponse::<()>::error(
            "Donation not found".to_string(),
        ))),
        Err(e) => {
            error!("Database error getting donation: {}", e);
            Ok(
                HttpResponse::InternalServerError().json(ApiResponse::<()>::error(
                    "Failed to retrieve donation".to_string(),
                )),
            )
        }
    }
}
