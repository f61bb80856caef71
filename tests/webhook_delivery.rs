//! Webhook authenticity checks run against the raw request bytes before any
//! state is read or written.

use actix_web::{App, test, web};
use fundrail::config::{DatabaseSettings, GatewaySettings, ServerSettings, Settings};
use fundrail::database::connection::DbPool;
use fundrail::routes;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use sqlx::postgres::PgPoolOptions;

type HmacSha256 = Hmac<Sha256>;

const WEBHOOK_SECRET: &str = "whsec_test123secret456";

fn sign(payload: &[u8], secret: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC key");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseSettings {
            url: "postgres://localhost/fundrail_test".to_string(),
        },
        gateway: GatewaySettings {
            key_id: "rzp_test_key".to_string(),
            key_secret: "rzp_test_secret".to_string(),
            webhook_secret: WEBHOOK_SECRET.to_string(),
            api_base: "http://localhost:9".to_string(),
            currency: "INR".to_string(),
        },
    }
}

/// Never dials out; deliveries rejected before storage is consulted pass
/// without a database.
fn lazy_pool() -> DbPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost/fundrail_test")
        .expect("lazy pool")
}

fn captured_event_body(order_id: &str) -> String {
    format!(
        r#"{{"entity":"event","event":"payment.captured","payload":{{"payment":{{"entity":{{"id":"pay_test01","order_id":"{order_id}","status":"captured"}}}}}}}}"#
    )
}

#[actix_web::test]
async fn missing_signature_header_is_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(lazy_pool()))
            .app_data(web::Data::new(test_settings()))
            .service(web::scope("/api").configure(routes::api::scoped_config)),
    )
    .await;

    let request = test::TestRequest::post()
        .uri("/api/webhooks/razorpay")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(captured_event_body("order_missing_sig"))
        .to_request();

    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), 400);
}

#[actix_web::test]
async fn forged_signature_is_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(lazy_pool()))
            .app_data(web::Data::new(test_settings()))
            .service(web::scope("/api").configure(routes::api::scoped_config)),
    )
    .await;

    let body = captured_event_body("order_forged");
    let forged = sign(body.as_bytes(), "wrong_secret");

    let request = test::TestRequest::post()
        .uri("/api/webhooks/razorpay")
        .insert_header(("Content-Type", "application/json"))
        .insert_header(("X-Razorpay-Signature", forged))
        .set_payload(body)
        .to_request();

    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), 400);
}

#[actix_web::test]
async fn tampered_body_is_rejected() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(lazy_pool()))
            .app_data(web::Data::new(test_settings()))
            .service(web::scope("/api").configure(routes::api::scoped_config)),
    )
    .await;

    let original = captured_event_body("order_original");
    let signature = sign(original.as_bytes(), WEBHOOK_SECRET);
    let tampered = captured_event_body("order_swapped");

    let request = test::TestRequest::post()
        .uri("/api/webhooks/razorpay")
        .insert_header(("Content-Type", "application/json"))
        .insert_header(("X-Razorpay-Signature", signature))
        .set_payload(tampered)
        .to_request();

    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), 400);
}

#[actix_web::test]
async fn authentic_delivery_of_an_unhandled_event_is_acknowledged() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(lazy_pool()))
            .app_data(web::Data::new(test_settings()))
            .service(web::scope("/api").configure(routes::api::scoped_config)),
    )
    .await;

    // payment.authorized carries no state change; the handler verifies the
    // signature, then acknowledges without consulting storage.
    let body = r#"{"entity":"event","event":"payment.authorized","payload":{"payment":{"entity":{"id":"pay_test02","order_id":"order_authorized","status":"authorized"}}}}"#;
    let signature = sign(body.as_bytes(), WEBHOOK_SECRET);

    let request = test::TestRequest::post()
        .uri("/api/webhooks/razorpay")
        .insert_header(("Content-Type", "application/json"))
        .insert_header(("X-Razorpay-Signature", signature))
        .set_payload(body)
        .to_request();

    let response = test::call_service(&app, request).await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = test::read_body_json(response).await;
    assert_eq!(body["status"], "ok");
}
