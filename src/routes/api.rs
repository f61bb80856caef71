use actix_web::{HttpResponse, web};

use crate::handlers;

pub fn scoped_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(web::resource("/register").route(web::post().to(handlers::auth::register)))
            .service(web::resource("/login").route(web::post().to(handlers::auth::login))),
    )
    .service(
        web::scope("/users")
            .service(
                web::resource("")
                    .route(web::get().to(handlers::users::index))
                    .route(web::head().to(HttpResponse::MethodNotAllowed)),
            )
            .service(
                web::resource("/me/donations")
                    .route(web::get().to(handlers::users::my_donations)),
            ),
    )
    .service(
        web::scope("/campaigns")
            .service(
                web::resource("")
                    .route(web::post().to(handlers::campaigns::create))
                    .route(web::get().to(handlers::campaigns::all)),
            )
            .service(
                web::resource("/{id}").route(web::get().to(handlers::campaigns::get_campaign)),
            )
            .service(
                web::resource("/{id}/status")
                    .route(web::patch().to(handlers::campaigns::update_status)),
            )
            .service(
                web::resource("/{id}/donations")
                    .route(web::get().to(handlers::campaigns::donations)),
            ),
    )
    .service(
        web::scope("/donations")
            .service(
                web::resource("/order").route(web::post().to(handlers::donations::create_order)),
            )
            .service(
                web::resource("/verify")
                    .route(web::post().to(handlers::donations::verify_payment)),
            )
            .service(
                web::resource("/{id}").route(web::get().to(handlers::donations::get_donation)),
            ),
    )
    .service(
        web::scope("/webhooks")
            .service(web::resource("/razorpay").route(web::post().to(handlers::webhooks::razorpay))),
    );
}
