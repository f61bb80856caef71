use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use fundrail::config::Settings;
use fundrail::database::connection::establish_pool;
use fundrail::routes;
use fundrail::services::gateway::{PaymentGateway, RazorpayClient};
use std::sync::Arc;
use tracing::info;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let settings = Settings::from_env()?;

    let pool = establish_pool(&settings.database.url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");

    let gateway: Arc<dyn PaymentGateway> = Arc::new(RazorpayClient::new(&settings.gateway));
    let gateway = web::Data::from(gateway);

    let bind_address = (settings.server.host.clone(), settings.server.port);
    info!("Starting server on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(settings.clone()))
            .app_data(gateway.clone())
            .service(web::scope("/api").configure(routes::api::scoped_config))
    })
    .bind(bind_address)?
    .run()
    .await?;

    Ok(())
}
