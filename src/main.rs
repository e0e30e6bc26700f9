use std::env;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use adventuretime_api::db;
use adventuretime_api::routes;
use adventuretime_api::services::payment::netopia::NetopiaClient;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    }

    let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);

    let mongo_uri = env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;

    let payment_client = web::Data::new(NetopiaClient::from_env());

    log::info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        // The storefront is served from another origin.
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(client.clone()))
            .app_data(payment_client.clone())
            .route("/health", web::get().to(routes::health::health_check))
            .service(
                web::scope("/api")
                    .service(
                        web::scope("/adventures")
                            .route("", web::get().to(routes::adventure::get_all))
                            .route("/search", web::post().to(routes::adventure::search))
                            .route("/{id}", web::get().to(routes::adventure::get_by_id)),
                    )
                    .service(
                        web::scope("/coupons")
                            .route("/validate", web::post().to(routes::coupon::validate)),
                    )
                    .service(
                        web::scope("/checkout")
                            .route("/intent", web::post().to(routes::checkout::create_intent))
                            .route(
                                "/intent/{id}/phone",
                                web::put().to(routes::checkout::attach_phone),
                            ),
                    )
                    .service(
                        web::scope("/payments")
                            .route("/ipn", web::post().to(routes::payment::handle_ipn))
                            .route("/{id}/status", web::get().to(routes::payment::get_status)),
                    )
                    .service(
                        web::scope("/bookings")
                            .route("/id/{id}", web::get().to(routes::bookings::get_by_id))
                            .route("/{email}", web::get().to(routes::bookings::get_for_email)),
                    )
                    .service(
                        web::scope("/vouchers")
                            .route("", web::post().to(routes::voucher::purchase))
                            .route("/ipn", web::post().to(routes::voucher::handle_ipn)),
                    ),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
