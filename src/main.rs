use actix_web::{App, HttpResponse, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use serde_json::json;
use std::io::Write; // for env_logger custom formatter

use seva_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    error::{AppError, expose_internal_errors},
    external::RazorpayService,
    handlers,
    middlewares::{AuthMiddleware, RateLimiter, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

const JSON_BODY_LIMIT: usize = 1024 * 1024;

async fn route_not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "success": false,
        "message": "Route not found"
    }))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().context("failed to load configuration")?;
    expose_internal_errors(config.server.is_development());

    let pool = create_pool(&config.database)
        .await
        .context("failed to create database connection pool")?;
    run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.expires_in);
    let razorpay_service = RazorpayService::new(config.razorpay.clone());
    if config.razorpay.key_id.is_empty() || config.razorpay.key_secret.is_empty() {
        log::warn!("Razorpay credentials are not configured; order creation will fail");
    }

    let auth_service = AuthService::new(pool.clone(), jwt_service.clone(), config.auth.clone());
    let donation_service = DonationService::new(pool.clone());
    let event_service = EventService::new(pool.clone());
    let gallery_service = GalleryService::new(pool.clone());
    let payment_service = PaymentService::new(pool.clone(), razorpay_service);
    let analytics_service = AnalyticsService::new(pool.clone());

    // Built once so every worker shares the same counters.
    let rate_limiter = RateLimiter::from_config(&config.rate_limit);
    let allowed_origins = config.server.allowed_origins.clone();
    let upload_config = web::Data::new(config.upload.clone());

    log::info!(
        "Starting HTTP server at {}:{} ({})",
        config.server.host,
        config.server.port,
        config.server.environment
    );

    HttpServer::new(move || {
        App::new()
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .wrap(rate_limiter.clone())
            .wrap(create_cors(&allowed_origins))
            .wrap(Logger::default())
            .app_data(
                web::JsonConfig::default()
                    .limit(JSON_BODY_LIMIT)
                    .error_handler(|err, _req| {
                        AppError::ValidationError(format!("Invalid JSON body: {err}")).into()
                    }),
            )
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                AppError::ValidationError(format!("Invalid query string: {err}")).into()
            }))
            .app_data(web::PathConfig::default().error_handler(|err, _req| {
                AppError::ValidationError(format!("Invalid path parameter: {err}")).into()
            }))
            .app_data(upload_config.clone())
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(donation_service.clone()))
            .app_data(web::Data::new(event_service.clone()))
            .app_data(web::Data::new(gallery_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(analytics_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api")
                    .configure(handlers::health_config)
                    .configure(handlers::auth_config)
                    .configure(handlers::donation_config)
                    .configure(handlers::event_config)
                    .configure(handlers::gallery_config)
                    .configure(handlers::payment_config)
                    .configure(handlers::analytics_config),
            )
            .default_service(web::to(route_not_found))
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    Ok(())
}
