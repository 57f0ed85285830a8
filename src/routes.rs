use crate::{
    api::{attendance, daily_status, export, monitor, students, teachers},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, middleware::from_fn, web};
use serde_json::json;
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("period and burst size are non-zero");
    Governor::new(&cfg)
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "OK" }))
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Malformed bodies and query strings are validation failures
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _| AppError::validation(err.to_string()).into()),
    );

    // Public routes
    cfg.route("/health", web::get().to(health)).service(
        web::scope("/auth").service(
            web::resource("/login")
                .wrap(login_limiter)
                .route(web::post().to(handlers::login)),
        ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .route("/me", web::get().to(handlers::me))
            .service(
                web::scope("/teachers")
                    // /teachers
                    .service(
                        web::resource("")
                            .route(web::get().to(teachers::list_teachers))
                            .route(web::post().to(teachers::create_teacher)),
                    )
                    // /teachers/{id}
                    .service(
                        web::resource("/{id}").route(web::put().to(teachers::update_teacher)),
                    )
                    // /teachers/{id}/toggle
                    .service(
                        web::resource("/{id}/toggle")
                            .route(web::post().to(teachers::toggle_teacher)),
                    ),
            )
            .service(
                web::scope("/students")
                    .service(
                        web::resource("")
                            .route(web::get().to(students::list_students))
                            .route(web::post().to(students::create_student)),
                    )
                    .service(
                        web::resource("/{id}/toggle")
                            .route(web::post().to(students::toggle_student)),
                    ),
            )
            .service(
                web::resource("/attendance")
                    .route(web::get().to(attendance::attendance_sheet))
                    .route(web::post().to(attendance::submit_attendance)),
            )
            .service(
                web::resource("/daily-status")
                    .route(web::get().to(daily_status::get_daily_status))
                    .route(web::put().to(daily_status::set_daily_status)),
            )
            .route("/monitor", web::get().to(monitor::monitor))
            .route("/export", web::get().to(export::export_attendance)),
    );
}
