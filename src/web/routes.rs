use actix_cors::Cors;
use actix_web::web;
use crate::web::handlers;

// Any origin, method and header, preflights included.
pub fn cors() -> Cors {
    Cors::permissive()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/chat", web::post().to(handlers::chat))
        .route("/history", web::get().to(handlers::history))
        .route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health_check));
}
