use actix_web::web;

pub mod games;
pub mod health;
pub mod realtime;

/// Register every route. `main.rs` and the route tests share this, so the
/// paths under test are the paths served.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // Games: /api/games/**
    cfg.service(web::scope("/api/games").configure(games::configure_routes));

    // WebSocket upgrade: /api/ws
    cfg.service(web::scope("/api/ws").configure(realtime::configure_routes));
}
