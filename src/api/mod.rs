mod handlers;

use axum::{
    http::HeaderValue,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::db::Database;

/// Router with the default configuration: mounted at the root, permissive CORS.
pub fn create_router(db: Database) -> Router {
    create_router_with_config(db, &AppConfig::default())
}

pub fn create_router_with_config(db: Database, config: &AppConfig) -> Router {
    let api = Router::new()
        // Kids
        .route("/kids", get(handlers::list_kids))
        .route("/kids", post(handlers::create_kid))
        .route("/kids/{id}", get(handlers::get_kid))
        .route("/kids/{id}", put(handlers::update_kid))
        .route("/kids/{id}", delete(handlers::delete_kid))
        .route("/kids/{id}/photo", put(handlers::set_kid_photo))
        .route("/kids/{id}/progress", get(handlers::list_kid_progress))
        .route("/kids/{id}/workshops", get(handlers::get_kid_board))
        .route("/kids/{id}/report", get(handlers::get_kid_report))
        .route(
            "/kids/{id}/workshops/{workshop_id}/{action}",
            post(handlers::apply_progress_action),
        )
        // Workshops
        .route("/workshops", get(handlers::list_workshops))
        .route("/workshops", post(handlers::create_workshop))
        .route("/workshops/{id}", get(handlers::get_workshop))
        .route("/workshops/{id}", put(handlers::update_workshop))
        .route("/workshops/{id}", delete(handlers::delete_workshop))
        .route("/workshops/{id}/progress", get(handlers::list_workshop_progress))
        // Health
        .route("/health", get(handlers::health));

    let app = Router::new()
        .nest("/api/v1", api)
        .route(
            "/settings/progress/{mode}",
            get(handlers::pages::progress_report),
        );

    let app = if config.basename.is_empty() {
        app
    } else {
        Router::new().nest(&config.basename, app)
    };

    app.layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .with_state(db)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    match &config.cors_origins {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => CorsLayer::permissive(),
    }
}
