//! Router construction for the fleet admin server.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers;
use crate::state::AppState;

/// Build the full axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        // Master data
        .route(
            "/drivers",
            get(handlers::drivers::list).post(handlers::drivers::create),
        )
        .route(
            "/drivers/:id",
            get(handlers::drivers::get)
                .put(handlers::drivers::update)
                .delete(handlers::drivers::delete),
        )
        .route(
            "/vehicles",
            get(handlers::vehicles::list).post(handlers::vehicles::create),
        )
        .route(
            "/vehicles/:id",
            get(handlers::vehicles::get)
                .put(handlers::vehicles::update)
                .delete(handlers::vehicles::delete),
        )
        .route(
            "/semi-trailers",
            get(handlers::semi_trailers::list).post(handlers::semi_trailers::create),
        )
        .route(
            "/semi-trailers/:id",
            get(handlers::semi_trailers::get)
                .put(handlers::semi_trailers::update)
                .delete(handlers::semi_trailers::delete),
        )
        .route(
            "/insurance-policies",
            get(handlers::policies::list).post(handlers::policies::create),
        )
        .route(
            "/insurance-policies/:id",
            get(handlers::policies::get)
                .put(handlers::policies::update)
                .delete(handlers::policies::delete),
        )
        .route(
            "/locations",
            get(handlers::locations::list).post(handlers::locations::create),
        )
        .route(
            "/locations/:id",
            get(handlers::locations::get)
                .put(handlers::locations::update)
                .delete(handlers::locations::delete),
        )
        // Trips
        .route(
            "/trips",
            get(handlers::trips::list).post(handlers::trips::create),
        )
        .route(
            "/trips/:id",
            get(handlers::trips::get)
                .put(handlers::trips::update)
                .delete(handlers::trips::delete),
        )
        .route("/trips/:id/cancel", post(handlers::trips::cancel))
        .route("/trips/:id/incident", post(handlers::trips::report_incident))
        .route(
            "/trips/:id/resolve-incident",
            post(handlers::trips::resolve_incident),
        )
        // Stage workflow
        .route("/trips/:id/stages", get(handlers::stages::list))
        .route(
            "/trips/:id/stages/initialize",
            post(handlers::stages::initialize),
        )
        .route(
            "/stages/:id/completion",
            put(handlers::stages::set_completion),
        )
        .route("/stages/:id/location", put(handlers::stages::set_location))
        .route("/catalog/:direction", get(handlers::catalog::list))
        .route("/catalog/:direction/:tag", get(handlers::catalog::get))
        .route("/dashboard", get(handlers::dashboard::summary));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
