use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use super::AppState;

fn v1_router() -> Router<AppState> {
    let menus = Router::new()
        .route("/{locationId}", get(handlers::menus::get_menu_range))
        .route("/{locationId}/{date}", get(handlers::menus::get_menu))
        .route("/{locationId}/{date}/search", get(handlers::menus::search_menu))
        .route("/{locationId}/{date}/filtered", get(handlers::menus::get_filtered_menu));

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/food/{itemId}", get(handlers::food::get_food_detail))
        .route("/locations", get(handlers::menus::list_locations))
        .route(
            "/locations/{locationId}/date-bounds",
            get(handlers::menus::get_date_bounds),
        )
        .route("/locations/{locationId}/hours", get(handlers::hours::get_hours))
        .nest("/menus", menus)
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", v1_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
