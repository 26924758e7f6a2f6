use std::net::SocketAddr;

use axum::{
    http::Method,
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

mod db;
mod domain;
mod rest;
mod storage;

use domain::{AppointmentService, PatientService};
use rest::AppState;

const DEFAULT_PORT: u16 = 5000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Setting up database");
    let db = db::DbConnection::init().await?;

    // Set up our application state
    let state = AppState::new(
        AppointmentService::new(db.clone()),
        PatientService::new(db),
    );

    // CORS setup to allow the frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    // Set up our application routes
    let api_routes = Router::new()
        .route(
            "/appointments",
            get(rest::list_appointments).post(rest::create_appointment),
        )
        .route("/appointments/upcoming", get(rest::upcoming_appointments))
        .route("/appointments/date/:date", get(rest::appointments_by_date))
        .route(
            "/appointments/:id",
            get(rest::get_appointment)
                .put(rest::update_appointment)
                .delete(rest::delete_appointment),
        )
        .route(
            "/patients",
            get(rest::list_patients).post(rest::create_patient),
        )
        .route(
            "/patients/:id",
            get(rest::get_patient)
                .put(rest::update_patient)
                .delete(rest::delete_patient),
        );

    // Define our main application router
    let app = Router::new()
        .route("/", get(rest::welcome))
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state);

    // Start the server
    let port = std::env::var("PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_PORT);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
