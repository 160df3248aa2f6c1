pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use agency_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use axum::middleware::from_fn;
use axum::{
    routing::{get, post, put},
    Router,
};
use mongodb::{options::ClientOptions, Client};
use secrecy::ExposeSecret;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use config::Config;
use services::AgencyRepository;

#[derive(Clone)]
pub struct AppState {
    pub db: mongodb::Database,
    pub config: Config,
    pub repository: AgencyRepository,
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    db: mongodb::Database,
}

impl Application {
    /// Connects to the store, prepares indexes and binds the listener. With
    /// port 0 the OS picks one; [`Application::port`] reports the real value.
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let mut client_options = ClientOptions::parse(config.database.url.expose_secret()).await?;
        client_options.app_name = Some(config.service_name.clone());

        let client = Client::with_options(client_options)?;
        let db = client.database(&config.database.db_name);

        let repository = AgencyRepository::new(&client, &db);

        // Initialize indexes for tenant-scoped queries
        repository.init_indexes().await?;

        let state = AppState {
            db: db.clone(),
            config: config.clone(),
            repository,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics))
            // Roster endpoints (tenant-scoped)
            .route(
                "/clients",
                post(handlers::roster::create_client).get(handlers::roster::list_clients),
            )
            .route(
                "/clients/:id",
                put(handlers::roster::update_client).delete(handlers::roster::delete_client),
            )
            .route(
                "/drivers",
                post(handlers::roster::create_driver).get(handlers::roster::list_drivers),
            )
            .route(
                "/drivers/:id",
                put(handlers::roster::update_driver).delete(handlers::roster::delete_driver),
            )
            .route(
                "/vehicles",
                post(handlers::roster::create_vehicle).get(handlers::roster::list_vehicles),
            )
            .route(
                "/vehicles/:id",
                put(handlers::roster::update_vehicle).delete(handlers::roster::delete_vehicle),
            )
            .route(
                "/agents",
                post(handlers::roster::create_agent).get(handlers::roster::list_agents),
            )
            .route(
                "/agents/:id",
                put(handlers::roster::update_agent).delete(handlers::roster::delete_agent),
            )
            // Booking lifecycle
            .route(
                "/bookings",
                post(handlers::bookings::create_booking).get(handlers::bookings::list_bookings),
            )
            .route("/bookings/:id", get(handlers::bookings::get_booking))
            .route("/bookings/:id/assign", post(handlers::bookings::assign_booking))
            .route(
                "/bookings/:id/complete",
                post(handlers::bookings::complete_booking),
            )
            .route("/bookings/:id/cancel", post(handlers::bookings::cancel_booking))
            .route("/bookings/:id/bill", post(handlers::bills::create_bill))
            // Bills and payments
            .route("/bills", get(handlers::bills::list_bills))
            .route("/bills/:id", get(handlers::bills::get_bill))
            .route("/bills/:id/payments", post(handlers::bills::record_payment))
            // Reports
            .route("/reports/summary", get(handlers::reports::finance_summary))
            .route("/reports/groups", get(handlers::reports::grouped_summaries))
            .route(
                "/reports/revenue-series",
                get(handlers::reports::revenue_series),
            )
            .route("/reports/export.csv", get(handlers::reports::export_csv))
            .route("/dashboard/summary", get(handlers::reports::dashboard_summary))
            .layer(from_fn(metrics_middleware))
            .layer(from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                        agency_id = tracing::field::Empty,
                    )
                }),
            )
            .with_state(state);

        let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
        let listener = TcpListener::bind(addr).await?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router,
            db,
        })
    }

    pub async fn run_until_stopped(self) -> anyhow::Result<()> {
        tracing::info!("Listening on {}", self.listener.local_addr()?);
        axum::serve(self.listener, self.router).await?;
        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn db(&self) -> &mongodb::Database {
        &self.db
    }
}
