//! Shared harness for the integration tests.
//!
//! Each test gets its own application on a random port and its own database,
//! dropped again in `cleanup`. The tests need a reachable MongoDB, which is a
//! replica set when billing transactions are exercised; point
//! `TEST_MONGODB_URI` at it (default `mongodb://localhost:27017`).

use agency_service::config::{Config, DatabaseConfig, ServerConfig};
use agency_service::Application;
use secrecy::Secret;

pub const TEST_AGENCY_ID: &str = "agency-test";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: mongodb::Database,
    pub db_name: String,
    client: reqwest::Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let db_name = format!("agency_test_{}", uuid::Uuid::new_v4());

        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Random port
            },
            database: DatabaseConfig {
                url: Secret::new(
                    std::env::var("TEST_MONGODB_URI")
                        .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
                ),
                db_name: db_name.clone(),
            },
            service_name: "agency-service-test".to_string(),
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);
        let db = app.db().clone();

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to come up by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
            client,
        }
    }

    /// Cleanup test database after test completes.
    pub async fn cleanup(&self) {
        self.db
            .drop(None)
            .await
            .expect("Failed to drop test database");
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.get_as(TEST_AGENCY_ID, path).await
    }

    pub async fn get_as(&self, agency_id: &str, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .header("X-Agency-ID", agency_id)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.post_as(TEST_AGENCY_ID, path, body).await
    }

    pub async fn post_as(
        &self,
        agency_id: &str,
        path: &str,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .header("X-Agency-ID", agency_id)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn put(&self, path: &str, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .put(format!("{}{}", self.address, path))
            .header("X-Agency-ID", TEST_AGENCY_ID)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str) -> reqwest::Response {
        self.client
            .delete(format!("{}{}", self.address, path))
            .header("X-Agency-ID", TEST_AGENCY_ID)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Seed one roster client and return its id.
    pub async fn seed_client(&self, name: &str) -> String {
        let response = self
            .post(
                "/clients",
                &serde_json::json!({ "name": name, "mobile": "9000000001" }),
            )
            .await;
        assert_eq!(response.status(), 201, "seeding client failed");
        response.json::<serde_json::Value>().await.unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn seed_driver(&self, name: &str) -> String {
        let response = self
            .post(
                "/drivers",
                &serde_json::json!({ "name": name, "mobile": "9000000002" }),
            )
            .await;
        assert_eq!(response.status(), 201, "seeding driver failed");
        response.json::<serde_json::Value>().await.unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn seed_vehicle(&self, number: &str) -> String {
        let response = self
            .post(
                "/vehicles",
                &serde_json::json!({ "number": number, "model": "Innova Crysta" }),
            )
            .await;
        assert_eq!(response.status(), 201, "seeding vehicle failed");
        response.json::<serde_json::Value>().await.unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    pub async fn seed_agent(&self, name: &str) -> String {
        let response = self
            .post(
                "/agents",
                &serde_json::json!({ "name": name, "mobile": "9000000003" }),
            )
            .await;
        assert_eq!(response.status(), 201, "seeding agent failed");
        response.json::<serde_json::Value>().await.unwrap()["id"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Create a pending booking for a fresh client and return its JSON.
    pub async fn create_booking(&self) -> serde_json::Value {
        let client_id = self.seed_client("Ramesh Kumar").await;
        let response = self
            .post(
                "/bookings",
                &serde_json::json!({
                    "client_id": client_id,
                    "pickup": "Airport",
                    "drop": "City Center",
                    "date": "2026-09-01",
                    "time": "10:00",
                    "trip_type": "One Way"
                }),
            )
            .await;
        assert_eq!(response.status(), 201, "creating booking failed");
        response.json().await.unwrap()
    }

    /// Walk a fresh booking through assign and complete; returns its id.
    pub async fn create_completed_booking(&self) -> String {
        let booking = self.create_booking().await;
        let booking_id = booking["id"].as_str().unwrap().to_string();
        let driver_id = self.seed_driver("Suresh").await;
        let vehicle_id = self.seed_vehicle("KA-01-AB-1234").await;

        let response = self
            .post(
                &format!("/bookings/{}/assign", booking_id),
                &serde_json::json!({ "driver_id": driver_id, "vehicle_id": vehicle_id }),
            )
            .await;
        assert_eq!(response.status(), 200, "assigning booking failed");

        let response = self
            .post(
                &format!("/bookings/{}/complete", booking_id),
                &serde_json::json!({}),
            )
            .await;
        assert_eq!(response.status(), 200, "completing booking failed");

        booking_id
    }

    /// Bill a completed booking with the worked-example inputs; returns the
    /// bill JSON.
    pub async fn bill_booking(&self, booking_id: &str) -> serde_json::Value {
        let response = self
            .post(
                &format!("/bookings/{}/bill", booking_id),
                &serde_json::json!({
                    "opening_km": 100.0,
                    "closing_km": 250.0,
                    "toll_parking": 50.0,
                    "advance": 1000.0
                }),
            )
            .await;
        assert_eq!(response.status(), 201, "billing booking failed");
        response.json().await.unwrap()
    }
}
