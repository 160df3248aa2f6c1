use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roster entities are the reference data a booking draws from. Each one is
/// scoped to a single agency and never shared across tenants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub agency_id: String,
    pub name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub agency_id: String,
    pub name: String,
    pub mobile: String,
    pub license_number: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub agency_id: String,
    /// Registration plate, e.g. `KA-01-AB-1234`. Shown on bookings and reports.
    pub number: String,
    pub model: String,
    pub vehicle_type: Option<String>,
    pub owner: Option<String>,
    pub created_at: DateTime,
}

/// External agent who referred the booking. Bookings without one are treated
/// as direct business in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub agency_id: String,
    pub name: String,
    pub agency_name: Option<String>,
    pub mobile: String,
    pub office_city: Option<String>,
    pub created_at: DateTime,
}
