//! Request and response shapes for the HTTP surface. Requests carry their own
//! validation rules; responses flatten store documents into plain JSON with
//! string timestamps.

use crate::models::{
    Agent, AssignmentSnapshot, Bill, BillStatus, BillingBreakdown, BillingInputs, Booking,
    BookingStatus, Client, Driver, Payment, TripType, Vehicle,
};
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Mobile number is required"))]
    pub mobile: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateClientRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Mobile number cannot be empty"))]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Mobile number is required"))]
    pub mobile: String,
    pub license_number: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateDriverRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Mobile number cannot be empty"))]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 1, message = "Vehicle number is required"))]
    pub number: String,
    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,
    pub vehicle_type: Option<String>,
    pub owner: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Vehicle number cannot be empty"))]
    pub number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Model cannot be empty"))]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAgentRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Mobile number is required"))]
    pub mobile: String,
    pub agency_name: Option<String>,
    pub office_city: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct UpdateAgentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Mobile number cannot be empty"))]
    pub mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub office_city: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub client_id: Uuid,
    #[validate(length(min = 1, message = "Pickup location is required"))]
    pub pickup: String,
    #[serde(rename = "drop")]
    #[validate(length(min = 1, message = "Drop location is required"))]
    pub drop_location: String,
    #[validate(length(min = 1, message = "Date is required"))]
    pub date: String,
    #[validate(length(min = 1, message = "Time is required"))]
    pub time: String,
    pub trip_type: TripType,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignBookingRequest {
    pub driver_id: Uuid,
    pub vehicle_id: Uuid,
    pub agent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub status: Option<String>,
}

fn default_rate_per_km() -> f64 {
    15.0
}

fn default_driver_allowance() -> f64 {
    300.0
}

fn default_gst_enabled() -> bool {
    true
}

fn default_gst_percent() -> f64 {
    5.0
}

/// Billing inputs as submitted by the operator. Everything except the two
/// odometer readings falls back to the agency's customary defaults.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBillRequest {
    #[validate(range(min = 0.0, message = "Opening km cannot be negative"))]
    pub opening_km: f64,
    #[validate(range(min = 0.0, message = "Closing km cannot be negative"))]
    pub closing_km: f64,
    #[serde(default = "default_rate_per_km")]
    #[validate(range(min = 0.0, message = "Rate per km cannot be negative"))]
    pub rate_per_km: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Extra km cannot be negative"))]
    pub extra_km: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Extra hours cannot be negative"))]
    pub extra_hours: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Extra hour charge cannot be negative"))]
    pub extra_hour_charge: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Night charge cannot be negative"))]
    pub night_charge: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Toll and parking cannot be negative"))]
    pub toll_parking: f64,
    #[serde(default = "default_driver_allowance")]
    #[validate(range(min = 0.0, message = "Driver allowance cannot be negative"))]
    pub driver_allowance: f64,
    #[serde(default)]
    #[validate(range(min = 0.0, message = "Advance cannot be negative"))]
    pub advance: f64,
    #[serde(default = "default_gst_enabled")]
    pub gst_enabled: bool,
    #[serde(default = "default_gst_percent")]
    #[validate(range(min = 0.0, max = 100.0, message = "GST percent must be between 0 and 100"))]
    pub gst_percent: f64,
}

impl CreateBillRequest {
    pub fn into_inputs(self) -> BillingInputs {
        BillingInputs {
            opening_km: self.opening_km,
            closing_km: self.closing_km,
            rate_per_km: self.rate_per_km,
            extra_km: self.extra_km,
            extra_hours: self.extra_hours,
            extra_hour_charge: self.extra_hour_charge,
            night_charge: self.night_charge,
            toll_parking: self.toll_parking,
            driver_allowance: self.driver_allowance,
            advance: self.advance,
            gst_enabled: self.gst_enabled,
            gst_percent: self.gst_percent,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct BillListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    #[validate(range(exclusive_min = 0.0, message = "Payment amount must be positive"))]
    pub amount: f64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GroupQuery {
    pub by: String,
}

#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub limit: Option<usize>,
}

/// Serializes an update request into a `$set` patch, dropping unset fields.
pub fn to_patch<T: Serialize>(request: &T) -> Result<Document, mongodb::bson::ser::Error> {
    mongodb::bson::to_document(request)
}

#[derive(Debug, Serialize)]
pub struct ClientResponse {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
}

impl From<Client> for ClientResponse {
    fn from(c: Client) -> Self {
        Self {
            id: c.id,
            name: c.name,
            mobile: c.mobile,
            email: c.email,
            address: c.address,
            created_at: c.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DriverResponse {
    pub id: Uuid,
    pub name: String,
    pub mobile: String,
    pub license_number: Option<String>,
    pub address: Option<String>,
    pub created_at: String,
}

impl From<Driver> for DriverResponse {
    fn from(d: Driver) -> Self {
        Self {
            id: d.id,
            name: d.name,
            mobile: d.mobile,
            license_number: d.license_number,
            address: d.address,
            created_at: d.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub number: String,
    pub model: String,
    pub vehicle_type: Option<String>,
    pub owner: Option<String>,
    pub created_at: String,
}

impl From<Vehicle> for VehicleResponse {
    fn from(v: Vehicle) -> Self {
        Self {
            id: v.id,
            number: v.number,
            model: v.model,
            vehicle_type: v.vehicle_type,
            owner: v.owner,
            created_at: v.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AgentResponse {
    pub id: Uuid,
    pub name: String,
    pub agency_name: Option<String>,
    pub mobile: String,
    pub office_city: Option<String>,
    pub created_at: String,
}

impl From<Agent> for AgentResponse {
    fn from(a: Agent) -> Self {
        Self {
            id: a.id,
            name: a.name,
            agency_name: a.agency_name,
            mobile: a.mobile,
            office_city: a.office_city,
            created_at: a.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub trip_id: String,
    pub client_id: Uuid,
    pub client_name: String,
    pub client_phone: String,
    pub pickup: String,
    #[serde(rename = "drop")]
    pub drop_location: String,
    pub date: String,
    pub time: String,
    pub trip_type: TripType,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub assignment: Option<AssignmentSnapshot>,
    pub created_at: String,
}

impl From<Booking> for BookingResponse {
    fn from(b: Booking) -> Self {
        Self {
            id: b.id,
            trip_id: b.trip_id,
            client_id: b.client_id,
            client_name: b.client_name,
            client_phone: b.client_phone,
            pickup: b.pickup,
            drop_location: b.drop_location,
            date: b.date,
            time: b.time,
            trip_type: b.trip_type,
            notes: b.notes,
            status: b.status,
            assignment: b.assignment,
            created_at: b.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PaymentView {
    pub amount: f64,
    pub date: String,
    pub note: Option<String>,
    pub recorded_at: String,
}

impl From<Payment> for PaymentView {
    fn from(p: Payment) -> Self {
        Self {
            amount: p.amount,
            date: p.date,
            note: p.note,
            recorded_at: p.recorded_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BillResponse {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub trip_id: String,
    pub client_name: String,
    #[serde(flatten)]
    pub inputs: BillingInputs,
    #[serde(flatten)]
    pub breakdown: BillingBreakdown,
    pub payments: Vec<PaymentView>,
    pub status: BillStatus,
    pub bill_date: String,
}

impl From<Bill> for BillResponse {
    fn from(b: Bill) -> Self {
        Self {
            id: b.id,
            booking_id: b.booking_id,
            trip_id: b.trip_id,
            client_name: b.client_name,
            inputs: b.inputs,
            breakdown: b.breakdown,
            payments: b.payments.into_iter().map(PaymentView::from).collect(),
            status: b.status,
            bill_date: b.bill_date.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_clients: u64,
    pub total_vehicles: u64,
    pub pending_bookings: u64,
    pub active_trips: u64,
    pub recent_pending: Vec<BookingResponse>,
}
