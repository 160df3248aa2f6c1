//! Billing and payment handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use mongodb::bson::DateTime;
use uuid::Uuid;
use validator::Validate;

use agency_core::error::AppError;
use anyhow::anyhow;

use crate::{
    dtos::{BillListQuery, BillResponse, CreateBillRequest, RecordPaymentRequest},
    middleware::TenantContext,
    models::{Bill, BillStatus, BookingEvent, Payment},
    services::metrics,
    AppState,
};

/// Compute the totals for a completed booking and persist the bill. The
/// booking is flipped to `Billed` in the same transaction, so exactly one
/// bill can ever exist per booking.
pub async fn create_bill(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<CreateBillRequest>,
) -> Result<(StatusCode, Json<BillResponse>), AppError> {
    payload.validate()?;
    if payload.closing_km < payload.opening_km {
        return Err(AppError::BadRequest(anyhow!(
            "Closing km cannot be less than opening km"
        )));
    }

    let booking = state
        .repository
        .get_booking(&tenant.agency_id, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Booking not found")))?;

    if booking.status.transition(BookingEvent::Bill).is_none() {
        return Err(AppError::BadRequest(anyhow!(
            "Cannot bill a booking in {} state",
            booking.status
        )));
    }

    let inputs = payload.into_inputs();
    let breakdown = inputs.compute();
    let bill = Bill {
        id: Uuid::new_v4(),
        agency_id: tenant.agency_id.clone(),
        booking_id: booking.id,
        trip_id: booking.trip_id.clone(),
        client_name: booking.client_name.clone(),
        inputs,
        breakdown,
        payments: Vec::new(),
        status: BillStatus::from_balance(breakdown.balance_due),
        bill_date: DateTime::now(),
    };

    tracing::info!(
        bill_id = %bill.id,
        booking_id = %booking.id,
        agency_id = %tenant.agency_id,
        grand_total = breakdown.grand_total,
        balance_due = breakdown.balance_due,
        "Creating bill"
    );

    state.repository.create_bill(&bill).await?;
    metrics::record_bill(&tenant.agency_id, breakdown.grand_total);

    Ok((StatusCode::CREATED, Json(BillResponse::from(bill))))
}

pub async fn list_bills(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<BillListQuery>,
) -> Result<Json<Vec<BillResponse>>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(|value| {
            BillStatus::parse(value)
                .ok_or_else(|| AppError::BadRequest(anyhow!("Unknown bill status: {}", value)))
        })
        .transpose()?;

    let bills = state.repository.list_bills(&tenant.agency_id, status).await?;
    Ok(Json(bills.into_iter().map(BillResponse::from).collect()))
}

pub async fn get_bill(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(bill_id): Path<Uuid>,
) -> Result<Json<BillResponse>, AppError> {
    let bill = state
        .repository
        .get_bill(&tenant.agency_id, bill_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Bill not found")))?;
    Ok(Json(BillResponse::from(bill)))
}

/// Append a payment to the bill's ledger. The store rechecks the balance in
/// the same write that applies it, so overdrawing is impossible even under
/// concurrent submissions.
pub async fn record_payment(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(bill_id): Path<Uuid>,
    Json(payload): Json<RecordPaymentRequest>,
) -> Result<Json<BillResponse>, AppError> {
    payload.validate()?;

    let payment = Payment {
        amount: payload.amount,
        date: Utc::now().format("%Y-%m-%d").to_string(),
        note: payload.note,
        recorded_at: DateTime::now(),
    };

    tracing::info!(
        bill_id = %bill_id,
        agency_id = %tenant.agency_id,
        amount = payment.amount,
        "Recording payment"
    );

    let bill = state
        .repository
        .record_payment(&tenant.agency_id, bill_id, &payment)
        .await?;
    metrics::record_payment(&tenant.agency_id, payment.amount);

    Ok(Json(BillResponse::from(bill)))
}
