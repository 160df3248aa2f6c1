//! Booking lifecycle handlers.
//!
//! Transitions are checked twice: here against a fresh read for a precise
//! error message, and again in the store's conditional write so concurrent
//! operators cannot move the same booking twice.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use mongodb::bson::DateTime;
use uuid::Uuid;
use validator::Validate;

use agency_core::error::AppError;
use anyhow::anyhow;

use crate::{
    dtos::{AssignBookingRequest, BookingListQuery, BookingResponse, CreateBookingRequest},
    middleware::TenantContext,
    models::{AssignmentSnapshot, Booking, BookingEvent, BookingStatus},
    utils::generate_trip_id,
    AppState,
};

pub async fn create_booking(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    payload.validate()?;

    // The client's name and phone are denormalized onto the booking so later
    // roster edits do not rewrite trip history.
    let client = state
        .repository
        .clients()
        .get(&tenant.agency_id, payload.client_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Client not found")))?;

    let booking = Booking {
        id: Uuid::new_v4(),
        agency_id: tenant.agency_id.clone(),
        trip_id: generate_trip_id(),
        client_id: client.id,
        client_name: client.name,
        client_phone: client.mobile,
        pickup: payload.pickup,
        drop_location: payload.drop_location,
        date: payload.date,
        time: payload.time,
        trip_type: payload.trip_type,
        notes: payload.notes,
        status: BookingStatus::Pending,
        assignment: None,
        created_at: DateTime::now(),
    };

    tracing::info!(
        booking_id = %booking.id,
        trip_id = %booking.trip_id,
        agency_id = %tenant.agency_id,
        trip_type = booking.trip_type.as_str(),
        "Creating booking"
    );

    state.repository.create_booking(&booking).await?;
    Ok((StatusCode::CREATED, Json(BookingResponse::from(booking))))
}

pub async fn list_bookings(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let status = query
        .status
        .as_deref()
        .map(|value| {
            BookingStatus::parse(value)
                .ok_or_else(|| AppError::BadRequest(anyhow!("Unknown booking status: {}", value)))
        })
        .transpose()?;

    let bookings = state
        .repository
        .list_bookings(&tenant.agency_id, status)
        .await?;
    Ok(Json(
        bookings.into_iter().map(BookingResponse::from).collect(),
    ))
}

pub async fn get_booking(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .repository
        .get_booking(&tenant.agency_id, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Booking not found")))?;
    Ok(Json(BookingResponse::from(booking)))
}

/// Resolve the driver, vehicle and optional agent, snapshot them onto the
/// booking and move it to `Assigned`.
pub async fn assign_booking(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<AssignBookingRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .repository
        .get_booking(&tenant.agency_id, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Booking not found")))?;

    if booking.status.transition(BookingEvent::Assign).is_none() {
        return Err(AppError::BadRequest(anyhow!(
            "Cannot assign a booking in {} state",
            booking.status
        )));
    }

    let driver = state
        .repository
        .drivers()
        .get(&tenant.agency_id, payload.driver_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Driver not found")))?;
    let vehicle = state
        .repository
        .vehicles()
        .get(&tenant.agency_id, payload.vehicle_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Vehicle not found")))?;

    let assignment = AssignmentSnapshot {
        driver_id: driver.id,
        driver_name: driver.name,
        driver_mobile: driver.mobile,
        vehicle_id: vehicle.id,
        vehicle_number: vehicle.number,
        vehicle_model: vehicle.model,
        agent_id: payload.agent_id,
    };

    tracing::info!(
        booking_id = %booking_id,
        agency_id = %tenant.agency_id,
        driver_id = %assignment.driver_id,
        vehicle_id = %assignment.vehicle_id,
        "Assigning booking"
    );

    let updated = state
        .repository
        .assign_booking(&tenant.agency_id, booking_id, &assignment)
        .await?
        .ok_or_else(|| AppError::Conflict(anyhow!("Booking changed state concurrently")))?;
    Ok(Json(BookingResponse::from(updated)))
}

pub async fn complete_booking(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    apply_transition(&state, &tenant, booking_id, BookingEvent::Complete, "complete").await
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    apply_transition(&state, &tenant, booking_id, BookingEvent::Cancel, "cancel").await
}

async fn apply_transition(
    state: &AppState,
    tenant: &TenantContext,
    booking_id: Uuid,
    event: BookingEvent,
    verb: &str,
) -> Result<Json<BookingResponse>, AppError> {
    let booking = state
        .repository
        .get_booking(&tenant.agency_id, booking_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Booking not found")))?;

    let next = booking.status.transition(event).ok_or_else(|| {
        AppError::BadRequest(anyhow!("Cannot {} a booking in {} state", verb, booking.status))
    })?;

    tracing::info!(
        booking_id = %booking_id,
        agency_id = %tenant.agency_id,
        from = booking.status.as_str(),
        to = next.as_str(),
        "Updating booking status"
    );

    let updated = state
        .repository
        .update_booking_status(&tenant.agency_id, booking_id, booking.status, next)
        .await?
        .ok_or_else(|| AppError::Conflict(anyhow!("Booking changed state concurrently")))?;
    Ok(Json(BookingResponse::from(updated)))
}
