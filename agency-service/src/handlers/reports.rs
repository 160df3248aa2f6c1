//! Reporting handlers: tenant totals, grouped summaries, the revenue chart
//! series, the CSV export and the dashboard widgets. All aggregation is done
//! in [`crate::services::reports`]; these handlers only fetch and join.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use std::collections::HashMap;
use uuid::Uuid;

use agency_core::error::AppError;
use anyhow::anyhow;

use crate::{
    dtos::{BookingResponse, DashboardSummary, GroupQuery, SeriesQuery},
    middleware::TenantContext,
    models::BookingStatus,
    services::reports::{self, FinanceSummary, GroupDimension, GroupSummary, RevenuePoint},
    AppState,
};

const REVENUE_SERIES_DEFAULT_LIMIT: usize = 10;
const DASHBOARD_RECENT_LIMIT: i64 = 5;

pub async fn finance_summary(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> Result<Json<FinanceSummary>, AppError> {
    let bills = state.repository.list_bills(&tenant.agency_id, None).await?;
    Ok(Json(reports::summarize(&bills)))
}

pub async fn grouped_summaries(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<GroupQuery>,
) -> Result<Json<Vec<GroupSummary>>, AppError> {
    let dimension = GroupDimension::parse(&query.by).ok_or_else(|| {
        AppError::BadRequest(anyhow!(
            "Unknown grouping dimension: {} (expected client, agent, vehicle or driver)",
            query.by
        ))
    })?;

    let bills = state.repository.list_bills(&tenant.agency_id, None).await?;

    // The client name is already denormalized onto the bill; the other
    // dimensions read the assignment snapshot of the backing booking.
    let bookings = if dimension == GroupDimension::Client {
        HashMap::new()
    } else {
        let ids: Vec<Uuid> = bills.iter().map(|b| b.booking_id).collect();
        state
            .repository
            .get_bookings_by_ids(&tenant.agency_id, &ids)
            .await?
    };

    let agent_names: HashMap<Uuid, String> = if dimension == GroupDimension::Agent {
        state
            .repository
            .agents()
            .list(&tenant.agency_id)
            .await?
            .into_iter()
            .map(|agent| (agent.id, agent.name))
            .collect()
    } else {
        HashMap::new()
    };

    Ok(Json(reports::group_bills(
        &bills,
        &bookings,
        &agent_names,
        dimension,
    )))
}

pub async fn revenue_series(
    State(state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<SeriesQuery>,
) -> Result<Json<Vec<RevenuePoint>>, AppError> {
    let limit = query.limit.unwrap_or(REVENUE_SERIES_DEFAULT_LIMIT);
    let bills = state.repository.list_bills(&tenant.agency_id, None).await?;
    Ok(Json(reports::revenue_series(&bills, limit)))
}

pub async fn export_csv(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let bills = state.repository.list_bills(&tenant.agency_id, None).await?;
    tracing::info!(agency_id = %tenant.agency_id, bills = bills.len(), "Exporting finance CSV");
    let csv = reports::export_csv(&bills);
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"finance-report.csv\"",
            ),
        ],
        csv,
    ))
}

pub async fn dashboard_summary(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> Result<Json<DashboardSummary>, AppError> {
    let total_clients = state.repository.clients().count(&tenant.agency_id).await?;
    let total_vehicles = state.repository.vehicles().count(&tenant.agency_id).await?;
    let pending_bookings = state
        .repository
        .count_bookings(&tenant.agency_id, BookingStatus::Pending)
        .await?;
    let active_trips = state
        .repository
        .count_bookings(&tenant.agency_id, BookingStatus::Assigned)
        .await?;
    let recent_pending = state
        .repository
        .recent_pending_bookings(&tenant.agency_id, DASHBOARD_RECENT_LIMIT)
        .await?;

    Ok(Json(DashboardSummary {
        total_clients,
        total_vehicles,
        pending_bookings,
        active_trips,
        recent_pending: recent_pending
            .into_iter()
            .map(BookingResponse::from)
            .collect(),
    }))
}
