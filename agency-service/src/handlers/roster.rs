//! CRUD for the four roster collections. These are small reference lists the
//! agency maintains by hand, so the handlers stay deliberately uniform.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use mongodb::bson::DateTime;
use uuid::Uuid;
use validator::Validate;

use agency_core::error::AppError;
use anyhow::anyhow;

use crate::{
    dtos::{
        to_patch, AgentResponse, ClientResponse, CreateAgentRequest, CreateClientRequest,
        CreateDriverRequest, CreateVehicleRequest, DriverResponse, UpdateAgentRequest,
        UpdateClientRequest, UpdateDriverRequest, UpdateVehicleRequest, VehicleResponse,
    },
    middleware::TenantContext,
    models::{Agent, Client, Driver, Vehicle},
    AppState,
};

pub async fn create_client(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<ClientResponse>), AppError> {
    payload.validate()?;
    let client = Client {
        id: Uuid::new_v4(),
        agency_id: tenant.agency_id.clone(),
        name: payload.name,
        mobile: payload.mobile,
        email: payload.email,
        address: payload.address,
        created_at: DateTime::now(),
    };

    tracing::info!(client_id = %client.id, agency_id = %tenant.agency_id, "Creating client");
    state.repository.clients().insert(&client).await?;
    Ok((StatusCode::CREATED, Json(ClientResponse::from(client))))
}

pub async fn list_clients(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> Result<Json<Vec<ClientResponse>>, AppError> {
    let clients = state.repository.clients().list(&tenant.agency_id).await?;
    Ok(Json(clients.into_iter().map(ClientResponse::from).collect()))
}

pub async fn update_client(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<UpdateClientRequest>,
) -> Result<Json<ClientResponse>, AppError> {
    payload.validate()?;
    let patch = to_patch(&payload)?;
    if patch.is_empty() {
        return Err(AppError::BadRequest(anyhow!("No fields to update")));
    }

    let client = state
        .repository
        .clients()
        .update(&tenant.agency_id, client_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Client not found")))?;
    Ok(Json(ClientResponse::from(client)))
}

pub async fn delete_client(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(client_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .repository
        .clients()
        .delete(&tenant.agency_id, client_id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow!("Client not found")));
    }
    tracing::info!(client_id = %client_id, agency_id = %tenant.agency_id, "Deleted client");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_driver(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateDriverRequest>,
) -> Result<(StatusCode, Json<DriverResponse>), AppError> {
    payload.validate()?;
    let driver = Driver {
        id: Uuid::new_v4(),
        agency_id: tenant.agency_id.clone(),
        name: payload.name,
        mobile: payload.mobile,
        license_number: payload.license_number,
        address: payload.address,
        created_at: DateTime::now(),
    };

    tracing::info!(driver_id = %driver.id, agency_id = %tenant.agency_id, "Creating driver");
    state.repository.drivers().insert(&driver).await?;
    Ok((StatusCode::CREATED, Json(DriverResponse::from(driver))))
}

pub async fn list_drivers(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> Result<Json<Vec<DriverResponse>>, AppError> {
    let drivers = state.repository.drivers().list(&tenant.agency_id).await?;
    Ok(Json(drivers.into_iter().map(DriverResponse::from).collect()))
}

pub async fn update_driver(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(driver_id): Path<Uuid>,
    Json(payload): Json<UpdateDriverRequest>,
) -> Result<Json<DriverResponse>, AppError> {
    payload.validate()?;
    let patch = to_patch(&payload)?;
    if patch.is_empty() {
        return Err(AppError::BadRequest(anyhow!("No fields to update")));
    }

    let driver = state
        .repository
        .drivers()
        .update(&tenant.agency_id, driver_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Driver not found")))?;
    Ok(Json(DriverResponse::from(driver)))
}

pub async fn delete_driver(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(driver_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .repository
        .drivers()
        .delete(&tenant.agency_id, driver_id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow!("Driver not found")));
    }
    tracing::info!(driver_id = %driver_id, agency_id = %tenant.agency_id, "Deleted driver");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_vehicle(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<VehicleResponse>), AppError> {
    payload.validate()?;
    let vehicle = Vehicle {
        id: Uuid::new_v4(),
        agency_id: tenant.agency_id.clone(),
        number: payload.number,
        model: payload.model,
        vehicle_type: payload.vehicle_type,
        owner: payload.owner,
        created_at: DateTime::now(),
    };

    tracing::info!(vehicle_id = %vehicle.id, agency_id = %tenant.agency_id, "Creating vehicle");
    state.repository.vehicles().insert(&vehicle).await?;
    Ok((StatusCode::CREATED, Json(VehicleResponse::from(vehicle))))
}

pub async fn list_vehicles(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let vehicles = state.repository.vehicles().list(&tenant.agency_id).await?;
    Ok(Json(
        vehicles.into_iter().map(VehicleResponse::from).collect(),
    ))
}

pub async fn update_vehicle(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(vehicle_id): Path<Uuid>,
    Json(payload): Json<UpdateVehicleRequest>,
) -> Result<Json<VehicleResponse>, AppError> {
    payload.validate()?;
    let patch = to_patch(&payload)?;
    if patch.is_empty() {
        return Err(AppError::BadRequest(anyhow!("No fields to update")));
    }

    let vehicle = state
        .repository
        .vehicles()
        .update(&tenant.agency_id, vehicle_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Vehicle not found")))?;
    Ok(Json(VehicleResponse::from(vehicle)))
}

pub async fn delete_vehicle(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(vehicle_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .repository
        .vehicles()
        .delete(&tenant.agency_id, vehicle_id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow!("Vehicle not found")));
    }
    tracing::info!(vehicle_id = %vehicle_id, agency_id = %tenant.agency_id, "Deleted vehicle");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_agent(
    State(state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateAgentRequest>,
) -> Result<(StatusCode, Json<AgentResponse>), AppError> {
    payload.validate()?;
    let agent = Agent {
        id: Uuid::new_v4(),
        agency_id: tenant.agency_id.clone(),
        name: payload.name,
        agency_name: payload.agency_name,
        mobile: payload.mobile,
        office_city: payload.office_city,
        created_at: DateTime::now(),
    };

    tracing::info!(agent_id = %agent.id, agency_id = %tenant.agency_id, "Creating agent");
    state.repository.agents().insert(&agent).await?;
    Ok((StatusCode::CREATED, Json(AgentResponse::from(agent))))
}

pub async fn list_agents(
    State(state): State<AppState>,
    tenant: TenantContext,
) -> Result<Json<Vec<AgentResponse>>, AppError> {
    let agents = state.repository.agents().list(&tenant.agency_id).await?;
    Ok(Json(agents.into_iter().map(AgentResponse::from).collect()))
}

pub async fn update_agent(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(agent_id): Path<Uuid>,
    Json(payload): Json<UpdateAgentRequest>,
) -> Result<Json<AgentResponse>, AppError> {
    payload.validate()?;
    let patch = to_patch(&payload)?;
    if patch.is_empty() {
        return Err(AppError::BadRequest(anyhow!("No fields to update")));
    }

    let agent = state
        .repository
        .agents()
        .update(&tenant.agency_id, agent_id, patch)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow!("Agent not found")))?;
    Ok(Json(AgentResponse::from(agent)))
}

pub async fn delete_agent(
    State(state): State<AppState>,
    tenant: TenantContext,
    Path(agent_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let deleted = state
        .repository
        .agents()
        .delete(&tenant.agency_id, agent_id)
        .await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow!("Agent not found")));
    }
    tracing::info!(agent_id = %agent_id, agency_id = %tenant.agency_id, "Deleted agent");
    Ok(StatusCode::NO_CONTENT)
}
