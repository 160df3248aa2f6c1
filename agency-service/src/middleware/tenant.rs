use agency_core::error::AppError;
use anyhow::anyhow;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

/// Header carrying the tenant id, set by the identity layer in front of this
/// service. Every request must name the agency it operates on.
pub const AGENCY_ID_HEADER: &str = "x-agency-id";

/// Tenant scope for a request. Extracted once per handler; every store call
/// takes the `agency_id` so no query can cross agencies.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub agency_id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let agency_id = parts
            .headers
            .get(AGENCY_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::AuthError(anyhow!("Missing {} header", AGENCY_ID_HEADER)))?
            .to_string();

        tracing::Span::current().record("agency_id", tracing::field::display(&agency_id));

        Ok(TenantContext { agency_id })
    }
}
