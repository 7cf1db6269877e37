//! Endpoints that are not plain entity collections.
use serde::Serialize;
use serde_json::Value;

use super::{ApiError, ApiRequest, Backend, decode};
use crate::models::{DashboardStats, ProgramPerformance};

pub const DASHBOARD_STATS: &str = "/dashboard/stats";
pub const PROGRAM_PERFORMANCE: &str = "/dashboard/program-performance";
pub const MODULE_PROGRESS: &str = "/module-progress";
pub const ASSIGNMENTS: &str = "/assignments";

/// `GET /dashboard/stats`
pub fn dashboard_stats(backend: &dyn Backend) -> Result<DashboardStats, ApiError> {
    let value = backend.send(&ApiRequest::get(DASHBOARD_STATS))?;
    decode(backend, DASHBOARD_STATS, value)
}

/// `GET /dashboard/program-performance`
pub fn program_performance(backend: &dyn Backend) -> Result<Vec<ProgramPerformance>, ApiError> {
    let value = backend.send(&ApiRequest::get(PROGRAM_PERFORMANCE))?;
    decode(backend, PROGRAM_PERFORMANCE, value)
}

/// `POST /module-progress`. The payload shape belongs to the backend; the
/// reply is returned as-is.
pub fn record_module_progress(
    backend: &dyn Backend,
    data: &impl Serialize,
) -> Result<Value, ApiError> {
    backend.send(&ApiRequest::post(MODULE_PROGRESS, encode(backend, MODULE_PROGRESS, data)?))
}

/// `POST /assignments`
pub fn create_assignment(backend: &dyn Backend, data: &impl Serialize) -> Result<Value, ApiError> {
    backend.send(&ApiRequest::post(ASSIGNMENTS, encode(backend, ASSIGNMENTS, data)?))
}

/// `PUT /assignments/{id}`
pub fn update_assignment(
    backend: &dyn Backend,
    id: i64,
    data: &impl Serialize,
) -> Result<Value, ApiError> {
    let path = format!("{ASSIGNMENTS}/{id}");
    let body = encode(backend, &path, data)?;
    backend.send(&ApiRequest::put(path, body))
}

fn encode(backend: &dyn Backend, path: &str, data: &impl Serialize) -> Result<Value, ApiError> {
    serde_json::to_value(data).map_err(|e| ApiError::Decode {
        url: format!("{}{}", backend.base_url(), path),
        message: format!("failed to encode request body: {e}"),
    })
}
