//! Inventory Submission Handlers
//!
//! Accepts interactively entered materials as JSON and CSV uploads as
//! multipart form data; both return the validated submission report.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::{JsonRejection, QueryRejection},
        Multipart, Query, State,
    },
    response::Json,
};
use inventory_models::{DisplayRecord, ReportType};
use inventory_utils::inventory::{MaterialEntry, SubmissionReport};
use inventory_utils::InventoryError;
use serde::{Deserialize, Serialize};

use crate::middleware::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitMaterialsRequest {
    #[serde(default)]
    pub report_type: ReportType,
    pub materials: Vec<MaterialEntry>,
}

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub report_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub report: SubmissionReport,
    pub display: Vec<DisplayRecord>,
    pub rejections: Vec<String>,
}

impl From<SubmissionReport> for SubmissionResponse {
    fn from(report: SubmissionReport) -> Self {
        Self {
            display: report.display(),
            rejections: report.rejection_messages(),
            report,
        }
    }
}

/// Validate interactively entered materials
///
/// POST /api/v1/inventory/materials
pub async fn submit_materials(
    State(state): State<AppState>,
    payload: Result<Json<SubmitMaterialsRequest>, JsonRejection>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let Json(request) = payload?;
    let report = state
        .service
        .submit_entries(request.report_type, &request.materials)?;
    Ok(Json(report.into()))
}

/// Upload and validate an inventory CSV
///
/// POST /api/v1/inventory/upload?report_type=SARA%20313
pub async fn upload_inventory(
    State(state): State<AppState>,
    query: Result<Query<UploadQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<SubmissionResponse>, ApiError> {
    let Query(query) = query?;
    let mut multipart = multipart?;
    let report_type = match query.report_type.as_deref() {
        None => ReportType::default(),
        Some(label) => ReportType::from_label(label).ok_or_else(|| {
            InventoryError::validation("report_type", format!("Unknown report type '{}'", label))
        })?,
    };

    let field = multipart
        .next_field()
        .await
        .map_err(|e| InventoryError::validation("file", format!("Failed to read upload: {}", e)))?
        .ok_or_else(|| InventoryError::validation("file", "No file provided"))?;

    let filename = field
        .file_name()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "upload.csv".to_string());

    let data = field
        .bytes()
        .await
        .map_err(|e| InventoryError::validation("file", format!("Failed to read file data: {}", e)))?;

    let report = state.service.process_upload(report_type, &filename, &data)?;
    Ok(Json(report.into()))
}
