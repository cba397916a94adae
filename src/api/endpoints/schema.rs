//! Feature schema endpoint.

use axum::extract::Path;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::SchemaResponse;
use crate::models::Disease;
use crate::schema;

/// `GET /api/schema/:disease`: ordered feature table with widget contracts.
pub async fn describe(Path(key): Path<String>) -> Result<Json<SchemaResponse>, ApiError> {
    let disease: Disease = key.parse()?;
    Ok(Json(SchemaResponse {
        disease,
        display_name: disease.display_name(),
        schema_version: schema::schema_version(disease),
        features: schema::features(disease),
    }))
}
