use axum::extract::{Query, State};
use axum::Json;
use serde_json::Value;

use crate::error::ApiError;
use crate::models::catalog::{CatalogResponse, ServicesQuery};
use crate::AppState;

/// GET /countries - provider country list, passed through.
pub async fn countries(State(state): State<AppState>) -> Result<Json<CatalogResponse>, ApiError> {
    let data = state.jasaotp.countries().await?;
    Ok(Json(CatalogResponse { ok: true, data }))
}

/// GET /services?negara= - provider services for one country, flattened
/// from the keyed map into a list with `kode` injected per item.
pub async fn services(
    State(state): State<AppState>,
    Query(query): Query<ServicesQuery>,
) -> Result<Json<CatalogResponse>, ApiError> {
    let negara = query
        .negara
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("negara required".into()))?;

    let catalog = state.jasaotp.service_catalog(&negara).await?;
    let list: Vec<Value> = catalog
        .get(&negara)
        .map(|services| {
            services
                .iter()
                .map(|(kode, item)| {
                    let mut entry = item.clone();
                    entry.insert("kode".into(), Value::String(kode.clone()));
                    Value::Object(entry)
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(Json(CatalogResponse {
        ok: true,
        data: Value::Array(list),
    }))
}
