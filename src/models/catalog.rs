use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ServicesQuery {
    pub negara: Option<String>,
}

/// Passthrough envelope for catalog endpoints; `data` keeps whatever
/// shape the provider returned.
#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub ok: bool,
    pub data: serde_json::Value,
}
