//! Static snapshot of what the prediction system supports.
//!
//! Built once from [`config`](crate::config) and the request schema, then
//! served as-is. Nothing in here changes per request.

use std::sync::LazyLock;

use serde::Serialize;

use crate::config::{MAX_REGION_SIZE_KB, MODALITIES, VALID_CHROMOSOMES};
use crate::json_schema_for;
use crate::request::PredictionRequest;
use crate::templates::TaskType;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskTypeInfo {
    pub code: &'static str,
    pub name: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    pub max_region_size_kb: i64,
    pub valid_chromosomes: Vec<&'static str>,
}

impl Constraints {
    pub fn current() -> Self {
        Self {
            max_region_size_kb: MAX_REGION_SIZE_KB,
            valid_chromosomes: VALID_CHROMOSOMES.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub task_types: Vec<TaskTypeInfo>,
    /// Catalog order is preserved.
    pub modalities: Vec<&'static str>,
    pub constraints: Constraints,
    /// JSON schema of [`PredictionRequest`], for form generation.
    pub request_schema: serde_json::Value,
}

static CAPABILITIES: LazyLock<Capabilities> = LazyLock::new(|| Capabilities {
    task_types: TaskType::SUPPORTED
        .iter()
        .map(|t| TaskTypeInfo {
            code: t.code(),
            name: t.name(),
        })
        .collect(),
    modalities: MODALITIES.to_vec(),
    constraints: Constraints::current(),
    request_schema: json_schema_for::<PredictionRequest>(),
});

/// The process-wide capabilities snapshot.
pub fn capabilities() -> &'static Capabilities {
    &CAPABILITIES
}
