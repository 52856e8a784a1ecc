//! Prediction request wire shape and the validate → format pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::templates::{TaskType, TemplateOptions, get_template_for_task};
use crate::validation::GenomicRegion;

/// Wrapper placed before the query when the caller gives no message.
pub const DEFAULT_QUERY_PREAMBLE: &str = "Please help me with the following prediction query:";

/// A prediction query as sent by the UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionRequest {
    /// `EFP`, `GEP`, or `EAP` (case-insensitive). Anything else uses the
    /// generic template.
    pub task_type: String,
    /// `1`..`22`, `X`, or `Y`.
    pub chromosome: String,
    /// Start coordinate in base pairs.
    pub start: i64,
    /// End coordinate in base pairs.
    pub end: i64,
    pub cell_type: String,
    /// Requested modalities, in display order.
    #[serde(default)]
    pub modalities: Option<Vec<String>>,
    /// Reference to uploaded ATAC-seq data.
    #[serde(default)]
    pub atac_seq_path: Option<String>,
    /// Free text replacing the default wrapper around the query.
    #[serde(default)]
    pub user_message: Option<String>,
}

/// Output of [`PredictionRequest::format_query`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedQuery {
    pub task_type: TaskType,
    pub region: GenomicRegion,
    pub modalities: Vec<String>,
    pub query: String,
}

impl PredictionRequest {
    /// The template this request resolves to.
    pub fn task(&self) -> TaskType {
        get_template_for_task(&self.task_type)
    }

    pub fn validate(&self) -> Result<GenomicRegion, ValidationError> {
        GenomicRegion::try_new(self.chromosome.as_str(), self.start, self.end)
    }

    /// Validate, then render the query with the task's template.
    pub fn format_query(&self) -> Result<FormattedQuery, ValidationError> {
        let region = self.validate()?;
        let task_type = self.task();
        let options = TemplateOptions::from_modalities(self.modalities.clone());
        let modalities = task_type.modalities(&options);
        let query = crate::templates::format_query(
            region.chromosome(),
            region.start(),
            region.end(),
            &modalities,
            &self.cell_type,
            self.atac_seq_path.as_deref(),
        );
        Ok(FormattedQuery {
            task_type,
            region,
            modalities,
            query,
        })
    }

    /// The user turn for this request: the caller's message (or the default
    /// preamble), a blank line, then the formatted query.
    pub fn user_content(&self) -> Result<String, ValidationError> {
        let formatted = self.format_query()?;
        Ok(self.wrap_query(&formatted))
    }

    /// Put the caller's message (or the default preamble) in front of an
    /// already formatted query.
    pub fn wrap_query(&self, formatted: &FormattedQuery) -> String {
        let lead = self
            .user_message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_QUERY_PREAMBLE);
        format!("{lead}\n\n{}", formatted.query)
    }
}
