//! Query formatting for prediction requests.
//!
//! [`format_query`] renders the structured text block that the model sees
//! for a region + cell type + modality list. The task templates
//! ([`format_efp_query`], [`format_gep_query`], [`format_eap_query`]) pick a
//! default or derived modality set and delegate to it. [`TaskType`] ties the
//! two together: [`get_template_for_task`] resolves a task code to a
//! template, falling back to [`TaskType::Generic`] for anything unknown.
//!
//! None of these functions validate their input. Run
//! [`validate_region`](crate::validation::validate_region) first.
//!
//! ```
//! use gfm_rs::templates::format_query;
//!
//! let text = format_query("7", 1_000_000, 1_050_000, &["RNA-seq"], "K562", None);
//! assert!(text.contains("- Region Size: 50,000 bp"));
//! assert!(text.ends_with("**Modalities:**\n- RNA-seq"));
//! ```

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::{
    ADDITIONAL_TF_BINDINGS, EPIGENOMIC_FEATURES, GRO_SEQ, HI_C, MICRO_C, RNA_SEQ,
    RNA_STRAND_SPECIFIC, STARR_SEQ,
};

// ── Generic formatter ──────────────────────────────────────────────

/// Render a prediction query block.
///
/// Field order is fixed: region header, chromosome, start, end, region size
/// (thousands-separated), blank line, cell type, blank line, modality
/// header, one bullet per modality in input order, then an ATAC-seq line
/// only when a non-empty path is given. Duplicate modalities are kept.
pub fn format_query<S: AsRef<str>>(
    chromosome: &str,
    start: i64,
    end: i64,
    modalities: &[S],
    cell_type: &str,
    atac_seq_path: Option<&str>,
) -> String {
    let mut parts = vec![
        "**Genomic Region:**".to_string(),
        format!("- Chromosome: {chromosome}"),
        format!("- Start: {start}"),
        format!("- End: {end}"),
        format!("- Region Size: {} bp", group_thousands(i128::from(end) - i128::from(start))),
        String::new(),
        format!("**Cell Type:** {cell_type}"),
        String::new(),
        "**Modalities:**".to_string(),
    ];

    parts.extend(modalities.iter().map(|m| format!("- {}", m.as_ref())));

    if let Some(path) = atac_seq_path.filter(|p| !p.is_empty()) {
        parts.push(String::new());
        parts.push(format!("**ATAC-seq Data:** {path}"));
    }

    parts.join("\n")
}

/// Format an integer with `,` thousands separators (`-1234567` → `-1,234,567`).
///
/// Takes `i128` so the difference of any two `i64` coordinates fits.
pub fn group_thousands(n: i128) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ── Task templates ─────────────────────────────────────────────────

/// EFP modalities: the epigenomic base set, plus additional TF-bindings
/// when requested.
pub fn efp_modalities(include_additional_tfs: bool) -> Vec<String> {
    let mut modalities = vec![EPIGENOMIC_FEATURES.to_string()];
    if include_additional_tfs {
        modalities.push(ADDITIONAL_TF_BINDINGS.to_string());
    }
    modalities
}

/// GEP modalities: the caller's list verbatim, or the expression defaults
/// when none is given. Defaults are never merged into a supplied list.
pub fn gep_modalities(expression_modalities: Option<Vec<String>>) -> Vec<String> {
    expression_modalities.unwrap_or_else(|| {
        [RNA_SEQ, RNA_STRAND_SPECIFIC, GRO_SEQ]
            .iter()
            .map(|s| s.to_string())
            .collect()
    })
}

/// EAP modalities in fixed order: STARR-seq, then Hi-C and Micro-C, then
/// the epigenomic base set, which is always last.
pub fn eap_modalities(include_starr_seq: bool, include_chromatin: bool) -> Vec<String> {
    let mut modalities = Vec::new();
    if include_starr_seq {
        modalities.push(STARR_SEQ.to_string());
    }
    if include_chromatin {
        modalities.push(HI_C.to_string());
        modalities.push(MICRO_C.to_string());
    }
    modalities.push(EPIGENOMIC_FEATURES.to_string());
    modalities
}

/// Epigenomic Feature Prediction query.
pub fn format_efp_query(
    chromosome: &str,
    start: i64,
    end: i64,
    cell_type: &str,
    include_additional_tfs: bool,
    atac_seq_path: Option<&str>,
) -> String {
    let modalities = efp_modalities(include_additional_tfs);
    format_query(chromosome, start, end, &modalities, cell_type, atac_seq_path)
}

/// Gene Expression Prediction query.
pub fn format_gep_query(
    chromosome: &str,
    start: i64,
    end: i64,
    cell_type: &str,
    expression_modalities: Option<Vec<String>>,
    atac_seq_path: Option<&str>,
) -> String {
    let modalities = gep_modalities(expression_modalities);
    format_query(chromosome, start, end, &modalities, cell_type, atac_seq_path)
}

/// Enhancer Activity Prediction query.
pub fn format_eap_query(
    chromosome: &str,
    start: i64,
    end: i64,
    cell_type: &str,
    include_starr_seq: bool,
    include_chromatin: bool,
    atac_seq_path: Option<&str>,
) -> String {
    let modalities = eap_modalities(include_starr_seq, include_chromatin);
    format_query(chromosome, start, end, &modalities, cell_type, atac_seq_path)
}

// ── Task dispatch ──────────────────────────────────────────────────

/// Prediction task, selecting which template formats the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum TaskType {
    #[serde(rename = "EFP")]
    EpigenomicFeaturePrediction,
    #[serde(rename = "GEP")]
    GeneExpressionPrediction,
    #[serde(rename = "EAP")]
    EnhancerActivityPrediction,
    /// Any unrecognized task code. Uses the caller's modalities verbatim.
    #[serde(rename = "GENERIC")]
    Generic,
}

impl TaskType {
    /// The three named tasks, in catalog order.
    pub const SUPPORTED: [TaskType; 3] = [
        TaskType::EpigenomicFeaturePrediction,
        TaskType::GeneExpressionPrediction,
        TaskType::EnhancerActivityPrediction,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            TaskType::EpigenomicFeaturePrediction => "EFP",
            TaskType::GeneExpressionPrediction => "GEP",
            TaskType::EnhancerActivityPrediction => "EAP",
            TaskType::Generic => "GENERIC",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TaskType::EpigenomicFeaturePrediction => "Epigenomic Feature Prediction",
            TaskType::GeneExpressionPrediction => "Gene Expression Prediction",
            TaskType::EnhancerActivityPrediction => "Enhancer Activity Prediction",
            TaskType::Generic => "Generic Prediction",
        }
    }

    /// Resolve the modality list this template renders for `options`.
    pub fn modalities(&self, options: &TemplateOptions) -> Vec<String> {
        match self {
            TaskType::EpigenomicFeaturePrediction => {
                efp_modalities(options.include_additional_tfs)
            }
            TaskType::GeneExpressionPrediction => gep_modalities(options.modalities.clone()),
            TaskType::EnhancerActivityPrediction => {
                eap_modalities(options.include_starr_seq, options.include_chromatin)
            }
            TaskType::Generic => options.modalities.clone().unwrap_or_default(),
        }
    }

    /// Format a full query block with this template.
    pub fn format_query(
        &self,
        chromosome: &str,
        start: i64,
        end: i64,
        cell_type: &str,
        options: &TemplateOptions,
        atac_seq_path: Option<&str>,
    ) -> String {
        let modalities = self.modalities(options);
        format_query(chromosome, start, end, &modalities, cell_type, atac_seq_path)
    }
}

impl std::fmt::Display for TaskType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Map a task code to its template, case-insensitively.
///
/// Unknown codes resolve to [`TaskType::Generic`] instead of failing.
pub fn get_template_for_task(task_type: &str) -> TaskType {
    match task_type.to_uppercase().as_str() {
        "EFP" => TaskType::EpigenomicFeaturePrediction,
        "GEP" => TaskType::GeneExpressionPrediction,
        "EAP" => TaskType::EnhancerActivityPrediction,
        _ => TaskType::Generic,
    }
}

/// Per-template switches. Each template reads only the fields it uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateOptions {
    /// GEP: explicit expression modalities. Generic: rendered verbatim.
    pub modalities: Option<Vec<String>>,
    /// EFP: append "Additional TF-bindings".
    pub include_additional_tfs: bool,
    /// EAP: lead with STARR-seq. Default: `true`.
    pub include_starr_seq: bool,
    /// EAP: include Hi-C and Micro-C. Default: `false`.
    pub include_chromatin: bool,
}

impl Default for TemplateOptions {
    fn default() -> Self {
        Self {
            modalities: None,
            include_additional_tfs: false,
            include_starr_seq: true,
            include_chromatin: false,
        }
    }
}

impl TemplateOptions {
    /// Derive template switches from a caller-supplied modality list.
    ///
    /// EFP turns on additional TF-bindings when listed. EAP keeps STARR-seq
    /// when the list is absent or names it, and turns on chromatin when
    /// Hi-C or Micro-C is named. GEP and Generic keep the list as-is.
    pub fn from_modalities(modalities: Option<Vec<String>>) -> Self {
        let listed = |name: &str| {
            modalities
                .as_ref()
                .is_some_and(|ms| ms.iter().any(|m| m == name))
        };
        Self {
            include_additional_tfs: listed(ADDITIONAL_TF_BINDINGS),
            include_starr_seq: modalities.is_none() || listed(STARR_SEQ),
            include_chromatin: listed(HI_C) || listed(MICRO_C),
            modalities,
        }
    }
}

// ── Result explanation / comparison ────────────────────────────────

/// A prediction result as returned to the UI. Every field is optional;
/// the formatters substitute placeholders for anything missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResult {
    #[serde(default)]
    pub task_type: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub confidence: Option<String>,
    #[serde(default)]
    pub classification: Option<String>,
    #[serde(default)]
    pub region: Option<ResultRegion>,
    #[serde(default)]
    pub cell_type: Option<String>,
    #[serde(default)]
    pub model_version: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResultRegion {
    #[serde(default)]
    pub chromosome: Option<String>,
    #[serde(default)]
    pub start: Option<i64>,
    #[serde(default)]
    pub end: Option<i64>,
}

impl ResultRegion {
    fn is_empty(&self) -> bool {
        self.chromosome.is_none() && self.start.is_none() && self.end.is_none()
    }
}

const UNKNOWN: &str = "Unknown";
const NOT_AVAILABLE: &str = "N/A";

fn or_na<T: ToString>(value: Option<&T>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| v.to_string())
}

impl PredictionResult {
    /// The four summary lines shared by explanation and comparison requests.
    fn summary_lines(&self) -> [String; 4] {
        [
            format!(
                "- Task Type: {}",
                self.task_type.as_deref().unwrap_or(UNKNOWN)
            ),
            format!("- Score: {}", or_na(self.score.as_ref())),
            format!("- Confidence: {}", or_na(self.confidence.as_ref())),
            format!("- Classification: {}", or_na(self.classification.as_ref())),
        ]
    }
}

/// Ask the model to explain a single result, optionally for one modality.
///
/// The region line is omitted when the result has no region fields at all.
pub fn format_explanation_request(result: &PredictionResult, modality: Option<&str>) -> String {
    let mut parts = vec![
        "Explain the following prediction result:".to_string(),
        String::new(),
    ];
    parts.extend(result.summary_lines());

    if let Some(m) = modality.filter(|m| !m.is_empty()) {
        parts.push(format!("- Modality: {m}"));
    }

    if let Some(region) = result.region.as_ref().filter(|r| !r.is_empty()) {
        parts.push(format!(
            "- Region: {}:{}-{}",
            or_na(region.chromosome.as_ref()),
            or_na(region.start.as_ref()),
            or_na(region.end.as_ref()),
        ));
    }

    parts.join("\n")
}

/// Ask the model to compare several results. Each result gets a numbered
/// block followed by a blank line.
pub fn format_comparison_request(results: &[PredictionResult]) -> String {
    let mut parts = vec![
        format!("Compare the following {} prediction results:", results.len()),
        String::new(),
    ];

    for (i, result) in results.iter().enumerate() {
        parts.push(format!("**Result {}:**", i + 1));
        parts.extend(result.summary_lines());
        parts.push(String::new());
    }

    parts.join("\n")
}
