//! Static validation rules for genomic prediction requests.
//!
//! Everything here is a compile-time constant or a pure predicate over one.
//! The allowed chromosome set, the region size bound, the task-type codes,
//! and the modality catalog are the single source of truth for the
//! validator, the query formatter, and the capabilities listing.

/// Maximum genomic region size, in kilobases (1 kb = 1000 bp).
pub const MAX_REGION_SIZE_KB: i64 = 600;

/// Base pairs per kilobase used by the region size check.
pub const BP_PER_KB: i64 = 1000;

/// Chromosome identifiers accepted by the prediction system.
pub const VALID_CHROMOSOMES: [&str; 24] = [
    "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11", "12", "13", "14", "15", "16", "17",
    "18", "19", "20", "21", "22", "X", "Y",
];

/// Supported prediction task codes.
pub const TASK_TYPES: [&str; 3] = ["EFP", "GEP", "EAP"];

/// The fixed modality catalog, in display order.
pub const MODALITIES: [&str; 14] = [
    EPIGENOMIC_FEATURES,
    RNA_SEQ,
    "Bru-seq",
    MICRO_C,
    HI_C,
    "Intact Hi-C",
    "TT-seq",
    ADDITIONAL_TF_BINDINGS,
    RNA_STRAND_SPECIFIC,
    GRO_SEQ,
    "GRO-cap",
    "PRO-seq",
    "NET-CAGE",
    STARR_SEQ,
];

// Catalog entries the task templates refer to by name.
pub const EPIGENOMIC_FEATURES: &str = "Epigenomic features (TF-bindings + 11 histone marks)";
pub const ADDITIONAL_TF_BINDINGS: &str = "Additional TF-bindings";
pub const RNA_SEQ: &str = "RNA-seq";
pub const RNA_STRAND_SPECIFIC: &str = "RNA strand-specific";
pub const GRO_SEQ: &str = "GRO-seq";
pub const STARR_SEQ: &str = "STARR-seq";
pub const HI_C: &str = "Hi-C";
pub const MICRO_C: &str = "Micro-C";

/// Whether `name` is one of `1`..`22`, `X`, `Y`.
///
/// Matching is exact: `"chr7"`, `"x"` and `" 7"` are all rejected.
pub fn is_valid_chromosome(name: &str) -> bool {
    VALID_CHROMOSOMES.contains(&name)
}

/// Whether the region `[start, end)` fits inside [`MAX_REGION_SIZE_KB`].
///
/// `start` and `end` are in base pairs. The bound is inclusive, so a region
/// of exactly 600,000 bp passes and 600,001 bp does not.
pub fn is_valid_region_size(start: i64, end: i64) -> bool {
    end.saturating_sub(start) <= max_region_size_bp()
}

/// [`MAX_REGION_SIZE_KB`] expressed in base pairs.
pub const fn max_region_size_bp() -> i64 {
    MAX_REGION_SIZE_KB * BP_PER_KB
}

/// The allowed chromosome set as a comma-separated list, for error messages.
pub fn valid_chromosomes_list() -> String {
    VALID_CHROMOSOMES.join(", ")
}

/// The canonical system prompt sent ahead of every conversation.
pub fn system_prompt() -> &'static str {
    crate::prompt::SYSTEM_PROMPT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_autosomes_and_sex_chromosomes_are_valid() {
        for n in 1..=22 {
            assert!(is_valid_chromosome(&n.to_string()), "chromosome {n}");
        }
        assert!(is_valid_chromosome("X"));
        assert!(is_valid_chromosome("Y"));
    }

    #[test]
    fn other_chromosome_names_are_rejected() {
        for name in ["0", "23", "chr1", "x", "y", "M", "MT", "", " 1", "1 "] {
            assert!(!is_valid_chromosome(name), "{name:?} should be rejected");
        }
    }

    #[test]
    fn region_size_bound_is_inclusive() {
        assert!(is_valid_region_size(0, 600_000));
        assert!(is_valid_region_size(1_000_000, 1_600_000));
        assert!(!is_valid_region_size(0, 600_001));
        assert!(!is_valid_region_size(1_000_000, 2_000_000));
    }

    #[test]
    fn region_size_uses_decimal_kilobases() {
        assert_eq!(max_region_size_bp(), 600_000);
    }

    #[test]
    fn modality_catalog_has_fourteen_unique_entries() {
        let mut seen = std::collections::HashSet::new();
        for m in MODALITIES {
            assert!(seen.insert(m), "duplicate modality {m}");
        }
        assert_eq!(MODALITIES.len(), 14);
        assert_eq!(MODALITIES[0], EPIGENOMIC_FEATURES);
        assert_eq!(MODALITIES[13], STARR_SEQ);
    }

    #[test]
    fn chromosome_list_mentions_bounds() {
        let list = valid_chromosomes_list();
        assert!(list.starts_with("1, 2"));
        assert!(list.ends_with("22, X, Y"));
    }
}
