//! Request validation: gate query formatting on domain constraints.
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. chromosome membership ([`ValidationError::InvalidChromosome`])
//! 2. region size bound ([`ValidationError::RegionTooLarge`])
//! 3. coordinate sanity ([`ValidationError::InvalidCoordinates`])

use serde::Serialize;
use tracing::warn;

use crate::config::{is_valid_chromosome, is_valid_region_size, valid_chromosomes_list};
use crate::error::ValidationError;

/// A validated genomic region. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenomicRegion {
    chromosome: String,
    start: i64,
    end: i64,
}

impl GenomicRegion {
    /// Validate and build a region. See the module docs for check order.
    pub fn try_new(
        chromosome: impl Into<String>,
        start: i64,
        end: i64,
    ) -> Result<Self, ValidationError> {
        let chromosome = chromosome.into();
        validate_region(&chromosome, start, end)?;
        Ok(Self {
            chromosome,
            start,
            end,
        })
    }

    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn end(&self) -> i64 {
        self.end
    }

    /// Region length in base pairs.
    pub fn size_bp(&self) -> i64 {
        self.end - self.start
    }
}

impl std::fmt::Display for GenomicRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.chromosome, self.start, self.end)
    }
}

/// Validate raw region parameters without building a [`GenomicRegion`].
pub fn validate_region(chromosome: &str, start: i64, end: i64) -> Result<(), ValidationError> {
    if !is_valid_chromosome(chromosome) {
        warn!(chromosome, "rejected region: invalid chromosome");
        return Err(ValidationError::InvalidChromosome {
            chromosome: chromosome.to_string(),
            allowed: valid_chromosomes_list(),
        });
    }

    if !is_valid_region_size(start, end) {
        let size_bp = end.saturating_sub(start);
        warn!(chromosome, start, end, size_bp, "rejected region: too large");
        return Err(ValidationError::region_too_large(size_bp));
    }

    if start < 0 || end <= start {
        warn!(chromosome, start, end, "rejected region: bad coordinates");
        return Err(ValidationError::InvalidCoordinates { start, end });
    }

    Ok(())
}
