//! Per-kind code table adaptation
//!
//! Each source table names its columns slightly differently. The adapter
//! derives a kind-specific table from the standard registry by applying an
//! ordered list of rename, mirror and remove rules. Renamed and mirrored
//! fields move to the end of the table, which fixes the order of the
//! indicator fragments.

use super::code_table::CodeTable;
use crate::error::{CedenError, Result};
use crate::models::DatasetKind;
use tracing::debug;

/// One adaptation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterRule {
    /// Move a field to a new name
    Rename { from: &'static str, to: &'static str },
    /// Expose a field under a second name, keeping the original
    Mirror { from: &'static str, to: &'static str },
    /// Drop a field the kind does not carry
    Remove(&'static str),
}

use AdapterRule::{Mirror, Remove, Rename};

const fn rename(from: &'static str, to: &'static str) -> AdapterRule {
    Rename { from, to }
}

const STATIONS_RULES: &[AdapterRule] = &[
    Remove("Analyte"),
    Remove("Result"),
    Remove("MatrixName"),
    Remove("ResultsReplicate"),
    Remove("QACode"),
    Remove("BatchVerification"),
    Remove("ResultQualCode"),
    Remove("Latitude"),
    Remove("SampleTypeCode"),
    Remove("SampleDate"),
    Remove("ProgramName"),
    Remove("CollectionReplicate"),
];

const WATER_CHEMISTRY_RULES: &[AdapterRule] = &[rename("ProgramName", "Program")];

const TOXICITY_RULES: &[AdapterRule] = &[
    rename("ProgramName", "Program"),
    rename("BatchVerification", "BatchVerificationCode"),
    Remove("ResultsReplicate"),
    Remove("CollectionReplicate"),
];

const TISSUE_RULES: &[AdapterRule] = &[
    rename("MatrixName", "Matrix"),
    rename("ResultsReplicate", "ResultReplicate"),
    Remove("ResultQualCode"),
];

const BENTHIC_RULES: &[AdapterRule] = &[
    rename("SampleTypeCode", "SampleType"),
    rename("ResultQualCode", "ResQualCode"),
    Remove("Analyte"),
    Remove("Result"),
    Remove("MatrixName"),
    Remove("ResultsReplicate"),
    Remove("QACode"),
    Remove("BatchVerification"),
    Remove("Datum"),
];

const HABITAT_RULES: &[AdapterRule] = &[
    rename("ProgramName", "Program"),
    Remove("ResultsReplicate"),
    Remove("Result"),
    Remove("BatchVerification"),
];

const CYANO_TOXIN_RULES: &[AdapterRule] = &[
    rename("BatchVerification", "BatchVerificationCode"),
    rename("ResultQualCode", "ResQualCode"),
    rename("ResultsReplicate", "Replicate"),
    rename("Analyte", "AnalyteName"),
    Remove("ProgramName"),
    Remove("CollectionReplicate"),
];

const IR_WATER_CHEMISTRY_RULES: &[AdapterRule] = &[
    rename("ResultQualCode", "ResQualCode"),
    rename("Analyte", "AnalyteName"),
    rename("ResultsReplicate", "Replicate"),
    rename("Latitude", "TargetLatitude"),
    Remove("BatchVerification"),
    Remove("CollectionReplicate"),
    Remove("Datum"),
];

const IR_TOXICITY_RULES: &[AdapterRule] = &[
    rename("ResultQualCode", "ResQualCode"),
    rename("ProgramName", "Program"),
    rename("Latitude", "TargetLatitude"),
    Remove("ResultsReplicate"),
    Remove("BatchVerification"),
    Remove("Datum"),
];

const IR_BENTHIC_RULES: &[AdapterRule] = &[
    rename("ResultQualCode", "ResQualCode"),
    rename("SampleTypeCode", "SampleType"),
    rename("Latitude", "TargetLatitude"),
    Remove("Analyte"),
    Remove("Result"),
    Remove("MatrixName"),
    Remove("ResultsReplicate"),
    Remove("QACode"),
    Remove("BatchVerification"),
    Remove("Datum"),
];

// STORET 2010, STORET 2012 and NWIS share one layout
const IR_STORET_RULES: &[AdapterRule] = &[
    rename("Analyte", "AnalyteName"),
    rename("ResultQualCode", "ResQualCode"),
    rename("ResultsReplicate", "Replicate"),
    rename("Latitude", "TargetLatitude"),
    Remove("BatchVerification"),
    Remove("CollectionReplicate"),
    Remove("Datum"),
];

const IR_FIELD_RULES: &[AdapterRule] = &[
    rename("ResultQualCode", "ResQualCode"),
    rename("ResultsReplicate", "ResultReplicate"),
    rename("Latitude", "TargetLatitude"),
    Mirror {
        from: "Analyte",
        to: "AnalyteName",
    },
    Remove("BatchVerification"),
    Remove("Datum"),
];

const IR_TISSUE_RULES: &[AdapterRule] = &[
    rename("ResultQualCode", "ResQualCode"),
    rename("ResultsReplicate", "ResultReplicate"),
    rename("MatrixName", "Matrix"),
    rename("Latitude", "TargetLatitude"),
    Remove("BatchVerification"),
    Remove("Datum"),
];

/// Ordered adaptation rules for a dataset kind
pub fn rules_for(kind: DatasetKind) -> &'static [AdapterRule] {
    match kind {
        DatasetKind::Stations => STATIONS_RULES,
        DatasetKind::WaterChemistry => WATER_CHEMISTRY_RULES,
        DatasetKind::Toxicity => TOXICITY_RULES,
        DatasetKind::Tissue => TISSUE_RULES,
        DatasetKind::Benthic => BENTHIC_RULES,
        DatasetKind::Habitat => HABITAT_RULES,
        DatasetKind::CyanoToxin => CYANO_TOXIN_RULES,
        DatasetKind::IrWaterChemistry => IR_WATER_CHEMISTRY_RULES,
        DatasetKind::IrToxicity => IR_TOXICITY_RULES,
        DatasetKind::IrBenthic => IR_BENTHIC_RULES,
        DatasetKind::IrStoret2010 | DatasetKind::IrStoret2012 | DatasetKind::IrNwis => {
            IR_STORET_RULES
        }
        DatasetKind::IrField => IR_FIELD_RULES,
        DatasetKind::IrTissue => IR_TISSUE_RULES,
    }
}

/// Derive the code table for `kind`, leaving `registry` untouched
///
/// Fails with [`CedenError::UnknownCodeField`] when a rule names a field the
/// registry does not carry, which points at a broken override file.
pub fn adapt(registry: &CodeTable, kind: DatasetKind) -> Result<CodeTable> {
    let mut table = registry.clone();

    for rule in rules_for(kind) {
        let applied = match *rule {
            Rename { from, to } => table.rename(from, to),
            Mirror { from, to } => table.mirror(from, to),
            Remove(field) => table.remove(field),
        };

        if !applied {
            let field = match *rule {
                Rename { from, .. } | Mirror { from, .. } => from,
                Remove(field) => field,
            };
            return Err(CedenError::UnknownCodeField {
                kind: kind.to_string(),
                field: field.to_string(),
            });
        }
    }

    debug!(
        "Adapted code table for {}: {}",
        kind,
        table.field_names().join(", ")
    );
    Ok(table)
}
