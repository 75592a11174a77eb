//! Record classification
//!
//! Every column of the adapted code table contributes zero or more severity
//! scores. The lowest and highest scores then decide the category:
//! any 0 marks a QC/metadata row, an all-1 row passed, otherwise the highest
//! score wins and the indicator lists the codes that produced it.

use super::adapter::adapt;
use super::code_table::{CodeTable, FieldCodes};
use super::policy::{FieldPolicy, YearPosition, sample_year};
use crate::constants::{
    DNQ_REJECT_BEFORE_YEAR, INDICATOR_SEPARATOR, NON_PROJECT_STATION_PATTERN,
    SPECIAL_RULES_INDICATOR, SURROGATE_PATTERN, columns,
};
use crate::error::Result;
use crate::models::{DatasetKind, QualityCategory, QualityVerdict, Record};
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

const METADATA: u8 = 0;
const PASSED: u8 = 1;
const REJECT: u8 = 6;
/// Score assumed when no column produced one
const NO_SCORE: u8 = 7;

static NON_PROJECT_STATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(NON_PROJECT_STATION_PATTERN).expect("Invalid non-project station regex")
});

static SURROGATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(SURROGATE_PATTERN).expect("Invalid surrogate regex"));

/// Classifier bound to one dataset kind
#[derive(Debug, Clone)]
pub struct QualityClassifier {
    kind: DatasetKind,
    table: CodeTable,
    policies: Vec<FieldPolicy>,
}

impl QualityClassifier {
    /// Adapt `registry` for `kind` and build a classifier over it
    pub fn new(registry: &CodeTable, kind: DatasetKind) -> Result<Self> {
        let table = adapt(registry, kind)?;
        if kind.is_legacy_report() {
            warn!(
                "{} reports month-day-year sample dates; DNQ years are read from the last four characters",
                kind
            );
        }
        Ok(Self::with_table(table, kind))
    }

    /// Build a classifier over an already adapted table
    pub fn with_table(table: CodeTable, kind: DatasetKind) -> Self {
        let policies = table
            .fields()
            .map(|(field, _)| FieldPolicy::for_field(field))
            .collect();
        Self {
            kind,
            table,
            policies,
        }
    }

    pub fn kind(&self) -> DatasetKind {
        self.kind
    }

    pub fn table(&self) -> &CodeTable {
        &self.table
    }

    /// Severity scores contributed by each column, in table order
    pub fn severity_scores(&self, record: &Record) -> Result<Vec<u8>> {
        let mut scores = Vec::new();

        for ((field, codes), policy) in self.table.fields().zip(&self.policies) {
            // columns the record does not carry contribute nothing
            let Some(value) = record.get(field) else {
                continue;
            };

            match policy {
                FieldPolicy::Default => scores.extend(codes.severity(value)),
                FieldPolicy::MultiValued => {
                    scores.extend(policy.tokens(value).into_iter().filter_map(|c| codes.severity(c)))
                }
                FieldPolicy::StationCode => {
                    if NON_PROJECT_STATION.is_match(value) {
                        scores.push(METADATA);
                    } else {
                        scores.extend(codes.severity(value));
                    }
                }
                FieldPolicy::AnalyteSurrogate => {
                    if SURROGATE.is_match(value) {
                        scores.push(METADATA);
                    } else {
                        scores.extend(codes.severity(value));
                    }
                }
                FieldPolicy::ResultQualifier => {
                    scores.extend(self.qualifier_score(value, codes, record)?)
                }
                FieldPolicy::ResultValue => {
                    if value.is_empty() {
                        if qualifier(record) == Some("ND") {
                            scores.push(PASSED);
                        }
                    } else {
                        scores.extend(codes.severity(value));
                    }
                }
            }
        }

        Ok(scores)
    }

    /// Assign a category and indicator to one record
    pub fn classify(&self, record: &Record) -> Result<QualityVerdict> {
        let scores = self.severity_scores(record)?;
        let min = scores.iter().copied().min().unwrap_or(NO_SCORE);
        let max = scores.iter().copied().max().unwrap_or(NO_SCORE);

        if min == METADATA {
            return Ok(QualityVerdict {
                category: QualityCategory::MetaData,
                indicator: String::new(),
            });
        }
        if max == PASSED {
            return Ok(QualityVerdict {
                category: QualityCategory::Passed,
                indicator: String::new(),
            });
        }

        let mut indicator = self.indicator(record, max);
        if max == REJECT && indicator.is_empty() {
            indicator = SPECIAL_RULES_INDICATOR.to_string();
        }

        Ok(QualityVerdict {
            category: QualityCategory::from_score(max),
            indicator,
        })
    }

    /// `field:code,code` for every column holding a code at `max` severity
    fn indicator(&self, record: &Record, max: u8) -> String {
        let mut fragments = Vec::new();

        for ((field, codes), policy) in self.table.fields().zip(&self.policies) {
            let Some(value) = record.get(field) else {
                continue;
            };
            let matched: Vec<&str> = policy
                .tokens(value)
                .into_iter()
                .filter(|code| codes.severity(code) == Some(max))
                .collect();
            if !matched.is_empty() {
                fragments.push(format!("{}:{}", field, matched.join(",")));
            }
        }

        fragments.join(INDICATOR_SEPARATOR)
    }

    fn qualifier_score(
        &self,
        value: &str,
        codes: &FieldCodes,
        record: &Record,
    ) -> Result<Option<u8>> {
        match value {
            "DNQ" => {
                let position = if self.kind.is_legacy_report() {
                    YearPosition::Trailing
                } else {
                    YearPosition::Leading
                };
                if sample_year(record, position)? < DNQ_REJECT_BEFORE_YEAR {
                    Ok(Some(REJECT))
                } else {
                    Ok(codes.severity(value))
                }
            }
            "ND" => {
                if positive_result(record) {
                    Ok(Some(REJECT))
                } else {
                    Ok(Some(PASSED))
                }
            }
            _ => Ok(codes.severity(value)),
        }
    }
}

/// Classify a single record against an adapted table
pub fn classify(record: &Record, table: &CodeTable, kind: DatasetKind) -> Result<QualityVerdict> {
    QualityClassifier::with_table(table.clone(), kind).classify(record)
}

/// Value of whichever result qualifier column the record carries
fn qualifier(record: &Record) -> Option<&str> {
    record
        .get(columns::RESULT_QUAL_CODE)
        .or_else(|| record.get(columns::RES_QUAL_CODE))
}

/// A non-detect must not report a positive result
fn positive_result(record: &Record) -> bool {
    record
        .get(columns::RESULT)
        .and_then(|value| value.trim().parse::<f64>().ok())
        .is_some_and(|result| result > 0.0)
}
