//! Field-specific scoring policies

use crate::constants::columns;
use crate::error::{CedenError, Result};
use crate::models::Record;

/// How a column's value turns into severity scores
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPolicy {
    /// Plain table lookup, unknown values contribute nothing
    Default,
    /// Comma-separated list of codes, each looked up on its own
    MultiValued,
    /// Non-project QA station codes are metadata
    StationCode,
    /// Surrogate spikes are metadata
    AnalyteSurrogate,
    /// DNQ and ND carry date and result dependent rules
    ResultQualifier,
    /// Empty results are only scored when the qualifier says ND
    ResultValue,
}

impl FieldPolicy {
    pub fn for_field(field: &str) -> Self {
        match field {
            columns::QA_CODE => FieldPolicy::MultiValued,
            columns::STATION_CODE => FieldPolicy::StationCode,
            columns::ANALYTE | columns::ANALYTE_NAME => FieldPolicy::AnalyteSurrogate,
            columns::RESULT_QUAL_CODE | columns::RES_QUAL_CODE => FieldPolicy::ResultQualifier,
            columns::RESULT => FieldPolicy::ResultValue,
            _ => FieldPolicy::Default,
        }
    }

    /// Split a raw value into the codes that are looked up
    pub fn tokens<'a>(&self, value: &'a str) -> Vec<&'a str> {
        match self {
            FieldPolicy::MultiValued => value.split(',').collect(),
            _ => vec![value],
        }
    }
}

/// Where the year sits inside a `SampleDate` value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearPosition {
    /// `YYYY-MM-DD...`
    Leading,
    /// `...MM/DD/YYYY`
    Trailing,
}

/// Read the sample year of a record
pub fn sample_year(record: &Record, position: YearPosition) -> Result<i32> {
    let value = record.get(columns::SAMPLE_DATE).unwrap_or_default();
    parse_year(value, position)
}

/// Parse a four-digit year from the start or end of a date string
pub fn parse_year(value: &str, position: YearPosition) -> Result<i32> {
    let chars: Vec<char> = value.chars().collect();
    let slice: String = match position {
        YearPosition::Leading => chars.iter().take(4).collect(),
        YearPosition::Trailing => chars[chars.len().saturating_sub(4)..].iter().collect(),
    };

    slice
        .trim()
        .parse::<i32>()
        .map_err(|_| CedenError::SampleYear {
            field: columns::SAMPLE_DATE.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_dispatch() {
        assert_eq!(FieldPolicy::for_field("QACode"), FieldPolicy::MultiValued);
        assert_eq!(FieldPolicy::for_field("ResQualCode"), FieldPolicy::ResultQualifier);
        assert_eq!(FieldPolicy::for_field("AnalyteName"), FieldPolicy::AnalyteSurrogate);
        assert_eq!(FieldPolicy::for_field("Datum"), FieldPolicy::Default);
        assert_eq!(FieldPolicy::MultiValued.tokens("BT,AWM"), vec!["BT", "AWM"]);
        assert_eq!(FieldPolicy::Default.tokens("BT,AWM"), vec!["BT,AWM"]);
    }

    #[test]
    fn test_parse_year_positions() {
        assert_eq!(parse_year("2015-06-01", YearPosition::Leading).unwrap(), 2015);
        assert_eq!(parse_year("06/01/2005", YearPosition::Trailing).unwrap(), 2005);
        assert_eq!(parse_year("2005", YearPosition::Trailing).unwrap(), 2005);
        assert!(parse_year("", YearPosition::Leading).is_err());
        assert!(matches!(
            parse_year("06/01/2005", YearPosition::Leading),
            Err(CedenError::SampleYear { .. })
        ));
    }
}
