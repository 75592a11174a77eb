//! Per-record enrichment applied before classification.
//!
//! Order matters: values are sanitized first, then the longitude sign is
//! corrected, numeric columns are coerced and finally the datum is
//! backfilled from the station directory.

use crate::constants::{
    DATUM_NOT_RECORDED, LONGITUDE_FLIP_LIMIT, NUMERIC_SENTINEL, STRIPPED_CHARACTERS, columns,
};
use crate::models::{DatasetKind, Record};
use std::borrow::Cow;
use std::collections::HashMap;
use tracing::trace;

/// Station code to datum, built from the stations export
pub type DatumMap = HashMap<String, String>;

/// Keep printable ASCII, minus the characters that break the portal loader
pub fn sanitize(value: &str) -> Cow<'_, str> {
    let keep = |c: char| c.is_ascii() && !c.is_ascii_control() && !STRIPPED_CHARACTERS.contains(&c);
    if value.chars().all(keep) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(value.chars().filter(|c| keep(*c)).collect())
    }
}

/// Negate western longitudes entered as positive numbers
///
/// Returns `None` when the value is left as is.
pub fn normalize_longitude(value: &str) -> Option<String> {
    let longitude = value.trim().parse::<f64>().ok()?;
    if longitude > 0.0 && longitude < LONGITUDE_FLIP_LIMIT {
        Some(format_float(-longitude))
    } else {
        None
    }
}

/// Parse a numeric column, falling back to the `NaN` sentinel
///
/// The flag is true when the fallback was used.
pub fn coerce_numeric(value: &str) -> (String, bool) {
    match value.trim().parse::<f64>() {
        Ok(number) => (format_float(number), false),
        Err(_) => (NUMERIC_SENTINEL.to_string(), true),
    }
}

/// Shortest round-trip form that always keeps a decimal point (`5` -> `5.0`)
///
/// Exponents carry a sign and at least two digits (`1e+20`, `1.5e-07`).
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    let formatted = format!("{:?}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => formatted,
    }
}

/// Applies the enrichment steps for one dataset kind
#[derive(Debug)]
pub struct RecordEnricher<'a> {
    kind: DatasetKind,
    numeric_fields: Vec<String>,
    datum_map: &'a DatumMap,
}

impl<'a> RecordEnricher<'a> {
    pub fn new(kind: DatasetKind, numeric_fields: Vec<String>, datum_map: &'a DatumMap) -> Self {
        Self {
            kind,
            numeric_fields,
            datum_map,
        }
    }

    /// Enrich `record` in place; returns the number of numeric fallbacks
    pub fn enrich(&self, record: &mut Record) -> usize {
        for value in record.values_mut() {
            let cleaned = match sanitize(value) {
                Cow::Owned(clean) => Some(clean),
                Cow::Borrowed(_) => None,
            };
            if let Some(clean) = cleaned {
                *value = clean;
            }
        }

        if let Some(flipped) = record.get(columns::LONGITUDE).and_then(normalize_longitude) {
            record.set(columns::LONGITUDE, flipped);
        }

        let mut fallbacks = 0;
        for field in &self.numeric_fields {
            let Some(raw) = record.get(field) else {
                continue;
            };
            let (coerced, fallback) = coerce_numeric(raw);
            if fallback {
                trace!("{} value '{}' is not numeric", field, raw);
                fallbacks += 1;
            }
            record.set(field, coerced);
        }

        if self.kind.requires_datum() {
            let datum = record
                .get(columns::STATION_CODE)
                .and_then(|code| self.datum_map.get(code))
                .map(String::as_str)
                .unwrap_or(DATUM_NOT_RECORDED)
                .to_string();
            record.set(columns::DATUM, datum);
        }

        fallbacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_control_and_reserved() {
        assert_eq!(sanitize("plain value"), "plain value");
        assert!(matches!(sanitize("plain value"), Cow::Borrowed(_)));
        assert_eq!(sanitize("a|b\"c\td\r\n"), "abcd");
        assert_eq!(sanitize("caf\u{e9} 5\u{b0}C"), "caf 5C");
    }

    #[test]
    fn test_longitude_normalization() {
        assert_eq!(normalize_longitude("121.5"), Some("-121.5".to_string()));
        assert_eq!(normalize_longitude("9999.9"), Some("-9999.9".to_string()));
        assert_eq!(normalize_longitude("-121.5"), None);
        assert_eq!(normalize_longitude("0"), None);
        assert_eq!(normalize_longitude("10000"), None);
        assert_eq!(normalize_longitude("unknown"), None);
        assert_eq!(normalize_longitude(""), None);
    }

    #[test]
    fn test_numeric_coercion() {
        assert_eq!(coerce_numeric("5"), ("5.0".to_string(), false));
        assert_eq!(coerce_numeric(" 0.25 "), ("0.25".to_string(), false));
        assert_eq!(coerce_numeric("-3.10"), ("-3.1".to_string(), false));
        assert_eq!(coerce_numeric(""), ("NaN".to_string(), true));
        assert_eq!(coerce_numeric("<0.5"), ("NaN".to_string(), true));
    }

    #[test]
    fn test_float_exponent_form() {
        assert_eq!(format_float(1e20), "1e+20");
        assert_eq!(format_float(-2.5e30), "-2.5e+30");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(1e-300), "1e-300");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(coerce_numeric("nan"), ("nan".to_string(), false));
    }

    #[test]
    fn test_enrich_record() {
        let mut datum_map = DatumMap::new();
        datum_map.insert("204PS0001".to_string(), "NAD83".to_string());

        let enricher = RecordEnricher::new(
            DatasetKind::WaterChemistry,
            vec!["Result".to_string(), "MDL".to_string()],
            &datum_map,
        );

        let mut record = Record::from_pairs(&[
            ("StationCode", "204PS0001"),
            ("Longitude", "122.1"),
            ("Result", "1"),
            ("MDL", "n/a"),
            ("Comment", "pipe|here"),
            ("Datum", ""),
        ]);
        let fallbacks = enricher.enrich(&mut record);

        assert_eq!(fallbacks, 1);
        assert_eq!(record.get("Longitude"), Some("-122.1"));
        assert_eq!(record.get("Result"), Some("1.0"));
        assert_eq!(record.get("MDL"), Some("NaN"));
        assert_eq!(record.get("Comment"), Some("pipehere"));
        assert_eq!(record.get("Datum"), Some("NAD83"));
    }

    #[test]
    fn test_unknown_station_gets_not_recorded_datum() {
        let datum_map = DatumMap::new();
        let enricher = RecordEnricher::new(DatasetKind::Toxicity, Vec::new(), &datum_map);
        let mut record = Record::from_pairs(&[("StationCode", "999XX"), ("Datum", "WGS84")]);
        enricher.enrich(&mut record);
        assert_eq!(record.get("Datum"), Some("NR"));
    }

    #[test]
    fn test_benthic_keeps_datum() {
        let datum_map = DatumMap::new();
        let enricher = RecordEnricher::new(DatasetKind::Benthic, Vec::new(), &datum_map);
        let mut record = Record::from_pairs(&[("StationCode", "999XX"), ("Datum", "WGS84")]);
        enricher.enrich(&mut record);
        assert_eq!(record.get("Datum"), Some("WGS84"));
    }
}
