//! QA code tables
//!
//! A [`CodeTable`] maps each recognised column to a lookup from raw code
//! value to severity. Tables are immutable once built; the schema adapter
//! derives per-kind copies that share the underlying lookups.

use crate::constants::code_tables::BASE_FIELDS;
use crate::error::{CedenError, Result};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Highest severity a code may carry (reject record)
pub const MAX_SEVERITY: u8 = 6;

/// Code lookup for a single column
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldCodes {
    codes: HashMap<String, u8>,
}

impl FieldCodes {
    /// Build a lookup, rejecting severities outside 0..=6
    pub fn from_entries<I, S>(field: &str, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u8)>,
        S: Into<String>,
    {
        let mut codes = HashMap::new();
        for (code, severity) in entries {
            let code = code.into();
            if severity > MAX_SEVERITY {
                return Err(CedenError::InvalidSeverity {
                    field: field.to_string(),
                    code,
                    severity,
                });
            }
            codes.insert(code, severity);
        }
        Ok(Self { codes })
    }

    pub fn severity(&self, code: &str) -> Option<u8> {
        self.codes.get(code).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    fn merged(&self, field: &str, extra: &BTreeMap<String, u8>) -> Result<Self> {
        let overrides = Self::from_entries(field, extra.iter().map(|(c, s)| (c.clone(), *s)))?;
        let mut codes = self.codes.clone();
        codes.extend(overrides.codes);
        Ok(Self { codes })
    }
}

/// Ordered set of per-column code lookups
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodeTable {
    fields: Vec<(String, Arc<FieldCodes>)>,
}

impl CodeTable {
    /// The registry every dataset kind is adapted from
    pub fn standard() -> Result<Self> {
        let mut fields = Vec::with_capacity(BASE_FIELDS.len());
        for (field, entries) in BASE_FIELDS {
            let codes = FieldCodes::from_entries(field, entries.iter().copied())?;
            fields.push((field.to_string(), Arc::new(codes)));
        }
        debug!("Built standard code table with {} fields", fields.len());
        Ok(Self { fields })
    }

    /// Build a table from explicit columns, mostly useful in tests
    pub fn from_fields(fields: Vec<(String, FieldCodes)>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .map(|(name, codes)| (name, Arc::new(codes)))
                .collect(),
        }
    }

    /// Merge configured overrides; unknown columns are appended as new fields
    pub fn with_overrides(
        mut self,
        overrides: &BTreeMap<String, BTreeMap<String, u8>>,
    ) -> Result<Self> {
        for (field, codes) in overrides {
            match self.position(field) {
                Some(position) => {
                    let merged = self.fields[position].1.merged(field, codes)?;
                    self.fields[position].1 = Arc::new(merged);
                }
                None => {
                    let added = FieldCodes::default().merged(field, codes)?;
                    self.fields.push((field.clone(), Arc::new(added)));
                }
            }
            debug!("Applied {} code overrides to {}", codes.len(), field);
        }
        Ok(self)
    }

    pub fn get(&self, field: &str) -> Option<&FieldCodes> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, codes)| codes.as_ref())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.position(field).is_some()
    }

    /// Columns in evaluation order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldCodes)> {
        self.fields
            .iter()
            .map(|(name, codes)| (name.as_str(), codes.as_ref()))
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|(name, _)| name == field)
    }

    /// Move `from` to the end of the table under the name `to`
    pub(crate) fn rename(&mut self, from: &str, to: &str) -> bool {
        let Some(position) = self.position(from) else {
            return false;
        };
        let (_, codes) = self.fields.remove(position);
        self.insert_or_replace(to, codes);
        true
    }

    pub(crate) fn remove(&mut self, field: &str) -> bool {
        match self.position(field) {
            Some(position) => {
                self.fields.remove(position);
                true
            }
            None => false,
        }
    }

    /// Expose the lookup of `from` under a second name as well
    pub(crate) fn mirror(&mut self, from: &str, to: &str) -> bool {
        let Some(position) = self.position(from) else {
            return false;
        };
        let codes = Arc::clone(&self.fields[position].1);
        self.insert_or_replace(to, codes);
        true
    }

    fn insert_or_replace(&mut self, name: &str, codes: Arc<FieldCodes>) {
        match self.position(name) {
            Some(existing) => self.fields[existing].1 = codes,
            None => self.fields.push((name.to_string(), codes)),
        }
    }
}
