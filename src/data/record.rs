//! Dataset records: a generic field-name -> value map, plus typed views for
//! the two sheets (COMPDEC contacts and REPDEC regional offices).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub const FIELD_COORDINATOR: &str = "Coordenador";
pub const FIELD_MUNICIPALITY: &str = "Municipio";
pub const FIELD_REGIONAL: &str = "REPDEC";

pub const FIELD_PHONE: &str = "Telefone";
pub const FIELD_OTHER_PHONES: &str = "Outros Contatos";
pub const FIELD_INSTITUTIONAL_EMAIL: &str = "Email COMPDEC";
pub const FIELD_EMAIL: &str = "Email";

pub const FIELD_CHIEF: &str = "CH_REPDEC";
pub const FIELD_CHIEF_CONTACT: &str = "CH_Contato";
pub const FIELD_ASSISTANT: &str = "AUX_REPDEC";
pub const FIELD_ASSISTANT_CONTACT: &str = "AUX_Contato";
pub const FIELD_OFFICE_EMAIL: &str = "Email_REPDEC";

/// One data row keyed by header name. A repeated header keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, String>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Value of `field`, or `""` when the dataset has no such column.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in header order, for display. Duplicate headers repeat the surviving value.
    pub fn ordered<'a>(
        &'a self,
        headers: &'a [String],
    ) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        headers.iter().map(move |h| (h.as_str(), self.get(h)))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

/// Municipal civil-defense contact (COMPDEC sheet row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactRecord(Record);

impl ContactRecord {
    pub fn new(record: Record) -> Self {
        Self(record)
    }

    pub fn coordinator_name(&self) -> &str {
        self.0.get(FIELD_COORDINATOR)
    }

    pub fn municipality(&self) -> &str {
        self.0.get(FIELD_MUNICIPALITY)
    }

    pub fn regional_key(&self) -> &str {
        self.0.get(FIELD_REGIONAL)
    }

    pub fn field(&self, name: &str) -> &str {
        self.0.get(name)
    }

    pub fn record(&self) -> &Record {
        &self.0
    }

    /// Rows with neither a coordinator nor a municipality are sheet padding.
    pub fn is_retained(&self) -> bool {
        !self.coordinator_name().is_empty() || !self.municipality().is_empty()
    }
}

/// Regional office leadership (REPDEC sheet row).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionalRecord(Record);

impl RegionalRecord {
    pub fn new(record: Record) -> Self {
        Self(record)
    }

    pub fn regional_key(&self) -> &str {
        self.0.get(FIELD_REGIONAL)
    }

    pub fn chief_name(&self) -> &str {
        self.0.get(FIELD_CHIEF)
    }

    pub fn chief_contact(&self) -> &str {
        self.0.get(FIELD_CHIEF_CONTACT)
    }

    pub fn assistant_name(&self) -> &str {
        self.0.get(FIELD_ASSISTANT)
    }

    pub fn assistant_contact(&self) -> &str {
        self.0.get(FIELD_ASSISTANT_CONTACT)
    }

    pub fn office_email(&self) -> &str {
        self.0.get(FIELD_OFFICE_EMAIL)
    }

    pub fn field(&self, name: &str) -> &str {
        self.0.get(name)
    }

    pub fn record(&self) -> &Record {
        &self.0
    }

    pub fn is_retained(&self) -> bool {
        !self.regional_key().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_reads_as_empty() {
        let record: Record = [("Coordenador", "Ana")].into_iter().collect();
        assert_eq!(record.get("Coordenador"), "Ana");
        assert_eq!(record.get("Telefone"), "");
    }

    #[test]
    fn repeated_field_keeps_last_value() {
        let record: Record = [("Email", "a@x"), ("Email", "b@x")].into_iter().collect();
        assert_eq!(record.len(), 1);
        assert_eq!(record.get("Email"), "b@x");
    }

    #[test]
    fn ordered_follows_header_order() {
        let record: Record = [("B", "2"), ("A", "1")].into_iter().collect();
        let headers = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let pairs: Vec<_> = record.ordered(&headers).collect();
        assert_eq!(pairs, vec![("A", "1"), ("B", "2"), ("C", "")]);
    }

    #[test]
    fn contact_retention_needs_name_or_city() {
        let named = ContactRecord::new([("Coordenador", "Ana")].into_iter().collect());
        let city_only = ContactRecord::new([("Municipio", "Blumenau")].into_iter().collect());
        let blank = ContactRecord::new([("Telefone", "123")].into_iter().collect());
        assert!(named.is_retained());
        assert!(city_only.is_retained());
        assert!(!blank.is_retained());
    }

    #[test]
    fn regional_retention_needs_key() {
        let keyed = RegionalRecord::new([("REPDEC", "R1")].into_iter().collect());
        let unkeyed = RegionalRecord::new([("CH_REPDEC", "Chefe")].into_iter().collect());
        assert!(keyed.is_retained());
        assert!(!unkeyed.is_retained());
    }
}
