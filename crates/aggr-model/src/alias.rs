//! Canonical column names and the raw aliases that map onto them.
//!
//! The mapping is ordered: substitution runs canonical by canonical in the
//! order the entries were declared, so a later entry may rewrite the output
//! of an earlier one. JSON documents keep their key order on load.

use std::fmt;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One canonical name and its recognized aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasEntry {
    pub canonical: String,
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMapping {
    entries: Vec<AliasEntry>,
}

impl AliasMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds aliases for a canonical name. Repeated canonical names extend the
    /// existing entry instead of creating a second one.
    pub fn insert<I, S>(&mut self, canonical: impl Into<String>, aliases: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let canonical = canonical.into();
        let aliases = aliases.into_iter().map(Into::into);
        match self.entries.iter_mut().find(|e| e.canonical == canonical) {
            Some(entry) => {
                for alias in aliases {
                    if !entry.aliases.contains(&alias) {
                        entry.aliases.push(alias);
                    }
                }
            }
            None => self.entries.push(AliasEntry {
                canonical,
                aliases: aliases.collect(),
            }),
        }
    }

    #[must_use]
    pub fn with<I, S>(mut self, canonical: impl Into<String>, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(canonical, aliases);
        self
    }

    /// Overlays `other` on top of this mapping. Entries for known canonical
    /// names gain the extra aliases; new canonical names go last.
    pub fn merge(&mut self, other: &AliasMapping) {
        for entry in &other.entries {
            self.insert(entry.canonical.clone(), entry.aliases.iter().cloned());
        }
    }

    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn aliases_for(&self, canonical: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|e| e.canonical == canonical)
            .map(|e| e.aliases.as_slice())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for Vec<String> {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(alias) => vec![alias],
            OneOrMany::Many(aliases) => aliases,
        }
    }
}

struct AliasMappingVisitor;

impl<'de> Visitor<'de> for AliasMappingVisitor {
    type Value = AliasMapping;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of canonical column names to an alias or a list of aliases")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut mapping = AliasMapping::new();
        while let Some((canonical, aliases)) = access.next_entry::<String, OneOrMany>()? {
            if canonical.trim().is_empty() {
                return Err(de::Error::custom("canonical column name must not be empty"));
            }
            mapping.insert(canonical, Vec::<String>::from(aliases));
        }
        Ok(mapping)
    }
}

impl<'de> Deserialize<'de> for AliasMapping {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(AliasMappingVisitor)
    }
}

impl Serialize for AliasMapping {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.canonical, &entry.aliases)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_declaration_order_from_json() {
        let json = r#"{"res_id": ["restaurant id"], "orders": "delivered orders", "aov": []}"#;
        let mapping: AliasMapping = serde_json::from_str(json).expect("parse mapping");
        let names: Vec<&str> = mapping
            .entries()
            .iter()
            .map(|e| e.canonical.as_str())
            .collect();
        assert_eq!(names, vec!["res_id", "orders", "aov"]);
        assert_eq!(
            mapping.aliases_for("orders"),
            Some(["delivered orders".to_string()].as_slice())
        );
    }

    #[test]
    fn rejects_empty_canonical_name() {
        let result: Result<AliasMapping, _> = serde_json::from_str(r#"{" ": ["x"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn merge_extends_existing_entries() {
        let mut base = AliasMapping::new().with("orders", ["order"]);
        let overlay = AliasMapping::new()
            .with("orders", ["order", "total orders"])
            .with("period", ["month"]);
        base.merge(&overlay);
        assert_eq!(base.len(), 2);
        assert_eq!(
            base.aliases_for("orders"),
            Some(["order".to_string(), "total orders".to_string()].as_slice())
        );
    }

    #[test]
    fn serializes_back_in_order() {
        let mapping = AliasMapping::new()
            .with("period", ["month"])
            .with("res_id", ["rid"]);
        let json = serde_json::to_string(&mapping).expect("serialize");
        assert_eq!(json, r#"{"period":["month"],"res_id":["rid"]}"#);
    }
}
