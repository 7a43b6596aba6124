use std::fmt;

use serde::{Deserialize, Serialize};

/// How duplicate rows for one (entity, period) pair collapse into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggFn {
    Sum,
    Mean,
    First,
}

impl AggFn {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Mean => "mean",
            Self::First => "first",
        }
    }
}

impl fmt::Display for AggFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared per-tab aggregation: column name to function, in output order.
///
/// A declared spec is never mutated. [`AggregationSpec::effective`] derives
/// the subset that applies to one concrete table, so the same spec can be
/// reused across any number of input files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationSpec {
    entries: Vec<(String, AggFn)>,
}

impl AggregationSpec {
    pub fn new(entries: Vec<(String, AggFn)>) -> Self {
        Self { entries }
    }

    /// Builds a spec from static column names.
    pub fn from_pairs(pairs: &[(&str, AggFn)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(column, agg)| ((*column).to_string(), *agg))
                .collect(),
        }
    }

    /// Same spec with every column name suffixed (`orders` -> `orders_tm`).
    #[must_use]
    pub fn suffixed(&self, suffix: &str) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(column, agg)| (format!("{column}{suffix}"), *agg))
                .collect(),
        }
    }

    /// Entries whose column exists in `columns`, in declaration order.
    pub fn effective<S: AsRef<str>>(&self, columns: &[S]) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|(column, _)| columns.iter().any(|c| c.as_ref() == column))
            .cloned()
            .collect();
        Self { entries }
    }

    pub fn get(&self, column: &str) -> Option<AggFn> {
        self.entries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, agg)| *agg)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AggFn)> {
        self.entries.iter().map(|(name, agg)| (name.as_str(), *agg))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_spec_drops_absent_columns_without_mutating() {
        let declared = AggregationSpec::from_pairs(&[
            ("orders_tm", AggFn::Sum),
            ("aov_tm", AggFn::Mean),
            ("primary_cuisine_tm", AggFn::First),
        ]);
        let columns = vec!["res_id_tm", "period_tm", "orders_tm", "primary_cuisine_tm"];
        let effective = declared.effective(&columns);

        assert_eq!(effective.len(), 2);
        assert_eq!(effective.get("orders_tm"), Some(AggFn::Sum));
        assert_eq!(effective.get("aov_tm"), None);
        assert_eq!(declared.len(), 3);
    }

    #[test]
    fn suffixing_keeps_functions() {
        let spec = AggregationSpec::from_pairs(&[("orders", AggFn::Sum), ("aov", AggFn::Mean)]);
        let suffixed = spec.suffixed("_funnel");
        let names: Vec<&str> = suffixed.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["orders_funnel", "aov_funnel"]);
        assert_eq!(suffixed.get("aov_funnel"), Some(AggFn::Mean));
    }
}
