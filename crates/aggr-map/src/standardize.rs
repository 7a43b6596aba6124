//! Column name standardization.
//!
//! Raw labels are normalized (lower case, `%` removed, whitespace runs
//! collapsed to `_`), ads-tab ambiguities are resolved, aliases are
//! substituted with their canonical names and finally the tab suffix is
//! appended. Alias matching is whole-label: an alias never matches part of a
//! longer label.

use std::collections::HashSet;

use aggr_model::AliasMapping;
use tracing::trace;

/// Tab whose generic labels need disambiguation before alias lookup.
pub const ADS_TAB: &str = "ads";

/// Raw ads-tab labels rewritten before `%` is stripped, so the meaning of
/// the percent sign survives normalization.
const ADS_PERCENT_LABELS: &[(&str, &str)] = &[
    ("budget burnt %", "budget burnt percentage"),
    ("budget remaining %", "budget remaining percentage"),
];

/// Generic labels that mean an ads-specific metric inside the ads tab.
const ADS_DISAMBIGUATION: &[(&str, &str)] = &[
    ("orders", "orders_ads"),
    ("order", "orders_ads"),
    ("new_user", "new_user_ads"),
    ("new_users", "new_users_ads"),
];

/// Normalizes one label: lower case, `%` removed, ` - ` separators dropped,
/// whitespace runs collapsed to a single underscore.
///
/// # Examples
///
/// ```
/// use aggr_map::normalize_label;
///
/// assert_eq!(normalize_label("  Menu Opens "), "menu_opens");
/// assert_eq!(normalize_label("Acceptance %"), "acceptance");
/// assert_eq!(normalize_label("Ads - Orders"), "ads_orders");
/// ```
pub fn normalize_label(raw: &str) -> String {
    let lowered = raw.to_lowercase().replace('%', "");
    let spaced = lowered.trim().replace(" - ", " ");
    spaced.split_whitespace().collect::<Vec<_>>().join("_")
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Alias mapping prepared for repeated lookups.
#[derive(Debug, Clone)]
pub struct ColumnStandardizer {
    entries: Vec<(String, HashSet<String>)>,
}

impl ColumnStandardizer {
    pub fn new(mapping: &AliasMapping) -> Self {
        let entries = mapping
            .entries()
            .iter()
            .map(|entry| {
                let aliases = entry
                    .aliases
                    .iter()
                    .map(|alias| normalize_label(alias))
                    .filter(|alias| !alias.is_empty())
                    .collect();
                (entry.canonical.clone(), aliases)
            })
            .collect();
        Self { entries }
    }

    /// Produces canonical labels for `labels`, one output per input.
    ///
    /// `tab` is the normalized tab key; `"ads"` enables ads disambiguation.
    /// `suffix` is appended to every label that does not already carry it.
    pub fn standardize<S: AsRef<str>>(
        &self,
        labels: &[S],
        tab: Option<&str>,
        suffix: &str,
    ) -> Vec<String> {
        let is_ads = tab == Some(ADS_TAB);
        labels
            .iter()
            .map(|raw| {
                let raw = raw.as_ref();
                let mut label = if is_ads {
                    rename_ads_percent(raw)
                } else {
                    raw.to_string()
                };
                label = normalize_label(&label);
                if is_ads {
                    label = disambiguate_ads(label);
                }
                label = self.substitute(label);
                label = normalize_label(&label);
                let out = append_suffix(label, suffix);
                trace!(raw, canonical = %out, "standardized column");
                out
            })
            .collect()
    }

    /// Applies every canonical entry in declaration order. A label rewritten
    /// by one entry can be rewritten again by a later one.
    fn substitute(&self, mut label: String) -> String {
        for (canonical, aliases) in &self.entries {
            if aliases.contains(&label) {
                label = canonical.clone();
            }
        }
        label
    }
}

fn rename_ads_percent(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw).to_lowercase();
    ADS_PERCENT_LABELS
        .iter()
        .find(|(from, _)| *from == collapsed)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn disambiguate_ads(label: String) -> String {
    ADS_DISAMBIGUATION
        .iter()
        .find(|(from, _)| *from == label)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or(label)
}

fn append_suffix(label: String, suffix: &str) -> String {
    if suffix.is_empty() || label.ends_with(suffix) {
        label
    } else {
        format!("{label}{suffix}")
    }
}

/// One-shot form of [`ColumnStandardizer::standardize`].
pub fn standardize_column_names<S: AsRef<str>>(
    labels: &[S],
    mapping: &AliasMapping,
    tab: Option<&str>,
    suffix: &str,
) -> Vec<String> {
    ColumnStandardizer::new(mapping).standardize(labels, tab, suffix)
}
