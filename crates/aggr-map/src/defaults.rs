//! Built-in alias mappings shipped with the crate.

use aggr_model::{AliasMapping, Platform};

use crate::error::{MappingError, Result};

const ZOMATO_ALIASES: &str = include_str!("../defaults/zomato.json");
const SWIGGY_ALIASES: &str = include_str!("../defaults/swiggy.json");

/// Returns the built-in alias mapping for a platform.
pub fn default_aliases(platform: Platform) -> Result<AliasMapping> {
    let source = match platform {
        Platform::Zomato => ZOMATO_ALIASES,
        Platform::Swiggy => SWIGGY_ALIASES,
    };
    serde_json::from_str(source).map_err(|source| MappingError::Parse {
        origin: format!("built-in {platform} aliases"),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standardize_column_names;

    #[test]
    fn built_in_mappings_parse() {
        for platform in Platform::ALL {
            let mapping = default_aliases(platform).expect("built-in aliases");
            assert!(!mapping.is_empty());
            assert_eq!(mapping.entries()[0].canonical, "res_id");
            assert_eq!(mapping.entries()[1].canonical, "period");
        }
    }

    #[test]
    fn zomato_ads_labels_resolve_to_ads_metrics() {
        let mapping = default_aliases(Platform::Zomato).unwrap();
        let out = standardize_column_names(
            &["Res ID", "Month", "Orders", "New Users", "Impressions", "Spend"],
            &mapping,
            Some("ads"),
            "_ads",
        );
        assert_eq!(
            out,
            vec![
                "res_id_ads",
                "period_ads",
                "ad_orders_ads",
                "ads_new_users_ads",
                "ad_impression_ads",
                "ads_consumed_ads"
            ]
        );
    }
}
