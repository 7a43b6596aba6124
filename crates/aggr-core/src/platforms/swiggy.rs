use aggr_common::has_column;
use aggr_model::{AggFn, Objective, Platform};
use aggr_transform::PeriodFormat;
use aggr_transform::derived::{
    MENU_PAIR_LABEL, swiggy_menu_pair, swiggy_rejection, swiggy_total_user_base,
};
use polars::prelude::{DataFrame, PolarsResult};

use super::{ADS_OUTPUT_COLUMNS, PlatformProcessor, TabSpec, missing_columns, sheet_key};

use AggFn::{First, Mean, Sum};

const RAW_DATA: &[(&str, AggFn)] = &[
    ("aov", Mean),
    ("orders", Sum),
    ("sales_generated", Sum),
    ("mark_food_ready_accuracy", Mean),
    ("mark_food_ready_adoption", Mean),
    ("acceptance", Mean),
    ("restaurant_cancellations", Sum),
    ("edits", Sum),
    ("igcc", Sum),
    ("prep_time", Mean),
    ("grid_visibility", Mean),
    ("average_food_ratings", Mean),
    ("new_user_orders", Sum),
    ("new_users_overall", Sum),
    ("repeat_user_orders", Sum),
    ("repeat_user_base", Sum),
    ("overall_repeat_rate", Mean),
    ("p1_customers", Sum),
    ("p2_customers", Sum),
    ("p3_customers", Sum),
    ("unclassified", Sum),
    ("ad_impression", Sum),
    ("menu_opens", Sum),
    ("l2m", Mean),
    ("m2c", Mean),
    ("c2p", Mean),
    ("p2o", Mean),
    ("mto", Mean),
    ("cart_builds", Sum),
    ("bad_order", Sum),
    ("total_food_issue", Sum),
    ("quality_issue", Sum),
    ("quantity_issue", Sum),
    ("packaging", Sum),
    ("location", Sum),
    ("wrong_item", Sum),
    ("special_inst_issue", Sum),
    ("missing_item", Sum),
    ("swiggyit_orders", Sum),
    ("swiggyit_burn", Sum),
    ("jumbo_orders", Sum),
    ("jumbo_burn", Sum),
    ("party_orders", Sum),
    ("party_burn", Sum),
    ("b2g1_orders", Sum),
    ("b2g1_burn", Sum),
    ("unlimited_orders", Sum),
    ("unlimited_burn", Sum),
    ("b1g1_orders", Sum),
    ("b1g1_burn", Sum),
    ("dotd_steal_deal_orders", Sum),
    ("dotd_steal_deal_burn", Sum),
    ("dormant_missed_you_orders", Sum),
    ("dormant_missed_you_burn", Sum),
    ("new_customer_try_new_orders", Sum),
    ("new_customer_try_new_burn", Sum),
    ("swiggy_one_eo_orders", Sum),
    ("swiggy_one_eo_burn", Sum),
    ("sub_zone", First),
    ("m2o", Mean),
];

const ADS: &[(&str, AggFn)] = &[
    ("inorganic_menu_opens", Sum),
    ("ad_orders", Sum),
    ("ads_consumed", Sum),
    ("ad_impression", Sum),
    ("ads_new_users", Sum),
    ("sales_generated", Sum),
];

static TABS: [TabSpec; 2] = [
    TabSpec {
        promote_header: true,
        drop_empty_columns: true,
        junk_columns: Some(&["swiggy"]),
        aggregation: RAW_DATA,
        ..TabSpec::new("raw_data", "raw_data")
    },
    TabSpec {
        drop_empty_columns: true,
        normalize_dtypes: true,
        aggregation: ADS,
        ..TabSpec::new("ads", "ads")
    },
];

const MANDATORY_ADS_OPTIMIZATION: &[&str] = &["raw_data", "ads"];
const MANDATORY_VISUALIZATION: &[&str] = &["raw_data"];

const CANONICAL_COLUMNS: &[&str] = &[
    "res_id",
    "period",
    "aov_raw_data",
    "orders_raw_data",
    "sales_generated_raw_data",
    "mark_food_ready_accuracy_raw_data",
    "mark_food_ready_adoption_raw_data",
    "acceptance_raw_data",
    "restaurant_cancellations_raw_data",
    "edits_raw_data",
    "igcc_raw_data",
    "prep_time_raw_data",
    "grid_visibility_raw_data",
    "average_food_ratings_raw_data",
    "new_user_orders_raw_data",
    "new_users_overall_raw_data",
    "repeat_user_orders_raw_data",
    "repeat_user_base_raw_data",
    "overall_repeat_rate_raw_data",
    "p1_customers_raw_data",
    "p2_customers_raw_data",
    "p3_customers_raw_data",
    "unclassified_raw_data",
    "ad_impression_raw_data",
    "menu_opens_raw_data",
    "l2m_raw_data",
    "m2c_raw_data",
    "c2p_raw_data",
    "p2o_raw_data",
    "mto_raw_data",
    "cart_builds_raw_data",
    "bad_order_raw_data",
    "total_food_issue_raw_data",
    "quality_issue_raw_data",
    "quantity_issue_raw_data",
    "packaging_raw_data",
    "location_raw_data",
    "wrong_item_raw_data",
    "special_inst_issue_raw_data",
    "missing_item_raw_data",
    "swiggyit_orders_raw_data",
    "swiggyit_burn_raw_data",
    "jumbo_orders_raw_data",
    "jumbo_burn_raw_data",
    "party_orders_raw_data",
    "b2g1_orders_raw_data",
    "party_burn_raw_data",
    "unlimited_orders_raw_data",
    "unlimited_burn_raw_data",
    "b2g1_burn_raw_data",
    "b1g1_orders_raw_data",
    "b1g1_burn_raw_data",
    "dotd_steal_deal_orders_raw_data",
    "dotd_steal_deal_burn_raw_data",
    "inorganic_menu_opens_ads",
    "dormant_missed_you_orders_raw_data",
    "dormant_missed_you_burn_raw_data",
    "new_customer_try_new_orders_raw_data",
    "new_customer_try_new_burn_raw_data",
    "swiggy_one_eo_orders_raw_data",
    "swiggy_one_eo_burn_raw_data",
    "ad_orders_ads",
    "sub_zone_raw_data",
    "ads_consumed_ads",
    "ad_impression_ads",
    "ads_new_users_ads",
    "sales_generated_ads",
    "m2o_raw_data",
    "rejection",
    "total_user_base",
];

/// Swiggy exports: a single raw-data sheet plus an optional ads sheet,
/// keyed by `MM-YYYY` periods.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwiggyProcessor;

impl PlatformProcessor for SwiggyProcessor {
    fn platform(&self) -> Platform {
        Platform::Swiggy
    }

    fn tabs(&self) -> &'static [TabSpec] {
        &TABS
    }

    fn anchor(&self) -> &'static TabSpec {
        &TABS[0]
    }

    fn period_format(&self) -> PeriodFormat {
        PeriodFormat::MonthYear
    }

    fn sheet_key(&self, sheet_name: &str) -> String {
        sheet_key(sheet_name)
    }

    fn default_mandatory_tabs(&self, objective: Objective) -> &'static [&'static str] {
        match objective {
            Objective::AdsOptimization => MANDATORY_ADS_OPTIMIZATION,
            Objective::Visualization => MANDATORY_VISUALIZATION,
        }
    }

    fn derive_columns(&self, mut table: DataFrame) -> PolarsResult<DataFrame> {
        swiggy_menu_pair(&mut table)?;
        let table = swiggy_rejection(table)?;
        swiggy_total_user_base(table)
    }

    /// The menu-opens pair is reported as one entry when neither side exists.
    fn missing_output_columns(&self, table: &DataFrame, ads_merged: bool) -> Vec<String> {
        let mut missing = Vec::new();
        if !has_column(table, "menu_opens_raw_data") && !has_column(table, "m2o_raw_data") {
            missing.push(MENU_PAIR_LABEL.to_string());
        }
        missing.extend(missing_columns(table, &["orders_raw_data"]));
        if ads_merged {
            missing.extend(missing_columns(table, ADS_OUTPUT_COLUMNS));
        }
        missing
    }

    fn canonical_columns(&self) -> &'static [&'static str] {
        CANONICAL_COLUMNS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{NamedFrom, Series};

    #[test]
    fn raw_data_sheet_key_keeps_data_word() {
        assert_eq!(SwiggyProcessor.sheet_key("Raw Data"), "raw_data");
    }

    #[test]
    fn missing_menu_pair_is_reported_once() {
        let table =
            DataFrame::new(vec![Series::new("orders_raw_data".into(), vec![1i64]).into()])
                .unwrap();
        let missing = SwiggyProcessor.missing_output_columns(&table, false);
        assert_eq!(missing, vec![MENU_PAIR_LABEL.to_string()]);
    }

    #[test]
    fn ads_outputs_only_required_when_merged() {
        let table = DataFrame::new(vec![
            Series::new("orders_raw_data".into(), vec![1i64]).into(),
            Series::new("m2o_raw_data".into(), vec![0.5]).into(),
        ])
        .unwrap();
        assert!(SwiggyProcessor.missing_output_columns(&table, false).is_empty());
        assert_eq!(SwiggyProcessor.missing_output_columns(&table, true).len(), 5);
    }
}
