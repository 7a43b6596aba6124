use aggr_model::{AggFn, Objective, Platform};
use aggr_transform::PeriodFormat;
use aggr_transform::derived::{zomato_grid_visibility, zomato_rejection};
use polars::prelude::{DataFrame, PolarsResult};

use super::{ADS_OUTPUT_COLUMNS, PlatformProcessor, TabSpec, missing_columns, sheet_key};

use AggFn::{First, Mean, Sum};

const TXN_METRICS: &[(&str, AggFn)] = &[
    ("orders", Sum),
    ("aov", Mean),
    ("total_user", Sum),
    ("new_user", Sum),
    ("repeat_user", Sum),
    ("um_orders", Sum),
    ("mm_orders", Sum),
    ("la_orders", Sum),
    ("kpt_actual_new", Mean),
    ("rejection", Sum),
    ("timeouts", Sum),
    ("mx_rejection", Sum),
    ("salt", Sum),
    ("mvd", Sum),
    ("subtotal", Sum),
    ("pc", Sum),
    ("commissionable_amt", Sum),
    ("pro_discount", Sum),
    ("food_rating", Mean),
    ("delivery_rating", Mean),
    ("adt", Mean),
    ("acceptance_time", Mean),
    ("rider_wait_time", Mean),
    ("food_order_ready_at", Mean),
    ("total_rejects_subtotal", Sum),
    ("mx_rejects_subtotal", Sum),
    ("discounted_orders", Sum),
    ("overall_discount_value", Sum),
    ("primary_cuisine", First),
];

const FUNNEL: &[(&str, AggFn)] = &[("cart_built", Sum), ("orders", Sum), ("menu_opens", Sum)];

const GRID: &[(&str, AggFn)] = &[
    ("actuals", Sum),
    ("expected", Sum),
    ("grid_visibility", Mean),
    ("weighted_visibility", Mean),
];

const PRO: &[(&str, AggFn)] = &[
    ("orders", Sum),
    ("users", Sum),
    ("commissionable_value", Sum),
    ("pro_discount", Sum),
    ("asv", Mean),
    ("breakfast_orders", Sum),
    ("lunch_orders", Sum),
    ("evening_orders", Sum),
    ("dinner_orders", Sum),
    ("late_night_orders", Sum),
    ("overall_discount_value", Sum),
    ("merchant_discount_value", Sum),
    ("order_acceptance_time", Mean),
    ("delivery_time", Mean),
];

const NEW_USER: &[(&str, AggFn)] = &[("res_new_user", Sum)];

const FOOD_ORDER_READY: &[(&str, AggFn)] = &[
    ("orders", Sum),
    ("for_accuracy_new", Mean),
    ("for_compliance", Mean),
    ("comp", Mean),
    ("acc", Mean),
];

const ORS: &[(&str, AggFn)] = &[
    ("orders", Sum),
    ("ors", Sum),
    ("poor_quality", Sum),
    ("order_status_delay", Sum),
    ("missing_items", Sum),
    ("wrong_order", Sum),
    ("order_cancellation", Sum),
    ("order_spilled", Sum),
    ("instructions_not_followed", Sum),
    ("instructions", Sum),
    ("untagged", Sum),
    ("others", Sum),
];

const PROMO: &[(&str, AggFn)] = &[
    ("promo_orders", Sum),
    ("mvd", Sum),
    ("promo_orders_subtotal", Sum),
];

const ADS: &[(&str, AggFn)] = &[
    ("ad_impression", Sum),
    ("inorganic_menu_opens", Sum),
    ("ad_orders", Sum),
    ("sales_generated", Sum),
    ("ads_consumed", Sum),
    ("ads_new_users", Sum),
    ("cart_built", Sum),
];

static TABS: [TabSpec; 9] = [
    TabSpec {
        aggregation: TXN_METRICS,
        ..TabSpec::new("txn_metrics", "tm")
    },
    TabSpec {
        aggregation: FUNNEL,
        ..TabSpec::new("funnel", "funnel")
    },
    TabSpec {
        aggregation: GRID,
        ..TabSpec::new("grid", "grid")
    },
    TabSpec {
        visualization_only: true,
        aggregation: PRO,
        ..TabSpec::new("pro", "pro")
    },
    TabSpec {
        visualization_only: true,
        aggregation: NEW_USER,
        ..TabSpec::new("new_user", "nu")
    },
    TabSpec {
        label: "food order ready",
        visualization_only: true,
        aggregation: FOOD_ORDER_READY,
        ..TabSpec::new("for", "for")
    },
    TabSpec {
        visualization_only: true,
        aggregation: ORS,
        ..TabSpec::new("ors", "ors")
    },
    TabSpec {
        visualization_only: true,
        aggregation: PROMO,
        ..TabSpec::new("promo", "promo")
    },
    TabSpec {
        normalize_dtypes: true,
        aggregation: ADS,
        ..TabSpec::new("ads", "ads")
    },
];

const MANDATORY_ADS_OPTIMIZATION: &[&str] = &["txn_metrics", "funnel", "ads"];
const MANDATORY_VISUALIZATION: &[&str] = &["txn_metrics", "funnel"];

const OUTPUT_COLUMNS: &[&str] = &[
    "orders_funnel",
    "menu_opens_funnel",
    "mx_rejection_tm",
    "timeouts_tm",
];

const CANONICAL_COLUMNS: &[&str] = &[
    "res_id",
    "period",
    "rejection",
    "mto",
    "orders_tm",
    "aov_tm",
    "total_user_tm",
    "new_user_tm",
    "ctr",
    "repeat_user_tm",
    "um_orders_tm",
    "mm_orders_tm",
    "roi",
    "la_orders_tm",
    "kpt_actual_new_tm",
    "rejection_tm",
    "timeouts_tm",
    "mx_rejection_tm",
    "salt_tm",
    "mvd_tm",
    "inorganic_m2o",
    "subtotal_tm",
    "pc_tm",
    "commissionable_amt_tm",
    "pro_discount_tm",
    "food_rating_tm",
    "delivery_rating_tm",
    "adt_tm",
    "acceptance_time_tm",
    "rider_wait_time_tm",
    "food_order_ready_at_tm",
    "total_rejects_subtotal_tm",
    "mx_rejects_subtotal_tm",
    "discounted_orders_tm",
    "overall_discount_value_tm",
    "cart_built_funnel",
    "orders_funnel",
    "actuals_grid",
    "expected_grid",
    "menu_opens_funnel",
    "grid_visibility_grid",
    "weighted_visibility_grid",
    "orders_pro",
    "users_pro",
    "commissionable_value_pro",
    "pro_discount_pro",
    "asv_pro",
    "breakfast_orders_pro",
    "lunch_orders_pro",
    "evening_orders_pro",
    "dinner_orders_pro",
    "late_night_orders_pro",
    "overall_discount_value_pro",
    "merchant_discount_value_pro",
    "order_acceptance_time_pro",
    "delivery_time_pro",
    "res_new_user_nu",
    "orders_for",
    "primary_cuisine_tm",
    "for_accuracy_new_for",
    "for_compliance_for",
    "comp_for",
    "acc_for",
    "orders_ors",
    "ors_ors",
    "poor_quality_ors",
    "order_status_delay_ors",
    "missing_items_ors",
    "wrong_order_ors",
    "order_cancellation_ors",
    "order_spilled_ors",
    "instructions_not_followed_ors",
    "instructions_ors",
    "untagged_ors",
    "others_ors",
    "promo_orders_promo",
    "mvd_promo",
    "promo_orders_subtotal_promo",
    "ad_impression_ads",
    "inorganic_menu_opens_ads",
    "ad_orders_ads",
    "sales_generated_ads",
    "ads_consumed_ads",
    "ads_new_users_ads",
    "cart_built_ads",
];

/// Zomato exports: one sheet per metric family, anchored on transaction
/// metrics and keyed by `YYYY-MM` periods.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZomatoProcessor;

impl PlatformProcessor for ZomatoProcessor {
    fn platform(&self) -> Platform {
        Platform::Zomato
    }

    fn tabs(&self) -> &'static [TabSpec] {
        &TABS
    }

    fn anchor(&self) -> &'static TabSpec {
        &TABS[0]
    }

    fn period_format(&self) -> PeriodFormat {
        PeriodFormat::YearMonth
    }

    /// Zomato names sheets like "Txn Metrics Data"; a standalone "data" word is noise.
    fn sheet_key(&self, sheet_name: &str) -> String {
        let lowered = sheet_name.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| c.is_whitespace() || c == '_')
            .filter(|word| !word.is_empty() && *word != "data")
            .collect();
        sheet_key(&words.join(" "))
    }

    fn default_mandatory_tabs(&self, objective: Objective) -> &'static [&'static str] {
        match objective {
            Objective::AdsOptimization => MANDATORY_ADS_OPTIMIZATION,
            Objective::Visualization => MANDATORY_VISUALIZATION,
        }
    }

    fn derive_columns(&self, table: DataFrame) -> PolarsResult<DataFrame> {
        let table = zomato_rejection(table)?;
        zomato_grid_visibility(table)
    }

    fn missing_output_columns(&self, table: &DataFrame, ads_merged: bool) -> Vec<String> {
        let mut missing = missing_columns(table, OUTPUT_COLUMNS);
        if ads_merged {
            missing.extend(missing_columns(table, ADS_OUTPUT_COLUMNS));
        }
        missing
    }

    fn canonical_columns(&self) -> &'static [&'static str] {
        CANONICAL_COLUMNS
    }
}
