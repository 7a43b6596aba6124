//! Derived Zomato rejection across whole pipeline runs.

mod common;

use aggr_core::{PipelineOptions, standardize_workbook};
use aggr_ingest::Workbook;
use aggr_map::default_aliases;
use aggr_model::{Objective, Platform};
use polars::prelude::AnyValue;
use proptest::prelude::*;

use common::{funnel, sheet};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn rejection_is_mx_rejection_plus_timeouts(
        rows in prop::collection::btree_map(0u8..6, (0i64..500, 0i64..500), 1..6)
    ) {
        let body: Vec<Vec<String>> = rows
            .iter()
            .map(|(id, (mx, timeouts))| {
                vec![
                    id.to_string(),
                    "2023-03-15".to_string(),
                    "10".to_string(),
                    mx.to_string(),
                    timeouts.to_string(),
                ]
            })
            .collect();
        let body_refs: Vec<Vec<&str>> = body
            .iter()
            .map(|r| r.iter().map(String::as_str).collect())
            .collect();
        let slices: Vec<&[&str]> = body_refs.iter().map(Vec::as_slice).collect();
        let txn = sheet(
            "Txn Metrics Data",
            &["Res Id", "Month", "Orders", "MX Rejection", "Timeouts"],
            &slices,
        );

        let aliases = default_aliases(Platform::Zomato).unwrap();
        let result = standardize_workbook(
            &Workbook::new(vec![txn, funnel()]),
            &aliases,
            Platform::Zomato,
            &PipelineOptions::new(Objective::AdsOptimization).with_mandatory_tabs(["funnel"]),
        )
        .unwrap();

        prop_assert_eq!(result.table.height(), rows.len());
        let rejection = result.table.column("rejection").unwrap();
        for (idx, (mx, timeouts)) in rows.values().enumerate() {
            prop_assert_eq!(rejection.get(idx).unwrap(), AnyValue::Int64(mx + timeouts));
        }
    }
}
