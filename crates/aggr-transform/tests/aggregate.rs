//! Tests for per-tab aggregation over normalized keys.

use std::collections::BTreeSet;

use aggr_common::column_strings;
use aggr_model::{AggFn, AggregationSpec};
use aggr_transform::{PeriodFormat, TabFrame, aggregate_tab};
use polars::prelude::*;
use proptest::prelude::*;

fn funnel_frame(ids: Vec<&str>, periods: Vec<&str>, orders: Vec<i64>) -> TabFrame {
    let data = DataFrame::new(vec![
        Series::new("res_id_funnel".into(), ids).into(),
        Series::new("period_funnel".into(), periods).into(),
        Series::new("orders_funnel".into(), orders).into(),
    ])
    .unwrap();
    TabFrame::new("funnel", "_funnel", data)
}

#[test]
fn keys_are_normalized_before_grouping() {
    let mut frame = funnel_frame(
        vec!["101.0", "101", "102"],
        vec!["2023-01-04", "2023-01-28", "2023-01-04"],
        vec![4, 6, 1],
    );
    frame.normalize_keys(PeriodFormat::YearMonth).unwrap();
    let spec = AggregationSpec::from_pairs(&[("orders", AggFn::Sum)]).suffixed("_funnel");

    let out = aggregate_tab(&frame, &spec).unwrap();
    assert_eq!(out.record_count(), 2);
    let ids = column_strings(&out.data, "res_id_funnel").unwrap();
    assert_eq!(ids, vec![Some("101".to_string()), Some("102".to_string())]);
    let orders = out.data.column("orders_funnel").unwrap();
    assert_eq!(orders.get(0).unwrap(), AnyValue::Int64(10));
}

#[test]
fn declared_spec_is_reusable_across_files() {
    let spec = AggregationSpec::from_pairs(&[("orders", AggFn::Sum), ("menu_opens", AggFn::Sum)])
        .suffixed("_funnel");
    let first = funnel_frame(vec!["1"], vec!["2023-01"], vec![3]);
    let second = funnel_frame(vec!["2"], vec!["2023-01"], vec![5]);

    aggregate_tab(&first, &spec).unwrap();
    let out = aggregate_tab(&second, &spec).unwrap();
    assert_eq!(spec.len(), 2);
    assert_eq!(out.column_names(), vec!["res_id_funnel", "period_funnel", "orders_funnel"]);
}

proptest! {
    #[test]
    fn sums_are_preserved_and_keys_distinct(
        rows in prop::collection::vec((0u8..4, 1u8..4, 0i64..1000), 1..40)
    ) {
        let ids: Vec<String> = rows.iter().map(|(id, _, _)| id.to_string()).collect();
        let periods: Vec<String> = rows.iter().map(|(_, m, _)| format!("2023-0{m}")).collect();
        let orders: Vec<i64> = rows.iter().map(|(_, _, o)| *o).collect();
        let total: i64 = orders.iter().sum();

        let frame = funnel_frame(
            ids.iter().map(String::as_str).collect(),
            periods.iter().map(String::as_str).collect(),
            orders,
        );
        let spec = AggregationSpec::from_pairs(&[("orders_funnel", AggFn::Sum)]);
        let out = aggregate_tab(&frame, &spec).unwrap();

        let out_ids = column_strings(&out.data, "res_id_funnel").unwrap();
        let out_periods = column_strings(&out.data, "period_funnel").unwrap();
        let pairs: BTreeSet<_> = out_ids.into_iter().zip(out_periods).collect();
        prop_assert_eq!(pairs.len(), out.record_count());

        let expected: BTreeSet<_> = ids.into_iter().zip(periods).collect();
        prop_assert_eq!(pairs.len(), expected.len());

        let summed: i64 = out
            .data
            .column("orders_funnel")
            .unwrap()
            .as_materialized_series()
            .i64()
            .unwrap()
            .into_iter()
            .flatten()
            .sum();
        prop_assert_eq!(summed, total);
    }
}
