//! Derived metrics computed on a merged platform table.

use aggr_common::{any_to_f64, any_to_i64, has_column};
use polars::prelude::{
    AnyValue, Column, DataFrame, DataType, IntoColumn, IntoLazy, NamedFrom, PolarsResult, Series,
    col,
};
use tracing::debug;

pub const REJECTION: &str = "rejection";
pub const TOTAL_USER_BASE: &str = "total_user_base";

/// Reported when neither side of the Swiggy menu-opens pair exists.
pub const MENU_PAIR_LABEL: &str = "menu_opens_raw_data/m2o_raw_data";

fn float_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<f64>>> {
    let column = df.column(name)?;
    Ok((0..column.len())
        .map(|idx| any_to_f64(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect())
}

fn integer_column(df: &DataFrame, name: &str) -> PolarsResult<Column> {
    let column = df.column(name)?;
    let values: Vec<Option<i64>> = (0..column.len())
        .map(|idx| any_to_i64(column.get(idx).unwrap_or(AnyValue::Null)))
        .collect();
    Ok(Series::new(name.into(), values).into_column())
}

/// Row-wise `numerator / denominator`; a zero denominator yields null.
fn ratio(df: &DataFrame, numerator: &str, denominator: &str, output: &str) -> PolarsResult<Column> {
    let top = float_values(df, numerator)?;
    let bottom = float_values(df, denominator)?;
    let values: Vec<Option<f64>> = top
        .into_iter()
        .zip(bottom)
        .map(|(n, d)| match (n, d) {
            (Some(n), Some(d)) => Some(n / d).filter(|v| v.is_finite()),
            _ => None,
        })
        .collect();
    Ok(Series::new(output.into(), values).into_column())
}

/// `rejection = mx_rejection_tm + timeouts_tm`, both read as integers.
///
/// Both inputs are rewritten as Int64 columns. A row missing either input has
/// a null rejection. Frames lacking either input are returned unchanged.
pub fn zomato_rejection(df: DataFrame) -> PolarsResult<DataFrame> {
    const MX: &str = "mx_rejection_tm";
    const TIMEOUTS: &str = "timeouts_tm";
    if !has_column(&df, MX) || !has_column(&df, TIMEOUTS) {
        return Ok(df);
    }
    let mut df = df;
    let mx = integer_column(&df, MX)?;
    let timeouts = integer_column(&df, TIMEOUTS)?;
    df.with_column(mx)?;
    df.with_column(timeouts)?;
    df.lazy()
        .with_columns([
            (col(MX).cast(DataType::Int64) + col(TIMEOUTS).cast(DataType::Int64)).alias(REJECTION),
        ])
        .collect()
}

/// Fills `grid_visibility_grid` from `actuals_grid / expected_grid` when the
/// export did not carry it.
pub fn zomato_grid_visibility(mut df: DataFrame) -> PolarsResult<DataFrame> {
    const VISIBILITY: &str = "grid_visibility_grid";
    if has_column(&df, VISIBILITY)
        || !has_column(&df, "actuals_grid")
        || !has_column(&df, "expected_grid")
    {
        return Ok(df);
    }
    let visibility = ratio(&df, "actuals_grid", "expected_grid", VISIBILITY)?;
    df.with_column(visibility)?;
    debug!("derived grid visibility");
    Ok(df)
}

/// Completes the Swiggy menu-opens / menu-to-order pair.
///
/// `menu_opens = orders / m2o` when the ratio exists, otherwise
/// `m2o = orders / menu_opens`. Returns `false` when neither side exists.
pub fn swiggy_menu_pair(df: &mut DataFrame) -> PolarsResult<bool> {
    const ORDERS: &str = "orders_raw_data";
    const M2O: &str = "m2o_raw_data";
    const MENU_OPENS: &str = "menu_opens_raw_data";
    if has_column(df, M2O) {
        if has_column(df, ORDERS) {
            let opens = ratio(df, ORDERS, M2O, MENU_OPENS)?;
            df.with_column(opens)?;
        }
        Ok(true)
    } else if has_column(df, MENU_OPENS) {
        if has_column(df, ORDERS) {
            let m2o = ratio(df, ORDERS, MENU_OPENS, M2O)?;
            df.with_column(m2o)?;
        }
        Ok(true)
    } else {
        Ok(false)
    }
}

/// `rejection = trunc(orders / acceptance - orders)`.
///
/// A blank acceptance counts as 1 (no rejections). Undefined results count
/// as zero rejections; a blank order count stays null.
pub fn swiggy_rejection(mut df: DataFrame) -> PolarsResult<DataFrame> {
    const ORDERS: &str = "orders_raw_data";
    const ACCEPTANCE: &str = "acceptance_raw_data";
    if !has_column(&df, ACCEPTANCE) || !has_column(&df, ORDERS) {
        return Ok(df);
    }
    let orders = float_values(&df, ORDERS)?;
    let acceptance = float_values(&df, ACCEPTANCE)?;
    let values: Vec<Option<i64>> = orders
        .into_iter()
        .zip(acceptance)
        .map(|(orders, acceptance)| {
            let orders = orders?;
            let rejected = orders / acceptance.unwrap_or(1.0) - orders;
            Some(if rejected.is_finite() { rejected.trunc() as i64 } else { 0 })
        })
        .collect();
    df.with_column(Series::new(REJECTION.into(), values))?;
    Ok(df)
}

/// `total_user_base = new_users_overall + repeat_user_base`.
pub fn swiggy_total_user_base(df: DataFrame) -> PolarsResult<DataFrame> {
    const NEW_USERS: &str = "new_users_overall_raw_data";
    const REPEAT_USERS: &str = "repeat_user_base_raw_data";
    if !has_column(&df, NEW_USERS) || !has_column(&df, REPEAT_USERS) {
        return Ok(df);
    }
    let mut df = df;
    let new_users = float_values(&df, NEW_USERS)?;
    let repeat_users = float_values(&df, REPEAT_USERS)?;
    let integral = new_users
        .iter()
        .chain(repeat_users.iter())
        .flatten()
        .all(|v| v.fract() == 0.0);
    let sums: Vec<Option<f64>> = new_users
        .into_iter()
        .zip(repeat_users)
        .map(|(a, b)| Some(a? + b?))
        .collect();
    let series = if integral {
        let ints: Vec<Option<i64>> = sums.into_iter().map(|v| v.map(|v| v as i64)).collect();
        Series::new(TOTAL_USER_BASE.into(), ints)
    } else {
        Series::new(TOTAL_USER_BASE.into(), sums)
    };
    df.with_column(series)?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_adds_cause_columns() {
        let df = DataFrame::new(vec![
            Series::new("mx_rejection_tm".into(), vec![Some("3"), Some("4.0"), None]).into(),
            Series::new("timeouts_tm".into(), vec![Some(2i64), Some(1), Some(5)]).into(),
        ])
        .unwrap();
        let out = zomato_rejection(df).unwrap();
        let rejection = out.column(REJECTION).unwrap();
        assert_eq!(rejection.dtype(), &DataType::Int64);
        assert_eq!(rejection.get(0).unwrap(), AnyValue::Int64(5));
        assert_eq!(rejection.get(1).unwrap(), AnyValue::Int64(5));
        assert_eq!(rejection.get(2).unwrap(), AnyValue::Null);
    }

    #[test]
    fn rejection_needs_both_inputs() {
        let df =
            DataFrame::new(vec![Series::new("timeouts_tm".into(), vec![1i64]).into()]).unwrap();
        let out = zomato_rejection(df).unwrap();
        assert!(!has_column(&out, REJECTION));
    }

    #[test]
    fn grid_visibility_only_when_absent() {
        let df = DataFrame::new(vec![
            Series::new("actuals_grid".into(), vec![30.0, 5.0]).into(),
            Series::new("expected_grid".into(), vec![60.0, 0.0]).into(),
        ])
        .unwrap();
        let out = zomato_grid_visibility(df).unwrap();
        let visibility = out.column("grid_visibility_grid").unwrap();
        assert_eq!(visibility.get(0).unwrap(), AnyValue::Float64(0.5));
        assert_eq!(visibility.get(1).unwrap(), AnyValue::Null);
    }

    #[test]
    fn menu_pair_prefers_m2o() {
        let mut df = DataFrame::new(vec![
            Series::new("orders_raw_data".into(), vec![10i64]).into(),
            Series::new("m2o_raw_data".into(), vec![0.5]).into(),
        ])
        .unwrap();
        assert!(swiggy_menu_pair(&mut df).unwrap());
        let opens = df.column("menu_opens_raw_data").unwrap();
        assert_eq!(opens.get(0).unwrap(), AnyValue::Float64(20.0));

        let mut bare =
            DataFrame::new(vec![Series::new("orders_raw_data".into(), vec![10i64]).into()])
                .unwrap();
        assert!(!swiggy_menu_pair(&mut bare).unwrap());
    }

    #[test]
    fn swiggy_rejection_from_acceptance() {
        let df = DataFrame::new(vec![
            Series::new("orders_raw_data".into(), vec![Some(90.0), Some(10.0), Some(5.0)]).into(),
            Series::new("acceptance_raw_data".into(), vec![Some(0.5), None, Some(0.0)]).into(),
        ])
        .unwrap();
        let out = swiggy_rejection(df).unwrap();
        let rejection = out.column(REJECTION).unwrap();
        assert_eq!(rejection.get(0).unwrap(), AnyValue::Int64(90));
        assert_eq!(rejection.get(1).unwrap(), AnyValue::Int64(0));
        assert_eq!(rejection.get(2).unwrap(), AnyValue::Int64(0));
    }

    #[test]
    fn total_user_base_sums_integers() {
        let df = DataFrame::new(vec![
            Series::new("new_users_overall_raw_data".into(), vec![Some("10"), None]).into(),
            Series::new("repeat_user_base_raw_data".into(), vec![Some("32"), Some("4")]).into(),
        ])
        .unwrap();
        let out = swiggy_total_user_base(df).unwrap();
        let total = out.column(TOTAL_USER_BASE).unwrap();
        assert_eq!(total.get(0).unwrap(), AnyValue::Int64(42));
        assert_eq!(total.get(1).unwrap(), AnyValue::Null);
    }
}
