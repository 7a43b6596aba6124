#![allow(dead_code)]

use aggr_ingest::{RawSheet, Workbook};

pub fn sheet(name: &str, headers: &[&str], rows: &[&[&str]]) -> RawSheet {
    RawSheet::new(
        name,
        headers.iter().map(|h| (*h).to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect(),
    )
}

pub fn txn_metrics() -> RawSheet {
    sheet(
        "Txn Metrics Data",
        &["Res Id", "Month", "Orders", "MX Rejection", "Timeouts", "AOV"],
        &[
            &["1", "2023-01-05", "10", "2", "1", "200"],
            &["1", "2023-01-20", "5", "1", "0", "400"],
            &["2", "2023-01-10", "7", "0", "3", "150"],
        ],
    )
}

pub fn funnel() -> RawSheet {
    sheet(
        "Funnel",
        &["Res Id", "Month", "Orders", "Menu Opens"],
        &[&["1", "2023-01-01", "15", "100"], &["3", "2023-01-01", "4", "50"]],
    )
}

pub fn grid() -> RawSheet {
    sheet(
        "Grid",
        &["Res Id", "Month", "Actuals", "Expected"],
        &[&["1", "2023-01-01", "30", "60"], &["2", "2023-01-01", "10", "40"]],
    )
}

pub fn ads() -> RawSheet {
    sheet(
        "Ads",
        &[
            "Res Id",
            "Month",
            "Ad Impressions",
            "Clicks",
            "Orders",
            "Sales",
            "Spend",
            "Budget Burnt %",
        ],
        &[
            &["1", "2023-01-03", "1,000", "40", "5", "2,500.50", "800", "90"],
            &["1", "2023-01-25", "500", "10", "1", "100", "200", "10"],
        ],
    )
}

fn keyed(name: &str, metric: &str) -> RawSheet {
    sheet(
        name,
        &["Res Id", "Month", metric],
        &[&["1", "2023-01-01", "3"], &["2", "2023-01-01", "4"]],
    )
}

pub fn pro() -> RawSheet {
    keyed("Pro", "Orders")
}

pub fn new_user() -> RawSheet {
    keyed("New User", "Res New User")
}

pub fn food_order_ready() -> RawSheet {
    keyed("FOR", "FOR Compliance")
}

pub fn ors() -> RawSheet {
    keyed("ORS", "Ors")
}

pub fn promo() -> RawSheet {
    keyed("Promo", "Promo Orders")
}

pub fn zomato_workbook(sheets: Vec<RawSheet>) -> Workbook {
    Workbook::new(sheets)
}

pub fn full_zomato() -> Vec<RawSheet> {
    vec![
        txn_metrics(),
        funnel(),
        grid(),
        pro(),
        new_user(),
        food_order_ready(),
        ors(),
        promo(),
        ads(),
    ]
}

pub fn swiggy_raw_data() -> RawSheet {
    RawSheet::from_grid(
        "Raw Data",
        vec![
            vec![
                "Swiggy".into(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ],
            vec![
                "Restaurant ID".into(),
                "Month".into(),
                "Orders".into(),
                "M2O".into(),
                "Acceptance".into(),
                String::new(),
            ],
            vec![
                "11".into(),
                "2023-02-01".into(),
                "90".into(),
                "0.5".into(),
                "0.5".into(),
                String::new(),
            ],
            vec![
                "12".into(),
                "2023-02-01".into(),
                "20".into(),
                "0.25".into(),
                String::new(),
                String::new(),
            ],
        ],
    )
}

pub fn swiggy_ads() -> RawSheet {
    sheet(
        "ADS",
        &["Restaurant ID", "Month", "Impressions", "Clicks", "Orders", "Sales", "Spend"],
        &[&["11", "2023-02-14", "2,000", "80", "9", "4,000", "1,200.75"]],
    )
}
