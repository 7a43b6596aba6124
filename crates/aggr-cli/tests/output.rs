//! Output writing over a CSV-folder workbook.

use std::fs;
use std::path::Path;

use aggr_cli::output::{
    CANONICAL_FILE, REVIEWS_FILE, TABS_DIR, default_output_dir, write_review_output,
    write_standardize_outputs,
};
use aggr_core::{PipelineOptions, standardize_review_file, standardize_workbook};
use aggr_ingest::read_workbook;
use aggr_map::default_aliases;
use aggr_model::{Objective, Platform};

fn write(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn zomato_folder(dir: &Path) {
    write(
        dir,
        "Txn Metrics Data.csv",
        "Res Id,Month,Orders,MX Rejection,Timeouts\n1,2023-01-04,10,1,2\n",
    );
    write(
        dir,
        "Funnel.csv",
        "Res Id,Month,Orders,Menu Opens\n1,2023-01-01,10,80\n2,2023-01-01,3,20\n",
    );
    write(dir, "Ads.csv", "Res Id,Month,Spend\n1,2023-01-09,\"1,500.5\"\n");
}

#[test]
fn writes_canonical_and_per_tab_csvs() {
    let input = tempfile::tempdir().unwrap();
    zomato_folder(input.path());
    let workbook = read_workbook(input.path()).unwrap();
    let aliases = default_aliases(Platform::Zomato).unwrap();
    let result = standardize_workbook(
        &workbook,
        &aliases,
        Platform::Zomato,
        &PipelineOptions::new(Objective::AdsOptimization),
    )
    .unwrap();

    let out = tempfile::tempdir().unwrap();
    let written = write_standardize_outputs(&result, &result.table, out.path()).unwrap();

    assert_eq!(written.canonical, out.path().join(CANONICAL_FILE));
    let canonical = fs::read_to_string(&written.canonical).unwrap();
    let mut lines = canonical.lines();
    let header = lines.next().unwrap();
    assert!(
        header.starts_with(concat!(
            "res_id,period,rejection,orders_tm,timeouts_tm,",
            "mx_rejection_tm,orders_funnel,menu_opens_funnel"
        )),
        "{header}"
    );
    assert!(header.contains("ads_consumed_ads"));
    assert_eq!(lines.count(), 1);

    let tabs: Vec<&str> = written.tabs.keys().map(String::as_str).collect();
    assert_eq!(tabs, vec!["ads", "funnel", "txn_metrics"]);
    let txn = fs::read_to_string(out.path().join(TABS_DIR).join("txn_metrics.csv")).unwrap();
    assert!(txn.lines().next().unwrap().ends_with(",comments"));
    assert_eq!(txn.lines().count(), 3);
    assert!(txn.contains("Add data for this res_id and period"));
}

#[test]
fn review_output_is_written() {
    let input = tempfile::tempdir().unwrap();
    write(
        input.path(),
        "reviews.csv",
        "Res Id,Order ID,Rating,Comment,Review Date\n7,A1,4,Great Food,2023-05-01\n",
    );
    let workbook = read_workbook(input.path()).unwrap();
    let aliases = default_aliases(Platform::Zomato).unwrap();
    let table = standardize_review_file(&workbook, &aliases, Platform::Zomato).unwrap();

    let out = tempfile::tempdir().unwrap();
    let path = write_review_output(&table, &out.path().join("nested")).unwrap();
    assert_eq!(path.file_name().unwrap(), REVIEWS_FILE);
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("great food"));
}

#[test]
fn default_output_dir_sits_next_to_the_workbook() {
    let input = tempfile::tempdir().unwrap();
    assert_eq!(default_output_dir(input.path()), input.path().join("output"));
    let file = input.path().join("export.xlsx");
    assert_eq!(default_output_dir(&file), input.path().join("output"));
}
