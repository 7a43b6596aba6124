use std::time::Instant;

use aggr_cli::output::{default_output_dir, write_review_output, write_standardize_outputs};
use aggr_common::column_strings;
use aggr_core::{
    COMMENTS_COLUMN, InMemoryMasterData, PipelineOptions, PipelineResult, processor_for,
    standardize_restaurant_master_data, standardize_review_file, standardize_workbook,
};
use aggr_ingest::read_workbook;
use aggr_map::{AliasRepository, default_aliases, load_alias_file};
use aggr_model::{AliasMapping, Objective, Platform};
use anyhow::{Context, Result};
use comfy_table::Table;
use tracing::{info, info_span};

use crate::cli::{AliasArgs, ReviewArgs, StandardizeArgs, TabsArgs};
use crate::summary::apply_table_style;
use crate::types::{ReviewResult, StandardizeResult, TabSummary};

pub fn run_tabs(args: &TabsArgs) -> Result<()> {
    let processor = processor_for(args.platform.into());
    let ads_mandatory = processor.default_mandatory_tabs(Objective::AdsOptimization);
    let visual_mandatory = processor.default_mandatory_tabs(Objective::Visualization);
    let mut table = Table::new();
    table.set_header(vec![
        "Tab",
        "Label",
        "Suffix",
        "Ads optimization",
        "Visualization",
    ]);
    apply_table_style(&mut table);
    for spec in processor.tabs() {
        let role = |objective: Objective, mandatory: &[&str]| {
            if mandatory.contains(&spec.key) {
                "mandatory"
            } else if spec.joins_for(objective) {
                "optional"
            } else {
                "-"
            }
        };
        table.add_row(vec![
            spec.key.to_string(),
            spec.label.to_string(),
            spec.column_suffix(),
            role(Objective::AdsOptimization, ads_mandatory).to_string(),
            role(Objective::Visualization, visual_mandatory).to_string(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_standardize(args: &StandardizeArgs) -> Result<StandardizeResult> {
    let platform: Platform = args.platform.into();
    let objective: Objective = args.objective.into();
    let span = info_span!("run", platform = %platform, workbook = %args.workbook.display());
    let _guard = span.enter();
    let start = Instant::now();

    let aliases = load_aliases(platform, &args.aliases)?;
    let workbook = read_workbook(&args.workbook)
        .with_context(|| format!("read workbook {}", args.workbook.display()))?;

    let mut options = PipelineOptions::new(objective);
    if !args.mandatory_tabs.is_empty() {
        options = options.with_mandatory_tabs(args.mandatory_tabs.iter().cloned());
    }
    let result = standardize_workbook(&workbook, &aliases, platform, &options)?;

    let mut table = result.table.clone();
    let mut master_rows = None;
    if let (Some(path), Some(client_id)) = (&args.master_data, args.client_id) {
        let repository = InMemoryMasterData::from_csv_path(path)
            .with_context(|| format!("load master data {}", path.display()))?;
        table = standardize_restaurant_master_data(
            &repository,
            &table,
            client_id,
            args.master_join.into(),
        )?;
        master_rows = Some(table.height());
    }

    let mut tabs = tab_summaries(&result);
    let mut output_dir = None;
    let mut canonical = None;
    if !args.dry_run {
        let dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(&args.workbook));
        let written = write_standardize_outputs(&result, &table, &dir)?;
        for summary in &mut tabs {
            summary.output = written.tabs.get(&summary.tab).cloned();
        }
        canonical = Some(written.canonical);
        output_dir = Some(dir);
    }

    info!(
        rows = table.height(),
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );
    Ok(StandardizeResult {
        platform,
        objective,
        rows: table.height(),
        columns: table.width(),
        tabs,
        warnings: result.warnings,
        modified: result.modified,
        master_rows,
        output_dir,
        canonical,
    })
}

pub fn run_review(args: &ReviewArgs) -> Result<ReviewResult> {
    let platform: Platform = args.platform.into();
    let span = info_span!("review", platform = %platform, workbook = %args.workbook.display());
    let _guard = span.enter();

    let aliases = load_aliases(platform, &args.aliases)?;
    let workbook = read_workbook(&args.workbook)
        .with_context(|| format!("read review workbook {}", args.workbook.display()))?;
    let table = standardize_review_file(&workbook, &aliases, platform)?;

    let output = if args.dry_run {
        None
    } else {
        let dir = args
            .output_dir
            .clone()
            .unwrap_or_else(|| default_output_dir(&args.workbook));
        Some(write_review_output(&table, &dir)?)
    };
    Ok(ReviewResult {
        platform,
        rows: table.height(),
        output,
    })
}

fn load_aliases(platform: Platform, args: &AliasArgs) -> Result<AliasMapping> {
    if let Some(path) = &args.aliases {
        return load_alias_file(path).with_context(|| format!("load aliases {}", path.display()));
    }
    if let Some(dir) = &args.alias_dir {
        return AliasRepository::new(dir)
            .load_effective(platform)
            .with_context(|| format!("load aliases from {}", dir.display()));
    }
    default_aliases(platform).context("load built-in aliases")
}

fn tab_summaries(result: &PipelineResult) -> Vec<TabSummary> {
    let processor = processor_for(result.platform);
    let mut summaries = Vec::with_capacity(result.tabs.len());
    for spec in processor.tabs() {
        let Some(frame) = result.tabs.get(spec.key) else {
            continue;
        };
        let gap_rows = column_strings(&frame.data, COMMENTS_COLUMN)
            .map(|comments| comments.iter().filter(|c| c.is_some()).count())
            .unwrap_or(0);
        summaries.push(TabSummary {
            tab: spec.key.to_string(),
            label: spec.label.to_string(),
            records: frame.record_count(),
            gap_rows,
            merged: result.merged_tabs.iter().any(|tab| tab == spec.key),
            output: None,
        });
    }
    summaries
}
