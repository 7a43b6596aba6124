use std::path::PathBuf;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::types::{ReviewResult, StandardizeResult, TabSummary};

pub fn print_standardize_summary(result: &StandardizeResult) {
    println!("Platform: {}", result.platform);
    println!("Objective: {}", result.objective);
    if let Some(dir) = &result.output_dir {
        println!("Output: {}", dir.display());
    }
    if let Some(path) = &result.canonical {
        println!("Canonical table: {}", path.display());
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Tab"),
        header_cell("Label"),
        header_cell("Records"),
        header_cell("Gap rows"),
        header_cell("Merged"),
        header_cell("CSV"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    align_column(&mut table, 5, CellAlignment::Center);
    let mut total_records = 0usize;
    let mut total_gaps = 0usize;
    for summary in &result.tabs {
        total_records += summary.records;
        total_gaps += summary.gap_rows;
        table.add_row(tab_row(summary));
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!("{} rows x {} columns", result.rows, result.columns))
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(total_records).add_attribute(Attribute::Bold),
        count_cell(total_gaps, Color::Yellow).add_attribute(Attribute::Bold),
        dim_cell("-"),
        output_cell(result.canonical.as_ref()),
    ]);
    println!("{table}");
    if let Some(matched) = result.master_rows {
        println!("Master data rows: {matched}");
    }
    if result.modified {
        println!("Gap rows were added; fill them in the per-tab CSVs.");
    }
    if !result.warnings.is_empty() {
        eprintln!("Warnings:");
        for warning in &result.warnings {
            eprintln!("- {warning}");
        }
    }
}

pub fn print_review_summary(result: &ReviewResult) {
    println!("Platform: {}", result.platform);
    println!("Reviews: {}", result.rows);
    if let Some(path) = &result.output {
        println!("Output: {}", path.display());
    }
}

fn tab_row(summary: &TabSummary) -> Vec<Cell> {
    vec![
        Cell::new(&summary.tab)
            .fg(Color::Blue)
            .add_attribute(Attribute::Bold),
        Cell::new(&summary.label),
        Cell::new(summary.records),
        count_cell(summary.gap_rows, Color::Yellow),
        if summary.merged {
            Cell::new("✓").fg(Color::Green)
        } else {
            dim_cell("-")
        },
        output_cell(summary.output.as_ref()),
    ]
}

fn output_cell(path: Option<&PathBuf>) -> Cell {
    match path {
        Some(_) => Cell::new("✓")
            .fg(Color::Green)
            .add_attribute(Attribute::Bold),
        None => dim_cell("-"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
