//! Table rendering for command output.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use reqview_model::{
    CORCENTRIC_ID_COLUMN, MORE_INFORMATION_NEEDED, Report, Screenshot, TO_BE_APPROVED,
};
use reqview_cli::links::link_for;

/// Column of a report row carrying the workflow status.
const STATUS_POSITION: usize = 1;

pub fn report_list_table(reports: &[Report]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Name"),
        header_cell("Records"),
        header_cell("Created"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for report in reports {
        table.add_row(vec![
            dim_cell(report.id()),
            Cell::new(report.name()).add_attribute(Attribute::Bold),
            count_cell(report.record_count()),
            Cell::new(report.created_at().format("%Y-%m-%d %H:%M")),
        ]);
    }
    table
}

/// Rows of one report. With a template, a link column is added from the
/// Corcentric id of each row.
pub fn report_table(report: &Report, link_template: Option<&str>) -> Table {
    let link_column = link_template.and_then(|t| report.column(CORCENTRIC_ID_COLUMN).map(|c| (t, c)));

    let mut header: Vec<Cell> = report.headers().iter().map(|h| header_cell(h)).collect();
    if link_column.is_some() {
        header.push(header_cell("Link"));
    }

    let mut table = Table::new();
    table.set_header(header);
    apply_wide_table_style(&mut table);

    for row in report.data() {
        let mut cells: Vec<Cell> = row
            .iter()
            .enumerate()
            .map(|(i, value)| {
                if i == STATUS_POSITION {
                    status_cell(value)
                } else {
                    Cell::new(value)
                }
            })
            .collect();
        if let Some((template, column)) = link_column {
            let link = row.get(column).and_then(|value| link_for(template, value));
            cells.push(match link {
                Some(url) => Cell::new(url).fg(Color::Blue),
                None => dim_cell("-"),
            });
        }
        table.add_row(cells);
    }
    table
}

pub fn screenshot_table(shots: &[Screenshot]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("File"),
        header_cell("Bytes"),
        header_cell("Taken"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    for shot in shots {
        table.add_row(vec![
            dim_cell(shot.id),
            Cell::new(&shot.filename),
            Cell::new(shot.image_data.len()),
            Cell::new(shot.timestamp.format("%Y-%m-%d %H:%M:%S")),
        ]);
    }
    table
}

fn status_cell(status: &str) -> Cell {
    match status {
        TO_BE_APPROVED => Cell::new(status).fg(Color::Yellow),
        MORE_INFORMATION_NEEDED => Cell::new(status)
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        _ => Cell::new(status),
    }
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_wide_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(200);
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
