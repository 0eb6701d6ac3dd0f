use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};
use deid_core::Tag;

use crate::types::{AnonymizeResult, LatticeResult};

pub fn print_summary(result: &AnonymizeResult) {
    println!("Input: {}", result.input.display());
    match &result.output {
        Some(path) => println!("Output: {}", path.display()),
        None => println!("Output: (dry run)"),
    }
    println!(
        "Generalization: {} (k = {}, max suppression = {:.1}%)",
        result.node,
        result.settings.k,
        result.settings.max_suppression_rate * 100.0
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Generalizer"),
        header_cell("Level"),
        header_cell("Top"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for column in &result.columns {
        table.add_row(vec![
            Cell::new(&column.name),
            dim_cell(column.generalizer),
            level_cell(column.level, column.top_level),
            dim_cell(column.top_level),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell("-"),
        Cell::new(result.node.level()).add_attribute(Attribute::Bold),
        dim_cell(result.columns.iter().map(|c| c.top_level).sum::<usize>()),
    ]);
    println!("{table}");

    let mut totals = Table::new();
    apply_table_style(&mut totals);
    align_column(&mut totals, 1, CellAlignment::Right);
    totals.add_row(vec![Cell::new("Rows"), Cell::new(result.total_rows)]);
    totals.add_row(vec![Cell::new("Released"), Cell::new(result.released_rows)]);
    totals.add_row(vec![
        Cell::new("Suppressed"),
        count_cell(result.suppressed_rows, Color::Yellow),
    ]);
    totals.add_row(vec![
        Cell::new("Suppression rate"),
        Cell::new(format!("{:.2}%", result.suppression_rate * 100.0)),
    ]);
    totals.add_row(vec![
        Cell::new("Equivalence classes"),
        Cell::new(result.equivalence_classes),
    ]);
    totals.add_row(vec![
        Cell::new("Nodes evaluated"),
        Cell::new(result.stats.evaluations),
    ]);
    totals.add_row(vec![
        Cell::new("Nodes tagged"),
        Cell::new(format!(
            "{}/{}",
            result.stats.nodes_tagged, result.stats.nodes_total
        )),
    ]);
    println!("{totals}");
}

pub fn print_lattice(result: &LatticeResult) {
    println!("Columns: {}", result.headers.join(", "));
    println!(
        "k = {}, max suppression = {:.1}%",
        result.settings.k,
        result.settings.max_suppression_rate * 100.0
    );

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Level"),
        header_cell("Node"),
        header_cell("Tag"),
        header_cell("Selected"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Center);
    let last_level = result
        .max_level
        .map_or(result.lattice.max_level(), |level| {
            level.min(result.lattice.max_level())
        });
    for level in 0..=last_level {
        for (node, tag) in result.lattice.level(level) {
            let selected = result.selected.as_ref() == Some(node);
            table.add_row(vec![
                dim_cell(level),
                Cell::new(node),
                tag_cell(tag),
                if selected {
                    Cell::new("✓")
                        .fg(Color::Green)
                        .add_attribute(Attribute::Bold)
                } else {
                    dim_cell("-")
                },
            ]);
        }
    }
    println!("{table}");

    let counts = result.lattice.tag_counts();
    println!(
        "{} k-anonymous, {} not k-anonymous, {} untagged; {} of {} nodes evaluated",
        counts.k_anonymous,
        counts.not_k_anonymous,
        counts.untagged,
        result.stats.evaluations,
        result.stats.nodes_total
    );
    if result.selected.is_none() {
        println!("No node satisfies the constraints.");
    }
}

fn tag_cell(tag: Tag) -> Cell {
    match tag {
        Tag::KAnonymous => Cell::new(tag).fg(Color::Green),
        Tag::NotKAnonymous => Cell::new(tag).fg(Color::Red),
        Tag::Untagged => dim_cell(tag),
    }
}

fn level_cell(level: usize, top_level: usize) -> Cell {
    if level == top_level {
        Cell::new(level).fg(Color::Yellow)
    } else if level == 0 {
        dim_cell(level)
    } else {
        Cell::new(level)
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
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

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
    if table.column_count() >= 4 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Percentage(45)),
            ColumnConstraint::LowerBoundary(Width::Fixed(10)),
            ColumnConstraint::LowerBoundary(Width::Fixed(5)),
            ColumnConstraint::LowerBoundary(Width::Fixed(5)),
        ]);
    }
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
