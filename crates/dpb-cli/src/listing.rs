//! Registry listing rendered as a terminal table.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Color, ColumnConstraint, ContentArrangement, Table};

use dpb_core::{Category, OperationSpec};

/// Render operations grouped by category, in registry order within a group.
pub fn operations_table(operations: &[OperationSpec]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Category"),
        header_cell("Operation"),
        header_cell("Description"),
    ]);
    apply_table_style(&mut table);
    for category in Category::ALL {
        let members = operations.iter().filter(|op| op.category == category);
        for (position, op) in members.enumerate() {
            let label = if position == 0 { category.label() } else { "" };
            table.add_row(vec![
                Cell::new(label).add_attribute(Attribute::Bold),
                Cell::new(op.name).fg(Color::Green),
                Cell::new(op.summary),
            ]);
        }
    }
    table
}

/// Footer line printed under the listing.
pub fn total_line(count: usize) -> String {
    format!("Total: {count} operations")
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if table.column_count() >= 2 {
        table.set_constraints(vec![
            ColumnConstraint::ContentWidth,
            ColumnConstraint::ContentWidth,
        ]);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}
