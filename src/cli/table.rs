use comfy_table::{Cell, CellAlignment, Row, Table, presets::UTF8_FULL};

use crate::{ast::Token, output::token_rows};

/// Renders the flat token table: index, kind, lexeme, line, column.
pub fn token_table(tokens: &[Token]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(Row::from(vec![
        Cell::new("#").set_alignment(CellAlignment::Right),
        Cell::new("Kind").set_alignment(CellAlignment::Left),
        Cell::new("Lexeme").set_alignment(CellAlignment::Left),
        Cell::new("Line").set_alignment(CellAlignment::Right),
        Cell::new("Col").set_alignment(CellAlignment::Right),
    ]));

    for row in token_rows(tokens) {
        table.add_row(Row::from(vec![
            Cell::new(row.index).set_alignment(CellAlignment::Right),
            Cell::new(row.kind),
            Cell::new(&row.lexeme),
            Cell::new(row.line).set_alignment(CellAlignment::Right),
            Cell::new(row.column).set_alignment(CellAlignment::Right),
        ]));
    }

    table.to_string()
}
