//! Mapping from board cell elements to coordinates.
//!
//! Board markup marks each cell element with the `cell` class and names it
//! `row{y}-col{x}`. Every `draw` replaces the
//! whole board, so the bound set is rebuilt from scratch each time and
//! gestures are only honoured for cells on the current board.

use std::collections::HashMap;

use minesweeper_live_common::{models::Pos, protocol::OutboundCommand};
use scraper::{Html, Selector};

/// How the player touched a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Plain click: sweep the cell.
    Primary,
    /// Context-menu click: toggle a flag.
    Secondary,
}

impl Gesture {
    pub fn command(self, pos: Pos) -> OutboundCommand {
        match self {
            Self::Primary => OutboundCommand::Sweep(pos),
            Self::Secondary => OutboundCommand::Flag(pos),
        }
    }
}

/// Parse a cell element id such as `row3-col5` into `Pos { x: 5, y: 3 }`.
pub fn parse_cell_id(id: &str) -> Option<Pos> {
    let (row, col) = id.split_once('-')?;
    let y = row.strip_prefix("row")?.parse().ok()?;
    let x = col.strip_prefix("col")?.parse().ok()?;
    Some(Pos { x, y })
}

#[derive(Debug, Default)]
pub struct CellBindings {
    cells: HashMap<String, Pos>,
}

impl CellBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every binding and bind the `.cell` elements found in `html`.
    /// Returns the number of cells bound.
    pub fn rebind(&mut self, html: &str) -> usize {
        self.cells.clear();

        let Ok(selector) = Selector::parse(".cell") else {
            return 0;
        };
        let board = Html::parse_fragment(html);
        for cell in board.select(&selector) {
            if let Some(id) = cell.value().id()
                && let Some(pos) = parse_cell_id(id)
            {
                self.cells.insert(id.to_string(), pos);
            }
        }

        self.cells.len()
    }

    pub fn resolve(&self, cell_id: &str) -> Option<Pos> {
        self.cells.get(cell_id).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}
