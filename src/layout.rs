use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::grid::PointerTarget;
use crate::state::{CELLS_PER_PAGE, COLUMNS_PER_ROW, ROWS};

/// Screen geometry of the grid: one rectangle per cell, row-major, with a
/// one-column gutter to the right of each cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    area: Rect,
    cells: Vec<Rect>,
}

impl GridLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Ratio(1, ROWS as u32); ROWS])
            .split(area);

        let mut cells = Vec::with_capacity(CELLS_PER_PAGE);
        for row in rows.iter() {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(vec![Constraint::Ratio(1, COLUMNS_PER_ROW as u32); COLUMNS_PER_ROW])
                .split(*row);
            cells.extend(columns.iter().map(|column| Rect {
                width: column.width.saturating_sub(1).max(column.width.min(1)),
                ..*column
            }));
        }

        Self { area, cells }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn cell(&self, index: usize) -> Option<Rect> {
        self.cells.get(index).copied()
    }

    /// The overlay covers the inside of its cell, leaving the border to the cell.
    pub fn overlay_area(cell: Rect) -> Rect {
        if cell.width <= 2 || cell.height <= 2 {
            return cell;
        }
        Rect {
            x: cell.x + 1,
            y: cell.y + 1,
            width: cell.width - 2,
            height: cell.height - 2,
        }
    }

    /// Resolves a terminal position. `None` means the pointer is outside the grid.
    pub fn hit(&self, column: u16, row: u16, overlay_owner: Option<usize>) -> Option<PointerTarget> {
        if !contains(self.area, column, row) {
            return None;
        }
        if let Some(owner) = overlay_owner.and_then(|index| self.cell(index)) {
            if contains(Self::overlay_area(owner), column, row) {
                return Some(PointerTarget::Overlay);
            }
        }
        let target = self
            .cells
            .iter()
            .position(|cell| contains(*cell, column, row))
            .map(PointerTarget::Cell)
            .unwrap_or(PointerTarget::Gap);
        Some(target)
    }
}

fn contains(rect: Rect, column: u16, row: u16) -> bool {
    column >= rect.x
        && row >= rect.y
        && u32::from(column) < u32::from(rect.x) + u32::from(rect.width)
        && u32::from(row) < u32::from(rect.y) + u32::from(rect.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> GridLayout {
        GridLayout::new(Rect::new(0, 0, 60, 20))
    }

    #[test]
    fn splits_into_row_major_cells() {
        let layout = layout();
        assert_eq!(layout.cell(0), Some(Rect::new(0, 0, 9, 5)));
        assert_eq!(layout.cell(5), Some(Rect::new(50, 0, 9, 5)));
        assert_eq!(layout.cell(6), Some(Rect::new(0, 5, 9, 5)));
        assert_eq!(layout.cell(23), Some(Rect::new(50, 15, 9, 5)));
        assert!(layout.cell(24).is_none());
    }

    #[test]
    fn hit_resolves_cells_gutters_and_outside() {
        let layout = layout();
        assert_eq!(layout.hit(0, 0, None), Some(PointerTarget::Cell(0)));
        assert_eq!(layout.hit(12, 6, None), Some(PointerTarget::Cell(7)));
        assert_eq!(layout.hit(9, 0, None), Some(PointerTarget::Gap));
        assert_eq!(layout.hit(60, 0, None), None);
        assert_eq!(layout.hit(0, 20, None), None);
    }

    #[test]
    fn hit_prefers_overlay_inside_owner() {
        let layout = layout();
        assert_eq!(layout.hit(12, 7, Some(7)), Some(PointerTarget::Overlay));
        assert_eq!(layout.hit(10, 5, Some(7)), Some(PointerTarget::Cell(7)));
        assert_eq!(layout.hit(2, 2, Some(7)), Some(PointerTarget::Cell(0)));
    }

    #[test]
    fn tiny_cells_keep_their_width() {
        let layout = GridLayout::new(Rect::new(0, 0, 6, 4));
        assert_eq!(layout.cell(0).map(|cell| cell.width), Some(1));
    }
}
