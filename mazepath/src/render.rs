use std::fmt::Display;

use crate::{
    find::SearchOutcome,
    grid::{GridMap, MapTrait, Point},
};

/// Text picture of a finished search on top of its grid.
///
/// `#` wall, `.` untouched free cell, `o` expanded cell, `*` path, `S`/`G` endpoints.
/// Points outside of `grid` are not drawn.
pub struct Overlay<'a> {
    pub grid: &'a GridMap,
    pub outcome: &'a SearchOutcome,
    pub start: Point,
    pub goal: Point,
}

impl Display for Overlay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut canvas = self.grid.create_storage('.');
        for row in 0..self.grid.rows() {
            for col in 0..self.grid.columns() {
                let p = Point { row, col };
                if !self.grid.is_free(p) {
                    *canvas.get_mut(p) = '#';
                }
            }
        }
        let marks = self
            .outcome
            .order
            .iter()
            .map(|p| (*p, 'o'))
            .chain(self.outcome.path.iter().flatten().map(|p| (*p, '*')))
            .chain([(self.start, 'S'), (self.goal, 'G')]);
        for (p, mark) in marks {
            if self.grid.contains(p) {
                *canvas.get_mut(p) = mark;
            }
        }

        write!(f, "{}", canvas)
    }
}
