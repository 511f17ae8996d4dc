//! Picking start and goal cells for a maze whose entrance is on the rim and
//! whose target sits in the middle.

use std::fmt::Display;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    grid::{MapTrait, Point},
    Error,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum EndpointRole {
    Start,
    Goal,
}

impl Display for EndpointRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                EndpointRole::Start => "start",
                EndpointRole::Goal => "goal",
            }
        )
    }
}

/// Scan all free cells row by row and return the one with the lowest score.
/// On ties the first cell found wins.
fn select_min_by<M: MapTrait>(
    map: &M,
    role: EndpointRole,
    score: impl Fn(Point) -> usize,
) -> Result<Point, Error> {
    let selected = (0..map.rows())
        .flat_map(|row| (0..map.columns()).map(move |col| Point { row, col }))
        .filter(|p| map.is_free(*p))
        .min_by_key(|p| score(*p))
        .ok_or(Error::NoFreeCell { role })?;

    debug!("selected {} at {} (score {})", role, selected, score(selected));
    Ok(selected)
}

/// The free cell closest to any edge of the grid.
pub fn select_start<M: MapTrait>(map: &M) -> Result<Point, Error> {
    let (rows, columns) = (map.rows(), map.columns());

    select_min_by(map, EndpointRole::Start, |p| {
        p.row
            .min(p.col)
            .min(rows - 1 - p.row)
            .min(columns - 1 - p.col)
    })
}

/// The free cell with the smallest Manhattan distance to the center cell
/// `(rows / 2, columns / 2)`.
pub fn select_goal<M: MapTrait>(map: &M) -> Result<Point, Error> {
    let center = Point {
        row: map.rows() / 2,
        col: map.columns() / 2,
    };

    select_min_by(map, EndpointRole::Goal, |p| p.manhattan(center))
}

pub fn select_endpoints<M: MapTrait>(map: &M) -> Result<(Point, Point), Error> {
    Ok((select_start(map)?, select_goal(map)?))
}
