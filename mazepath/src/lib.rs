//! Route finding through maze images.
//!
//! A maze image is thresholded into a [`GridMap`] of free and blocked cells,
//! a start is picked near the rim and a goal near the middle, and the route
//! between them is searched with breadth-first search ([`bfs`]) or A*
//! ([`astar`]). Both searches also return every cell they expanded, in order,
//! so the exploration can be replayed.

pub mod config;
pub mod endpoints;
pub mod error;
pub mod find;
pub mod grid;
pub mod render;
pub mod util;

pub use config::Config;
pub use endpoints::{select_endpoints, select_goal, select_start, EndpointRole};
pub use error::Error;
pub use find::{
    astar, bfs, reconstruct_path, AStar, Algorithm, BreadthFirst, FifoFrontier, Frontier,
    Heuristic, Manhattan, NoHeuristic, PathFinder, PathFinderState, PathResult,
    PriorityFrontier, SearchOutcome, UNREACHABLE,
};
pub use grid::{Cell, CellStorage, GridMap, MapTrait, Point};
pub use render::Overlay;
