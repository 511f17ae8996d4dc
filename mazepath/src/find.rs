//! Frontier search over a [`MapTrait`] grid.
//!
//! Breadth-first search and A* are the same loop with a different frontier:
//! a FIFO queue expands cells level by level, a priority queue ordered by
//! `cost + estimate` expands the most promising cell first. With unit step
//! costs a FIFO queue never finds a cheaper route to a cell it already
//! discovered, so every cell is enqueued once, exactly like a textbook BFS.

use std::{
    cmp::Ordering,
    collections::{BinaryHeap, VecDeque},
    fmt::Display,
    str::FromStr,
};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::{
    grid::{CellStorage, MapTrait, Point},
    Error,
};

/// Cost stored for cells that have not been discovered yet
pub const UNREACHABLE: usize = usize::MAX;

/// Cost of moving between two orthogonally adjacent free cells
const STEP_COST: usize = 1;

/// The set of discovered cells waiting to be expanded
pub trait Frontier {
    /// Add a cell. `priority` is the estimated total cost of a route through it.
    fn push(&mut self, node: Point, priority: usize);

    /// Take the next cell to expand
    fn pop(&mut self) -> Option<Point>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// First-in first-out frontier, ignores priorities
#[derive(Debug, Default)]
pub struct FifoFrontier(VecDeque<Point>);

impl Frontier for FifoFrontier {
    fn push(&mut self, node: Point, _priority: usize) {
        self.0.push_back(node);
    }

    fn pop(&mut self) -> Option<Point> {
        self.0.pop_front()
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

/// The objects that we store in the priority queue
#[derive(Debug, Eq, PartialEq)]
struct ToVisit {
    priority: usize,
    point: Point,
}

impl Ord for ToVisit {
    fn cmp(&self, other: &Self) -> Ordering {
        // reverse for BinaryHeap to be a min-heap, equal priorities pop the smaller point first
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.point.cmp(&self.point))
    }
}

impl PartialOrd for ToVisit {
    fn partial_cmp(&self, other: &ToVisit) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Min-priority frontier.
///
/// The same cell may be pushed several times with decreasing priorities, the
/// search skips the stale copies when they are popped.
#[derive(Debug, Default)]
pub struct PriorityFrontier(BinaryHeap<ToVisit>);

impl Frontier for PriorityFrontier {
    fn push(&mut self, node: Point, priority: usize) {
        self.0.push(ToVisit {
            priority,
            point: node,
        });
    }

    fn pop(&mut self) -> Option<Point> {
        self.0.pop().map(|v| v.point)
    }

    fn len(&self) -> usize {
        self.0.len()
    }
}

/// Estimate of the remaining cost between two cells.
/// Must never overestimate the true cost (admissible).
pub trait Heuristic {
    fn estimate(&self, from: Point, to: Point) -> usize;
}

#[derive(Copy, Clone, Debug, Default)]
pub struct NoHeuristic;

impl Heuristic for NoHeuristic {
    fn estimate(&self, _from: Point, _to: Point) -> usize {
        0
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Manhattan;

impl Heuristic for Manhattan {
    fn estimate(&self, from: Point, to: Point) -> usize {
        from.manhattan(to)
    }
}

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct PathResult {
    pub path: Vec<Point>,
    pub start: Point,
    pub goal: Point,
    pub total_cost: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathFinderState {
    Computing,
    NoPathFound,
    PathFound(PathResult),
}

impl PathFinderState {
    pub fn is_done(&self) -> bool {
        !matches!(self, PathFinderState::Computing)
    }
}

/// Everything a finished search produces: the cells in the order they were
/// expanded and the route to the goal, if there is one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub path: Option<Vec<Point>>,
    pub order: Vec<Point>,
}

impl SearchOutcome {
    /// Number of steps along the path
    pub fn path_len(&self) -> Option<usize> {
        self.path.as_ref().map(|p| p.len().saturating_sub(1))
    }

    pub fn is_reachable(&self) -> bool {
        self.path.is_some()
    }
}

/// Walk the predecessor links back from `goal` to `start` and return the
/// route in start to goal order.
///
/// Returns `None` if `goal` was never reached. Both points must lie inside
/// the storage.
pub fn reconstruct_path(
    from: &CellStorage<Option<Point>>,
    start: Point,
    goal: Point,
) -> Option<Vec<Point>> {
    let mut path = vec![goal];
    let mut current = goal;

    while current != start {
        current = from.get(current)?;
        path.push(current);
    }

    path.reverse();
    Some(path)
}

/// A single search from `start` to `goal` that can be advanced one expansion
/// at a time, which is what a replaying visualizer wants, or run to the end.
#[derive(Debug)]
pub struct PathFinder<'a, M: MapTrait, F: Frontier, H: Heuristic> {
    map: &'a M,
    start: Point,
    goal: Point,
    frontier: F,
    heuristic: H,
    cost: CellStorage<usize>,
    closed: CellStorage<bool>,
    from: CellStorage<Option<Point>>,
    order: Vec<Point>,
    state: PathFinderState,
}

impl<'a, M: MapTrait, F: Frontier, H: Heuristic> PathFinder<'a, M, F, H> {
    /// Prepare a search. Fails if either endpoint is outside the map or the
    /// start cell is blocked.
    pub fn new(
        map: &'a M,
        start: Point,
        goal: Point,
        mut frontier: F,
        heuristic: H,
    ) -> Result<Self, Error> {
        for point in [start, goal] {
            if !map.contains(point) {
                return Err(Error::OutOfBounds {
                    point,
                    rows: map.rows(),
                    columns: map.columns(),
                });
            }
        }
        if !map.is_free(start) {
            return Err(Error::BlockedStart(start));
        }

        let mut cost = map.create_storage(UNREACHABLE);
        *cost.get_mut(start) = 0;
        frontier.push(start, heuristic.estimate(start, goal));

        Ok(Self {
            map,
            start,
            goal,
            frontier,
            heuristic,
            cost,
            closed: map.create_storage(false),
            from: map.create_storage(None),
            order: Vec::new(),
            state: PathFinderState::Computing,
        })
    }

    /// Run until the goal is found or the frontier is exhausted
    pub fn finish(mut self) -> SearchOutcome {
        while !self.step().is_done() {}

        let path = match self.state {
            PathFinderState::PathFound(result) => Some(result.path),
            _ => None,
        };
        debug!(
            "search {} -> {} expanded {} cells, {}",
            self.start,
            self.goal,
            self.order.len(),
            match &path {
                Some(p) => format!("path of {} steps", p.len() - 1),
                None => "no path".to_owned(),
            }
        );

        SearchOutcome {
            path,
            order: self.order,
        }
    }

    /// Pop one entry off the frontier and expand it
    pub fn step(&mut self) -> &PathFinderState {
        if self.state.is_done() {
            return &self.state;
        }

        let Some(current) = self.frontier.pop() else {
            self.state = PathFinderState::NoPathFound;
            return &self.state;
        };

        // a cheaper copy of this entry was already expanded
        if self.closed.get(current) {
            trace!("skipping stale entry {}", current);
            return &self.state;
        }
        *self.closed.get_mut(current) = true;
        self.order.push(current);

        let current_cost = self.cost.get(current);
        trace!("expanding {} at cost {}", current, current_cost);

        if current == self.goal {
            debug!("found goal {} at cost {}", current, current_cost);

            self.state = match reconstruct_path(&self.from, self.start, self.goal) {
                Some(path) => PathFinderState::PathFound(PathResult {
                    path,
                    start: self.start,
                    goal: self.goal,
                    total_cost: current_cost,
                }),
                None => PathFinderState::NoPathFound,
            };
            return &self.state;
        }

        let map = self.map;
        for next in map.neighbors_of(current) {
            let next_cost = current_cost + STEP_COST;
            if next_cost < self.cost.get(next) {
                *self.cost.get_mut(next) = next_cost;
                *self.from.get_mut(next) = Some(current);
                self.frontier
                    .push(next, next_cost + self.heuristic.estimate(next, self.goal));
            }
        }

        &self.state
    }

    pub fn state(&self) -> &PathFinderState {
        &self.state
    }

    /// Cells expanded so far, in expansion order
    pub fn order(&self) -> &[Point] {
        &self.order
    }

    /// Best known cost from the start, `None` for undiscovered cells
    pub fn cost_at(&self, node: Point) -> Option<usize> {
        Some(self.cost.get(node)).filter(|c| *c != UNREACHABLE)
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn goal(&self) -> Point {
        self.goal
    }
}

pub type BreadthFirst<'a, M> = PathFinder<'a, M, FifoFrontier, NoHeuristic>;
pub type AStar<'a, M> = PathFinder<'a, M, PriorityFrontier, Manhattan>;

impl<'a, M: MapTrait> BreadthFirst<'a, M> {
    pub fn breadth_first(map: &'a M, start: Point, goal: Point) -> Result<Self, Error> {
        PathFinder::new(map, start, goal, FifoFrontier::default(), NoHeuristic)
    }
}

impl<'a, M: MapTrait> AStar<'a, M> {
    pub fn astar(map: &'a M, start: Point, goal: Point) -> Result<Self, Error> {
        PathFinder::new(map, start, goal, PriorityFrontier::default(), Manhattan)
    }
}

/// Shortest path by number of steps, expanding cells level by level
pub fn bfs<M: MapTrait>(map: &M, start: Point, goal: Point) -> Result<SearchOutcome, Error> {
    Ok(BreadthFirst::breadth_first(map, start, goal)?.finish())
}

/// Shortest path by number of steps, guided by the Manhattan distance to the goal
pub fn astar<M: MapTrait>(map: &M, start: Point, goal: Point) -> Result<SearchOutcome, Error> {
    Ok(AStar::astar(map, start, goal)?.finish())
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Bfs,
    AStar,
}

impl Algorithm {
    pub fn run<M: MapTrait>(
        &self,
        map: &M,
        start: Point,
        goal: Point,
    ) -> Result<SearchOutcome, Error> {
        match self {
            Algorithm::Bfs => bfs(map, start, goal),
            Algorithm::AStar => astar(map, start, goal),
        }
    }
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Algorithm::Bfs => "bfs",
                Algorithm::AStar => "astar",
            }
        )
    }
}

impl FromStr for Algorithm {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bfs" => Ok(Algorithm::Bfs),
            "astar" => Ok(Algorithm::AStar),
            _ => Err(anyhow::anyhow!("Invalid algorithm: {}", s)),
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use super::*;
    use crate::grid::{Cell, GridMap};

    fn create_basic_map() -> GridMap {
        "
        #######
        #.###.#
        #.###.#
        #.#...#
        #.#.###
        #......
        #######
        "
        .parse()
        .unwrap()
    }

    fn gap_map(open: bool) -> GridMap {
        let mut map = GridMap::new(5, 5, Cell::Free);
        for col in 0..5 {
            if open && col == 2 {
                continue;
            }
            map.set(Point::new(2, col), Cell::Blocked);
        }
        map
    }

    fn p(row: usize, col: usize) -> Point {
        Point::new(row, col)
    }

    /// Shortest distances from `start` by repeated relaxation until nothing changes
    fn brute_force_distances(map: &GridMap, start: Point) -> CellStorage<usize> {
        let mut dist = map.create_storage(UNREACHABLE);
        *dist.get_mut(start) = 0;

        loop {
            let mut changed = false;
            for node in map.free_cells() {
                for next in map.neighbors_of(node) {
                    let d = dist.get(next);
                    if d != UNREACHABLE && d + 1 < dist.get(node) {
                        *dist.get_mut(node) = d + 1;
                        changed = true;
                    }
                }
            }
            if !changed {
                return dist;
            }
        }
    }

    fn assert_valid_path(map: &GridMap, path: &[Point], start: Point, goal: Point) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        assert!(path.iter().all(|p| map.is_free(*p)));
        assert!(path.windows(2).all(|w| w[0].manhattan(w[1]) == 1));

        let unique: HashSet<_> = path.iter().collect();
        assert_eq!(unique.len(), path.len());
    }

    fn assert_valid_order(outcome: &SearchOutcome, dist: &CellStorage<usize>, goal: Point) {
        let unique: HashSet<_> = outcome.order.iter().collect();
        assert_eq!(unique.len(), outcome.order.len());
        assert!(outcome.order.iter().all(|p| dist.get(*p) != UNREACHABLE));

        let goal_count = outcome.order.iter().filter(|p| **p == goal).count();
        if outcome.is_reachable() {
            assert_eq!(goal_count, 1);
            assert_eq!(outcome.order.last(), Some(&goal));
        } else {
            assert_eq!(goal_count, 0);
        }
    }

    #[test]
    fn test_basic_route() {
        let map = create_basic_map();

        for algorithm in [Algorithm::Bfs, Algorithm::AStar] {
            let outcome = algorithm.run(&map, p(1, 1), p(1, 5)).unwrap();
            assert_eq!(outcome.path_len(), Some(12));
        }

        let mut finder = AStar::astar(&map, p(1, 1), p(1, 5)).unwrap();
        while !finder.step().is_done() {}
        assert!(matches!(
            finder.state(),
            PathFinderState::PathFound(PathResult { total_cost: 12, .. })
        ));
    }

    #[test]
    fn test_basic_no_route() {
        let map = create_basic_map();

        // the goal is a wall
        for algorithm in [Algorithm::Bfs, Algorithm::AStar] {
            let outcome = algorithm.run(&map, p(1, 1), p(0, 5)).unwrap();
            assert_eq!(outcome.path, None);
            assert_eq!(outcome.order.len(), map.free_count());
        }
    }

    #[test]
    fn test_gap_in_wall() {
        let map = gap_map(true);

        let bfs_outcome = bfs(&map, p(0, 0), p(4, 4)).unwrap();
        let astar_outcome = astar(&map, p(0, 0), p(4, 4)).unwrap();

        assert_eq!(bfs_outcome.path_len(), Some(8));
        assert_eq!(astar_outcome.path_len(), Some(8));
        for outcome in [&bfs_outcome, &astar_outcome] {
            let path = outcome.path.as_ref().unwrap();
            assert_valid_path(&map, path, p(0, 0), p(4, 4));
            assert!(path.contains(&p(2, 2)));
        }
    }

    #[test]
    fn test_enclosed_goal() {
        let map = gap_map(false);

        let bfs_outcome = bfs(&map, p(0, 0), p(4, 4)).unwrap();
        let astar_outcome = astar(&map, p(0, 0), p(4, 4)).unwrap();

        let component: HashSet<_> = (0..2)
            .flat_map(|row| (0..5).map(move |col| p(row, col)))
            .collect();

        for outcome in [&bfs_outcome, &astar_outcome] {
            assert_eq!(outcome.path, None);
            assert_eq!(outcome.order.len(), 10);
            let visited: HashSet<_> = outcome.order.iter().copied().collect();
            assert_eq!(visited, component);
        }
    }

    #[test]
    fn test_bfs_expands_down_before_right() {
        let map = GridMap::new(3, 3, Cell::Free);
        let outcome = bfs(&map, p(0, 0), p(2, 2)).unwrap();

        assert_eq!(
            outcome.order,
            vec![
                p(0, 0),
                p(1, 0),
                p(0, 1),
                p(2, 0),
                p(1, 1),
                p(0, 2),
                p(2, 1),
                p(1, 2),
                p(2, 2)
            ]
        );
        assert_eq!(
            outcome.path,
            Some(vec![p(0, 0), p(1, 0), p(2, 0), p(2, 1), p(2, 2)])
        );
    }

    #[test]
    fn test_astar_ties_break_by_coordinate() {
        let map = GridMap::new(3, 3, Cell::Free);
        let outcome = astar(&map, p(0, 0), p(2, 2)).unwrap();

        // every cell lies on a shortest route, so all estimates are equal and
        // the coordinate ordering makes the expansion row-major
        let row_major: Vec<_> = map.free_cells().collect();
        assert_eq!(outcome.order, row_major);
        assert_eq!(
            outcome.path,
            Some(vec![p(0, 0), p(0, 1), p(0, 2), p(1, 2), p(2, 2)])
        );
    }

    #[test]
    fn test_astar_expands_fewer_cells() {
        let map = GridMap::new(5, 5, Cell::Free);

        let astar_outcome = astar(&map, p(0, 0), p(0, 4)).unwrap();
        assert_eq!(
            astar_outcome.order,
            vec![p(0, 0), p(0, 1), p(0, 2), p(0, 3), p(0, 4)]
        );

        let bfs_outcome = bfs(&map, p(0, 0), p(0, 4)).unwrap();
        assert_eq!(bfs_outcome.path_len(), Some(4));
        assert!(bfs_outcome.order.len() > astar_outcome.order.len());
    }

    #[test]
    fn test_start_is_goal() {
        let map = create_basic_map();
        for algorithm in [Algorithm::Bfs, Algorithm::AStar] {
            let outcome = algorithm.run(&map, p(3, 3), p(3, 3)).unwrap();
            assert_eq!(outcome.path, Some(vec![p(3, 3)]));
            assert_eq!(outcome.order, vec![p(3, 3)]);
            assert_eq!(outcome.path_len(), Some(0));
        }
    }

    #[test]
    fn test_preconditions() {
        let map = create_basic_map();

        assert_eq!(
            bfs(&map, p(7, 1), p(1, 1)),
            Err(Error::OutOfBounds {
                point: p(7, 1),
                rows: 7,
                columns: 7
            })
        );
        assert!(matches!(
            astar(&map, p(1, 1), p(1, 9)),
            Err(Error::OutOfBounds { .. })
        ));
        assert_eq!(astar(&map, p(0, 0), p(1, 1)), Err(Error::BlockedStart(p(0, 0))));
    }

    #[test]
    fn test_stepping() {
        let map = create_basic_map();
        let mut finder = BreadthFirst::breadth_first(&map, p(1, 1), p(1, 5)).unwrap();
        assert_eq!(finder.start(), p(1, 1));
        assert_eq!(finder.goal(), p(1, 5));
        assert_eq!(finder.frontier_len(), 1);
        assert_eq!(finder.cost_at(p(1, 1)), Some(0));
        assert_eq!(finder.cost_at(p(5, 5)), None);

        let mut steps = 0;
        loop {
            let before = finder.order().len();
            let state = finder.step().clone();
            steps += 1;
            assert!(finder.order().len() <= before + 1);
            if state.is_done() {
                break;
            }
        }

        assert!(matches!(
            finder.state(),
            PathFinderState::PathFound(PathResult { total_cost: 12, .. })
        ));
        assert_eq!(steps, finder.order().len());
        assert_eq!(finder.cost_at(p(5, 5)), Some(8));

        // further steps do nothing
        let order_len = finder.order().len();
        assert!(finder.step().is_done());
        assert_eq!(finder.order().len(), order_len);
    }

    #[test]
    fn test_astar_skips_stale_entries() {
        // (2, 1) is first reached through (1, 1) at cost 4, then through (2, 2) at cost 2
        let map: GridMap = "
            .#..
            #...
            ....
            ....
        "
        .parse()
        .unwrap();
        let mut finder = AStar::astar(&map, p(2, 3), p(0, 0)).unwrap();

        let mut skipped = Vec::new();
        loop {
            let before = finder.order().len();
            let state = finder.step().clone();
            if state.is_done() {
                break;
            }
            if finder.order().len() == before {
                skipped.push(before);
            }
        }

        assert_eq!(skipped, vec![9]);
        assert_eq!(finder.state(), &PathFinderState::NoPathFound);
        assert_eq!(finder.order().len(), 13);
        let unique: HashSet<_> = finder.order().iter().collect();
        assert_eq!(unique.len(), finder.order().len());
    }

    #[test]
    fn test_reconstruct_path() {
        let map = GridMap::new(1, 4, Cell::Free);
        let mut from = map.create_storage(None);
        *from.get_mut(p(0, 1)) = Some(p(0, 0));
        *from.get_mut(p(0, 2)) = Some(p(0, 1));

        assert_eq!(
            reconstruct_path(&from, p(0, 0), p(0, 2)),
            Some(vec![p(0, 0), p(0, 1), p(0, 2)])
        );
        assert_eq!(reconstruct_path(&from, p(0, 0), p(0, 3)), None);
        assert_eq!(reconstruct_path(&from, p(0, 0), p(0, 0)), Some(vec![p(0, 0)]));
    }

    #[test]
    fn test_priority_frontier_order() {
        let mut frontier = PriorityFrontier::default();
        frontier.push(p(2, 0), 5);
        frontier.push(p(1, 1), 3);
        frontier.push(p(0, 4), 5);
        frontier.push(p(1, 0), 3);
        assert_eq!(frontier.len(), 4);

        assert_eq!(frontier.pop(), Some(p(1, 0)));
        assert_eq!(frontier.pop(), Some(p(1, 1)));
        assert_eq!(frontier.pop(), Some(p(0, 4)));
        assert_eq!(frontier.pop(), Some(p(2, 0)));
        assert_eq!(frontier.pop(), None);
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_deterministic() {
        let map = create_basic_map();
        for algorithm in [Algorithm::Bfs, Algorithm::AStar] {
            let first = algorithm.run(&map, p(5, 6), p(1, 5)).unwrap();
            let second = algorithm.run(&map, p(5, 6), p(1, 5)).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_exhaustive_small_grids() {
        // every wall layout of a 3x3 grid, every free start, every goal
        for mask in 0u32..(1 << 9) {
            let mut map = GridMap::new(3, 3, Cell::Free);
            for i in 0..9 {
                if mask & (1 << i) != 0 {
                    map.set(p(i / 3, i % 3), Cell::Blocked);
                }
            }

            for start in map.free_cells().collect::<Vec<_>>() {
                let dist = brute_force_distances(&map, start);

                for goal in (0..9).map(|i| p(i / 3, i % 3)) {
                    let bfs_outcome = bfs(&map, start, goal).unwrap();
                    let astar_outcome = astar(&map, start, goal).unwrap();

                    let expected = Some(dist.get(goal)).filter(|d| *d != UNREACHABLE);
                    assert_eq!(bfs_outcome.path_len(), expected, "bfs {mask:09b} {start} {goal}");
                    assert_eq!(astar_outcome.path_len(), expected, "astar {mask:09b} {start} {goal}");

                    for outcome in [&bfs_outcome, &astar_outcome] {
                        if let Some(path) = &outcome.path {
                            assert_valid_path(&map, path, start, goal);
                        }
                        assert_valid_order(outcome, &dist, goal);
                    }

                    if expected.is_none() {
                        // without a goal to stop at, both searches flood the whole component
                        let component = map
                            .free_cells()
                            .filter(|p| dist.get(*p) != UNREACHABLE)
                            .count();
                        assert_eq!(bfs_outcome.order.len(), component);
                        assert_eq!(astar_outcome.order.len(), component);
                    }
                }
            }
        }
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!("bfs".parse::<Algorithm>().unwrap(), Algorithm::Bfs);
        assert_eq!("astar".parse::<Algorithm>().unwrap(), Algorithm::AStar);
        assert!("dijkstra".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::AStar.to_string(), "astar");
    }
}
