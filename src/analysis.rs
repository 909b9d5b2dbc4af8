use std::collections::VecDeque;

use fnv::FnvHashMap;
use log::debug;

use crate::grid::{ALL_DIRECTIONS, MAX_SIZE, Position, step};
use crate::map::Map;

/// Marker for cells no pull sequence reaches.
pub const INFINITY: u16 = u16::MAX;

type DistGrid = [[u16; MAX_SIZE]; MAX_SIZE];

/// Cells sharing the same set of reachable goals, with that set as the
/// capacity bound: more boxes than goals inside one area can never all be
/// solved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Area {
    pub goals: Vec<Position>,
    pub cells: Vec<Position>,
}

/// Static tables computed once per level from the empty map (no boxes, no
/// keeper) and never mutated afterwards.
#[derive(PartialEq, Eq)]
pub struct Analysis {
    distances: Vec<Box<DistGrid>>,
    simple_deadlocks: [[bool; MAX_SIZE]; MAX_SIZE],
    areas: Vec<Area>,
}

impl Analysis {
    pub fn new(map: &Map) -> Self {
        let distances: Vec<Box<DistGrid>> = map
            .goals()
            .iter()
            .map(|&goal| pull_distances(map, goal))
            .collect();

        // A walkable cell no goal can pull from is dead for boxes forever.
        let mut simple_deadlocks = [[false; MAX_SIZE]; MAX_SIZE];
        let mut deadlock_count = 0;
        for pos in map.walkable_cells() {
            if distances
                .iter()
                .all(|grid| grid[pos.1 as usize][pos.0 as usize] == INFINITY)
            {
                simple_deadlocks[pos.1 as usize][pos.0 as usize] = true;
                deadlock_count += 1;
            }
        }

        // Group the remaining cells by their reachable-goal signature.
        let mut groups: FnvHashMap<Vec<Position>, Vec<Position>> = FnvHashMap::default();
        for pos in map.walkable_cells() {
            if simple_deadlocks[pos.1 as usize][pos.0 as usize] {
                continue;
            }
            let signature: Vec<Position> = map
                .goals()
                .iter()
                .enumerate()
                .filter(|&(idx, _)| {
                    distances[idx][pos.1 as usize][pos.0 as usize] != INFINITY
                })
                .map(|(_, &goal)| goal)
                .collect();
            groups.entry(signature).or_default().push(pos);
        }
        let mut areas: Vec<Area> = groups
            .into_iter()
            .map(|(goals, cells)| Area { goals, cells })
            .collect();
        areas.sort_by(|a, b| a.goals.cmp(&b.goals));

        debug!(
            "analysed level: {} goals, {} simple deadlocks, {} areas",
            map.goals().len(),
            deadlock_count,
            areas.len()
        );

        Analysis {
            distances,
            simple_deadlocks,
            areas,
        }
    }

    pub fn goal_count(&self) -> usize {
        self.distances.len()
    }

    /// Minimum pushes to bring a box from `pos` onto the goal with index
    /// `goal_idx` (in `Map::goals` order) across the empty map, or
    /// [`INFINITY`].
    pub fn distance(&self, goal_idx: usize, pos: Position) -> u16 {
        self.distances[goal_idx][pos.1 as usize][pos.0 as usize]
    }

    pub fn is_simple_deadlock(&self, pos: Position) -> bool {
        self.simple_deadlocks[pos.1 as usize][pos.0 as usize]
    }

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }
}

/// BFS over the pull relation: from `pos`, a box lands on `step(pos, dir)`
/// with the puller on the cell beyond. FIFO order makes each recorded
/// distance the minimum push count.
fn pull_distances(map: &Map, goal: Position) -> Box<DistGrid> {
    let mut dist = Box::new([[INFINITY; MAX_SIZE]; MAX_SIZE]);
    dist[goal.1 as usize][goal.0 as usize] = 0;

    let mut queue = VecDeque::new();
    queue.push_back(goal);

    while let Some(pos) = queue.pop_front() {
        let d = dist[pos.1 as usize][pos.0 as usize];

        for dir in ALL_DIRECTIONS {
            if let Some(box_pos) = step(pos, dir, map.size()) {
                if let Some(puller_pos) = step(box_pos, dir, map.size()) {
                    if !map.is_blocked(box_pos)
                        && !map.is_blocked(puller_pos)
                        && dist[box_pos.1 as usize][box_pos.0 as usize] == INFINITY
                    {
                        dist[box_pos.1 as usize][box_pos.0 as usize] = d + 1;
                        queue.push_back(box_pos);
                    }
                }
            }
        }
    }

    dist
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Map {
        Map::from_text(text.trim_matches('\n')).unwrap()
    }

    #[test]
    fn test_trivial_distances() {
        let map = parse(
            r#"
#####
#@$.#
#####
"#,
        );
        let analysis = Analysis::new(&map);

        assert_eq!(analysis.goal_count(), 1);
        // The goal itself
        assert_eq!(analysis.distance(0, Position(3, 1)), 0);
        // The box cell: one push right
        assert_eq!(analysis.distance(0, Position(2, 1)), 1);
        // The keeper cell: a box here cannot be pushed right (no room to
        // stand behind it)
        assert_eq!(analysis.distance(0, Position(1, 1)), INFINITY);
    }

    #[test]
    fn test_pull_distance_matches_push_reachability() {
        // A box in the corner (4, 1) can never be pushed anywhere, so no
        // goal reaches it; (3, 2) is one pull away from the goal.
        let map = parse(
            r#"
######
#@  $#
# .  #
#    #
######
"#,
        );
        let analysis = Analysis::new(&map);

        assert_eq!(analysis.distance(0, Position(2, 2)), 0);
        assert_eq!(analysis.distance(0, Position(3, 2)), 1);
        assert_eq!(analysis.distance(0, Position(4, 1)), INFINITY);
        assert!(analysis.is_simple_deadlock(Position(4, 1)));
        assert!(!analysis.is_simple_deadlock(Position(3, 2)));
    }

    #[test]
    fn test_corner_cells_are_simple_deadlocks() {
        let map = parse(
            r#"
######
#@   #
# $. #
#    #
######
"#,
        );
        let analysis = Analysis::new(&map);

        for corner in [
            Position(1, 1),
            Position(4, 1),
            Position(1, 3),
            Position(4, 3),
        ] {
            assert!(
                analysis.is_simple_deadlock(corner),
                "{} should be a simple deadlock",
                corner
            );
        }
        assert!(!analysis.is_simple_deadlock(Position(2, 2)));
        assert!(!analysis.is_simple_deadlock(Position(3, 2)));
    }

    #[test]
    fn test_area_partition() {
        // The bottom room hangs off a one-way column: boxes inside can only
        // be shuffled sideways towards the two pocket goals, never pushed
        // back up (the keeper would need to stand below the bottom row).
        let map = parse(
            r#"
########
#@ $  .#
#### ###
#### ###
#..$$  #
########
"#,
        );
        let analysis = Analysis::new(&map);

        let pocket = analysis
            .areas()
            .iter()
            .find(|area| area.goals == vec![Position(1, 4), Position(2, 4)])
            .expect("pocket area missing");
        for cell in [Position(3, 4), Position(4, 4), Position(5, 4)] {
            assert!(pocket.cells.contains(&cell), "{} not in pocket", cell);
        }
        // Top-row cells reach only the top goal.
        let top = analysis
            .areas()
            .iter()
            .find(|area| area.goals == vec![Position(6, 1)])
            .expect("top area missing");
        assert!(top.cells.contains(&Position(3, 1)));
    }

    #[test]
    fn test_recomputation_is_identical() {
        let map = parse(
            r#"
########
#@ $  .#
#### ###
#### ###
#..$$  #
########
"#,
        );
        assert!(Analysis::new(&map) == Analysis::new(&map));
    }
}
