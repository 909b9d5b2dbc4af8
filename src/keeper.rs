use fnv::FnvHashSet;

use crate::grid::{ALL_DIRECTIONS, Direction, Position, manhattan, step};
use crate::map::Map;
use crate::search::{Actions, SearchDomain, SearchTree, Strategy};

/// Walking domain for the keeper alone: the box configuration is frozen
/// and counts as obstacles alongside the walls.
pub struct KeeperDomain<'m> {
    map: &'m Map,
    boxes: FnvHashSet<Position>,
}

impl<'m> KeeperDomain<'m> {
    pub fn new(map: &'m Map, boxes: &[Position]) -> Self {
        KeeperDomain {
            map,
            boxes: boxes.iter().copied().collect(),
        }
    }

    fn can_walk(&self, from: Position, dir: Direction) -> bool {
        match step(from, dir, self.map.size()) {
            Some(dest) => !self.map.is_blocked(dest) && !self.boxes.contains(&dest),
            None => false,
        }
    }
}

impl SearchDomain for KeeperDomain<'_> {
    type State = Position;
    type Action = Direction;
    type Goal = Position;
    type Key = Position;

    fn actions(&mut self, state: &Position) -> Actions<Direction> {
        Actions::Expand(
            ALL_DIRECTIONS
                .iter()
                .copied()
                .filter(|&dir| self.can_walk(*state, dir))
                .collect(),
        )
    }

    fn result(&self, state: &Position, action: &Direction) -> Position {
        step(*state, *action, self.map.size()).expect("walk action leaves the map")
    }

    fn cost(&self, _state: &Position, _action: &Direction) -> u32 {
        1
    }

    fn heuristic(&self, state: &Position, goal: &Position) -> u32 {
        manhattan(*state, *goal)
    }

    fn equivalent(&self, a: &Position, b: &Position) -> bool {
        a == b
    }

    fn satisfies(&self, state: &Position, goal: &Position) -> bool {
        state == goal
    }

    fn key(&self, state: &Position) -> Position {
        *state
    }
}

/// Find a walk for the keeper from `start` to `target` with the given
/// boxes in place. Returns the keystrokes exclusive of any push, or `None`
/// when the target is unreachable.
pub fn keeper_path(
    map: &Map,
    boxes: &[Position],
    start: Position,
    target: Position,
) -> Option<Vec<Direction>> {
    let mut domain = KeeperDomain::new(map, boxes);
    let mut tree = SearchTree::new(&mut domain, start, target, Strategy::Greedy);
    let solution = tree.search()?;
    Some(tree.plan(solution))
}
