use fnv::FnvHashMap;

use crate::analysis::Analysis;
use crate::deadlock::{ExtraWalls, creates_deadlock, is_push_legal};
use crate::grid::{ALL_DIRECTIONS, Direction, Position, step, unstep};
use crate::heuristic::greedy_matching;
use crate::keeper::keeper_path;
use crate::map::Map;
use crate::search::{Actions, SearchDomain};

/// A macro-state of the outer search: where the keeper stands and where
/// the boxes are. Box order is incidental; comparisons sort first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    pub keeper: Position,
    pub boxes: Vec<Position>,
}

impl State {
    pub fn new(keeper: Position, boxes: Vec<Position>) -> State {
        State { keeper, boxes }
    }

    pub fn sorted_boxes(&self) -> Vec<Position> {
        let mut boxes = self.boxes.clone();
        boxes.sort_unstable();
        boxes
    }
}

/// One box push together with the walk that lines the keeper up for it.
/// The final key is the push itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPlan {
    pub box_pos: Position,
    pub keys: Vec<Direction>,
}

/// The outer search domain: states move one box per action, and keeper
/// walking happens inside action enumeration rather than in the tree.
pub struct SokobanDomain {
    map: Map,
    analysis: Analysis,
    // Keepers already expanded per box configuration, keyed by sorted
    // box vectors.
    visited_keepers: FnvHashMap<Vec<Position>, Vec<Position>>,
}

impl SokobanDomain {
    pub fn new(map: Map) -> SokobanDomain {
        let analysis = Analysis::new(&map);
        SokobanDomain {
            map,
            analysis,
            visited_keepers: FnvHashMap::default(),
        }
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn initial_state(&self) -> State {
        State::new(self.map.keeper(), self.map.boxes().to_vec())
    }

    /// The goal the search tests against: the goal cells, sorted.
    pub fn goal(&self) -> Vec<Position> {
        let mut goals = self.map.goals().to_vec();
        goals.sort_unstable();
        goals
    }

    /// Forget the keepers recorded by previous searches.
    pub fn reset(&mut self) {
        self.visited_keepers.clear();
    }

    /// Whether an already-expanded state with the same boxes had its keeper
    /// in the same connected region. Keeper-only walks cost nothing towards
    /// the goal test, so such a state expands to the same pushes.
    fn dominated(&self, state: &State) -> bool {
        let Some(keepers) = self.visited_keepers.get(&state.sorted_boxes()) else {
            return false;
        };
        keepers
            .iter()
            .any(|&seen| keeper_path(&self.map, &state.boxes, state.keeper, seen).is_some())
    }

    fn allowed(&self, state: &State, box_pos: Position, dir: Direction) -> bool {
        is_push_legal(
            &self.map,
            &self.analysis,
            &state.boxes,
            &ExtraWalls::default(),
            box_pos,
            dir,
        ) && !creates_deadlock(&self.map, &self.analysis, &state.boxes, box_pos, dir)
    }
}

impl SearchDomain for SokobanDomain {
    type State = State;
    type Action = PushPlan;
    type Goal = Vec<Position>;
    type Key = (Position, Vec<Position>);

    fn actions(&mut self, state: &State) -> Actions<PushPlan> {
        if self.dominated(state) {
            return Actions::SkipDominated;
        }
        self.visited_keepers
            .entry(state.sorted_boxes())
            .or_default()
            .push(state.keeper);

        let mut pushes = Vec::new();
        for &box_pos in &state.boxes {
            for &dir in &ALL_DIRECTIONS {
                if !self.allowed(state, box_pos, dir) {
                    continue;
                }
                // is_push_legal already proved the stand cell exists
                let stand = unstep(box_pos, dir, self.map.size())
                    .expect("legal push without a cell to push from");
                if let Some(mut keys) = keeper_path(&self.map, &state.boxes, state.keeper, stand) {
                    keys.push(dir);
                    pushes.push(PushPlan { box_pos, keys });
                }
            }
        }
        Actions::Expand(pushes)
    }

    fn result(&self, state: &State, action: &PushPlan) -> State {
        let dir = *action.keys.last().expect("push plan without a push key");
        assert!(
            state.boxes.contains(&action.box_pos),
            "push targets a box missing from the state"
        );
        let dest =
            step(action.box_pos, dir, self.map.size()).expect("push drives a box off the map");

        let mut boxes: Vec<Position> = state
            .boxes
            .iter()
            .copied()
            .filter(|&b| b != action.box_pos)
            .collect();
        boxes.push(dest);

        // The keeper ends on the cell the box vacated.
        State::new(action.box_pos, boxes)
    }

    fn cost(&self, _state: &State, action: &PushPlan) -> u32 {
        action.keys.len() as u32
    }

    fn heuristic(&self, state: &State, _goal: &Vec<Position>) -> u32 {
        greedy_matching(&self.analysis, &state.boxes)
    }

    fn equivalent(&self, a: &State, b: &State) -> bool {
        a.keeper == b.keeper && a.sorted_boxes() == b.sorted_boxes()
    }

    fn satisfies(&self, state: &State, goal: &Vec<Position>) -> bool {
        state.sorted_boxes() == *goal
    }

    fn key(&self, state: &State) -> (Position, Vec<Position>) {
        (state.keeper, state.sorted_boxes())
    }
}
