use log::{debug, info};

use crate::domain::{SokobanDomain, State};
use crate::grid::step;
use crate::map::{Map, MapError};
use crate::plan::Plan;
use crate::search::{SearchTree, Strategy};

/// Outcome of one solve: the keystroke plan, if any, and how many states
/// the outer search visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveReport {
    pub plan: Option<Plan>,
    pub visited: usize,
}

/// Ties the pieces together: static analysis happens once at construction,
/// each `solve` call runs a fresh search over it.
pub struct Solver {
    domain: SokobanDomain,
}

impl Solver {
    pub fn new(map: Map) -> Solver {
        debug!("preparing solver for a {}x{} level", map.width(), map.height());
        Solver {
            domain: SokobanDomain::new(map),
        }
    }

    pub fn solve(&mut self, strategy: Strategy) -> SolveReport {
        self.domain.reset();
        let initial = self.domain.initial_state();
        let goal = self.domain.goal();

        debug!("searching with {:?} strategy", strategy);
        let mut tree = SearchTree::new(&mut self.domain, initial, goal, strategy);
        let (pushes, visited) = match tree.search() {
            Some(node) => (Some(tree.plan(node)), tree.visited_count()),
            None => (None, tree.visited_count()),
        };

        let plan = pushes.map(|pushes| {
            let plan = Plan::from_pushes(&pushes);
            let end = replay(self.domain.map(), &plan);
            assert!(
                end.sorted_boxes() == self.domain.goal(),
                "solution replay does not solve the level"
            );
            plan
        });

        match &plan {
            Some(plan) => info!("plan found: {} keys, {} states visited", plan.len(), visited),
            None => info!("no plan, {} states visited", visited),
        }

        SolveReport { plan, visited }
    }
}

/// Parse and solve a level in one go.
pub fn solve_level(text: &str, strategy: Strategy) -> Result<SolveReport, MapError> {
    let map = Map::from_text(text)?;
    let mut solver = Solver::new(map);
    Ok(solver.solve(strategy))
}

/// Apply a keystroke plan to the map's initial state, checking every step:
/// the keeper never enters a wall, and a push moves exactly one box into a
/// free cell. Panics on an illegal plan.
pub fn replay(map: &Map, plan: &Plan) -> State {
    let mut keeper = map.keeper();
    let mut boxes = map.boxes().to_vec();

    for &dir in plan.keys() {
        let dest = step(keeper, dir, map.size()).expect("keeper steps off the map");
        assert!(!map.is_blocked(dest), "keeper walks into a wall at {dest}");
        if let Some(idx) = boxes.iter().position(|&b| b == dest) {
            let box_dest = step(dest, dir, map.size()).expect("box pushed off the map");
            assert!(
                !map.is_blocked(box_dest),
                "box pushed into a wall at {box_dest}"
            );
            assert!(
                !boxes.contains(&box_dest),
                "box pushed into a box at {box_dest}"
            );
            boxes[idx] = box_dest;
        }
        keeper = dest;
    }

    State::new(keeper, boxes)
}
