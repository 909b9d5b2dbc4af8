use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;

use log::warn;

use crate::grid::Direction;
use crate::plan::Plan;
use crate::search::Strategy;
use crate::solver::solve_level;

/// Hand-off cell between one solver thread and one consumer.
///
/// The consumer polls [`next_key`](SharedPlan::next_key) and sees nothing
/// until the solver publishes a complete plan; afterwards the keys drain
/// front to back. The mutex makes the publish visible as a whole, never as
/// a partially built list.
#[derive(Clone, Default)]
pub struct SharedPlan {
    slot: Arc<Mutex<Option<VecDeque<Direction>>>>,
}

impl SharedPlan {
    pub fn new() -> SharedPlan {
        SharedPlan::default()
    }

    /// Publish a finished plan. Called once per level by the solver side.
    pub fn publish(&self, plan: Plan) {
        let mut slot = self.slot.lock().expect("plan cell poisoned");
        *slot = Some(plan.keys().iter().copied().collect());
    }

    /// Take the next keystroke, or `None` while no plan is published or
    /// once the plan has drained.
    pub fn next_key(&self) -> Option<char> {
        let mut slot = self.slot.lock().expect("plan cell poisoned");
        slot.as_mut()
            .and_then(|keys| keys.pop_front())
            .map(|dir| dir.key())
    }

    pub fn is_published(&self) -> bool {
        self.slot.lock().expect("plan cell poisoned").is_some()
    }
}

/// Solve a level on a background thread and publish the result. A level
/// the solver rejects or cannot solve publishes the empty plan, so the
/// consumer simply has no keys to send. The thread is detached; dropping
/// the handle abandons the result.
pub fn solve_in_background(level: String, strategy: Strategy) -> SharedPlan {
    let handle = SharedPlan::new();
    let shared = handle.clone();

    thread::spawn(move || {
        let plan = match solve_level(&level, strategy) {
            Ok(report) => report.plan.unwrap_or_default(),
            Err(err) => {
                warn!("level rejected: {}", err);
                Plan::new()
            }
        };
        shared.publish(plan);
    });

    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use crate::domain::PushPlan;
    use crate::grid::Position;

    #[test]
    fn test_nothing_before_publish() {
        let shared = SharedPlan::new();
        assert!(!shared.is_published());
        assert_eq!(shared.next_key(), None);
    }

    #[test]
    fn test_drains_front_to_back() {
        let shared = SharedPlan::new();
        shared.publish(Plan::from_pushes(&[PushPlan {
            box_pos: Position(2, 1),
            keys: vec![Direction::Down, Direction::Right, Direction::Up],
        }]));

        assert!(shared.is_published());
        assert_eq!(shared.next_key(), Some('s'));
        assert_eq!(shared.next_key(), Some('d'));
        assert_eq!(shared.next_key(), Some('w'));
        assert_eq!(shared.next_key(), None);
    }

    #[test]
    fn test_background_solve() {
        let shared = solve_in_background("#####\n#@$.#\n#####".to_owned(), Strategy::Greedy);

        let deadline = Instant::now() + Duration::from_secs(10);
        while !shared.is_published() {
            assert!(Instant::now() < deadline, "solver thread never published");
            thread::sleep(Duration::from_millis(1));
        }

        assert_eq!(shared.next_key(), Some('d'));
        assert_eq!(shared.next_key(), None);
    }

    #[test]
    fn test_background_solve_of_malformed_level() {
        let shared = solve_in_background("####\n#  #\n####".to_owned(), Strategy::Greedy);

        let deadline = Instant::now() + Duration::from_secs(10);
        while !shared.is_published() {
            assert!(Instant::now() < deadline, "solver thread never published");
            thread::sleep(Duration::from_millis(1));
        }

        // Published, but empty: there is nothing to send.
        assert_eq!(shared.next_key(), None);
    }
}
