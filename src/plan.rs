use std::fmt;

use crate::domain::PushPlan;
use crate::grid::Direction;

/// The finished keystroke sequence, one `w/a/s/d` key per keeper step.
/// This is what the embedding client transmits.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Plan(Vec<Direction>);

impl Plan {
    pub fn new() -> Plan {
        Plan(Vec::new())
    }

    /// Flatten a solved push sequence into keystrokes.
    pub fn from_pushes(pushes: &[PushPlan]) -> Plan {
        Plan(
            pushes
                .iter()
                .flat_map(|push| push.keys.iter().copied())
                .collect(),
        )
    }

    pub fn keys(&self) -> &[Direction] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.0 {
            write!(f, "{}", key.key())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Position;

    #[test]
    fn test_flattening_preserves_order() {
        let pushes = [
            PushPlan {
                box_pos: Position(2, 1),
                keys: vec![Direction::Down, Direction::Right],
            },
            PushPlan {
                box_pos: Position(2, 2),
                keys: vec![Direction::Up],
            },
        ];
        let plan = Plan::from_pushes(&pushes);
        assert_eq!(
            plan.keys(),
            &[Direction::Down, Direction::Right, Direction::Up]
        );
        assert_eq!(plan.to_string(), "sdw");
        assert_eq!(plan.len(), 3);
    }

    #[test]
    fn test_empty_plan() {
        let plan = Plan::from_pushes(&[]);
        assert!(plan.is_empty());
        assert_eq!(plan.to_string(), "");
    }
}
