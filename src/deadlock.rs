use fnv::FnvHashSet;

use crate::analysis::Analysis;
use crate::grid::{ALL_DIRECTIONS, Direction, Position, step, unstep};
use crate::map::Map;

/// Cells treated as walls on top of the map's own, used by the freeze
/// recursion when it commits a box as immovable.
pub type ExtraWalls = FnvHashSet<Position>;

/// Whether the box at `box_pos` can be pushed one cell towards `dir`:
/// the destination must be free (and not a cell boxes can never leave),
/// and the keeper must have a free cell to push from.
pub fn is_push_legal(
    map: &Map,
    analysis: &Analysis,
    boxes: &[Position],
    extra_walls: &ExtraWalls,
    box_pos: Position,
    dir: Direction,
) -> bool {
    let Some(dest) = step(box_pos, dir, map.size()) else {
        return false;
    };
    let Some(keeper_cell) = unstep(box_pos, dir, map.size()) else {
        return false;
    };

    !map.is_blocked(dest)
        && !extra_walls.contains(&dest)
        && !boxes.contains(&dest)
        && !analysis.is_simple_deadlock(dest)
        && !map.is_blocked(keeper_cell)
        && !extra_walls.contains(&keeper_cell)
        && !boxes.contains(&keeper_cell)
}

/// Whether the box at `box_pos` is frozen: no direction admits a push, and
/// every adjacent box is itself frozen once this one is committed as a
/// wall. A box walled in with no box neighbours is trivially frozen.
pub fn freeze_deadlock(
    map: &Map,
    analysis: &Analysis,
    boxes: &[Position],
    extra_walls: &ExtraWalls,
    box_pos: Position,
) -> bool {
    if ALL_DIRECTIONS
        .iter()
        .any(|&dir| is_push_legal(map, analysis, boxes, extra_walls, box_pos, dir))
    {
        return false;
    }

    for dir in ALL_DIRECTIONS {
        let Some(neighbour) = step(box_pos, dir, map.size()) else {
            continue;
        };
        if !boxes.contains(&neighbour) {
            continue;
        }
        let remaining: Vec<Position> =
            boxes.iter().copied().filter(|&b| b != box_pos).collect();
        let mut walls = extra_walls.clone();
        walls.insert(box_pos);
        if !freeze_deadlock(map, analysis, &remaining, &walls, neighbour) {
            return false;
        }
    }

    true
}

/// Whether any area holds more boxes than its signature has goals. Every
/// box inside an area can only ever reach that area's goals, so this is a
/// pigeonhole proof of unsolvability.
pub fn area_overflow(analysis: &Analysis, boxes: &[Position]) -> bool {
    analysis.areas().iter().any(|area| {
        let inside = boxes.iter().filter(|b| area.cells.contains(b)).count();
        inside > area.goals.len()
    })
}

/// Whether pushing the box at `box_pos` towards `dir` produces a state no
/// plan can pass through. The push itself must already be legal.
pub fn creates_deadlock(
    map: &Map,
    analysis: &Analysis,
    boxes: &[Position],
    box_pos: Position,
    dir: Direction,
) -> bool {
    let Some(dest) = step(box_pos, dir, map.size()) else {
        return true;
    };

    let mut moved: Vec<Position> = boxes.iter().copied().filter(|&b| b != box_pos).collect();
    moved.push(dest);

    if area_overflow(analysis, &moved) {
        return true;
    }

    // A frozen box is only fatal off its goal.
    !map.is_goal(dest) && freeze_deadlock(map, analysis, &moved, &ExtraWalls::default(), dest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> (Map, Analysis) {
        let map = Map::from_text(text.trim_matches('\n')).unwrap();
        let analysis = Analysis::new(&map);
        (map, analysis)
    }

    #[test]
    fn test_push_legality() {
        let (map, analysis) = parse(
            r#"
#######
#@    #
# $$ .#
# .   #
#######
"#,
        );
        let boxes = map.boxes().to_vec();
        let none = ExtraWalls::default();

        // Left box: pushing right runs into the other box
        assert!(!is_push_legal(
            &map,
            &analysis,
            &boxes,
            &none,
            Position(2, 2),
            Direction::Right
        ));
        // Left box: pushing down is fine
        assert!(is_push_legal(
            &map,
            &analysis,
            &boxes,
            &none,
            Position(2, 2),
            Direction::Down
        ));
        // Left box: pushing left needs the keeper inside the right box
        assert!(!is_push_legal(
            &map,
            &analysis,
            &boxes,
            &none,
            Position(2, 2),
            Direction::Left
        ));
        // Right box: the top row cannot be pulled down to any goal, so
        // pushing onto it is refused outright
        assert!(!is_push_legal(
            &map,
            &analysis,
            &boxes,
            &none,
            Position(3, 2),
            Direction::Up
        ));
    }

    #[test]
    fn test_cornered_box_is_frozen() {
        let (map, analysis) = parse(
            r#"
######
#@  $#
# .  #
#    #
######
"#,
        );
        let boxes = map.boxes().to_vec();
        assert!(freeze_deadlock(
            &map,
            &analysis,
            &boxes,
            &ExtraWalls::default(),
            Position(4, 1)
        ));
    }

    #[test]
    fn test_mutual_freeze_rejected() {
        // Pushing the lone free box up completes a 2x2 block: every box in
        // it loses all push directions once its neighbours count as walls.
        let (map, analysis) = parse(
            r#"
########
#      #
# $$   #
# $ .  #
# .$.  #
#  @ . #
########
"#,
        );
        let boxes = map.boxes().to_vec();

        assert!(is_push_legal(
            &map,
            &analysis,
            &boxes,
            &ExtraWalls::default(),
            Position(3, 4),
            Direction::Up
        ));
        assert!(creates_deadlock(
            &map,
            &analysis,
            &boxes,
            Position(3, 4),
            Direction::Up
        ));
        // Pushing the same box left lands it on a goal: no deadlock.
        assert!(!creates_deadlock(
            &map,
            &analysis,
            &boxes,
            Position(3, 4),
            Direction::Left
        ));
    }

    #[test]
    fn test_frozen_on_goal_is_no_deadlock() {
        // The box ends in a corner formed by walls, but on its goal.
        let (map, analysis) = parse(
            r#"
#####
#@$.#
#####
"#,
        );
        let boxes = map.boxes().to_vec();
        assert!(!creates_deadlock(
            &map,
            &analysis,
            &boxes,
            Position(2, 1),
            Direction::Right
        ));
    }

    #[test]
    fn test_area_overflow() {
        // Bottom pocket: three cells' worth of boxes but only two goals
        // reachable from them.
        let (_map, analysis) = parse(
            r#"
########
#@ $  .#
#### ###
#### ###
#..$$  #
########
"#,
        );

        assert!(area_overflow(
            &analysis,
            &[Position(3, 4), Position(4, 4), Position(5, 4)]
        ));
        assert!(!area_overflow(&analysis, &[Position(3, 4), Position(4, 4)]));
    }
}
