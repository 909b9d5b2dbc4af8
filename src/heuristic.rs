use crate::analysis::{Analysis, INFINITY};
use crate::grid::Position;

/// Stand-in cost for box/goal pairs with no pull path: large enough to sort
/// after every real distance (a 64x64 board caps real pull distances well
/// below it), small enough that a full matching of such pairs stays far
/// from `u32` overflow.
pub const UNREACHABLE_COST: u32 = 100_000;

/// Estimate the pushes remaining by matching boxes to goals greedily over
/// the precomputed pull distances and summing the matched edges.
///
/// Unreachable pairs take part with [`UNREACHABLE_COST`] so they match
/// last; a sum that still ends up containing a true infinity collapses to
/// zero (such states are rejected by the deadlock prunings, not here).
pub fn greedy_matching(analysis: &Analysis, boxes: &[Position]) -> u32 {
    let goal_count = analysis.goal_count();

    let mut edges: Vec<(u32, usize, usize)> = Vec::with_capacity(goal_count * boxes.len());
    for goal_idx in 0..goal_count {
        for (box_idx, &pos) in boxes.iter().enumerate() {
            let dist = analysis.distance(goal_idx, pos);
            let cost = if dist == INFINITY {
                UNREACHABLE_COST
            } else {
                u32::from(dist)
            };
            edges.push((cost, goal_idx, box_idx));
        }
    }
    // Stable, so equal distances keep their goal-major enumeration order.
    edges.sort_by_key(|&(cost, _, _)| cost);

    let mut matched_goals = vec![false; goal_count];
    let mut matched_boxes = vec![false; boxes.len()];
    let mut total: u32 = 0;
    let mut matched = 0;

    for &(cost, goal_idx, box_idx) in &edges {
        if !matched_goals[goal_idx] && !matched_boxes[box_idx] {
            matched_goals[goal_idx] = true;
            matched_boxes[box_idx] = true;
            total += cost;
            matched += 1;
            if matched == boxes.len() {
                break;
            }
        }
    }

    // Pair any box left over with the nearest goal still free, at its true
    // distance. With a full bipartite edge list this only happens when
    // there are more boxes than goals.
    let mut infinite = false;
    for (box_idx, &pos) in boxes.iter().enumerate() {
        if matched_boxes[box_idx] {
            continue;
        }
        let nearest = (0..goal_count)
            .filter(|&goal_idx| !matched_goals[goal_idx])
            .min_by_key(|&goal_idx| analysis.distance(goal_idx, pos));
        if let Some(goal_idx) = nearest {
            matched_goals[goal_idx] = true;
            let dist = analysis.distance(goal_idx, pos);
            if dist == INFINITY {
                infinite = true;
            } else {
                total += u32::from(dist);
            }
        }
    }

    if infinite { 0 } else { total }
}
