use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap},
};

use tracing::debug;

use crate::{
    ActionId, Position,
    action::ActionCatalog,
    field::{GameField, ObstacleSet},
};

/// Returns manhattan distance between two positions
fn manhattan_distance(a: Position, b: Position) -> u64 {
    u64::from(a.x.abs_diff(b.x)) + u64::from(a.y.abs_diff(b.y))
}

/// Finds a shortest sequence of action ids leading from the field's start to
/// its end, using A* over the cells the checker would accept.
///
/// Moves follow the same rules as the checker: only the landing cell of an
/// action must be inside the field and free of obstacles. Returns `None` when
/// the end cannot be reached with the given actions.
pub fn solve(
    field: &GameField,
    obstacles: &ObstacleSet,
    catalog: &ActionCatalog,
) -> Option<Vec<ActionId>> {
    // For priority queue
    #[derive(Clone, Eq, PartialEq)]
    struct PrioritizedItem {
        priority: u64,
        cost: u64,
        position: Position,
    }

    impl Ord for PrioritizedItem {
        fn cmp(&self, other: &Self) -> Ordering {
            // Reverse ordering for min-heap behavior
            other
                .priority
                .cmp(&self.priority)
                .then_with(|| self.cost.cmp(&other.cost))
                .then_with(|| other.position.cmp(&self.position))
        }
    }

    impl PartialOrd for PrioritizedItem {
        fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
            Some(self.cmp(other))
        }
    }

    let start = field.start();
    let goal = field.end();
    if start == goal {
        return Some(Vec::new());
    }

    let moves: Vec<(ActionId, i32, i32)> = catalog
        .iter()
        .filter(|action| action.dx != 0 || action.dy != 0)
        .map(|action| (action.id, action.dx, action.dy))
        .collect();

    // Largest manhattan distance a single action covers; keeps the heuristic admissible.
    let reach = moves
        .iter()
        .map(|(_, dx, dy)| u64::from(dx.unsigned_abs()) + u64::from(dy.unsigned_abs()))
        .max()?;
    let heuristic = |position: Position| manhattan_distance(position, goal).div_ceil(reach);

    let mut frontier = BinaryHeap::new();
    let mut came_from: HashMap<Position, (Position, ActionId)> = HashMap::new();
    let mut cost_so_far: HashMap<Position, u64> = HashMap::new();

    frontier.push(PrioritizedItem {
        priority: heuristic(start),
        cost: 0,
        position: start,
    });
    cost_so_far.insert(start, 0);

    let mut goal_reached = false;

    while let Some(PrioritizedItem {
        position: current,
        cost,
        ..
    }) = frontier.pop()
    {
        if current == goal {
            goal_reached = true;
            break;
        }
        // Skip stale queue entries
        if cost_so_far.get(&current).is_some_and(|&best| cost > best) {
            continue;
        }

        for &(id, dx, dy) in &moves {
            let Some(neighbor) = current.offset(dx, dy) else {
                continue;
            };
            if !field.contains(neighbor) || obstacles.contains(neighbor) {
                continue;
            }

            let new_cost = cost + 1;
            if cost_so_far.get(&neighbor).is_none_or(|&known| new_cost < known) {
                cost_so_far.insert(neighbor, new_cost);
                came_from.insert(neighbor, (current, id));
                frontier.push(PrioritizedItem {
                    priority: new_cost + heuristic(neighbor),
                    cost: new_cost,
                    position: neighbor,
                });
            }
        }
    }

    if !goal_reached {
        debug!(%start, %goal, "no solution found");
        return None;
    }

    // Reconstruct path
    let mut answer = Vec::new();
    let mut current = goal;
    while current != start {
        let (previous, id) = *came_from.get(&current)?;
        answer.push(id);
        current = previous;
    }

    answer.reverse();
    debug!(%start, %goal, steps = answer.len(), "solution found");
    Some(answer)
}
