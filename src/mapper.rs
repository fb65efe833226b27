use std::collections::{HashMap, VecDeque};

use crate::grid::NeighborGraph;
use crate::solver::Assignment;
use crate::types::{Person, SeatingChart, SeatingOptions};

/// Fills each assigned seat with the next person of its category, in input
/// order, walking the grid row-major.
pub fn map_people(assignment: &Assignment, people: &[Person], options: SeatingOptions) -> SeatingChart {
    let grid = assignment.grid;

    let mut queues: HashMap<&str, VecDeque<&Person>> = HashMap::new();
    for person in people {
        queues
            .entry(person.category.as_str())
            .or_default()
            .push_back(person);
    }

    let mut rows = Vec::with_capacity(grid.rows);
    let mut seated = 0;
    for row in 0..grid.rows {
        let mut seats = Vec::with_capacity(grid.columns);
        for column in 0..grid.columns {
            let seat = grid.index(row, column);
            let Some(category) = assignment.category(seat) else {
                seats.push(None);
                continue;
            };
            let person = match queues.get_mut(category).and_then(VecDeque::pop_front) {
                Some(p) => p.clone(),
                None => {
                    tracing::error!(
                        category,
                        seat,
                        "no person left for assigned seat; emitting placeholder"
                    );
                    Person::placeholder(category)
                }
            };
            seated += 1;
            seats.push(Some(person));
        }
        rows.push(seats);
    }

    let violations = NeighborGraph::new(grid, options.adjacency).conflicts(&assignment.cells);

    SeatingChart {
        grid,
        rows,
        seated,
        outcome: assignment.outcome,
        violations,
        stats: assignment.stats,
    }
}
