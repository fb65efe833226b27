use std::cmp::Reverse;
use std::collections::HashMap;
use std::time::Instant;

use crate::error::SeatingError;
use crate::grid::{NeighborGraph, seat_order};
use crate::types::{FallbackReason, GridSpec, Outcome, Person, SearchStats, SeatingOptions};

/// Index into [`Assignment::categories`], in first-seen input order.
pub type CategoryId = usize;

/// Category per seat for one grid, before people are mapped back in.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub grid: GridSpec,
    pub categories: Vec<String>,
    pub cells: Vec<Option<CategoryId>>,
    pub outcome: Outcome,
    pub stats: SearchStats,
}

impl Assignment {
    pub fn category(&self, seat: usize) -> Option<&str> {
        self.cells[seat].map(|c| self.categories[c].as_str())
    }

    pub fn seated(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }
}

enum Search {
    Solved,
    TimedOut,
    Exhausted,
}

/// One seat on the explicit search stack.
struct Frame {
    pos: usize,
    /// Candidate categories in trial order; `None` leaves the seat empty.
    choices: Vec<Option<CategoryId>>,
    next: usize,
    applied: Option<CategoryId>,
}

pub struct Solver<'a> {
    grid: GridSpec,
    options: SeatingOptions,
    people: &'a [Person],
}

impl<'a> Solver<'a> {
    pub fn new(grid: GridSpec, options: SeatingOptions, people: &'a [Person]) -> Self {
        Self {
            grid,
            options,
            people,
        }
    }

    /// Backtracking search first; a clean greedy pass if it times out or
    /// proves there is no conforming arrangement.
    pub fn solve(&self) -> Result<Assignment, SeatingError> {
        let mut search = SearchState::new(self.grid, self.options, self.people)?;
        let start = Instant::now();
        let deadline = start + self.options.deadline;

        let result = search.backtrack(deadline);
        search.stats.elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            grid = %self.grid,
            people = self.people.len(),
            nodes = search.stats.nodes,
            backtracks = search.stats.backtracks,
            elapsed_ms = search.stats.elapsed_ms,
            "backtracking finished"
        );

        let outcome = match result {
            Search::Solved => return Ok(search.into_assignment(Outcome::Solved)),
            Search::TimedOut => Outcome::BestEffort {
                reason: FallbackReason::Timeout,
            },
            Search::Exhausted => Outcome::BestEffort {
                reason: FallbackReason::Exhausted,
            },
        };
        tracing::warn!(grid = %self.grid, %outcome, "falling back to greedy placement");

        search.reset();
        search.greedy();
        Ok(search.into_assignment(outcome))
    }

    /// Greedy pass only, without attempting the backtracking search.
    pub fn solve_greedy(&self) -> Result<Assignment, SeatingError> {
        let mut search = SearchState::new(self.grid, self.options, self.people)?;
        search.greedy();
        Ok(search.into_assignment(Outcome::BestEffort {
            reason: FallbackReason::GreedyOnly,
        }))
    }
}

/// Mutable buffers owned by a single solve call. Both passes mutate `cells`
/// and `counts` in place; backtracking restores them on every undo.
struct SearchState {
    grid: GridSpec,
    graph: NeighborGraph,
    order: Vec<usize>,
    categories: Vec<String>,
    initial_counts: Vec<usize>,
    counts: Vec<usize>,
    cells: Vec<Option<CategoryId>>,
    total: usize,
    stats: SearchStats,
}

impl SearchState {
    fn new(grid: GridSpec, options: SeatingOptions, people: &[Person]) -> Result<Self, SeatingError> {
        grid.validate()?;
        if people.len() > grid.capacity() {
            return Err(SeatingError::Infeasible {
                people: people.len(),
                capacity: grid.capacity(),
            });
        }

        let mut categories: Vec<String> = Vec::new();
        let mut counts: Vec<usize> = Vec::new();
        let mut ids: HashMap<&str, CategoryId> = HashMap::new();
        for person in people {
            let id = *ids.entry(person.category.as_str()).or_insert_with(|| {
                categories.push(person.category.clone());
                counts.push(0);
                categories.len() - 1
            });
            counts[id] += 1;
        }

        Ok(Self {
            grid,
            graph: NeighborGraph::new(grid, options.adjacency),
            order: seat_order(grid),
            categories,
            initial_counts: counts.clone(),
            counts,
            cells: vec![None; grid.capacity()],
            total: people.len(),
            stats: SearchStats::default(),
        })
    }

    fn reset(&mut self) {
        self.counts.clone_from(&self.initial_counts);
        self.cells.fill(None);
    }

    /// Categories with people left, most numerous first, ties by first-seen order.
    fn ranked(&self) -> Vec<CategoryId> {
        let mut ranked: Vec<CategoryId> = (0..self.counts.len())
            .filter(|&c| self.counts[c] > 0)
            .collect();
        ranked.sort_by_key(|&c| Reverse(self.counts[c]));
        ranked
    }

    fn forbidden(&self, seat: usize, category: CategoryId) -> bool {
        self.graph.touches(seat, &category, &self.cells)
    }

    fn backtrack(&mut self, deadline: Instant) -> Search {
        let seats = self.order.len();
        let mut stack: Vec<Frame> = Vec::with_capacity(seats);
        let mut placed = 0;
        let mut pos = 0;

        loop {
            self.stats.nodes += 1;
            if Instant::now() > deadline {
                return Search::TimedOut;
            }
            if placed == self.total {
                return Search::Solved;
            }

            let seats_remaining = seats.saturating_sub(pos);
            let to_place = self.total - placed;
            if pos < seats && seats_remaining >= to_place {
                let seat = self.order[pos];
                let mut choices: Vec<Option<CategoryId>> = self
                    .ranked()
                    .into_iter()
                    .filter(|&c| !self.forbidden(seat, c))
                    .map(Some)
                    .collect();
                if seats_remaining - 1 >= to_place {
                    choices.push(None);
                }
                stack.push(Frame {
                    pos,
                    choices,
                    next: 0,
                    applied: None,
                });
            }

            // Undo the deepest choice and move on to its next alternative,
            // popping seats whose alternatives are used up.
            loop {
                let Some(frame) = stack.last_mut() else {
                    return Search::Exhausted;
                };
                let seat = self.order[frame.pos];
                if let Some(c) = frame.applied.take() {
                    self.cells[seat] = None;
                    self.counts[c] += 1;
                    placed -= 1;
                }
                if let Some(&choice) = frame.choices.get(frame.next) {
                    frame.next += 1;
                    if let Some(c) = choice {
                        self.cells[seat] = Some(c);
                        self.counts[c] -= 1;
                        placed += 1;
                        frame.applied = Some(c);
                    }
                    pos = frame.pos + 1;
                    break;
                }
                stack.pop();
                self.stats.backtracks += 1;
            }
        }
    }

    /// Single pass over the seat order. When every remaining category is
    /// forbidden at a seat, the most numerous one is placed anyway.
    fn greedy(&mut self) {
        let mut remaining = self.total;
        for pos in 0..self.order.len() {
            if remaining == 0 {
                break;
            }
            let seat = self.order[pos];
            let ranked = self.ranked();
            let chosen = ranked
                .iter()
                .copied()
                .find(|&c| !self.forbidden(seat, c))
                .or_else(|| ranked.first().copied());
            if let Some(c) = chosen {
                self.cells[seat] = Some(c);
                self.counts[c] -= 1;
                remaining -= 1;
            }
        }
    }

    fn into_assignment(self, outcome: Outcome) -> Assignment {
        Assignment {
            grid: self.grid,
            categories: self.categories,
            cells: self.cells,
            outcome,
            stats: self.stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AdjacencyMode;
    use std::time::Duration;

    fn people(groups: &[(&str, usize)]) -> Vec<Person> {
        let mut out = Vec::new();
        for &(category, n) in groups {
            for i in 0..n {
                out.push(Person::new(
                    format!("{category}{i}"),
                    format!("{category} {i}"),
                    category,
                ));
            }
        }
        out
    }

    fn options(adjacency: AdjacencyMode) -> SeatingOptions {
        SeatingOptions {
            adjacency,
            deadline: Duration::from_secs(30),
        }
    }

    /// Validates an assignment:
    /// 1. Seat count matches the people supplied
    /// 2. Per-category counts match the input
    /// 3. A solved assignment has no two neighbors sharing a category
    fn assert_assignment_valid(a: &Assignment, people: &[Person], mode: AdjacencyMode) {
        assert_eq!(a.seated(), people.len(), "seated count mismatch");

        for (id, name) in a.categories.iter().enumerate() {
            let expected = people.iter().filter(|p| &p.category == name).count();
            let got = a.cells.iter().filter(|c| **c == Some(id)).count();
            assert_eq!(got, expected, "category {name:?}: expected {expected}, got {got}");
        }

        if a.outcome.is_solved() {
            let graph = NeighborGraph::new(a.grid, mode);
            for seat in 0..a.cells.len() {
                let Some(c) = a.cells[seat] else { continue };
                for &n in graph.neighbors(seat) {
                    assert_ne!(
                        a.cells[n],
                        Some(c),
                        "seats {seat} and {n} share category {}",
                        a.categories[c]
                    );
                }
            }
        }
    }

    #[test]
    fn test_three_by_three_four_directional_solved() {
        let input = people(&[("A", 3), ("B", 3), ("C", 3)]);
        let a = Solver::new(GridSpec::new(3, 3), options(AdjacencyMode::Four), &input)
            .solve()
            .unwrap();
        assert_eq!(a.outcome, Outcome::Solved);
        assert_assignment_valid(&a, &input, AdjacencyMode::Four);
        assert!(a.cells.iter().all(Option::is_some));
    }

    #[test]
    fn test_three_by_three_eight_directional_falls_back() {
        // Every 2x2 block is a 4-clique under eight-directional adjacency,
        // so three categories cannot fill the room.
        let input = people(&[("A", 3), ("B", 3), ("C", 3)]);
        let a = Solver::new(GridSpec::new(3, 3), options(AdjacencyMode::Eight), &input)
            .solve()
            .unwrap();
        assert_eq!(
            a.outcome,
            Outcome::BestEffort {
                reason: FallbackReason::Exhausted
            }
        );
        assert_assignment_valid(&a, &input, AdjacencyMode::Eight);
    }

    #[test]
    fn test_two_by_two_all_adjacent_falls_back() {
        let input = people(&[("A", 2), ("B", 2)]);
        let a = Solver::new(GridSpec::new(2, 2), options(AdjacencyMode::Eight), &input)
            .solve()
            .unwrap();
        assert!(!a.outcome.is_solved());
        assert_assignment_valid(&a, &input, AdjacencyMode::Eight);

        // Seat order 0, 3, 1, 2: A, B, then both forced repeats.
        let cats: Vec<_> = (0..4).map(|s| a.category(s).unwrap()).collect();
        assert_eq!(cats, vec!["A", "A", "B", "B"]);
        let graph = NeighborGraph::new(a.grid, AdjacencyMode::Eight);
        assert!(graph.conflicts(&a.cells) >= 1);
    }

    #[test]
    fn test_single_row_distinct_categories() {
        let input = people(&[("P", 1), ("Q", 1), ("R", 1), ("S", 1), ("T", 1)]);
        let a = Solver::new(GridSpec::new(1, 5), options(AdjacencyMode::Four), &input)
            .solve()
            .unwrap();
        assert_eq!(a.outcome, Outcome::Solved);
        let cats: Vec<_> = (0..5).map(|s| a.category(s).unwrap()).collect();
        // Even seats 0, 2, 4 first, then 1, 3.
        assert_eq!(cats, vec!["P", "S", "Q", "T", "R"]);
    }

    #[test]
    fn test_majority_category_on_checkerboard() {
        let input = people(&[("A", 7), ("B", 3)]);
        let grid = GridSpec::new(4, 4);
        let a = Solver::new(grid, options(AdjacencyMode::Four), &input)
            .solve()
            .unwrap();
        assert_eq!(a.outcome, Outcome::Solved);
        assert_assignment_valid(&a, &input, AdjacencyMode::Four);
        assert_eq!(a.cells.iter().filter(|c| c.is_none()).count(), 6);

        for seat in 0..grid.capacity() {
            if a.category(seat) == Some("A") {
                let (r, c) = grid.position(seat);
                assert_eq!((r + c) % 2, 0, "A placed off the checkerboard at {seat}");
            }
        }
    }

    #[test]
    fn test_too_many_people_is_infeasible() {
        let input = people(&[("A", 3), ("B", 2)]);
        let err = Solver::new(GridSpec::new(2, 2), SeatingOptions::default(), &input)
            .solve()
            .unwrap_err();
        assert_eq!(
            err,
            SeatingError::Infeasible {
                people: 5,
                capacity: 4
            }
        );
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = Solver::new(GridSpec::new(0, 3), SeatingOptions::default(), &[])
            .solve()
            .unwrap_err();
        assert_eq!(err, SeatingError::InvalidGrid { rows: 0, columns: 3 });
    }

    #[test]
    fn test_no_people_leaves_grid_empty() {
        let a = Solver::new(GridSpec::new(2, 3), SeatingOptions::default(), &[])
            .solve()
            .unwrap();
        assert_eq!(a.outcome, Outcome::Solved);
        assert_eq!(a.seated(), 0);
    }

    #[test]
    fn test_passed_deadline_aborts_search() {
        let input = people(&[("A", 6), ("B", 5), ("C", 4)]);
        let mut search =
            SearchState::new(GridSpec::new(4, 5), options(AdjacencyMode::Eight), &input).unwrap();
        let deadline = Instant::now();
        std::thread::sleep(Duration::from_millis(2));
        assert!(matches!(search.backtrack(deadline), Search::TimedOut));
        assert_eq!(search.stats.nodes, 1);
    }

    #[test]
    fn test_deadline_not_yet_exceeded_keeps_searching() {
        let input = people(&[("A", 2), ("B", 2)]);
        let mut search =
            SearchState::new(GridSpec::new(2, 2), options(AdjacencyMode::Four), &input).unwrap();
        let deadline = Instant::now() + Duration::from_secs(30);
        assert!(matches!(search.backtrack(deadline), Search::Solved));
    }

    #[test]
    fn test_zero_deadline_still_seats_everyone() {
        let input = people(&[("A", 6), ("B", 5), ("C", 4)]);
        let opts = SeatingOptions {
            adjacency: AdjacencyMode::Eight,
            deadline: Duration::ZERO,
        };
        let a = Solver::new(GridSpec::new(4, 5), opts, &input).solve().unwrap();
        assert_assignment_valid(&a, &input, AdjacencyMode::Eight);
    }

    #[test]
    fn test_deterministic() {
        let input = people(&[("X", 3), ("Y", 3), ("Z", 2), ("", 2)]);
        let grid = GridSpec::new(3, 4);
        let first = Solver::new(grid, options(AdjacencyMode::Eight), &input)
            .solve()
            .unwrap();
        let second = Solver::new(grid, options(AdjacencyMode::Eight), &input)
            .solve()
            .unwrap();
        assert_eq!(first.cells, second.cells);
        assert_eq!(first.outcome, second.outcome);
        assert_assignment_valid(&first, &input, AdjacencyMode::Eight);
    }

    #[test]
    fn test_greedy_places_everyone() {
        let cases: [(GridSpec, &[(&str, usize)]); 4] = [
            (GridSpec::new(2, 2), &[("A", 4)]),
            (GridSpec::new(3, 4), &[("A", 9), ("B", 2), ("C", 1)]),
            (GridSpec::new(5, 5), &[("A", 4), ("B", 4), ("C", 4), ("D", 4)]),
            (GridSpec::new(1, 7), &[("A", 3)]),
        ];
        for (grid, groups) in cases {
            let input = people(groups);
            let a = Solver::new(grid, options(AdjacencyMode::Eight), &input)
                .solve_greedy()
                .unwrap();
            assert_eq!(
                a.outcome,
                Outcome::BestEffort {
                    reason: FallbackReason::GreedyOnly
                }
            );
            assert_assignment_valid(&a, &input, AdjacencyMode::Eight);
        }
    }

    #[test]
    fn test_empty_category_is_its_own_group() {
        let input = vec![
            Person::new("1", "a", ""),
            Person::new("2", "b", ""),
            Person::new("3", "c", "Math"),
        ];
        let a = Solver::new(GridSpec::new(1, 3), options(AdjacencyMode::Four), &input)
            .solve()
            .unwrap();
        assert_eq!(a.categories, vec!["".to_string(), "Math".to_string()]);
        assert_eq!(a.outcome, Outcome::Solved);
        assert_eq!(
            (0..3).map(|s| a.category(s).unwrap()).collect::<Vec<_>>(),
            vec!["", "Math", ""]
        );
    }
}
