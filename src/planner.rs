use serde::Serialize;

use crate::error::SeatingError;
use crate::interleave::interleave;
use crate::mapper::map_people;
use crate::solver::Solver;
use crate::types::{Classroom, GridSpec, Person, SeatingChart, SeatingOptions};

/// Seats `people` in a single grid.
pub fn arrange(
    grid: GridSpec,
    people: &[Person],
    options: SeatingOptions,
) -> Result<SeatingChart, SeatingError> {
    let assignment = Solver::new(grid, options, people).solve()?;
    Ok(map_people(&assignment, people, options))
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassroomArrangement {
    pub classroom: Classroom,
    /// People handed to this classroom.
    pub assigned: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<SeatingChart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub arrangements: Vec<ClassroomArrangement>,
    /// People left over once every classroom was filled to capacity.
    pub unseated: Vec<Person>,
}

impl Plan {
    pub fn seated(&self) -> usize {
        self.arrangements
            .iter()
            .filter_map(|a| a.chart.as_ref())
            .map(|c| c.seated)
            .sum()
    }
}

/// Interleaves the roster once, hands each classroom the next slice of up to
/// its capacity, and arranges each classroom on its own deadline. A failure
/// in one classroom is recorded on that classroom only.
pub fn plan(people: &[Person], classrooms: &[Classroom], options: SeatingOptions) -> Plan {
    let pool = interleave(people);
    let mut rest: &[Person] = &pool;
    let mut arrangements = Vec::with_capacity(classrooms.len());

    for classroom in classrooms {
        let grid = classroom.grid();
        let take = match grid.validate() {
            Ok(()) => grid.capacity().min(rest.len()),
            Err(_) => 0,
        };
        let (slice, tail) = rest.split_at(take);
        rest = tail;

        let (chart, error) = match arrange(grid, slice, options) {
            Ok(chart) => {
                tracing::info!(
                    classroom = %classroom.name,
                    grid = %chart.grid,
                    seated = chart.seated,
                    violations = chart.violations,
                    outcome = %chart.outcome,
                    "classroom arranged"
                );
                (Some(chart), None)
            }
            Err(e) => {
                tracing::warn!(classroom = %classroom.name, error = %e, "classroom skipped");
                (None, Some(e.to_string()))
            }
        };

        arrangements.push(ClassroomArrangement {
            classroom: classroom.clone(),
            assigned: slice.len(),
            chart,
            error,
        });
    }

    if !rest.is_empty() {
        tracing::warn!(unseated = rest.len(), "not enough seats for everyone");
    }

    Plan {
        arrangements,
        unseated: rest.to_vec(),
    }
}
