use crate::types::{Person, SeatingChart};

const MAX_CELL_WIDTH: usize = 12;
const MIN_CELL_WIDTH: usize = 3;
const NO_CATEGORY: &str = "(none)";

/// Draws the chart as a box per seat: category on the first line, name on
/// the second. Empty seats are left blank.
pub fn render_chart(chart: &SeatingChart) -> String {
    let width = chart
        .seats()
        .flatten()
        .flat_map(|p| [category_label(p).chars().count(), p.name.chars().count()])
        .max()
        .unwrap_or(0)
        .clamp(MIN_CELL_WIDTH, MAX_CELL_WIDTH);

    let border = border_line(chart.grid.columns, width);
    let mut result = String::new();
    result.push_str(&border);
    for row in &chart.rows {
        result.push_str(&text_line(row, width, category_label));
        result.push_str(&text_line(row, width, |p| p.name.as_str()));
        result.push_str(&border);
    }
    result
}

fn category_label(person: &Person) -> &str {
    if person.category.is_empty() {
        NO_CATEGORY
    } else {
        &person.category
    }
}

fn border_line(columns: usize, width: usize) -> String {
    let mut line = String::from("+");
    for _ in 0..columns {
        line.push_str(&"-".repeat(width + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn text_line<'a>(
    row: &'a [Option<Person>],
    width: usize,
    label: impl Fn(&'a Person) -> &'a str,
) -> String {
    let mut line = String::from("|");
    for seat in row {
        let text: String = seat
            .as_ref()
            .map(|p| label(p).chars().take(width).collect())
            .unwrap_or_default();
        line.push_str(&format!(" {text:<width$} |"));
    }
    line.push('\n');
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GridSpec, Outcome, SearchStats};

    fn chart(rows: Vec<Vec<Option<Person>>>) -> SeatingChart {
        let grid = GridSpec::new(rows.len(), rows[0].len());
        let seated = rows.iter().flatten().filter(|s| s.is_some()).count();
        SeatingChart {
            grid,
            rows,
            seated,
            outcome: Outcome::Solved,
            violations: 0,
            stats: SearchStats::default(),
        }
    }

    #[test]
    fn test_render_single_row() {
        let c = chart(vec![vec![
            Some(Person::new("1", "Asha", "CSE")),
            None,
            Some(Person::new("2", "Bo", "EEE")),
        ]]);
        let output = render_chart(&c);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "+------+------+------+");
        assert_eq!(lines[1], "| CSE  |      | EEE  |");
        assert_eq!(lines[2], "| Asha |      | Bo   |");
        assert_eq!(lines[3], lines[0]);
    }

    #[test]
    fn test_render_truncates_long_names() {
        let c = chart(vec![vec![Some(Person::new(
            "1",
            "Bartholomew Fitzgerald",
            "Mechanical",
        ))]]);
        let output = render_chart(&c);
        assert!(output.contains("| Bartholomew  |"));
        assert!(output.contains("| Mechanical   |"));
    }

    #[test]
    fn test_render_empty_category_and_empty_grid() {
        let c = chart(vec![vec![Some(Person::new("1", "Kim", ""))], vec![None]]);
        let output = render_chart(&c);
        assert!(output.contains("(none)"));
        assert_eq!(output.lines().count(), 7);

        let empty = chart(vec![vec![None, None]]);
        assert_eq!(render_chart(&empty).lines().next(), Some("+-----+-----+"));
    }
}
