use std::str::FromStr;
use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::SeatingError;

/// Deadline given to the backtracking search of one grid.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(3);

/// Largest grid a single search will build buffers for.
pub const MAX_SEATS: usize = 10_000;

/// A person to be seated. `category` is the attribute that must not repeat
/// between neighboring seats.
///
/// An absent or null category deserializes to the empty string, and everyone
/// without a category is grouped together as one more category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(alias = "roll_no", deserialize_with = "deserialize_key")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(
        default,
        alias = "department",
        deserialize_with = "deserialize_category"
    )]
    pub category: String,
}

impl Person {
    pub fn new(id: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: category.into(),
        }
    }

    /// Stand-in record carrying only a category.
    pub fn placeholder(category: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            category: category.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSpec {
    pub rows: usize,
    pub columns: usize,
}

impl GridSpec {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }

    /// Seat count, saturating at `usize::MAX`. Call `validate` first to
    /// reject grids whose product overflows.
    pub fn capacity(&self) -> usize {
        self.rows.saturating_mul(self.columns)
    }

    pub fn index(&self, row: usize, column: usize) -> usize {
        row * self.columns + column
    }

    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.columns, index % self.columns)
    }

    pub fn validate(&self) -> Result<(), SeatingError> {
        if self.rows == 0 || self.columns == 0 {
            return Err(SeatingError::InvalidGrid {
                rows: self.rows,
                columns: self.columns,
            });
        }
        match self.rows.checked_mul(self.columns) {
            Some(seats) if seats <= MAX_SEATS => Ok(()),
            _ => Err(SeatingError::TooLarge {
                rows: self.rows,
                columns: self.columns,
                max: MAX_SEATS,
            }),
        }
    }
}

impl std::fmt::Display for GridSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.rows, self.columns)
    }
}

/// Which neighboring seats count as adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjacencyMode {
    /// Orthogonal neighbors only.
    Four,
    /// Orthogonal and diagonal neighbors.
    #[default]
    Eight,
}

impl FromStr for AdjacencyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "4" | "four" | "four-directional" => Ok(AdjacencyMode::Four),
            "8" | "eight" | "eight-directional" => Ok(AdjacencyMode::Eight),
            _ => Err(format!(
                "invalid adjacency '{}', expected: 4 (four-directional) or 8 (eight-directional)",
                s
            )),
        }
    }
}

impl<'de> Deserialize<'de> for AdjacencyMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => s,
            serde_json::Value::Number(n) => n.to_string(),
            other => {
                return Err(D::Error::custom(format!(
                    "invalid adjacency {other}, expected a string or number"
                )));
            }
        };
        raw.parse().map_err(D::Error::custom)
    }
}

/// Request-level knobs shared by every grid in one planning request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatingOptions {
    pub adjacency: AdjacencyMode,
    pub deadline: Duration,
}

impl Default for SeatingOptions {
    fn default() -> Self {
        Self {
            adjacency: AdjacencyMode::default(),
            deadline: DEFAULT_DEADLINE,
        }
    }
}

/// Why the greedy pass had to take over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// The deadline passed before the search finished.
    Timeout,
    /// The search space was exhausted without a conforming arrangement.
    Exhausted,
    /// The greedy pass was asked for directly and no search ran.
    GreedyOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// No two neighbors share a category.
    Solved,
    /// Everyone is seated but neighbors may share a category.
    BestEffort { reason: FallbackReason },
}

impl Outcome {
    pub fn is_solved(&self) -> bool {
        matches!(self, Outcome::Solved)
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Solved => write!(f, "solved"),
            Outcome::BestEffort {
                reason: FallbackReason::Timeout,
            } => write!(f, "best effort (search timed out)"),
            Outcome::BestEffort {
                reason: FallbackReason::Exhausted,
            } => write!(f, "best effort (no conforming arrangement)"),
            Outcome::BestEffort {
                reason: FallbackReason::GreedyOnly,
            } => write!(f, "best effort (greedy only)"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    pub nodes: u64,
    pub backtracks: u64,
    pub elapsed_ms: u64,
}

/// Final people-bearing grid for one classroom.
#[derive(Debug, Clone, Serialize)]
pub struct SeatingChart {
    pub grid: GridSpec,
    pub rows: Vec<Vec<Option<Person>>>,
    pub seated: usize,
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Neighboring pairs that share a category.
    pub violations: usize,
    pub stats: SearchStats,
}

impl SeatingChart {
    pub fn is_solved(&self) -> bool {
        self.outcome.is_solved()
    }

    /// Seats in row-major order.
    pub fn seats(&self) -> impl Iterator<Item = Option<&Person>> {
        self.rows.iter().flatten().map(Option::as_ref)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classroom {
    pub name: String,
    #[serde(alias = "rows_count", deserialize_with = "deserialize_usize_from_number")]
    pub rows: usize,
    #[serde(alias = "cols_count", deserialize_with = "deserialize_usize_from_number")]
    pub columns: usize,
}

impl Classroom {
    pub fn new(name: impl Into<String>, rows: usize, columns: usize) -> Self {
        Self {
            name: name.into(),
            rows,
            columns,
        }
    }

    pub fn grid(&self) -> GridSpec {
        GridSpec::new(self.rows, self.columns)
    }
}

/// Accepts a key given as a JSON string or number.
pub fn deserialize_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "invalid key {other}, expected a string or number"
        ))),
    }
}

/// Maps a null category to the empty category.
pub fn deserialize_category<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `5`, `5.0` or `"5"`. Spreadsheet exports often carry dimensions as floats.
pub fn deserialize_usize_from_number<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = match &value {
        serde_json::Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0)
                .map(|f| f as u64)
        }),
        serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    parsed
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| D::Error::custom(format!("invalid dimension {value}")))
}
