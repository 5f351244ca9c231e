//! Tabular extraction: named strategies turning a column/row table into records.
//!
//! Strategies are tried in priority order; the first whose required columns
//! are present wins.

use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::entities::Record;
use crate::domain::error::{DomainError, DomainResult};

/// A single table cell. Missing cells are `None` at the row level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Cell {
    pub fn as_label(&self) -> String {
        match self {
            Cell::Number(n) => n.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Bool(b) => b.to_string(),
        }
    }

    /// Numbers as-is, numeric text parsed, everything else `None`.
    pub fn as_weight(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Bool(_) => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// Generic host table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Option<Cell>>>,
}

impl Table {
    /// Rows may be shorter than the header (padded with nulls), never longer.
    pub fn validate(&self) -> DomainResult<()> {
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() > self.columns.len() {
                return Err(DomainError::RaggedRow {
                    row: i,
                    expected: self.columns.len(),
                    found: row.len(),
                });
            }
        }
        Ok(())
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(col)?.as_ref()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.trim().eq_ignore_ascii_case(name))
    }
}

/// One way of reading records out of a table.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// True when every column this strategy needs is present.
    fn matches(&self, columns: &[String]) -> bool;

    fn extract(&self, table: &Table) -> DomainResult<Vec<Record>>;
}

fn weight_regex() -> Regex {
    Regex::new(r"(?i)^\s*(value|weight|size|count|amount)\s*$").expect("static regex")
}

fn find_weight_column(weight: &Regex, columns: &[String]) -> Option<usize> {
    columns.iter().position(|c| weight.is_match(c))
}

fn row_weight(table: &Table, row: usize, weight_col: Option<usize>) -> Option<f64> {
    weight_col
        .and_then(|col| table.cell(row, col))
        .and_then(Cell::as_weight)
}

/// Columns named `level1`, `Level 2`, `level_3`, ordered by their number.
pub struct LevelColumns {
    level: Regex,
    weight: Regex,
}

impl Default for LevelColumns {
    fn default() -> Self {
        Self::new()
    }
}

impl LevelColumns {
    pub fn new() -> Self {
        Self {
            level: Regex::new(r"(?i)^\s*level[\s_-]*(\d+)\s*$").expect("static regex"),
            weight: weight_regex(),
        }
    }

    fn level_columns(&self, columns: &[String]) -> Vec<usize> {
        let mut levels: Vec<(u32, usize)> = columns
            .iter()
            .enumerate()
            .filter_map(|(i, c)| {
                let caps = self.level.captures(c)?;
                let n = caps.get(1)?.as_str().parse().ok()?;
                Some((n, i))
            })
            .collect();
        levels.sort();
        levels.into_iter().map(|(_, i)| i).collect()
    }
}

impl ExtractionStrategy for LevelColumns {
    fn name(&self) -> &'static str {
        "level-columns"
    }

    fn description(&self) -> &'static str {
        "numbered level columns (level1, Level 2, ...) plus optional weight"
    }

    fn matches(&self, columns: &[String]) -> bool {
        !self.level_columns(columns).is_empty()
    }

    fn extract(&self, table: &Table) -> DomainResult<Vec<Record>> {
        table.validate()?;
        let levels = self.level_columns(&table.columns);
        let weight_col = find_weight_column(&self.weight, &table.columns);

        Ok((0..table.rows.len())
            .map(|row| Record {
                labels: levels
                    .iter()
                    .map(|&col| table.cell(row, col).map(Cell::as_label))
                    .collect(),
                weight: row_weight(table, row, weight_col),
            })
            .collect())
    }
}

/// A single `path` column with `/`-delimited labels.
pub struct DelimitedPath {
    weight: Regex,
}

impl Default for DelimitedPath {
    fn default() -> Self {
        Self::new()
    }
}

impl DelimitedPath {
    pub const COLUMN: &'static str = "path";

    pub fn new() -> Self {
        Self {
            weight: weight_regex(),
        }
    }
}

impl ExtractionStrategy for DelimitedPath {
    fn name(&self) -> &'static str {
        "delimited-path"
    }

    fn description(&self) -> &'static str {
        "one 'path' column of '/'-separated labels plus optional weight"
    }

    fn matches(&self, columns: &[String]) -> bool {
        columns
            .iter()
            .any(|c| c.trim().eq_ignore_ascii_case(Self::COLUMN))
    }

    fn extract(&self, table: &Table) -> DomainResult<Vec<Record>> {
        table.validate()?;
        let Some(path_col) = table.column_index(Self::COLUMN) else {
            return Err(DomainError::NoMatchingStrategy {
                columns: table.columns.clone(),
            });
        };
        let weight_col = find_weight_column(&self.weight, &table.columns);

        Ok((0..table.rows.len())
            .map(|row| Record {
                labels: table
                    .cell(row, path_col)
                    .map(|cell| {
                        cell.as_label()
                            .split('/')
                            .map(|seg| Some(seg.to_string()))
                            .collect()
                    })
                    .unwrap_or_default(),
                weight: row_weight(table, row, weight_col),
            })
            .collect())
    }
}

/// Every non-weight column, in table order, is a level.
pub struct AllColumns {
    weight: Regex,
}

impl Default for AllColumns {
    fn default() -> Self {
        Self::new()
    }
}

impl AllColumns {
    pub fn new() -> Self {
        Self {
            weight: weight_regex(),
        }
    }
}

impl ExtractionStrategy for AllColumns {
    fn name(&self) -> &'static str {
        "all-columns"
    }

    fn description(&self) -> &'static str {
        "every non-weight column in table order"
    }

    fn matches(&self, columns: &[String]) -> bool {
        columns.iter().any(|c| !self.weight.is_match(c))
    }

    fn extract(&self, table: &Table) -> DomainResult<Vec<Record>> {
        table.validate()?;
        let weight_col = find_weight_column(&self.weight, &table.columns);
        let levels: Vec<usize> = (0..table.columns.len())
            .filter(|&i| !self.weight.is_match(&table.columns[i]))
            .collect();

        Ok((0..table.rows.len())
            .map(|row| Record {
                labels: levels
                    .iter()
                    .map(|&col| table.cell(row, col).map(Cell::as_label))
                    .collect(),
                weight: row_weight(table, row, weight_col),
            })
            .collect())
    }
}

/// Prioritized strategy list.
pub struct Extractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(vec![
            Box::new(LevelColumns::new()),
            Box::new(DelimitedPath::new()),
            Box::new(AllColumns::new()),
        ])
    }
}

impl Extractor {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn strategies(&self) -> impl Iterator<Item = &dyn ExtractionStrategy> {
        self.strategies.iter().map(|s| &**s)
    }

    /// First strategy whose columns are all present.
    pub fn select(&self, columns: &[String]) -> DomainResult<&dyn ExtractionStrategy> {
        self.strategies()
            .find(|s| s.matches(columns))
            .ok_or_else(|| DomainError::NoMatchingStrategy {
                columns: columns.to_vec(),
            })
    }

    /// Extract with the selected strategy; returns its name and the records.
    #[instrument(level = "debug", skip(self, table), fields(columns = table.columns.len(), rows = table.rows.len()))]
    pub fn extract(&self, table: &Table) -> DomainResult<(&'static str, Vec<Record>)> {
        let strategy = self.select(&table.columns)?;
        debug!("using extraction strategy {}", strategy.name());
        let records = strategy.extract(table)?;
        Ok((strategy.name(), records))
    }
}
