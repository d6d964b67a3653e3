//! A convenience loader for the tab-delimited ingestion format.

use std::collections::HashSet;
use std::io::BufRead;

use crate::error::{Error, Result};
use crate::group::ClusterGroup;

/// How a column is located in the header row: by exact name, or by a
/// 1-based position (so the file need not have a header at all describing
/// those particular columns, as long as the count lines up).
#[derive(Clone, Debug)]
pub enum Column {
    /// Match the header cell with this exact name.
    Name(String),
    /// Use the column at this 1-based position, ignoring the header.
    Position(usize),
}

impl Column {
    fn resolve(&self, header: &[&str], line: u64) -> Result<usize> {
        match self {
            Column::Name(name) => header.iter().position(|cell| cell == name).ok_or_else(|| {
                Error::Parse { line, message: format!("no column named '{}' in header", name) }
            }),
            Column::Position(pos) => {
                if *pos == 0 || *pos > header.len() {
                    return Err(Error::Parse {
                        line,
                        message: format!("column position {} is out of range", pos),
                    });
                }
                Ok(pos - 1)
            }
        }
    }
}

/// Reads the tab-delimited pairwise-similarity format and feeds it into a
/// [`ClusterGroup`].
///
/// The format is a header row followed by one row per similarity, all
/// tab-separated. By default the first three columns carry `id1`, `id2`,
/// and `score`, in that order; [`ClusterReader::with_columns`] overrides
/// which columns to use, by name or by 1-based position.
///
/// In dense mode (the default), the reader tracks how many distinct ids it
/// has seen and how many distinct pairs it has actually been given an edge
/// for, and logs a single warning after the stream is exhausted if those
/// don't reconcile to a complete dense matrix (`n·(n-1)/2` edges for `n`
/// ids). [`ClusterReader::sparse`] disables this bookkeeping for inputs that
/// are expected to omit most pairs.
#[derive(Clone, Debug)]
pub struct ClusterReader {
    id1: Column,
    id2: Column,
    score: Column,
    sparse: bool,
}

impl Default for ClusterReader {
    fn default() -> ClusterReader {
        ClusterReader {
            id1: Column::Position(1),
            id2: Column::Position(2),
            score: Column::Position(3),
            sparse: false,
        }
    }
}

/// What a single [`ClusterReader::read`] call observed about edge density.
///
/// In sparse mode both fields are `None`: the reader does not track ids or
/// pairs seen, so there is nothing to report. This is mainly useful for
/// confirming the dense-mode mismatch warning's trigger condition in tests;
/// ordinary callers can ignore it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ReadStats {
    /// How many edges a complete dense matrix over the ids seen would need
    /// (`n * (n - 1) / 2`), or `None` in sparse mode.
    pub expected_edges: Option<u64>,
    /// How many distinct pairs were actually ingested, or `None` in sparse
    /// mode.
    pub actual_edges: Option<u64>,
}

impl ClusterReader {
    /// Create a reader using the default column positions (1, 2, 3) and
    /// dense-mode bookkeeping.
    pub fn new() -> ClusterReader {
        ClusterReader::default()
    }

    /// Override which columns carry `id1`, `id2`, and `score`.
    pub fn with_columns(mut self, id1: Column, id2: Column, score: Column) -> ClusterReader {
        self.id1 = id1;
        self.id2 = id2;
        self.score = score;
        self
    }

    /// Disable dense-mode expected-vs-actual edge count bookkeeping.
    ///
    /// Use this when the input is known to be a sparse subset of all
    /// possible pairs; otherwise the reader logs a spurious mismatch
    /// warning for every such input.
    pub fn sparse(mut self, sparse: bool) -> ClusterReader {
        self.sparse = sparse;
        self
    }

    /// Read every row from `input` and feed it to `group` via
    /// [`ClusterGroup::add_sim`].
    ///
    /// Returns an error on the first malformed row or I/O failure,
    /// identifying the 1-based line number. No partial `add_sim` call is
    /// made for a row that fails to parse. On success, returns the
    /// dense-mode edge-count bookkeeping described on [`ReadStats`].
    pub fn read<R: BufRead>(&self, input: R, group: &mut ClusterGroup) -> Result<ReadStats> {
        let mut lines = input.lines();

        let header_line = lines.next().ok_or_else(|| Error::Parse {
            line: 1,
            message: "input is empty; expected a header row".to_string(),
        })??;
        let header: Vec<&str> = header_line.split('\t').collect();

        let id1_idx = self.id1.resolve(&header, 1)?;
        let id2_idx = self.id2.resolve(&header, 1)?;
        let score_idx = self.score.resolve(&header, 1)?;
        let min_columns = [id1_idx, id2_idx, score_idx].iter().max().copied().unwrap_or(0) + 1;

        let mut ids: HashSet<String> = HashSet::new();
        let mut pairs_seen: HashSet<(String, String)> = HashSet::new();

        for (offset, line) in lines.enumerate() {
            let line_no = offset as u64 + 2;
            let line = line?;
            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < min_columns {
                return Err(Error::Parse {
                    line: line_no,
                    message: format!(
                        "expected at least {} tab-separated fields, found {}",
                        min_columns,
                        fields.len()
                    ),
                });
            }

            let id1 = fields[id1_idx];
            let id2 = fields[id2_idx];
            let score: f64 = fields[score_idx].trim().parse().map_err(|_| Error::Parse {
                line: line_no,
                message: format!("could not parse '{}' as a score", fields[score_idx]),
            })?;

            if !self.sparse {
                ids.insert(id1.to_string());
                ids.insert(id2.to_string());
                let pair = if id1 <= id2 {
                    (id1.to_string(), id2.to_string())
                } else {
                    (id2.to_string(), id1.to_string())
                };
                pairs_seen.insert(pair);
            }

            group.add_sim(id1, id2, score);
        }

        if self.sparse {
            return Ok(ReadStats::default());
        }

        let n = ids.len() as u64;
        let expected = n.saturating_mul(n.saturating_sub(1)) / 2;
        let actual = pairs_seen.len() as u64;
        if expected != actual {
            log::warn!(
                "dense-mode edge count mismatch: expected {} edges for {} ids, saw {}",
                expected,
                n,
                actual
            );
        }

        Ok(ReadStats { expected_edges: Some(expected), actual_edges: Some(actual) })
    }
}
