use std::collections::{BTreeSet, HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::names::normalize_genome_name;
use super::sniff::{detect_format, is_null_cell, Delimiter, Detected, InputFormat};
use super::types::PairwiseComparison;

/// Distance substituted when a row's distance field cannot be parsed.
pub const DEFAULT_DISTANCE: f64 = 0.5;

const REPORTED_RECOVERIES: usize = 5;
const HEADER_TOKENS: [&str; 4] = ["distance", "mutation_distance", "mutdist", "dist"];

/// Fatal parse failures.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The file could not be read.
    #[error("failed to read {input}: {source}")]
    Io {
        /// Offending input.
        input: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// No data lines remain once blanks and comments are dropped.
    #[error("{input} contains no data lines")]
    EmptyInput {
        /// Offending input.
        input: String,
    },

    /// Every row was rejected.
    #[error("no valid comparisons could be parsed from {input}")]
    NoValidData {
        /// Offending input.
        input: String,
    },
}

/// Counts describing what the parser recovered from or discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostics {
    /// Detected layout.
    pub format: Option<InputFormat>,
    /// Delimiter of a pairs file.
    pub delimiter: Option<Delimiter>,
    /// Non-blank, non-comment lines.
    pub data_lines: usize,
    /// Whether a column-header row was recognized and skipped.
    pub header_skipped: bool,
    /// Rows with fewer than three fields.
    pub skipped_lines: usize,
    /// Rows whose distance was replaced by [`DEFAULT_DISTANCE`].
    pub defaulted_distances: usize,
    /// Unparseable p-values replaced by 0.
    pub defaulted_p_values: usize,
    /// Unparseable Jaccard values replaced by the distance complement.
    pub defaulted_jaccard: usize,
    /// Matrix cells that were empty, negative or not numbers.
    pub null_cells: usize,
    /// Records dropped because query and target are the same genome.
    pub self_pairs_dropped: usize,
    /// Records dropped because the unordered pair was already seen.
    pub duplicates_dropped: usize,
}

impl ParseDiagnostics {
    /// Rows or cells that needed a default or were skipped.
    pub fn row_issues(&self) -> usize {
        self.skipped_lines
            + self.defaulted_distances
            + self.defaulted_p_values
            + self.defaulted_jaccard
            + self.null_cells
    }
}

/// Parsed comparisons plus the diagnostics gathered on the way.
#[derive(Debug, Clone)]
pub struct ParsedComparisons {
    /// Deduplicated records without self-pairs, in input order.
    pub comparisons: Vec<PairwiseComparison>,
    /// Recovery and filtering counts.
    pub diagnostics: ParseDiagnostics,
}

impl ParsedComparisons {
    /// Number of comparisons.
    pub fn len(&self) -> usize {
        self.comparisons.len()
    }

    /// Whether no comparison survived.
    pub fn is_empty(&self) -> bool {
        self.comparisons.is_empty()
    }

    /// Distinct genome identifiers, sorted.
    pub fn genomes(&self) -> BTreeSet<&str> {
        self.comparisons
            .iter()
            .flat_map(|c| [c.query.as_str(), c.target.as_str()])
            .collect()
    }
}

/// Parse a distance file from disk.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedComparisons, ParseError> {
    let path = path.as_ref();
    let input = path.display().to_string();
    let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
        input: input.clone(),
        source,
    })?;
    parse_str(&content, &input)
}

/// Parse distance text; `input` names the source in errors and logs.
pub fn parse_str(content: &str, input: &str) -> Result<ParsedComparisons, ParseError> {
    let lines = data_lines(content);
    let detected = detect_format(&lines).ok_or_else(|| ParseError::EmptyInput {
        input: input.to_string(),
    })?;

    let mut diagnostics = ParseDiagnostics {
        format: Some(detected.format()),
        data_lines: lines.len(),
        ..ParseDiagnostics::default()
    };

    let records = match detected {
        Detected::SquareMatrix => {
            info!(input, lines = lines.len(), "parsing square distance matrix");
            parse_square_matrix(&lines, &mut diagnostics)
        }
        Detected::ComparisonPairs { delimiter } => {
            info!(
                input,
                lines = lines.len(),
                delimiter = delimiter.label(),
                "parsing comparison pairs"
            );
            diagnostics.delimiter = Some(delimiter);
            parse_comparison_pairs(&lines, delimiter, &mut diagnostics)
        }
    };

    let parsed_rows = records.len();
    let comparisons = deduplicate(records, &mut diagnostics);
    if comparisons.is_empty() {
        return Err(ParseError::NoValidData {
            input: input.to_string(),
        });
    }

    info!(
        input,
        kept = comparisons.len(),
        parsed = parsed_rows,
        row_issues = diagnostics.row_issues(),
        "parsed pairwise comparisons"
    );
    Ok(ParsedComparisons {
        comparisons,
        diagnostics,
    })
}

/// Lines that are neither blank nor `#` comments, with trailing whitespace
/// removed. Leading whitespace is kept: a matrix header starts with an empty
/// corner cell.
pub fn data_lines(content: &str) -> Vec<&str> {
    content
        .lines()
        .map(str::trim_end)
        .filter(|line| {
            let trimmed = line.trim_start();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .collect()
}

fn parse_comparison_pairs(
    lines: &[&str],
    delimiter: Delimiter,
    diagnostics: &mut ParseDiagnostics,
) -> Vec<PairwiseComparison> {
    let mut records = Vec::with_capacity(lines.len());
    let mut recoveries = 0usize;

    for (idx, line) in lines.iter().enumerate() {
        let fields = delimiter.split(line);
        if fields.len() < 3 {
            diagnostics.skipped_lines += 1;
            report_recovery(&mut recoveries, idx, line, "fewer than 3 fields, line skipped");
            continue;
        }
        if idx == 0 && is_column_header(fields[2]) {
            debug!(line = %line, "skipping column header");
            diagnostics.header_skipped = true;
            continue;
        }

        let mutation_distance = match parse_unit(fields[2]) {
            Some(value) => value,
            None => {
                diagnostics.defaulted_distances += 1;
                report_recovery(
                    &mut recoveries,
                    idx,
                    line,
                    "unparseable distance, substituting 0.5",
                );
                DEFAULT_DISTANCE
            }
        };

        let p_value = match fields.get(3) {
            None => 0.0,
            Some(raw) => parse_unit(raw).unwrap_or_else(|| {
                diagnostics.defaulted_p_values += 1;
                0.0
            }),
        };

        let complement = 1.0 - mutation_distance;
        let jaccard_index = match fields.get(4) {
            None => complement,
            Some(raw) => parse_jaccard(raw).unwrap_or_else(|| {
                diagnostics.defaulted_jaccard += 1;
                complement
            }),
        };

        records.push(PairwiseComparison::new(
            normalize_genome_name(fields[0]),
            normalize_genome_name(fields[1]),
            mutation_distance,
            p_value,
            jaccard_index,
        ));
    }

    if recoveries > REPORTED_RECOVERIES {
        warn!(
            total = recoveries,
            "further row recoveries not logged individually"
        );
    }
    records
}

fn parse_square_matrix(
    lines: &[&str],
    diagnostics: &mut ParseDiagnostics,
) -> Vec<PairwiseComparison> {
    let Some((header_line, body)) = lines.split_first() else {
        return Vec::new();
    };
    let header: Vec<&str> = header_line.split('\t').map(str::trim).collect();
    let rows: Vec<Vec<&str>> = body
        .iter()
        .map(|line| line.split('\t').map(str::trim).collect())
        .collect();

    let width = rows.first().map_or(header.len(), Vec::len);
    let column_labels = if header.len() == width {
        &header[1..]
    } else {
        &header[..]
    };
    let mut columns: HashMap<&str, usize> = HashMap::with_capacity(column_labels.len());
    for (idx, label) in column_labels.iter().enumerate() {
        columns.entry(*label).or_insert(idx + 1);
    }

    let labelled: Vec<(&str, &[&str])> = rows
        .iter()
        .filter_map(|cells| match cells.first() {
            Some(label) if !label.is_empty() => Some((*label, cells.as_slice())),
            _ => None,
        })
        .collect();
    let names: Vec<String> = labelled
        .iter()
        .map(|(label, _)| normalize_genome_name(label))
        .collect();

    let mut records = Vec::new();
    for (i, (_, cells)) in labelled.iter().enumerate() {
        for (j, (target, _)) in labelled.iter().enumerate().skip(i + 1) {
            let cell = columns.get(target).and_then(|&col| cells.get(col)).copied();
            match cell.and_then(parse_matrix_cell) {
                Some(distance) => records.push(PairwiseComparison::new(
                    names[i].clone(),
                    names[j].clone(),
                    distance,
                    0.0,
                    1.0 - distance,
                )),
                None => diagnostics.null_cells += 1,
            }
        }
    }
    records
}

fn deduplicate(
    records: Vec<PairwiseComparison>,
    diagnostics: &mut ParseDiagnostics,
) -> Vec<PairwiseComparison> {
    let mut seen: HashSet<(String, String)> = HashSet::with_capacity(records.len());
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if record.is_self_pair() {
            diagnostics.self_pairs_dropped += 1;
            continue;
        }
        let (a, b) = record.pair_key();
        if !seen.insert((a.to_string(), b.to_string())) {
            diagnostics.duplicates_dropped += 1;
            continue;
        }
        kept.push(record);
    }
    kept
}

/// Parse a value that belongs in `[0, 1]`, clamping out-of-range input.
pub(crate) fn parse_unit(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().parse().ok()?;
    (!value.is_nan()).then(|| value.clamp(0.0, 1.0))
}

/// Jaccard field: a decimal or a `shared/total` hash fraction.
fn parse_jaccard(raw: &str) -> Option<f64> {
    let value = match raw.split_once('/') {
        Some((numerator, denominator)) => {
            let numerator: f64 = numerator.trim().parse().ok()?;
            let denominator: f64 = denominator.trim().parse().ok()?;
            if denominator == 0.0 {
                return None;
            }
            numerator / denominator
        }
        None => raw.trim().parse().ok()?,
    };
    (!value.is_nan()).then(|| value.clamp(0.0, 1.0))
}

fn parse_matrix_cell(raw: &str) -> Option<f64> {
    if is_null_cell(raw) {
        return None;
    }
    let value: f64 = raw.parse().ok()?;
    (!value.is_nan() && value >= 0.0).then(|| value.min(1.0))
}

fn is_column_header(distance_field: &str) -> bool {
    distance_field.parse::<f64>().is_err()
        && HEADER_TOKENS
            .iter()
            .any(|token| distance_field.eq_ignore_ascii_case(token))
}

fn report_recovery(count: &mut usize, idx: usize, line: &str, reason: &str) {
    *count += 1;
    if *count <= REPORTED_RECOVERIES {
        let preview: String = line.chars().take(100).collect();
        warn!(line = idx + 1, preview = %preview, "{reason}");
    }
}
