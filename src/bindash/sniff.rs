//! Ordered format detection.
//!
//! Each [`FormatSniffer`] inspects the data lines of a file and either claims
//! the layout or declines. [`detect_format`] walks [`sniffer_chain`] in order
//! and stops at the first claim; the pairs sniffer terminates the chain and
//! accepts anything non-empty.

use serde::Serialize;
use tracing::debug;

/// Layout of a distance file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// Labelled square matrix, header row plus one row per genome.
    SquareMatrix,
    /// One comparison per line.
    ComparisonPairs,
}

/// Field separator of a comparison-pairs file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    /// `\t`
    Tab,
    /// `,`
    Comma,
    /// Runs of spaces or tabs.
    Whitespace,
}

impl Delimiter {
    /// Order tried when detecting the delimiter.
    pub const DETECTION_ORDER: [Delimiter; 3] = [Delimiter::Tab, Delimiter::Comma, Delimiter::Whitespace];

    /// Split a line into trimmed, non-empty fields.
    pub fn split(self, line: &str) -> Vec<&str> {
        match self {
            Delimiter::Tab => non_empty(line.split('\t')),
            Delimiter::Comma => non_empty(line.split(',')),
            Delimiter::Whitespace => line.split_whitespace().collect(),
        }
    }

    /// Whether the delimiter occurs in the line at all.
    pub fn appears_in(self, line: &str) -> bool {
        match self {
            Delimiter::Tab => line.contains('\t'),
            Delimiter::Comma => line.contains(','),
            Delimiter::Whitespace => line.contains(char::is_whitespace),
        }
    }

    /// Short name for logs.
    pub fn label(self) -> &'static str {
        match self {
            Delimiter::Tab => "TAB",
            Delimiter::Comma => ",",
            Delimiter::Whitespace => "whitespace",
        }
    }
}

fn non_empty<'a>(fields: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    fields.map(str::trim).filter(|field| !field.is_empty()).collect()
}

/// Pick the delimiter for a pairs file from its first data line.
///
/// The first delimiter that occurs in the line and yields at least three
/// fields wins; tab is assumed when none does.
pub fn detect_delimiter(line: &str) -> Delimiter {
    Delimiter::DETECTION_ORDER
        .into_iter()
        .find(|delimiter| delimiter.appears_in(line) && delimiter.split(line).len() >= 3)
        .unwrap_or(Delimiter::Tab)
}

/// A layout recognized by a sniffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detected {
    /// Labelled square matrix.
    SquareMatrix,
    /// Comparison pairs split with a fixed delimiter.
    ComparisonPairs {
        /// Delimiter used for every line of the file.
        delimiter: Delimiter,
    },
}

impl Detected {
    /// The input format this detection selects.
    pub fn format(&self) -> InputFormat {
        match self {
            Detected::SquareMatrix => InputFormat::SquareMatrix,
            Detected::ComparisonPairs { .. } => InputFormat::ComparisonPairs,
        }
    }
}

/// Predicate over the data lines of a file.
pub trait FormatSniffer: Send + Sync {
    /// Name used in debug logs.
    fn name(&self) -> &'static str;

    /// Claim the layout, or return `None` when it does not apply.
    fn sniff(&self, lines: &[&str]) -> Option<Detected>;
}

/// Recognizes a tab-delimited square matrix.
///
/// The first data line must be a header of labels (more than two cells) and
/// the line after it a row whose cells past the label are numbers or nulls.
/// A header that starts with the empty corner cell may carry numeric labels;
/// a header without it must have at least one non-numeric label.
#[derive(Debug, Default, Clone, Copy)]
pub struct SquareMatrixSniffer;

impl FormatSniffer for SquareMatrixSniffer {
    fn name(&self) -> &'static str {
        "square_matrix"
    }

    fn sniff(&self, lines: &[&str]) -> Option<Detected> {
        let header: Vec<&str> = lines.first()?.split('\t').map(str::trim).collect();
        if header.len() <= 2 {
            return None;
        }
        // Without the empty corner cell, an all-numeric header is a data row.
        let has_corner = header[0].is_empty();
        if !has_corner && header[1..].iter().all(|cell| is_numeric(cell)) {
            return None;
        }

        let row: Vec<&str> = lines.get(1)?.split('\t').map(str::trim).collect();
        if row.len() != header.len() && row.len() != header.len() + 1 {
            return None;
        }

        let values = &row[1..];
        let numeric = values.iter().any(|cell| is_numeric(cell))
            && values.iter().all(|cell| is_numeric(cell) || is_null_cell(cell));
        numeric.then_some(Detected::SquareMatrix)
    }
}

/// Accepts any non-empty input as comparison pairs.
#[derive(Debug, Default, Clone, Copy)]
pub struct PairsSniffer;

impl FormatSniffer for PairsSniffer {
    fn name(&self) -> &'static str {
        "comparison_pairs"
    }

    fn sniff(&self, lines: &[&str]) -> Option<Detected> {
        let first = lines.first()?;
        Some(Detected::ComparisonPairs {
            delimiter: detect_delimiter(first),
        })
    }
}

/// Sniffers in the order they are consulted.
pub fn sniffer_chain() -> Vec<Box<dyn FormatSniffer>> {
    vec![Box::new(SquareMatrixSniffer), Box::new(PairsSniffer)]
}

/// Run the sniffer chain over the data lines.
pub fn detect_format(lines: &[&str]) -> Option<Detected> {
    sniffer_chain().iter().find_map(|sniffer| {
        let detected = sniffer.sniff(lines);
        debug!(sniffer = sniffer.name(), ?detected, "format sniff");
        detected
    })
}

pub(crate) fn is_numeric(cell: &str) -> bool {
    cell.parse::<f64>().map_or(false, |value| !value.is_nan())
}

pub(crate) fn is_null_cell(cell: &str) -> bool {
    cell.is_empty()
        || cell.eq_ignore_ascii_case("na")
        || cell.eq_ignore_ascii_case("nan")
        || cell.eq_ignore_ascii_case("null")
}
