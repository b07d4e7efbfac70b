//! BinDash pairwise-distance parsing.
//!
//! Turns the loosely structured text produced by BinDash (and tools that
//! emit the same kind of table) into canonical [`PairwiseComparison`]
//! records. Two layouts are understood:
//!
//! - comparison pairs: `query, target, distance, [p-value], [jaccard]`
//!   delimited by tabs, commas or whitespace;
//! - a labelled square distance matrix, tab delimited.
//!
//! Layout detection is an ordered chain of [`FormatSniffer`]s. Row-level
//! problems never abort a parse: bad values are replaced by defaults and
//! counted in [`ParseDiagnostics`].

mod names;
mod parser;
mod sniff;
mod types;

pub use names::normalize_genome_name;
pub use parser::{
    data_lines, parse_file, parse_str, ParseDiagnostics, ParseError, ParsedComparisons,
    DEFAULT_DISTANCE,
};
pub use sniff::{
    detect_delimiter, detect_format, sniffer_chain, Delimiter, Detected, FormatSniffer,
    InputFormat, PairsSniffer, SquareMatrixSniffer,
};
pub use types::PairwiseComparison;
pub(crate) use types::clamp_unit;
