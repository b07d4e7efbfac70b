mod common;

use common::FOUR_GENOMES;
use fungigt::bindash::{Delimiter, InputFormat};
use fungigt::{build_distance_matrix, parse_file, parse_str, DistanceMatrix, ParseError};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-12
}

#[test]
fn single_bindash_row_end_to_end() {
    let parsed = parse_str("g1.fna\tg2.fna\t0.05\t0.001\t9000/16384\n", "mem").unwrap();
    assert_eq!(parsed.len(), 1);

    let c = &parsed.comparisons[0];
    assert_eq!(c.query, "g1");
    assert_eq!(c.target, "g2");
    assert!(approx(c.mutation_distance, 0.05));
    assert!(approx(c.p_value, 0.001));
    assert!(approx(c.jaccard_index, 9000.0 / 16384.0));
    assert!(approx(c.ani, 0.95));

    let matrix = build_distance_matrix(&parsed.comparisons).unwrap();
    assert_eq!(matrix.labels(), ["g1", "g2"]);
    assert_eq!(matrix.get(0, 1), c.mutation_distance);
    assert_eq!(matrix.get(1, 0), c.mutation_distance);
    assert_eq!(matrix.imputed_pairs(), 0);
}

#[test]
fn hash_fraction_jaccard() {
    let parsed = parse_str("a.fa\tb.fa\t0.1\t0\t8192/16384\n", "mem").unwrap();
    assert_eq!(parsed.comparisons[0].jaccard_index, 0.5);
}

#[test]
fn malformed_distance_defaults_without_aborting() {
    let body = "\
g1\tg2\t0.10
g1\tg3\tnot-a-number
g2\tg3\t0.20
g3\tg4\t0.30
";
    let parsed = parse_str(body, "mem").unwrap();
    assert_eq!(parsed.len(), 4);
    assert_eq!(parsed.diagnostics.defaulted_distances, 1);

    let defaulted = parsed
        .comparisons
        .iter()
        .find(|c| c.pair_key() == ("g1", "g3"))
        .unwrap();
    assert_eq!(defaulted.mutation_distance, 0.5);
    assert_eq!(defaulted.ani, 0.5);
    // No jaccard column: complement of the substituted distance.
    assert_eq!(defaulted.jaccard_index, 0.5);
}

#[test]
fn short_rows_are_skipped() {
    let parsed = parse_str("g1\tg2\t0.1\njunk\ng2\tg3\t0.2\n", "mem").unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed.diagnostics.skipped_lines, 1);
}

#[test]
fn paths_and_genomic_tags_are_normalized() {
    let parsed = parse_str(FOUR_GENOMES, "four").unwrap();
    let genomes: Vec<&str> = parsed.genomes().into_iter().collect();
    assert_eq!(genomes, ["gA", "gB", "gC", "gD"]);
    assert_eq!(parsed.len(), 6);
    assert_eq!(parsed.diagnostics.format, Some(InputFormat::ComparisonPairs));
    assert_eq!(parsed.diagnostics.delimiter, Some(Delimiter::Tab));
}

#[test]
fn comma_and_whitespace_tables() {
    let comma = parse_str("g1.fna,g2.fna,0.05,0.001,0.6\n", "mem").unwrap();
    assert_eq!(comma.diagnostics.delimiter, Some(Delimiter::Comma));
    assert_eq!(comma.comparisons[0].jaccard_index, 0.6);

    let spaced = parse_str("g1.fna   g2.fna  0.05\n", "mem").unwrap();
    assert_eq!(spaced.diagnostics.delimiter, Some(Delimiter::Whitespace));
    assert_eq!(spaced.comparisons[0].query, "g1");
}

#[test]
fn self_pairs_and_duplicates_are_dropped() {
    let body = "g1\tg1\t0\ng1\tg2\t0.1\ng2\tg1\t0.3\n";
    let parsed = parse_str(body, "mem").unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed.comparisons[0].mutation_distance, 0.1);
    assert_eq!(parsed.diagnostics.self_pairs_dropped, 1);
    assert_eq!(parsed.diagnostics.duplicates_dropped, 1);
}

#[test]
fn comment_only_input_is_empty() {
    let err = parse_str("# nothing here\n\n", "mem").unwrap_err();
    assert!(matches!(err, ParseError::EmptyInput { .. }));
}

#[test]
fn only_self_pairs_is_no_valid_data() {
    let err = parse_str("g1\tg1\t0\ng2\tg2\t0\n", "mem").unwrap_err();
    assert!(matches!(err, ParseError::NoValidData { .. }));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = parse_file(dir.path().join("absent.tsv")).unwrap_err();
    assert!(matches!(err, ParseError::Io { .. }));
}

#[test]
fn matrix_tsv_reads_back() {
    let labels: Vec<String> = ["gA", "gB", "gC"].iter().map(|s| s.to_string()).collect();
    #[rustfmt::skip]
    let values = vec![
        0.0,  0.02, 0.1,
        0.02, 0.0,  0.11,
        0.1,  0.11, 0.0,
    ];
    let original = DistanceMatrix::from_square(labels, values).unwrap();

    let parsed = parse_str(&original.to_tsv(), "matrix").unwrap();
    assert_eq!(parsed.diagnostics.format, Some(InputFormat::SquareMatrix));
    assert_eq!(parsed.len(), 3);

    let rebuilt = build_distance_matrix(&parsed.comparisons).unwrap();
    assert_eq!(rebuilt.labels(), original.labels());
    assert_eq!(rebuilt.values(), original.values());
}

#[test]
fn matrix_null_cells_leave_gaps_for_imputation() {
    let body = "\tg1\tg2\tg3\ng1\t0\t0.2\tNA\ng2\t0.2\t0\t0.3\ng3\tNA\t0.3\t0\n";
    let parsed = parse_str(body, "mem").unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed.diagnostics.null_cells, 1);

    let matrix = build_distance_matrix(&parsed.comparisons).unwrap();
    assert!(matrix.is_imputed(0, 2));
    assert!(approx(matrix.get_by_label("g1", "g3").unwrap(), 0.4));
}

#[test]
fn matrix_with_numeric_labels() {
    let body = "\t1\t2\t3\n1\t0\t0.1\t0.2\n2\t0.1\t0\t0.3\n3\t0.2\t0.3\t0\n";
    let parsed = parse_str(body, "mem").unwrap();
    assert_eq!(parsed.diagnostics.format, Some(InputFormat::SquareMatrix));
    assert_eq!(parsed.len(), 3);

    let pairs: Vec<_> = parsed
        .comparisons
        .iter()
        .map(|c| (c.query.as_str(), c.target.as_str(), c.mutation_distance))
        .collect();
    assert_eq!(pairs, [("1", "2", 0.1), ("1", "3", 0.2), ("2", "3", 0.3)]);
}
