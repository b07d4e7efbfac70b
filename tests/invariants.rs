use proptest::prelude::*;

use fungigt::cluster::DistanceSort;
use fungigt::{build_distance_matrix, parse_str, sanitize_for_clustering, summarize, Linkage};

fn distance_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (-0.5f64..1.5).prop_map(|d| format!("{d}")),
        1 => Just("NaN".to_string()),
        1 => Just("oops".to_string()),
    ]
}

fn jaccard_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..20_000, 1u32..20_000).prop_map(|(a, b)| format!("{a}/{b}")),
        (-1.0f64..2.0).prop_map(|j| format!("{j}")),
        Just("0/0".to_string()),
    ]
}

fn table() -> impl Strategy<Value = String> {
    prop::collection::vec(
        (0usize..6, 0usize..6, distance_cell(), -1.0f64..2.0, jaccard_cell()),
        1..30,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(q, t, d, p, j)| format!("/genomes/g{q}.fna\tg{t}_genomic.fa\t{d}\t{p}\t{j}\n"))
            .collect()
    })
}

proptest! {
    #[test]
    fn parsed_records_are_canonical(body in table()) {
        let Ok(parsed) = parse_str(&body, "prop") else {
            // Every row was a self-pair.
            return Ok(());
        };
        let mut seen = std::collections::HashSet::new();
        for c in &parsed.comparisons {
            prop_assert!(c.query != c.target);
            prop_assert!(seen.insert(c.pair_key()));
            for value in [c.mutation_distance, c.p_value, c.jaccard_index, c.ani] {
                prop_assert!((0.0..=1.0).contains(&value));
            }
            prop_assert_eq!(c.ani, 1.0 - c.mutation_distance);
        }

        let stats = summarize(&parsed.comparisons);
        prop_assert_eq!(stats.total_comparisons, parsed.len());
        prop_assert!(stats.min_ani <= stats.median_ani && stats.median_ani <= stats.max_ani);
    }

    #[test]
    fn matrices_are_symmetric_and_bounded(body in table()) {
        let Ok(parsed) = parse_str(&body, "prop") else {
            return Ok(());
        };
        let matrix = build_distance_matrix(&parsed.comparisons).unwrap();
        prop_assert!(matrix.is_symmetric());
        prop_assert!(matrix.has_zero_diagonal());
        prop_assert!(matrix.values().iter().all(|v| (0.0..=1.0).contains(v)));
        prop_assert_eq!(matrix.len(), parsed.genomes().len());
    }

    #[test]
    fn linkage_is_monotone_and_orders_every_leaf(body in table()) {
        let Ok(parsed) = parse_str(&body, "prop") else {
            return Ok(());
        };
        let matrix = build_distance_matrix(&parsed.comparisons).unwrap();
        let linkage = Linkage::average(&sanitize_for_clustering(&matrix)).unwrap();

        prop_assert_eq!(linkage.merges().len(), matrix.len() - 1);
        for pair in linkage.merges().windows(2) {
            prop_assert!(pair[1].distance >= pair[0].distance - 1e-12);
        }
        for sort in [DistanceSort::Original, DistanceSort::Ascending, DistanceSort::Descending] {
            let mut order = linkage.leaf_order(sort);
            order.sort_unstable();
            prop_assert_eq!(order, (0..matrix.len()).collect::<Vec<_>>());
        }
    }
}
