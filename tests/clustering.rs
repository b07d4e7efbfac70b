mod common;

use common::{assert_snapshot, FOUR_GENOMES};
use fungigt::cluster::DistanceSort;
use fungigt::render::DendrogramPlan;
use fungigt::{
    build_distance_matrix, classical_mds, parse_str, sanitize_for_clustering, CondensedMatrix,
    Linkage, LinkageMethod,
};
use test_case::test_case;

fn four_genomes() -> CondensedMatrix {
    let parsed = parse_str(FOUR_GENOMES, "four").unwrap();
    sanitize_for_clustering(&build_distance_matrix(&parsed.comparisons).unwrap())
}

#[test]
fn average_linkage_pairs_close_genomes_first() {
    let linkage = Linkage::average(&four_genomes()).unwrap();
    let merges = linkage.merges();
    assert_eq!(merges.len(), 3);

    assert_eq!((merges[0].left, merges[0].right), (0, 1));
    assert!((merges[0].distance - 0.02).abs() < 1e-12);
    assert_eq!((merges[1].left, merges[1].right), (2, 3));
    assert!((merges[1].distance - 0.04).abs() < 1e-12);
    // Mean of the four cross-pair distances.
    assert_eq!((merges[2].left, merges[2].right), (4, 5));
    assert!((merges[2].distance - 0.115).abs() < 1e-12);
    assert_eq!(merges[2].size, 4);
}

#[test]
fn descending_order_puts_looser_cluster_first() {
    let linkage = Linkage::average(&four_genomes()).unwrap();
    assert_eq!(linkage.leaf_order(DistanceSort::Descending), [2, 3, 0, 1]);
    assert_eq!(linkage.leaf_order(DistanceSort::Ascending), [0, 1, 2, 3]);
}

#[test]
fn newick_snapshot() {
    let condensed = four_genomes();
    let linkage = Linkage::average(&condensed).unwrap();
    let newick = linkage.to_newick(condensed.labels()).unwrap();
    assert_snapshot("four_genomes.nwk", &format!("{newick}\n"));
}

#[test]
fn dendrogram_plan_agrees_with_linkage() {
    let parsed = parse_str(FOUR_GENOMES, "four").unwrap();
    let matrix = build_distance_matrix(&parsed.comparisons).unwrap();
    let plan = DendrogramPlan::from_matrix(&matrix, LinkageMethod::Average).unwrap();
    assert_eq!(plan.method, LinkageMethod::Average);
    assert_eq!(plan.labels, ["gA", "gB", "gC", "gD"]);
    assert_eq!(plan.leaf_order, [2, 3, 0, 1]);
    assert!(plan.newick.starts_with("((gA:"));
}

#[test_case(LinkageMethod::Average ; "average")]
#[test_case(LinkageMethod::Complete ; "complete")]
#[test_case(LinkageMethod::Single ; "single")]
#[test_case(LinkageMethod::Ward ; "ward")]
fn every_method_keeps_the_two_clusters(method: LinkageMethod) {
    let linkage = Linkage::new(&four_genomes(), method).unwrap();
    assert_eq!(linkage.method(), method);
    let merges = linkage.merges();
    assert_eq!((merges[0].left, merges[0].right), (0, 1));
    assert_eq!((merges[1].left, merges[1].right), (2, 3));
    assert_eq!(merges[2].size, 4);
    assert!(merges.windows(2).all(|w| w[0].distance <= w[1].distance));
}

#[test_case(LinkageMethod::Single, 0.10 ; "closest cross pair")]
#[test_case(LinkageMethod::Average, 0.115 ; "mean cross pair")]
#[test_case(LinkageMethod::Complete, 0.13 ; "farthest cross pair")]
fn root_height_by_method(method: LinkageMethod, expected: f64) {
    let linkage = Linkage::new(&four_genomes(), method).unwrap();
    assert!((linkage.merges()[2].distance - expected).abs() < 1e-12);
}

#[test]
fn mds_separates_the_two_clusters() {
    let projection = classical_mds(&four_genomes(), 2).unwrap();
    assert_eq!(projection.dimensions(), 2);
    assert_eq!(projection.coordinates.len(), 4);
    assert!(projection.eigenvalues[0] >= projection.eigenvalues[1]);

    let total: f64 = projection.proportion_explained.iter().sum();
    assert!(total > 0.0 && total <= 1.0 + 1e-9);

    let dist = |a: usize, b: usize| {
        let (p, q) = (&projection.coordinates[a], &projection.coordinates[b]);
        ((p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2)).sqrt()
    };
    assert!(dist(0, 1) < dist(0, 2));
    assert!(dist(2, 3) < dist(1, 3));

    // First axis splits {gA, gB} from {gC, gD}.
    let axis: Vec<f64> = projection.coordinates.iter().map(|c| c[0]).collect();
    assert!(axis[0] * axis[2] < 0.0);
    assert!(axis[0] * axis[1] > 0.0);
    assert!(axis[2] * axis[3] > 0.0);
}

#[test]
fn mds_of_two_genomes_recovers_their_distance() {
    let parsed = parse_str("g1\tg2\t0.3\n", "mem").unwrap();
    let condensed = sanitize_for_clustering(&build_distance_matrix(&parsed.comparisons).unwrap());
    let projection = classical_mds(&condensed, 2).unwrap();
    let gap = (projection.coordinates[0][0] - projection.coordinates[1][0]).abs();
    assert!((gap - 0.3).abs() < 1e-9);
}
