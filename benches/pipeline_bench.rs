//! Parsing, matrix and clustering throughput on synthetic BinDash tables.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fungigt::*;

fn synthetic_table(genomes: usize) -> String {
    let mut out = String::from("# query\ttarget\tdistance\tp-value\tjaccard\n");
    for i in 0..genomes {
        for j in (i + 1)..genomes {
            let d = ((i * 31 + j * 17) % 97) as f64 / 1000.0;
            out.push_str(&format!(
                "/data/g{i}_genomic.fna\t/data/g{j}_genomic.fna\t{d}\t0\t{}/1000\n",
                1000 - (d * 5000.0) as usize
            ));
        }
    }
    out
}

fn benchmark_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    for genomes in [25usize, 100] {
        let table = synthetic_table(genomes);

        group.bench_with_input(BenchmarkId::new("parse", genomes), &table, |b, table| {
            b.iter(|| parse_str(black_box(table), "bench").map(|p| p.len()))
        });

        let parsed = match parse_str(&table, "bench") {
            Ok(parsed) => parsed,
            Err(err) => panic!("synthetic table failed to parse: {err}"),
        };
        group.bench_with_input(
            BenchmarkId::new("matrix", genomes),
            &parsed.comparisons,
            |b, comparisons| b.iter(|| build_distance_matrix(black_box(comparisons))),
        );

        let matrix = match build_distance_matrix(&parsed.comparisons) {
            Ok(matrix) => matrix,
            Err(err) => panic!("synthetic matrix failed: {err}"),
        };
        let condensed = sanitize_for_clustering(&matrix);
        group.bench_with_input(
            BenchmarkId::new("average_linkage", genomes),
            &condensed,
            |b, condensed| b.iter(|| Linkage::average(black_box(condensed))),
        );
        group.bench_with_input(BenchmarkId::new("mds", genomes), &condensed, |b, condensed| {
            b.iter(|| classical_mds(black_box(condensed), 2))
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_pipeline);
criterion_main!(benches);
