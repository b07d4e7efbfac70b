#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

fn snapshot_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("snapshots")
}

/// Compare `actual` with `tests/snapshots/<name>`; `FUNGIGT_UPDATE_SNAPSHOTS=1`
/// rewrites the file instead.
pub fn assert_snapshot(name: &str, actual: &str) {
    let path = snapshot_root().join(name);
    if std::env::var("FUNGIGT_UPDATE_SNAPSHOTS").is_ok() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create snapshot directory");
        }
        fs::write(&path, actual).expect("write snapshot");
        return;
    }

    let expected =
        fs::read_to_string(&path).unwrap_or_else(|_| panic!("snapshot {:?} not found", path));
    if normalize(&expected) != normalize(actual) {
        panic!(
            "Snapshot mismatch for {:?}. Set FUNGIGT_UPDATE_SNAPSHOTS=1 to regenerate.\nExpected:\n{}\nActual:\n{}",
            path, expected, actual
        );
    }
}

fn normalize(input: &str) -> String {
    input.replace("\r\n", "\n")
}

/// Write `body` to a named file inside `dir`.
pub fn write_input(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).expect("create input");
    file.write_all(body.as_bytes()).expect("write input");
    path
}

/// Four genomes, every pair compared, BinDash pairs layout.
pub const FOUR_GENOMES: &str = "\
# query\ttarget\tdistance\tp-value\tjaccard
/data/gA_genomic.fna\t/data/gB_genomic.fna\t0.02\t0.0\t800/1000
/data/gA_genomic.fna\t/data/gC_genomic.fna\t0.10\t0.0\t400/1000
/data/gA_genomic.fna\t/data/gD_genomic.fna\t0.12\t0.0\t350/1000
/data/gB_genomic.fna\t/data/gC_genomic.fna\t0.11\t0.0\t380/1000
/data/gB_genomic.fna\t/data/gD_genomic.fna\t0.13\t0.0\t330/1000
/data/gC_genomic.fna\t/data/gD_genomic.fna\t0.04\t0.0\t700/1000
";
