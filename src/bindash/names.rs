const COMPRESSION_SUFFIXES: [&str; 4] = [".gz", ".bz2", ".xz", ".zst"];
const GENOMIC_EXTENSIONS: [&str; 3] = [".fasta", ".fna", ".fa"];
const GENOMIC_TAG: &str = "_genomic";

/// Reduce a genome path to the identifier used throughout the pipeline.
///
/// Directory components, compression suffixes, a FASTA extension (or, when
/// there is none, a short alphabetic last extension such as `.txt`) and every
/// `_genomic` tag are removed: `/data/GCF_000146045.2_R64_genomic.fna.gz`
/// becomes `GCF_000146045.2_R64`. Accession versions like `.2` are kept.
pub fn normalize_genome_name(raw: &str) -> String {
    let raw = raw.trim();
    let base = raw.rsplit(['/', '\\']).next().unwrap_or(raw);

    let mut name = base;
    if let Some(stripped) = COMPRESSION_SUFFIXES
        .iter()
        .find_map(|suffix| strip_suffix_ignore_case(name, suffix))
    {
        name = stripped;
    }
    name = GENOMIC_EXTENSIONS
        .iter()
        .find_map(|ext| strip_suffix_ignore_case(name, ext))
        .unwrap_or_else(|| file_stem(name));

    let cleaned = name.replace(GENOMIC_TAG, "");
    if cleaned.is_empty() {
        base.to_string()
    } else {
        cleaned
    }
}

fn strip_suffix_ignore_case<'a>(name: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = name.len().checked_sub(suffix.len())?;
    if cut == 0 || !name.is_char_boundary(cut) {
        return None;
    }
    name[cut..]
        .eq_ignore_ascii_case(suffix)
        .then(|| &name[..cut])
}

const MAX_EXTENSION_LEN: usize = 8;

fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 && looks_like_extension(&name[idx + 1..]) => &name[..idx],
        _ => name,
    }
}

fn looks_like_extension(ext: &str) -> bool {
    !ext.is_empty()
        && ext.len() <= MAX_EXTENSION_LEN
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
        && ext.chars().any(|c| c.is_ascii_alphabetic())
}
