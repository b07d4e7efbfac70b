use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use super::FileType;

/// Bytes inspected when the extension is inconclusive.
pub const CONTENT_SNIFF_BYTES: usize = 1000;

const CONTENT_KEYWORDS: [(FileType, &[&str]); 3] = [
    (FileType::Bindash, &["query", "target", "mutation_distance", "jaccard"]),
    (FileType::Annotations, &["go:", "kegg:", "pfam:", "cog"]),
    (FileType::Hmmer, &["domain", "evalue", "bitscore"]),
];

/// Guess the file type of `path`.
///
/// The file name is matched against each type's suffixes in
/// [`FileType::ALL`] order. Failing that, the first
/// [`CONTENT_SNIFF_BYTES`] are searched case-insensitively for
/// type-specific keywords. Unreadable files are simply unrecognised.
pub fn detect_file_type(path: &Path) -> Option<FileType> {
    if let Some(ty) = FileType::ALL.into_iter().find(|ty| ty.matches_extension(path)) {
        debug!(path = %path.display(), file_type = %ty, "detected by extension");
        return Some(ty);
    }

    let mut head = Vec::with_capacity(CONTENT_SNIFF_BYTES);
    let read = File::open(path).and_then(|file| {
        file.take(CONTENT_SNIFF_BYTES as u64).read_to_end(&mut head)
    });
    if let Err(err) = read {
        debug!(path = %path.display(), error = %err, "content sniff failed");
        return None;
    }
    let detected = detect_from_content(&String::from_utf8_lossy(&head));
    debug!(path = %path.display(), file_type = ?detected, "detected by content");
    detected
}

/// Keyword search over a text sample.
pub fn detect_from_content(sample: &str) -> Option<FileType> {
    let sample = sample.to_lowercase();
    CONTENT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| sample.contains(k)))
        .map(|(ty, _)| *ty)
}
