//! File-type dispatch and the visualizers behind it.

mod api;
mod bindash;
mod detect;
mod registry;

pub use api::{
    Analysis, AnalysisError, ArtifactRecord, DataSummary, FileType, RenderContext,
    UnknownFileType, ValidationError, Visualizer,
};
pub use bindash::BinDashVisualizer;
pub use detect::{detect_file_type, detect_from_content, CONTENT_SNIFF_BYTES};
pub use registry::{VisualizerInfo, VisualizerRegistry};
