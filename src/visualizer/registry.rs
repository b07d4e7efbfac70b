use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use super::{BinDashVisualizer, FileType, Visualizer};

/// Availability of one file type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualizerInfo {
    /// File type.
    pub file_type: FileType,
    /// Recognised suffixes.
    pub extensions: Vec<String>,
    /// Short description.
    pub description: String,
    /// Name of the registered visualizer, if any.
    pub visualizer: Option<String>,
    /// Whether a dedicated visualizer exists.
    pub available: bool,
}

/// Visualizers keyed by the file type they handle.
#[derive(Debug, Default)]
pub struct VisualizerRegistry {
    entries: BTreeMap<FileType, Arc<dyn Visualizer>>,
}

impl VisualizerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Registry with every built-in visualizer.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(BinDashVisualizer::new());
        registry
    }

    /// Register a visualizer, replacing any previous one for its type, and
    /// return a shared handle to it.
    pub fn register<V>(&mut self, visualizer: V) -> Arc<V>
    where
        V: Visualizer + 'static,
    {
        let arc = Arc::new(visualizer);
        self.entries
            .insert(arc.file_type(), Arc::clone(&arc) as Arc<dyn Visualizer>);
        arc
    }

    /// Visualizer for a file type.
    pub fn get(&self, file_type: FileType) -> Option<Arc<dyn Visualizer>> {
        self.entries.get(&file_type).map(Arc::clone)
    }

    /// Availability of every known file type.
    pub fn list(&self) -> Vec<VisualizerInfo> {
        FileType::ALL
            .into_iter()
            .map(|file_type| {
                let visualizer = self.entries.get(&file_type).map(|v| v.name().to_string());
                VisualizerInfo {
                    file_type,
                    extensions: file_type.extensions().iter().map(|e| e.to_string()).collect(),
                    description: file_type.description().to_string(),
                    available: visualizer.is_some(),
                    visualizer,
                }
            })
            .collect()
    }
}
