//! Label manifest stored next to a model artifact.
//!
//! `trained_plant_disease_model.onnx` is paired with
//! `trained_plant_disease_model.labels.json`, which is either a bare JSON
//! array of labels or an object:
//!
//! ```json
//! {
//!   "version": "2024-11",
//!   "labels": ["Apple___Apple_scab", "..."],
//!   "input": { "width": 128, "height": 128, "layout": "nhwc" }
//! }
//! ```
//!
//! Without a manifest the built-in PlantVillage table and 128x128 NHWC input
//! are used.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use crate::error::{PredictError, Result};
use crate::labels::{LabelTable, CLASS_NAMES};
use crate::preprocess::InputSpec;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelManifest {
    #[serde(default)]
    pub version: Option<String>,
    pub labels: Vec<String>,
    #[serde(default)]
    pub input: InputSpec,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestFile {
    Labels(Vec<String>),
    Full(ModelManifest),
}

impl Default for ModelManifest {
    fn default() -> Self {
        Self {
            version: None,
            labels: CLASS_NAMES.iter().map(|s| s.to_string()).collect(),
            input: InputSpec::default(),
        }
    }
}

/// Where the manifest for `model_path` is expected to live.
pub fn manifest_path_for(model_path: &Path) -> PathBuf {
    model_path.with_extension("labels.json")
}

impl ModelManifest {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        let manifest = match serde_json::from_str::<ManifestFile>(json)? {
            ManifestFile::Labels(labels) => ModelManifest {
                version: None,
                labels,
                input: InputSpec::default(),
            },
            ManifestFile::Full(manifest) => manifest,
        };
        Ok(manifest)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|e| PredictError::model_load(path, e))?;
        let manifest = Self::from_json(&json).map_err(|e| PredictError::model_load(path, e))?;

        if manifest.labels.is_empty() {
            return Err(PredictError::model_load(path, "manifest lists no labels"));
        }
        if manifest.input.width == 0 || manifest.input.height == 0 {
            return Err(PredictError::model_load(path, "manifest input size must be non-zero"));
        }

        Ok(manifest)
    }

    /// Manifest co-located with the model, or the built-in defaults when there is none.
    pub fn for_model(model_path: &Path) -> Result<Self> {
        let path = manifest_path_for(model_path);
        if path.is_file() {
            debug!("Using label manifest {}", path.display());
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn label_table(&self) -> LabelTable {
        LabelTable::new(self.labels.clone())
    }
}
