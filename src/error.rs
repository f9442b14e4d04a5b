use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a single prediction request.
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("failed to load model {path}: {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("could not decode image: {0}")]
    ImageDecode(String),

    #[error("model inference failed: {0}")]
    Inference(String),

    #[error("class index {index} is outside the label table ({len} labels)")]
    LabelIndex { index: usize, len: usize },

    #[error("label table has {labels} entries but the model produced {outputs} scores")]
    LabelTableMismatch { labels: usize, outputs: usize },
}

impl PredictError {
    pub(crate) fn model_load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        PredictError::ModelLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// True when the caller supplied bad input rather than the server being misconfigured.
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictError::ImageDecode(_))
    }
}

pub type Result<T, E = PredictError> = std::result::Result<T, E>;
