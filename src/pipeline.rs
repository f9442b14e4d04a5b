//! The prediction path: load model, preprocess upload, forward pass,
//! arg-max, label lookup.
//!
//! Every call is independent. The model is loaded for the call and dropped
//! when it returns; nothing is cached between requests.

use std::fmt;
use std::path::Path;

use log::debug;

use crate::error::{PredictError, Result};
use crate::labels::LabelTable;
use crate::manifest::ModelManifest;
use crate::model::{OnnxModel, ScoreModel};
use crate::preprocess::{self, InputSpec};

/// Top-1 class chosen for an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prediction {
    pub class_index: usize,
    pub label: String,
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Prediction: {}", self.label)
    }
}

/// Index of the largest score. Ties go to the lowest index and NaN never wins.
pub fn argmax(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (index, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((index, score)),
        }
    }
    best.map(|(index, _)| index)
}

/// Classify `image_bytes` with the model stored at `model_path`.
///
/// The label table and input geometry come from the manifest next to the
/// model when one exists, otherwise from the built-in PlantVillage defaults.
pub fn predict(image_bytes: &[u8], model_path: &Path) -> Result<Prediction> {
    let manifest = ModelManifest::for_model(model_path)?;
    let model = OnnxModel::load(model_path, &manifest.input)?;
    predict_with(image_bytes, &model, &manifest.label_table(), &manifest.input)
}

/// Run the prediction steps after model loading against any scorer.
pub fn predict_with(
    image_bytes: &[u8],
    model: &dyn ScoreModel,
    labels: &LabelTable,
    input: &InputSpec,
) -> Result<Prediction> {
    let tensor = preprocess::preprocess(image_bytes, input)?;
    let scores = model.scores(&tensor)?;
    debug!("Model produced {} scores", scores.len());

    labels.check_outputs(scores.len())?;

    let class_index = argmax(&scores)
        .ok_or_else(|| PredictError::Inference("model produced no comparable scores".into()))?;
    let label = labels.get(class_index)?.to_string();

    Ok(Prediction { class_index, label })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_picks_largest() {
        assert_eq!(argmax(&[0.1, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[-3.0, -1.0, -2.0]), Some(1));
    }

    #[test]
    fn argmax_ties_go_to_lowest_index() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4, 0.0]), Some(1));
        assert_eq!(argmax(&[1.0, 1.0, 1.0]), Some(0));
    }

    #[test]
    fn argmax_skips_nan() {
        assert_eq!(argmax(&[f32::NAN, 0.3, 0.1]), Some(1));
        assert_eq!(argmax(&[0.3, f32::NAN, 0.9]), Some(2));
        assert_eq!(argmax(&[f32::NAN, f32::NAN]), None);
    }

    #[test]
    fn argmax_of_empty_is_none() {
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn display_matches_rendered_text() {
        let prediction = Prediction {
            class_index: 3,
            label: "Apple___healthy".into(),
        };
        assert_eq!(prediction.to_string(), "Prediction: Apple___healthy");
    }

    #[test]
    fn missing_model_is_model_load_error() {
        let err = predict(b"irrelevant", Path::new("/nonexistent/model.onnx")).unwrap_err();
        assert!(matches!(err, PredictError::ModelLoad { .. }));
    }
}
