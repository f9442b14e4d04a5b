use std::path::Path;

use log::debug;
use ndarray::Array4;
use tract_onnx::prelude::*;

use crate::error::{PredictError, Result};
use crate::preprocess::InputSpec;

/// Anything that turns a preprocessed batch of one into per-class scores.
pub trait ScoreModel {
    fn scores(&self, input: &Array4<f32>) -> Result<Vec<f32>>;
}

type Plan = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX classifier run through tract.
pub struct OnnxModel {
    plan: Plan,
}

impl OnnxModel {
    /// Load and optimise the artifact, pinning its input to `input`'s shape.
    pub fn load(path: &Path, input: &InputSpec) -> Result<Self> {
        if !path.is_file() {
            return Err(PredictError::model_load(path, "no such file"));
        }

        let shape: TVec<usize> = input.shape().iter().copied().collect();
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| {
                model.with_input_fact(0, InferenceFact::dt_shape(f32::datum_type(), shape))
            })
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| PredictError::model_load(path, format!("{:#}", e)))?;

        debug!("Loaded ONNX model {}", path.display());
        Ok(Self { plan })
    }

    /// Number of scores the model produces, when its output shape is fully known.
    pub fn output_len(&self) -> Option<usize> {
        let fact = self.plan.model().output_fact(0).ok()?;
        fact.shape.as_concrete().map(|dims| dims.iter().product())
    }
}

impl ScoreModel for OnnxModel {
    fn scores(&self, input: &Array4<f32>) -> Result<Vec<f32>> {
        let data: Vec<f32> = input.iter().copied().collect();
        let tensor = Tensor::from_shape(input.shape(), &data)
            .map_err(|e| PredictError::Inference(format!("{:#}", e)))?;

        let outputs = self
            .plan
            .run(tvec!(tensor.into()))
            .map_err(|e| PredictError::Inference(format!("{:#}", e)))?;

        let output = outputs
            .first()
            .ok_or_else(|| PredictError::Inference("model produced no outputs".into()))?;
        let scores = output
            .to_array_view::<f32>()
            .map_err(|e| PredictError::Inference(format!("{:#}", e)))?;

        Ok(scores.iter().copied().collect())
    }
}
