use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::Prediction;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub class_index: usize,
    pub prediction: String,
    pub message: String,
}

impl PredictionResponse {
    pub fn new(request_id: Uuid, prediction: &Prediction) -> Self {
        Self {
            request_id,
            class_index: prediction.class_index,
            prediction: prediction.label.clone(),
            message: prediction.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct WarningResponse {
    pub warning: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ErrorResponse {
    pub request_id: Uuid,
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HealthResponse {
    pub status: String,
}
