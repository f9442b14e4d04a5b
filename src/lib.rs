//! Plant leaf disease classification.
//!
//! The [`pipeline`] module turns an uploaded JPEG/PNG into one of the 38
//! PlantVillage class labels using an ONNX export of the trained classifier.
//! [`handlers`] exposes that pipeline over HTTP with actix-web.

pub mod config;
pub mod error;
pub mod handlers;
pub mod labels;
pub mod manifest;
pub mod model;
pub mod models;
pub mod pipeline;
pub mod preprocess;
pub mod views;

pub use error::PredictError;
pub use labels::LabelTable;
pub use pipeline::{predict, predict_with, Prediction};
