#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use ndarray::Array4;
use plant_disease_detector::error::{PredictError, Result};
use plant_disease_detector::labels::NUM_CLASSES;
use plant_disease_detector::model::ScoreModel;
use prost::Message;
use tract_onnx::pb::{
    attribute_proto::AttributeType, tensor_proto::DataType, type_proto, AttributeProto,
    GraphProto, ModelProto, NodeProto, OperatorSetIdProto, TensorProto, TypeProto,
    ValueInfoProto,
};

pub const APPLE_HEALTHY: usize = 3;
pub const TOMATO_LEAF_MOLD: usize = 31;

pub fn solid_image(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb(color)))
}

pub fn encode(image: &DynamicImage, format: ImageOutputFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn green_leaf_png() -> Vec<u8> {
    encode(&solid_image(256, 256, [30, 180, 40]), ImageOutputFormat::Png)
}

pub fn moldy_leaf_jpeg() -> Vec<u8> {
    encode(&solid_image(320, 240, [200, 60, 40]), ImageOutputFormat::Jpeg(90))
}

/// Scores by dominant colour channel: green votes for a healthy apple leaf,
/// red for tomato leaf mold, anything else ties everywhere.
pub struct ColourModel;

impl ScoreModel for ColourModel {
    fn scores(&self, input: &Array4<f32>) -> Result<Vec<f32>> {
        if input.shape() != [1, 128, 128, 3] {
            return Err(PredictError::Inference(format!(
                "unexpected input shape {:?}",
                input.shape()
            )));
        }

        let mut sums = [0.0f32; 3];
        for ((_, _, _, c), value) in input.indexed_iter() {
            sums[c] += *value;
        }

        let mut scores = vec![0.0; NUM_CLASSES];
        if sums[1] > sums[0] && sums[1] > sums[2] {
            scores[APPLE_HEALTHY] = 1.0;
        } else if sums[0] > sums[1] && sums[0] > sums[2] {
            scores[TOMATO_LEAF_MOLD] = 1.0;
        }
        Ok(scores)
    }
}

/// Returns the same scores for every input.
pub struct FixedScores(pub Vec<f32>);

impl ScoreModel for FixedScores {
    fn scores(&self, _input: &Array4<f32>) -> Result<Vec<f32>> {
        Ok(self.0.clone())
    }
}

/// Fails every forward pass.
pub struct BrokenModel;

impl ScoreModel for BrokenModel {
    fn scores(&self, _input: &Array4<f32>) -> Result<Vec<f32>> {
        Err(PredictError::Inference("graph execution failed".into()))
    }
}

pub fn multipart_body(boundary: &str, parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                    name, filename
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

fn float_value(name: &str) -> ValueInfoProto {
    ValueInfoProto {
        name: name.to_string(),
        r#type: Some(TypeProto {
            denotation: String::new(),
            value: Some(type_proto::Value::TensorType(type_proto::Tensor {
                elem_type: DataType::Float as i32,
                shape: None,
            })),
        }),
        ..Default::default()
    }
}

/// Write a small ONNX classifier to `path`: mean colour per channel over an
/// NHWC image, then a `[3, 38]` projection. Green scores `Apple___healthy`,
/// red scores `Tomato___Leaf_Mold`, every other class stays at zero.
pub fn write_colour_onnx(path: &Path) {
    let mut weights = vec![0.0f32; 3 * NUM_CLASSES];
    weights[NUM_CLASSES + APPLE_HEALTHY] = 1.0;
    weights[TOMATO_LEAF_MOLD] = 1.0;

    let reduce = NodeProto {
        op_type: "ReduceMean".into(),
        input: vec!["image".into()],
        output: vec!["mean".into()],
        attribute: vec![
            AttributeProto {
                name: "axes".into(),
                r#type: AttributeType::Ints as i32,
                ints: vec![1, 2],
                ..Default::default()
            },
            AttributeProto {
                name: "keepdims".into(),
                r#type: AttributeType::Int as i32,
                i: 0,
                ..Default::default()
            },
        ],
        ..Default::default()
    };
    let project = NodeProto {
        op_type: "MatMul".into(),
        input: vec!["mean".into(), "weights".into()],
        output: vec!["scores".into()],
        ..Default::default()
    };

    let graph = GraphProto {
        name: "colour_classifier".into(),
        node: vec![reduce, project],
        initializer: vec![TensorProto {
            name: "weights".into(),
            dims: vec![3, NUM_CLASSES as i64],
            data_type: DataType::Float as i32,
            float_data: weights,
            ..Default::default()
        }],
        input: vec![float_value("image")],
        output: vec![float_value("scores")],
        ..Default::default()
    };

    let model = ModelProto {
        ir_version: 7,
        opset_import: vec![OperatorSetIdProto {
            domain: String::new(),
            version: 11,
        }],
        graph: Some(graph),
        ..Default::default()
    };

    std::fs::write(path, model.encode_to_vec()).unwrap();
}
