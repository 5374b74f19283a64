// ============================================================
// Layer 4 - Feature Batcher
// ============================================================
// Moves a FeatureMatrix onto a burn device as a [rows, cols]
// float tensor. The matrix is already row-major and rectangular,
// so this is a single copy plus a shape.

use burn::{prelude::*, tensor::TensorData};

use crate::data::preprocessor::FeatureMatrix;

#[derive(Clone, Debug)]
pub struct FeatureBatcher<B: Backend> {
    /// The device to create tensors on
    pub device: B::Device,
}

impl<B: Backend> FeatureBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Shape: [rows, cols]
    pub fn batch(&self, features: &FeatureMatrix) -> Tensor<B, 2> {
        Tensor::<B, 2>::from_data(
            TensorData::new(features.values().to_vec(), [features.rows(), features.cols()]),
            &self.device,
        )
    }
}
