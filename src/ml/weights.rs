// ============================================================
// Layer 5 - Weight Tensors
// ============================================================
// Random initialisation and the persisted form of model weights.
//
// Every draw goes through the model's own StdRng rather than the
// backend's RNG, so a seed fully determines the weights.
//
// WeightTensor is the serialisable snapshot: the shape plus a flat
// row-major Vec<f32>. Converting a tensor to a snapshot and back
// preserves every value bit for bit.

use anyhow::{anyhow, ensure, Result};
use burn::{prelude::*, tensor::TensorData};
use rand::{rngs::StdRng, Rng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Tensor of U(0, 1) samples.
pub fn uniform<B: Backend, const D: usize>(
    rng:    &mut StdRng,
    shape:  [usize; D],
    device: &B::Device,
) -> Tensor<B, D> {
    let count: usize = shape.iter().product();
    let values: Vec<f32> = (0..count).map(|_| rng.gen::<f32>()).collect();
    Tensor::from_data(TensorData::new(values, shape), device)
}

/// Tensor of N(0, 1) samples.
pub fn normal<B: Backend, const D: usize>(
    rng:    &mut StdRng,
    shape:  [usize; D],
    device: &B::Device,
) -> Tensor<B, D> {
    let count: usize = shape.iter().product();
    let values: Vec<f32> = (0..count).map(|_| rng.sample::<f32, _>(StandardNormal)).collect();
    Tensor::from_data(TensorData::new(values, shape), device)
}

/// Copy a tensor's values out to the host.
pub fn to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Result<Vec<f32>> {
    tensor
        .into_data()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("cannot read tensor values: {e:?}"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTensor {
    pub shape:  Vec<usize>,
    pub values: Vec<f32>,
}

impl WeightTensor {
    pub fn from_tensor<B: Backend, const D: usize>(tensor: &Tensor<B, D>) -> Result<Self> {
        let shape  = tensor.dims().to_vec();
        let values = to_vec(tensor.clone())?;
        Ok(Self { shape, values })
    }

    /// Rebuild a rank-D tensor. Fails if the stored rank or element
    /// count doesn't agree with the shape.
    pub fn to_tensor<B: Backend, const D: usize>(&self, device: &B::Device) -> Result<Tensor<B, D>> {
        let shape: [usize; D] = self.shape.as_slice().try_into().map_err(|_| {
            anyhow!("expected a rank-{D} tensor, got shape {:?}", self.shape)
        })?;
        let expected: usize = shape.iter().product();
        ensure!(
            expected == self.values.len(),
            "tensor of shape {:?} needs {expected} values, got {}",
            self.shape,
            self.values.len()
        );
        Ok(Tensor::from_data(TensorData::new(self.values.clone(), shape), device))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use rand::SeedableRng;

    type B = NdArray;

    #[test]
    fn test_uniform_is_seeded_and_in_range() {
        let device = Default::default();
        let a = to_vec(uniform::<B, 2>(&mut StdRng::seed_from_u64(7), [4, 3], &device)).unwrap();
        let b = to_vec(uniform::<B, 2>(&mut StdRng::seed_from_u64(7), [4, 3], &device)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert!(a.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn test_snapshot_is_bit_exact() {
        let device = Default::default();
        let t = normal::<B, 3>(&mut StdRng::seed_from_u64(1), [3, 3, 4], &device);
        let snap = WeightTensor::from_tensor(&t).unwrap();
        assert_eq!(snap.shape, vec![3, 3, 4]);

        let back: Tensor<B, 3> = snap.to_tensor(&device).unwrap();
        let again = WeightTensor::from_tensor(&back).unwrap();
        let bits = |w: &WeightTensor| w.values.iter().map(|v| v.to_bits()).collect::<Vec<_>>();
        assert_eq!(bits(&snap), bits(&again));
    }

    #[test]
    fn test_wrong_rank_rejected() {
        let device = Default::default();
        let snap = WeightTensor { shape: vec![2, 2], values: vec![0.0; 4] };
        assert!(snap.to_tensor::<B, 3>(&device).is_err());
    }

    #[test]
    fn test_wrong_length_rejected() {
        let device = Default::default();
        let snap = WeightTensor { shape: vec![2, 2], values: vec![0.0; 3] };
        assert!(snap.to_tensor::<B, 2>(&device).is_err());
    }
}
