// ============================================================
// Layer 5 - Autoencoder Anomaly Detector
// ============================================================
// A single linear encode/decode pair:
//
//   x ──(W_enc: input_dim × encoding_dim)──▶ z ──(W_dec)──▶ x̂
//
// The anomaly score of a row is its mean squared reconstruction
// error, mean((x − x̂)²). Rows scoring strictly above the threshold
// are flagged.
//
// The weights are never fitted. "Training" nudges them down by
// seeded uniform noise that shrinks each epoch, and reports a
// loss just below the true reconstruction error.

use anyhow::{ensure, Result};
use burn::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::data::{
    batcher::FeatureBatcher,
    preprocessor::{FeatureMatrix, Preprocessor},
};
use crate::domain::{
    epoch::EpochMetrics,
    request::{check_epochs, ModelRequest},
    traits::{DetectionModel, Persistable},
};
use crate::ml::{
    weights::{self, WeightTensor},
    ModelBackend, ModelDevice, DEFAULT_SEED,
};

pub const DEFAULT_THRESHOLD: f32 = 0.15;
pub const INPUT_DIM:         usize = 10;
pub const ENCODING_DIM:      usize = 5;

const LEARNING_RATE:          f64 = 0.01;
const BASE_IMPROVEMENT:       f64 = 0.05;
const MAX_RANDOM_IMPROVEMENT: f64 = 0.01;

/// `results` payload of a predict command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub is_anomaly:     Vec<bool>,
    pub anomaly_scores: Vec<f32>,
}

/// Everything needed to rebuild the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoencoderState {
    pub encoder_weights: WeightTensor,
    pub decoder_weights: WeightTensor,
    pub threshold:       f32,
    pub input_dim:       usize,
    pub encoding_dim:    usize,
}

pub struct AutoencoderModel {
    encoder:      Tensor<ModelBackend, 2>,
    decoder:      Tensor<ModelBackend, 2>,
    threshold:    f32,
    input_dim:    usize,
    encoding_dim: usize,
    history:      Vec<EpochMetrics>,
    rng:          StdRng,
    batcher:      FeatureBatcher<ModelBackend>,
}

impl AutoencoderModel {
    /// Draw fresh weights from `seed`. The same seed always yields
    /// the same weights and the same sequence of later draws.
    pub fn new(seed: u64) -> Self {
        let device: ModelDevice = Default::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let encoder = weights::uniform(&mut rng, [INPUT_DIM, ENCODING_DIM], &device);
        let decoder = weights::uniform(&mut rng, [ENCODING_DIM, INPUT_DIM], &device);

        Self {
            encoder,
            decoder,
            threshold:    DEFAULT_THRESHOLD,
            input_dim:    INPUT_DIM,
            encoding_dim: ENCODING_DIM,
            history:      Vec::new(),
            rng,
            batcher:      FeatureBatcher::new(device),
        }
    }

    /// History of the most recent `fit` call
    pub fn last_history(&self) -> &[EpochMetrics] { &self.history }

    /// [n, input_dim] → [n, encoding_dim]
    pub fn encode(&self, x: Tensor<ModelBackend, 2>) -> Tensor<ModelBackend, 2> {
        x.matmul(self.encoder.clone())
    }

    /// [n, encoding_dim] → [n, input_dim]
    pub fn decode(&self, z: Tensor<ModelBackend, 2>) -> Tensor<ModelBackend, 2> {
        z.matmul(self.decoder.clone())
    }

    /// Per-row mean squared error, shape [n, 1]
    fn reconstruction_error(
        original:      Tensor<ModelBackend, 2>,
        reconstructed: Tensor<ModelBackend, 2>,
    ) -> Tensor<ModelBackend, 2> {
        let diff = original - reconstructed;
        (diff.clone() * diff).mean_dim(1)
    }

    fn check_width(&self, data: &FeatureMatrix) -> Result<()> {
        ensure!(
            data.cols() == self.input_dim,
            "expected {} features per row, got {}",
            self.input_dim,
            data.cols()
        );
        Ok(())
    }

    /// Anomaly score per row. Higher means more unusual.
    pub fn predict_scores(&self, data: &FeatureMatrix) -> Result<Vec<f32>> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        self.check_width(data)?;

        let x     = self.batcher.batch(data);
        let recon = self.decode(self.encode(x.clone()));
        weights::to_vec(Self::reconstruction_error(x, recon))
    }

    /// Score every row and flag the ones strictly above `threshold`
    /// (or the model's own threshold when `None`).
    pub fn detect_anomalies(
        &self,
        data:      &FeatureMatrix,
        threshold: Option<f32>,
    ) -> Result<AnomalyReport> {
        let threshold = threshold.unwrap_or(self.threshold);
        let scores    = self.predict_scores(data)?;
        let flags: Vec<bool> = scores.iter().map(|&s| s > threshold).collect();

        tracing::debug!(
            "Scored {} rows, {} above threshold {}",
            scores.len(),
            flags.iter().filter(|&&f| f).count(),
            threshold
        );

        Ok(AnomalyReport { is_anomaly: flags, anomaly_scores: scores })
    }

    /// Run the training simulation for `epochs` epochs.
    pub fn fit(&mut self, data: &FeatureMatrix, epochs: usize) -> Result<Vec<EpochMetrics>> {
        check_epochs(epochs)?;
        ensure!(!data.is_empty(), "cannot train on an empty dataset");
        self.check_width(data)?;

        let device      = self.batcher.device.clone();
        let x           = self.batcher.batch(data);
        let mut history = Vec::new();

        for epoch in 0..epochs {
            let recon  = self.decode(self.encode(x.clone()));
            let errors = weights::to_vec(Self::reconstruction_error(x.clone(), recon))?;
            let loss   = errors.iter().map(|&e| e as f64).sum::<f64>() / errors.len() as f64;

            // Shrinks linearly from 1 towards 0 over the run
            let noise_factor       = 1.0 - epoch as f64 / epochs as f64;
            let random_improvement = noise_factor * self.rng.gen::<f64>() * MAX_RANDOM_IMPROVEMENT;
            let epoch_loss         = loss * (1.0 - BASE_IMPROVEMENT - random_improvement);

            let step      = (LEARNING_RATE * noise_factor) as f32;
            let enc_noise = weights::uniform::<ModelBackend, 2>(&mut self.rng, self.encoder.dims(), &device);
            self.encoder  = self.encoder.clone() - enc_noise.mul_scalar(step);
            let dec_noise = weights::uniform::<ModelBackend, 2>(&mut self.rng, self.decoder.dims(), &device);
            self.decoder  = self.decoder.clone() - dec_noise.mul_scalar(step);

            tracing::debug!("Epoch {:>3}/{} | loss={:.6}", epoch + 1, epochs, epoch_loss);
            history.push(EpochMetrics::new(epoch + 1, epoch_loss));
        }

        self.history = history.clone();
        Ok(history)
    }
}

impl Default for AutoencoderModel {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl DetectionModel for AutoencoderModel {
    fn name(&self) -> &'static str {
        <Self as Persistable>::KIND
    }

    fn train(&mut self, request: &ModelRequest) -> Result<Vec<EpochMetrics>> {
        let data = Preprocessor::new().features(&request.data)?;
        tracing::info!("Training autoencoder on {} rows for {} epochs", data.rows(), request.epochs);
        self.fit(&data, request.epochs)
    }

    fn predict(&mut self, request: &ModelRequest) -> Result<Value> {
        let data   = Preprocessor::new().features(&request.data)?;
        let report = self.detect_anomalies(&data, request.threshold)?;
        Ok(serde_json::to_value(report)?)
    }
}

impl Persistable for AutoencoderModel {
    const KIND: &'static str = "autoencoder";

    type State = AutoencoderState;

    fn to_state(&self) -> Result<AutoencoderState> {
        Ok(AutoencoderState {
            encoder_weights: WeightTensor::from_tensor(&self.encoder)?,
            decoder_weights: WeightTensor::from_tensor(&self.decoder)?,
            threshold:       self.threshold,
            input_dim:       self.input_dim,
            encoding_dim:    self.encoding_dim,
        })
    }

    fn restore(&mut self, state: AutoencoderState) -> Result<()> {
        let device = self.batcher.device.clone();
        let encoder: Tensor<ModelBackend, 2> = state.encoder_weights.to_tensor(&device)?;
        let decoder: Tensor<ModelBackend, 2> = state.decoder_weights.to_tensor(&device)?;

        ensure!(
            encoder.dims() == [state.input_dim, state.encoding_dim],
            "encoder weights {:?} don't match {}x{}",
            encoder.dims(),
            state.input_dim,
            state.encoding_dim
        );
        ensure!(
            decoder.dims() == [state.encoding_dim, state.input_dim],
            "decoder weights {:?} don't match {}x{}",
            decoder.dims(),
            state.encoding_dim,
            state.input_dim
        );
        ensure!(state.threshold.is_finite(), "threshold must be finite");

        self.encoder      = encoder;
        self.decoder      = decoder;
        self.threshold    = state.threshold;
        self.input_dim    = state.input_dim;
        self.encoding_dim = state.encoding_dim;
        Ok(())
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(n: usize) -> FeatureMatrix {
        let values = (0..n * INPUT_DIM).map(|i| (i % 7) as f32 / 7.0).collect();
        FeatureMatrix::new(n, INPUT_DIM, values).unwrap()
    }

    /// 2 → 1 → 2 model that keeps the first feature and drops the second
    fn tiny_model() -> AutoencoderModel {
        let mut model = AutoencoderModel::new(0);
        model
            .restore(AutoencoderState {
                encoder_weights: WeightTensor { shape: vec![2, 1], values: vec![1.0, 0.0] },
                decoder_weights: WeightTensor { shape: vec![1, 2], values: vec![1.0, 0.0] },
                threshold:       1.0,
                input_dim:       2,
                encoding_dim:    1,
            })
            .unwrap();
        model
    }

    #[test]
    fn test_same_seed_same_weights() {
        let a = AutoencoderModel::new(42).to_state().unwrap();
        let b = AutoencoderModel::new(42).to_state().unwrap();
        let c = AutoencoderModel::new(43).to_state().unwrap();
        assert_eq!(a, b);
        assert_ne!(a.encoder_weights, c.encoder_weights);
        assert_eq!(a.encoder_weights.shape, vec![INPUT_DIM, ENCODING_DIM]);
        assert_eq!(a.decoder_weights.shape, vec![ENCODING_DIM, INPUT_DIM]);
    }

    #[test]
    fn test_reconstruction_error_by_hand() {
        // x = [1, 2] → z = 1 → x̂ = [1, 0] → ((0)² + (2)²) / 2 = 2
        // x = [3, 1] → z = 3 → x̂ = [3, 0] → ((0)² + (1)²) / 2 = 0.5
        let model = tiny_model();
        let data  = FeatureMatrix::new(2, 2, vec![1.0, 2.0, 3.0, 1.0]).unwrap();
        let report = model.detect_anomalies(&data, None).unwrap();
        assert_eq!(report.anomaly_scores, vec![2.0, 0.5]);
        assert_eq!(report.is_anomaly, vec![true, false]);
    }

    #[test]
    fn test_threshold_is_strict_and_overridable() {
        let model = tiny_model();
        let data  = FeatureMatrix::new(1, 2, vec![1.0, 2.0]).unwrap();
        // score == threshold is not an anomaly
        assert_eq!(model.detect_anomalies(&data, Some(2.0)).unwrap().is_anomaly, vec![false]);
        assert_eq!(model.detect_anomalies(&data, Some(1.9)).unwrap().is_anomaly, vec![true]);
    }

    #[test]
    fn test_flags_follow_scores() {
        let model  = AutoencoderModel::default();
        let report = model.detect_anomalies(&rows(8), None).unwrap();
        assert_eq!(report.anomaly_scores.len(), 8);
        for (score, flag) in report.anomaly_scores.iter().zip(&report.is_anomaly) {
            assert!(*score >= 0.0);
            assert_eq!(*flag, *score > model.threshold);
        }
    }

    #[test]
    fn test_empty_predict_is_empty() {
        let report = AutoencoderModel::default()
            .detect_anomalies(&FeatureMatrix::empty(), None)
            .unwrap();
        assert!(report.anomaly_scores.is_empty());
        assert!(report.is_anomaly.is_empty());
    }

    #[test]
    fn test_wrong_width_rejected() {
        let data = FeatureMatrix::new(1, 3, vec![0.0; 3]).unwrap();
        let err  = AutoencoderModel::default().predict_scores(&data).unwrap_err();
        assert!(err.to_string().contains("expected 10 features per row, got 3"));
    }

    #[test]
    fn test_fit_history_shape() {
        let mut model = AutoencoderModel::default();
        let history   = model.fit(&rows(4), 5).unwrap();
        assert_eq!(history.len(), 5);
        for (i, m) in history.iter().enumerate() {
            assert_eq!(m.epoch, i + 1);
            assert!(m.accuracy.is_none());
            assert!(m.loss > 0.0);
        }
        assert_eq!(model.last_history(), history.as_slice());
    }

    #[test]
    fn test_reported_loss_is_below_true_loss() {
        let mut model = AutoencoderModel::default();
        let data      = rows(4);
        let scores    = model.predict_scores(&data).unwrap();
        let true_loss = scores.iter().map(|&s| s as f64).sum::<f64>() / scores.len() as f64;

        let first = &model.fit(&data, 3).unwrap()[0];
        // first epoch: loss * (1 - 0.05 - up to 0.01)
        assert!(first.loss <= true_loss * 0.95 + 1e-9);
        assert!(first.loss >= true_loss * 0.94 - 1e-9);
    }

    #[test]
    fn test_fit_only_decreases_weights() {
        let mut model = AutoencoderModel::default();
        let before    = model.to_state().unwrap();
        model.fit(&rows(2), 3).unwrap();
        let after = model.to_state().unwrap();

        for (b, a) in before.encoder_weights.values.iter().zip(&after.encoder_weights.values) {
            assert!(a <= b);
        }
        assert_ne!(before.decoder_weights, after.decoder_weights);
    }

    #[test]
    fn test_zero_epochs_is_empty_history() {
        let mut model = AutoencoderModel::default();
        assert!(model.fit(&rows(1), 0).unwrap().is_empty());
    }

    #[test]
    fn test_empty_training_set_rejected() {
        let mut model = AutoencoderModel::default();
        assert!(model.fit(&FeatureMatrix::empty(), 3).is_err());
    }

    #[test]
    fn test_epoch_count_capped() {
        let mut model = AutoencoderModel::default();
        let before    = model.to_state().unwrap();
        assert!(model.fit(&rows(1), usize::MAX).is_err());
        assert_eq!(model.to_state().unwrap(), before);
    }

    #[test]
    fn test_restore_round_trip_is_bit_exact() {
        let mut trained = AutoencoderModel::new(9);
        trained.fit(&rows(3), 2).unwrap();
        let state = trained.to_state().unwrap();

        let mut fresh = AutoencoderModel::new(1);
        fresh.restore(state.clone()).unwrap();
        assert_eq!(fresh.to_state().unwrap(), state);
    }

    #[test]
    fn test_inconsistent_state_rejected_and_model_untouched() {
        let mut model = AutoencoderModel::default();
        let before    = model.to_state().unwrap();
        let mut bad   = before.clone();
        bad.encoding_dim = 4;

        assert!(model.restore(bad).is_err());
        assert_eq!(model.to_state().unwrap(), before);
    }

    #[test]
    fn test_predict_via_trait_uses_request_threshold() {
        let mut model = tiny_model();
        let mut req   = ModelRequest::predict(json!([[1.0, 2.0]]));
        req.threshold = Some(5.0);
        let out = model.predict(&req).unwrap();
        assert_eq!(out, json!({"is_anomaly": [false], "anomaly_scores": [2.0]}));
    }
}
