// ============================================================
// Layer 5 - Convolutional Intrusion Classifier (simulated)
// ============================================================
// Holds the weight shapes of a small two-layer CNN:
//
//   conv1: 3×3 kernel, 32 filters
//   conv2: 3×3 kernel, 64 filters
//   fc:    64 → num_classes
//
// over windows of 100 time steps × 10 features.
//
// No convolution is ever run. The weights exist so that a
// checkpoint has the same layout as a real network of this shape,
// and so that "training" has something to perturb. Each sample's
// class scores are drawn from the model's seeded RNG instead:
//
//   - 70% of samples: all mass on `normal` (0.8 + U·0.2)
//   - otherwise:      one attack class gets 0.7 + U·0.3, the rest U·0.3
//
// and then normalised to probabilities. The 70/30 split mirrors
// the class balance of typical captured traffic, where most
// connections are benign.
//
// Training:
//   Reports a steadily improving accuracy/loss curve, clamped to
//   accuracy ≤ 0.99 and loss ≥ 0.05, and jitters every weight
//   tensor with Gaussian noise that fades out over the run.
//
// Labels:
//   Labels never influence the curve. They are only checked for
//   count (one per sample) and tallied for the debug log. Callers
//   encode labels in different ways, so each one may be any of:
//     "dos"              ← class name
//     1 or 1.0           ← class index
//     [0, 1, 0, 0, 0]    ← one-hot or probability row (argmax)
//   Anything else is counted as unrecognised rather than refused.

use anyhow::{ensure, Result};
use burn::prelude::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::data::preprocessor::{Preprocessor, SampleBatch};
use crate::domain::{
    attack::AttackClass,
    epoch::EpochMetrics,
    request::{check_epochs, ModelRequest},
    traits::{DetectionModel, Persistable},
};
use crate::ml::{
    weights::{self, WeightTensor},
    ModelBackend, ModelDevice, DEFAULT_SEED,
};

/// (time steps, features)
pub const INPUT_SHAPE: (usize, usize) = (100, 10);

const KERNEL:        usize = 3;
const CONV1_FILTERS: usize = 32;
const CONV2_FILTERS: usize = 64;

const NORMAL_PRIOR: f64 = 0.7;

const INITIAL_ACCURACY:  f64 = 0.75;
const INITIAL_LOSS:      f64 = 0.6;
const MAX_ACCURACY:      f64 = 0.99;
const MIN_LOSS:          f64 = 0.05;
const MAX_ACCURACY_STEP: f64 = 0.03;
const MAX_LOSS_STEP:     f64 = 0.07;
const NOISE_SCALE:       f64 = 0.01;

/// One entry of the `results` array of a predict command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub class:         String,
    pub confidence:    f64,
    pub is_attack:     bool,
    /// Same as `class` for attacks, `null` for normal traffic
    pub attack_type:   Option<String>,
    pub probabilities: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CnnState {
    pub conv1_weights: WeightTensor,
    pub conv2_weights: WeightTensor,
    pub fc_weights:    WeightTensor,
    pub input_shape:   (usize, usize),
    pub num_classes:   usize,
    pub class_names:   Vec<String>,
}

pub struct CnnModel {
    conv1:       Tensor<ModelBackend, 3>,
    conv2:       Tensor<ModelBackend, 3>,
    fc:          Tensor<ModelBackend, 2>,
    input_shape: (usize, usize),
    num_classes: usize,
    class_names: Vec<String>,
    history:     Vec<EpochMetrics>,
    rng:         StdRng,
    device:      ModelDevice,
}

impl CnnModel {
    pub fn new(seed: u64) -> Self {
        let device: ModelDevice = Default::default();
        let mut rng        = StdRng::seed_from_u64(seed);
        let class_names    = AttackClass::names();
        let num_classes    = class_names.len();

        let conv1 = weights::uniform(&mut rng, [KERNEL, KERNEL, CONV1_FILTERS], &device);
        let conv2 = weights::uniform(&mut rng, [KERNEL, KERNEL, CONV2_FILTERS], &device);
        let fc    = weights::uniform(&mut rng, [CONV2_FILTERS, num_classes], &device);

        Self {
            conv1,
            conv2,
            fc,
            input_shape: INPUT_SHAPE,
            num_classes,
            class_names,
            history: Vec::new(),
            rng,
            device,
        }
    }

    pub fn last_history(&self) -> &[EpochMetrics] { &self.history }

    /// One probability row per sample; each row sums to 1.
    pub fn predict_probabilities(&mut self, samples: SampleBatch) -> Vec<Vec<f64>> {
        (0..samples.len()).map(|_| self.draw_scores()).collect()
    }

    fn draw_scores(&mut self) -> Vec<f64> {
        let mut scores = vec![0.0f64; self.num_classes];

        if self.rng.gen::<f64>() < NORMAL_PRIOR {
            scores[0] = 0.8 + self.rng.gen::<f64>() * 0.2;
        } else {
            let attack = self.rng.gen_range(1..self.num_classes);
            for s in scores.iter_mut() {
                *s = self.rng.gen::<f64>() * 0.3;
            }
            scores[attack] = 0.7 + self.rng.gen::<f64>() * 0.3;
        }

        // total ≥ 0.7, never zero
        let total: f64 = scores.iter().sum();
        scores.iter_mut().for_each(|s| *s /= total);
        scores
    }

    pub fn classify(&mut self, samples: SampleBatch) -> Vec<ClassificationResult> {
        let rows = self.predict_probabilities(samples);
        rows.iter().map(|probs| self.describe(probs)).collect()
    }

    fn describe(&self, probs: &[f64]) -> ClassificationResult {
        // First maximum wins on ties
        let (best, confidence) = probs
            .iter()
            .copied()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |acc, (i, p)| if p > acc.1 { (i, p) } else { acc });

        let class     = self.class_names[best].clone();
        let is_attack = best > 0;

        ClassificationResult {
            attack_type:   is_attack.then(|| class.clone()),
            class,
            confidence,
            is_attack,
            probabilities: self
                .class_names
                .iter()
                .cloned()
                .zip(probs.iter().copied())
                .collect(),
        }
    }

    /// Map a label to its class index, or `None` if it can't be read
    /// as a class name, a whole-number index, or a score row.
    fn label_index(&self, label: &Value) -> Option<usize> {
        match label {
            Value::String(name) => self.class_names.iter().position(|c| c == name),
            Value::Number(n) => {
                let x = n.as_f64()?;
                (x >= 0.0 && x.fract() == 0.0 && x < self.num_classes as f64).then_some(x as usize)
            }
            Value::Array(row) if row.len() == self.num_classes => {
                let scores: Option<Vec<f64>> = row.iter().map(Value::as_f64).collect();
                // First maximum wins, as in `describe`
                scores?
                    .into_iter()
                    .enumerate()
                    .fold(None, |best: Option<(usize, f64)>, (i, p)| match best {
                        Some((_, q)) if q >= p => best,
                        _                      => Some((i, p)),
                    })
                    .map(|(i, _)| i)
            }
            _ => None,
        }
    }

    /// Per-class label counts plus the number of unrecognised labels.
    fn label_counts(&self, labels: &[Value]) -> (Vec<usize>, usize) {
        let mut counts  = vec![0usize; self.num_classes];
        let mut skipped = 0;
        for label in labels {
            match self.label_index(label) {
                Some(i) => counts[i] += 1,
                None    => skipped += 1,
            }
        }
        (counts, skipped)
    }

    /// Run the training simulation. Labels are optional, but when
    /// given there must be exactly one per sample.
    pub fn fit(
        &mut self,
        samples: SampleBatch,
        labels:  &[Value],
        epochs:  usize,
    ) -> Result<Vec<EpochMetrics>> {
        check_epochs(epochs)?;
        ensure!(
            labels.is_empty() || labels.len() == samples.len(),
            "labels length {} does not match data length {}",
            labels.len(),
            samples.len()
        );

        if !labels.is_empty() {
            let (counts, skipped) = self.label_counts(labels);
            tracing::debug!(
                "Label distribution: {:?}, {} unrecognised",
                self.class_names.iter().zip(&counts).collect::<Vec<_>>(),
                skipped
            );
        }

        let device       = self.device.clone();
        let mut accuracy = INITIAL_ACCURACY;
        let mut loss     = INITIAL_LOSS;
        let mut history  = Vec::new();

        for epoch in 0..epochs {
            accuracy = (accuracy + self.rng.gen::<f64>() * MAX_ACCURACY_STEP).min(MAX_ACCURACY);
            loss     = (loss - self.rng.gen::<f64>() * MAX_LOSS_STEP).max(MIN_LOSS);
            history.push(EpochMetrics::with_accuracy(epoch + 1, loss, accuracy));

            // Smaller jitter in later epochs
            let scale = (NOISE_SCALE * (1.0 - epoch as f64 / epochs as f64)) as f32;
            let n1 = weights::normal::<ModelBackend, 3>(&mut self.rng, self.conv1.dims(), &device);
            self.conv1 = self.conv1.clone() + n1.mul_scalar(scale);
            let n2 = weights::normal::<ModelBackend, 3>(&mut self.rng, self.conv2.dims(), &device);
            self.conv2 = self.conv2.clone() + n2.mul_scalar(scale);
            let n3 = weights::normal::<ModelBackend, 2>(&mut self.rng, self.fc.dims(), &device);
            self.fc = self.fc.clone() + n3.mul_scalar(scale);

            tracing::debug!(
                "Epoch {:>3}/{} | loss={:.4} | accuracy={:.1}%",
                epoch + 1,
                epochs,
                loss,
                accuracy * 100.0
            );
        }

        self.history = history.clone();
        Ok(history)
    }
}

impl Default for CnnModel {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl DetectionModel for CnnModel {
    fn name(&self) -> &'static str {
        <Self as Persistable>::KIND
    }

    fn train(&mut self, request: &ModelRequest) -> Result<Vec<EpochMetrics>> {
        let samples = Preprocessor::new().samples(&request.data)?;
        tracing::info!(
            "Training CNN on {} samples ({} labels) for {} epochs",
            samples.len(),
            request.labels.len(),
            request.epochs
        );
        self.fit(samples, &request.labels, request.epochs)
    }

    fn predict(&mut self, request: &ModelRequest) -> Result<Value> {
        let samples = Preprocessor::new().samples(&request.data)?;
        let results = self.classify(samples);
        tracing::debug!(
            "Classified {} samples, {} flagged as attacks",
            results.len(),
            results.iter().filter(|r| r.is_attack).count()
        );
        Ok(serde_json::to_value(results)?)
    }
}

impl Persistable for CnnModel {
    const KIND: &'static str = "cnn";

    type State = CnnState;

    fn to_state(&self) -> Result<CnnState> {
        Ok(CnnState {
            conv1_weights: WeightTensor::from_tensor(&self.conv1)?,
            conv2_weights: WeightTensor::from_tensor(&self.conv2)?,
            fc_weights:    WeightTensor::from_tensor(&self.fc)?,
            input_shape:   self.input_shape,
            num_classes:   self.num_classes,
            class_names:   self.class_names.clone(),
        })
    }

    fn restore(&mut self, state: CnnState) -> Result<()> {
        let conv1: Tensor<ModelBackend, 3> = state.conv1_weights.to_tensor(&self.device)?;
        let conv2: Tensor<ModelBackend, 3> = state.conv2_weights.to_tensor(&self.device)?;
        let fc:    Tensor<ModelBackend, 2> = state.fc_weights.to_tensor(&self.device)?;

        ensure!(state.num_classes >= 2, "a classifier needs at least 2 classes, got {}", state.num_classes);
        ensure!(
            state.class_names.len() == state.num_classes,
            "{} class names for {} classes",
            state.class_names.len(),
            state.num_classes
        );
        let unique: BTreeSet<&String> = state.class_names.iter().collect();
        ensure!(
            unique.len() == state.class_names.len(),
            "class names must be unique, got {:?}",
            state.class_names
        );
        let [fc_in, fc_out] = fc.dims();
        ensure!(
            fc_out == state.num_classes,
            "fc weights output {fc_out} classes, expected {}",
            state.num_classes
        );
        ensure!(
            fc_in == conv2.dims()[2],
            "fc weights take {fc_in} inputs but conv2 has {} filters",
            conv2.dims()[2]
        );

        self.conv1       = conv1;
        self.conv2       = conv2;
        self.fc          = fc;
        self.input_shape = state.input_shape;
        self.num_classes = state.num_classes;
        self.class_names = state.class_names;
        Ok(())
    }
}
