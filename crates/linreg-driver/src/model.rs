//! Regression models and the shipped parameter zoo
//!
//! Plain-Rust model structs the benchmarks and CLI run on the CPU or push
//! through the engines. The zoo carries the two parameter sets the
//! firmware shipped with: the diabetes single-feature regression and the
//! iris logistic classifier.

use crate::bus::CsrBus;
use crate::dot::DotAccel;
use crate::error::Result;

/// Single-feature linear regression, `y = w·x + b`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearModel {
    /// Slope
    pub weight: f64,
    /// Intercept
    pub bias: f64,
}

impl LinearModel {
    /// Predict in f64.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        x.mul_add(self.weight, self.bias)
    }

    /// Quantize to the integer fast path with a decimal `scale`.
    #[must_use]
    pub fn quantized(&self, scale: i32) -> QuantizedLinearModel {
        #[allow(clippy::cast_possible_truncation)]
        QuantizedLinearModel {
            weight: (self.weight * f64::from(scale)) as i64,
            bias: (self.bias * f64::from(scale) * f64::from(scale)) as i64,
            scale,
        }
    }
}

/// Integer-only variant of [`LinearModel`] for FPU-less cores.
///
/// Weight is scaled by `scale`, bias by `scale²`; a prediction is computed
/// entirely in integer arithmetic and comes back scaled by `scale`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizedLinearModel {
    /// Slope × scale
    pub weight: i64,
    /// Intercept × scale²
    pub bias: i64,
    /// Decimal scale factor
    pub scale: i32,
}

impl QuantizedLinearModel {
    /// Predict; the returned value is `y × scale`.
    #[must_use]
    pub fn predict_raw(&self, x: f64) -> i64 {
        #[allow(clippy::cast_possible_truncation)]
        let x_scaled = (x * f64::from(self.scale)) as i64;
        (x_scaled * self.weight + self.bias) / i64::from(self.scale)
    }

    /// Predict and undo the scaling.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn predict(&self, x: f64) -> f64 {
        self.predict_raw(x) as f64 / f64::from(self.scale)
    }
}

/// Binary logistic regression over a feature vector.
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    /// One weight per feature
    pub weights: Vec<f64>,
    /// Intercept
    pub bias: f64,
}

impl LogisticModel {
    /// Decision function `w·x + b`, CPU f64 reference.
    #[must_use]
    pub fn decision(&self, x: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(x.iter())
            .map(|(w, xi)| w * xi)
            .sum::<f64>()
            + self.bias
    }

    /// Decision function computed on the dot engine.
    ///
    /// # Errors
    ///
    /// Propagates [`DotAccel::dot`] errors (length mismatch).
    pub fn decision_accel<B: CsrBus>(&self, accel: &mut DotAccel<B>, x: &[f64]) -> Result<f64> {
        Ok(accel.dot(x, &self.weights)? + self.bias)
    }

    /// Class probability via the logistic function.
    #[must_use]
    pub fn predict_proba(&self, x: &[f64]) -> f64 {
        sigmoid(self.decision(x))
    }

    /// Predicted class: 1 if the decision function is positive.
    ///
    /// Follows the sklearn convention, so `classify` always agrees with
    /// [`predict_proba`](Self::predict_proba) at the 0.5 threshold. The
    /// micromlgen C export argmaxes `{decision, 0}` and so labels the
    /// classes the other way around; its labeling is not reproduced here.
    #[must_use]
    pub fn classify(&self, x: &[f64]) -> usize {
        usize::from(self.decision(x) > 0.0)
    }
}

/// Logistic function.
#[must_use]
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Trained parameter sets the firmware shipped with.
pub mod zoo {
    use super::{LinearModel, LogisticModel};

    /// Diabetes progression regression (one BMI feature, scikit-learn
    /// diabetes dataset).
    #[must_use]
    pub fn diabetes() -> LinearModel {
        LinearModel {
            weight: 938.237_861_251_353,
            bias: 152.918_861_826_161_13,
        }
    }

    /// Iris binary classifier (4 features, micromlgen export).
    #[must_use]
    pub fn iris() -> LogisticModel {
        LogisticModel {
            weights: vec![
                -0.364_794_021_304,
                -1.354_997_663_209,
                2.096_285_594_43,
                0.921_547_508_751,
            ],
            bias: -0.236_308_339_219,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimBus;

    #[test]
    fn diabetes_float_prediction() {
        let model = zoo::diabetes();
        let y = model.predict(0.03);
        assert!((y - 181.065_997_663_7).abs() < 1e-6);
    }

    #[test]
    fn quantized_matches_original_firmware() {
        // predict_int(0.03) in the C demo: (3 * 93823 + 1529188) / 100 = 18106
        let q = zoo::diabetes().quantized(100);
        assert_eq!(q.weight, 93_823);
        assert_eq!(q.bias, 1_529_188);
        assert_eq!(q.predict_raw(0.03), 18_106);
    }

    #[test]
    fn quantized_tracks_float_within_scale() {
        let model = zoo::diabetes();
        let q = model.quantized(100);
        for x in [-0.1, 0.0, 0.03, 0.08, 0.15] {
            let diff = (q.predict(x) - model.predict(x)).abs();
            assert!(diff < 0.5, "x={x}: quantized off by {diff}");
        }
    }

    #[test]
    fn iris_classifies_both_ways() {
        let model = zoo::iris();
        // Large petal measurements dominate with positive weights
        assert_eq!(model.classify(&[5.0, 3.0, 5.5, 2.0]), 1);
        // Small petals, large sepals push the decision negative
        assert_eq!(model.classify(&[5.0, 3.5, 1.5, 0.2]), 0);
    }

    #[test]
    fn classify_agrees_with_probability() {
        // The class label must match the 0.5 probability threshold, not
        // the inverted argmax labeling of the micromlgen C export.
        let model = zoo::iris();
        let samples: [[f64; 4]; 4] = [
            [5.0, 3.0, 5.5, 2.0],
            [5.0, 3.5, 1.5, 0.2],
            [6.1, 2.8, 4.7, 1.2],
            [4.9, 3.0, 1.4, 0.2],
        ];
        for x in &samples {
            let expected = usize::from(model.predict_proba(x) > 0.5);
            assert_eq!(model.classify(x), expected, "label flip on {x:?}");
        }
    }

    #[test]
    fn proba_is_monotone_in_decision() {
        let model = zoo::iris();
        let hi = model.predict_proba(&[5.0, 3.0, 5.5, 2.0]);
        let lo = model.predict_proba(&[5.0, 3.5, 1.5, 0.2]);
        assert!(hi > 0.5 && lo < 0.5);
    }

    #[test]
    fn sigmoid_midpoint() {
        assert!((sigmoid(0.0) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn accel_decision_matches_cpu() {
        let model = zoo::iris();
        let mut accel = DotAccel::new(SimBus::new());
        accel.init();
        let x = [6.1, 2.8, 4.7, 1.2];
        let hw = model.decision_accel(&mut accel, &x).unwrap();
        let cpu = model.decision(&x);
        assert!((hw - cpu).abs() < 1e-3, "accel {hw} vs cpu {cpu}");
    }
}
