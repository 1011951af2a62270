//! Loss functions producing gradient/hessian pairs for boosting.

/// First and second derivative of the loss with respect to the raw score.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GradientPair {
    /// First derivative.
    pub grad: f64,
    /// Second derivative.
    pub hess: f64,
}

impl GradientPair {
    /// Creates a new pair.
    pub fn new(grad: f64, hess: f64) -> Self {
        Self { grad, hess }
    }

    /// Scales both derivatives by a sample weight.
    pub fn weighted(self, weight: f64) -> Self {
        Self::new(self.grad * weight, self.hess * weight)
    }
}

/// Loss function driving tree construction.
pub trait Loss: Send + Sync {
    /// Gradient pair for one sample given its raw score and label.
    fn compute_gradient(&self, pred: f64, label: f64) -> GradientPair;

    /// Weighted gradients for a whole batch.
    fn gradient_batch(
        &self,
        preds: &[f64],
        labels: &[f64],
        weights: &[f64],
        out: &mut [GradientPair],
    ) {
        debug_assert_eq!(preds.len(), labels.len());
        debug_assert_eq!(preds.len(), out.len());
        for (((pred, label), weight), gp) in preds
            .iter()
            .zip(labels)
            .zip(weights)
            .zip(out.iter_mut())
        {
            *gp = self.compute_gradient(*pred, *label).weighted(*weight);
        }
    }

    /// Name of the loss (for logging).
    fn name(&self) -> &'static str;
}

/// Squared error `0.5 * (pred - label)^2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredLoss;

impl Loss for SquaredLoss {
    #[inline]
    fn compute_gradient(&self, pred: f64, label: f64) -> GradientPair {
        GradientPair::new(pred - label, 1.0)
    }

    fn name(&self) -> &'static str {
        "squared_error"
    }
}

/// Binary cross entropy on logits.
///
/// With `p = sigmoid(pred)`: grad = p - label, hess = p (1 - p). The hessian
/// is floored so that saturated leaves keep a finite Newton step.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogisticLoss;

const MIN_HESSIAN: f64 = 1e-16;

impl Loss for LogisticLoss {
    #[inline]
    fn compute_gradient(&self, pred: f64, label: f64) -> GradientPair {
        let p = sigmoid(pred);
        GradientPair::new(p - label, (p * (1.0 - p)).max(MIN_HESSIAN))
    }

    fn name(&self) -> &'static str {
        "binary_logistic"
    }
}

/// Logistic function.
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
