use serde::{Deserialize, Serialize};

use std::f32::consts::PI;

/// An ActivationType represents the type
/// of activation function a node's network
/// equivalent will use.
///
/// The set is closed: every network node
/// dispatches through [`ActivationType::apply`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ActivationType {
    // 1 / (1 + exp(-4.9x))
    Sigmoid,
    // tanh(2.5x)
    Tanh,
    // x
    Identity,
    // 0   if x < 0
    // x   if x ≥ 0
    ReLU,
    // exp(-x²)
    Gaussian,
    // sin(πx)
    Sinusoidal,
    // exp(-5x²)
    // Peaks when a coordinate difference is zero.
    DhnGaussian,
    // exp(-5(x - 2)²)
    // Peaks when two DhnGaussian inputs both peak.
    DhnGaussianPair,
}

impl ActivationType {
    /// Every available activation type.
    pub const ALL: [ActivationType; 8] = [
        ActivationType::Sigmoid,
        ActivationType::Tanh,
        ActivationType::Identity,
        ActivationType::ReLU,
        ActivationType::Gaussian,
        ActivationType::Sinusoidal,
        ActivationType::DhnGaussian,
        ActivationType::DhnGaussianPair,
    ];

    /// Applies the activation function to `x`.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::genomics::ActivationType;
    ///
    /// assert_eq!(ActivationType::Identity.apply(-3.5), -3.5);
    /// assert_eq!(ActivationType::ReLU.apply(-3.5), 0.0);
    /// assert_eq!(ActivationType::DhnGaussian.apply(0.0), 1.0);
    /// assert_eq!(ActivationType::DhnGaussianPair.apply(2.0), 1.0);
    /// ```
    pub fn apply(self, x: f32) -> f32 {
        match self {
            ActivationType::Sigmoid => 1.0 / (1.0 + (-4.9 * x).exp()),
            ActivationType::Tanh => (2.5 * x).tanh(),
            ActivationType::Identity => x,
            ActivationType::ReLU => x.max(0.0),
            ActivationType::Gaussian => (-x.powi(2)).exp(),
            ActivationType::Sinusoidal => (x * PI).sin(),
            ActivationType::DhnGaussian => (-5.0 * x.powi(2)).exp(),
            ActivationType::DhnGaussianPair => (-5.0 * (x - 2.0).powi(2)).exp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_activations() {
        for x in -50..=50 {
            let x = x as f32 / 5.0;
            for activation in [
                ActivationType::Sigmoid,
                ActivationType::Gaussian,
                ActivationType::DhnGaussian,
                ActivationType::DhnGaussianPair,
            ] {
                let y = activation.apply(x);
                assert!((0.0..=1.0).contains(&y), "{:?}({}) = {}", activation, x, y);
            }
            assert!(ActivationType::Tanh.apply(x).abs() <= 1.0);
            assert!(ActivationType::Sinusoidal.apply(x).abs() <= 1.0);
        }
    }

    #[test]
    fn sigmoid_midpoint() {
        assert_eq!(ActivationType::Sigmoid.apply(0.0), 0.5);
    }

    #[test]
    fn coordinate_gaussians_peak() {
        assert!(ActivationType::DhnGaussian.apply(0.5) < ActivationType::DhnGaussian.apply(0.0));
        assert!(
            ActivationType::DhnGaussianPair.apply(1.0) < ActivationType::DhnGaussianPair.apply(2.0)
        );
    }
}
