use super::DecodeError;
use crate::genomics::ActivationType;

use serde::{Deserialize, Serialize};

/// The layout of a substrate: the dimensions of its input
/// layer, of each hidden sheet and of its output layer.
///
/// Dimensions are either `[n]`, a row of `n` nodes, or
/// `[x, y]`, a sheet of `x × y` nodes. Node coordinates
/// are spread evenly over `[-1, 1]` along each axis.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SubstrateGeometry {
    pub input_dims: Vec<usize>,
    /// Dimensions of the hidden layers, in order. A CPPN
    /// encoding more hidden layers than listed reuses the
    /// last entry; an empty list reuses `input_dims`.
    pub hidden_sheet_dims: Vec<Vec<usize>>,
    pub output_dims: Vec<usize>,
    pub hidden_activation: ActivationType,
    pub output_activation: ActivationType,
}

impl Default for SubstrateGeometry {
    /// Two inputs in a row, one output and sigmoid activations.
    fn default() -> SubstrateGeometry {
        SubstrateGeometry {
            input_dims: vec![1, 2],
            hidden_sheet_dims: vec![],
            output_dims: vec![1],
            hidden_activation: ActivationType::Sigmoid,
            output_activation: ActivationType::Sigmoid,
        }
    }
}

impl SubstrateGeometry {
    /// Returns the dimensions of the `index`-th hidden layer.
    ///
    /// # Examples
    /// ```
    /// use hyperneat::decoding::SubstrateGeometry;
    ///
    /// let geometry = SubstrateGeometry {
    ///     hidden_sheet_dims: vec![vec![2, 2], vec![3]],
    ///     ..SubstrateGeometry::default()
    /// };
    /// assert_eq!(geometry.hidden_dims(0), &[2, 2]);
    /// assert_eq!(geometry.hidden_dims(1), &[3]);
    /// assert_eq!(geometry.hidden_dims(5), &[3]);
    ///
    /// let flat = SubstrateGeometry::default();
    /// assert_eq!(flat.hidden_dims(0), &[1, 2]);
    /// ```
    pub fn hidden_dims(&self, index: usize) -> &[usize] {
        self.hidden_sheet_dims
            .get(index)
            .or_else(|| self.hidden_sheet_dims.last())
            .map(Vec::as_slice)
            .unwrap_or(self.input_dims.as_slice())
    }
}

/// Returns the node coordinates of a layer, enumerated
/// x-major: all `y` values for the first `x`, then the next.
///
/// # Errors
///
/// Returns an error if `dims` is neither `[n]` nor `[x, y]`,
/// or if an axis is empty.
///
/// # Examples
/// ```
/// use hyperneat::decoding::coordinates;
///
/// assert_eq!(coordinates(&[3]).unwrap(), vec![(-1.0, 0.0), (0.0, 0.0), (1.0, 0.0)]);
/// assert_eq!(coordinates(&[1, 2]).unwrap(), vec![(0.0, -1.0), (0.0, 1.0)]);
/// assert!(coordinates(&[2, 2, 2]).is_err());
/// ```
pub fn coordinates(dims: &[usize]) -> Result<Vec<(f32, f32)>, DecodeError> {
    let (x_count, y_count) = match *dims {
        [x] if x > 0 => (x, 1),
        [x, y] if x > 0 && y > 0 => (x, y),
        _ => return Err(DecodeError::UnsupportedDimensions(dims.to_vec())),
    };
    let xs = linspace(x_count);
    let ys = linspace(y_count);
    Ok(xs
        .iter()
        .flat_map(|&x| ys.iter().map(move |&y| (x, y)))
        .collect())
}

/// `n` evenly spaced values from -1 to 1, or the
/// single value 0 when `n` is 1.
fn linspace(n: usize) -> Vec<f32> {
    if n == 1 {
        return vec![0.0];
    }
    let step = 2.0 / (n - 1) as f32;
    (0..n).map(|i| -1.0 + step * i as f32).collect()
}
