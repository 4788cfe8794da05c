//! Host/tensor conversions for single-channel images
//!
//! Burn has no cheap per-pixel access, so algorithms that need to walk pixels
//! in order pull the data out once with [`tensor_to_vec`] and push the result
//! back with [`tensor_from_vec`].

use burn::tensor::{backend::Backend, Tensor, TensorData};

/// Copy a tensor to the host as row-major `f32` values.
pub fn tensor_to_vec<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Vec<f32> {
    tensor.into_data().iter::<f32>().collect()
}

/// Build a `[height, width]` tensor from row-major values.
///
/// # Panics
/// Panics if `values.len() != height * width`.
pub fn tensor_from_vec<B: Backend>(
    values: Vec<f32>,
    [height, width]: [usize; 2],
    device: &B::Device,
) -> Tensor<B, 2> {
    assert_eq!(
        values.len(),
        height * width,
        "value count does not match a {height}x{width} image"
    );
    let data = TensorData::new(values, [height, width]).convert::<B::FloatElem>();
    Tensor::from_data(data, device)
}

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    use super::*;

    type TestBackend = NdArray;

    #[test]
    fn round_trip_preserves_row_major_order() {
        let device = Default::default();
        let values = vec![0.0, 0.25, 0.5, 0.75, 1.0, 0.125];

        let tensor = tensor_from_vec::<TestBackend>(values.clone(), [2, 3], &device);
        assert_eq!(tensor.dims(), [2, 3]);
        assert_eq!(tensor_to_vec(tensor), values);
    }

    #[test]
    #[should_panic(expected = "value count")]
    fn wrong_length_panics() {
        let device = Default::default();
        let _ = tensor_from_vec::<TestBackend>(vec![0.0; 5], [2, 3], &device);
    }
}
