//! Filtering operations for matte evaluation
//!
//! Provides the first-order Gaussian-derivative kernels used by the gradient
//! error metric, a replicate-border correlation built on `conv2d`, and min-max
//! normalization.

use std::f64::consts::PI;

use burn::tensor::{
    backend::Backend, module::conv2d, ops::ConvOptions, ElementConversion, Tensor,
};

use crate::array_ops::tensor_from_vec;

fn gauss(x: f64, sigma: f64) -> f64 {
    (-x * x / (2.0 * sigma * sigma)).exp() / (sigma * (2.0 * PI).sqrt())
}

fn dgauss(x: f64, sigma: f64) -> f64 {
    -x * gauss(x, sigma) / (sigma * sigma)
}

/// First-order Gaussian-derivative kernels
///
/// The kernel half-size is `ceil(sigma * sqrt(-2 ln(sqrt(2 pi) * sigma * epsilon)))`
/// (at least 1), so the Gaussian tail below `epsilon` is truncated. Entry
/// `(i, j)` of the x-kernel is `g(i - half) * g'(j - half)`; the kernel is
/// scaled to unit L2 norm and the y-kernel is its transpose.
///
/// # Arguments
/// * `sigma` - Standard deviation of the Gaussian
/// * `epsilon` - Truncation level of the Gaussian tail
/// * `device` - Device to create the kernels on
///
/// # Returns
/// `(kernel_x, kernel_y)`, both `[size, size]`
pub fn gaussian_derivative_kernels<B: Backend>(
    sigma: f64,
    epsilon: f64,
    device: &B::Device,
) -> (Tensor<B, 2>, Tensor<B, 2>) {
    let half = (sigma * (-2.0 * ((2.0 * PI).sqrt() * sigma * epsilon).ln()).sqrt()).ceil();
    let half = if half.is_finite() && half >= 1.0 {
        half as usize
    } else {
        1
    };
    let size = 2 * half + 1;

    let mut kernel_x = vec![0.0_f64; size * size];
    for i in 0..size {
        for j in 0..size {
            kernel_x[i * size + j] =
                gauss(i as f64 - half as f64, sigma) * dgauss(j as f64 - half as f64, sigma);
        }
    }
    let norm = kernel_x.iter().map(|v| v * v).sum::<f64>().sqrt();

    let mut x_values = Vec::with_capacity(size * size);
    let mut y_values = vec![0.0_f32; size * size];
    for i in 0..size {
        for j in 0..size {
            let value = (kernel_x[i * size + j] / norm) as f32;
            x_values.push(value);
            y_values[j * size + i] = value;
        }
    }

    (
        tensor_from_vec(x_values, [size, size], device),
        tensor_from_vec(y_values, [size, size], device),
    )
}

/// Correlate an image with a kernel using replicated borders
///
/// Matches `cv2.filter2D(..., borderType=BORDER_REPLICATE)` for odd kernels.
///
/// # Arguments
/// * `image` - Input image `[height, width]`
/// * `kernel` - Odd-sized kernel `[kernel_h, kernel_w]`
///
/// # Returns
/// Filtered image `[height, width]`
pub fn filter_replicate<B: Backend>(image: Tensor<B, 2>, kernel: Tensor<B, 2>) -> Tensor<B, 2> {
    let [height, width] = image.dims();
    if height == 0 || width == 0 {
        return image;
    }
    let [kernel_h, kernel_w] = kernel.dims();
    let padded = pad_replicate(image, kernel_h / 2, kernel_w / 2);
    let [padded_h, padded_w] = padded.dims();

    let options = ConvOptions::new([1, 1], [0, 0], [1, 1], 1);
    let filtered = conv2d(
        padded.reshape([1, 1, padded_h, padded_w]),
        kernel.reshape([1, 1, kernel_h, kernel_w]),
        None,
        options,
    );

    filtered.reshape([height, width])
}

/// Gaussian gradient magnitude `sqrt(gx^2 + gy^2)` with replicated borders.
pub fn gaussian_gradient_magnitude<B: Backend>(
    image: Tensor<B, 2>,
    sigma: f64,
    epsilon: f64,
) -> Tensor<B, 2> {
    let (kernel_x, kernel_y) = gaussian_derivative_kernels::<B>(sigma, epsilon, &image.device());
    let gx = filter_replicate(image.clone(), kernel_x);
    let gy = filter_replicate(image, kernel_y);

    (gx.powf_scalar(2.0) + gy.powf_scalar(2.0)).sqrt()
}

/// Min-max normalize to [0, 1]
///
/// A constant image has no range to stretch and maps to all zeros.
pub fn min_max_normalize<B: Backend, const D: usize>(tensor: Tensor<B, D>) -> Tensor<B, D> {
    let min = tensor.clone().min().into_scalar().elem::<f64>();
    let max = tensor.clone().max().into_scalar().elem::<f64>();
    let range = max - min;

    if range > f64::EPSILON {
        tensor.sub_scalar(min).div_scalar(range)
    } else {
        tensor.zeros_like()
    }
}

/// Replicate padding for `[height, width]` tensors
fn pad_replicate<B: Backend>(tensor: Tensor<B, 2>, pad_h: usize, pad_w: usize) -> Tensor<B, 2> {
    let [height, width] = tensor.dims();
    // Nothing to replicate from.
    if height == 0 || width == 0 {
        return tensor;
    }
    let mut result = tensor;

    if pad_h > 0 {
        let top = result.clone().slice([0..1, 0..width]);
        let bottom = result.clone().slice([height - 1..height, 0..width]);
        let mut rows = Vec::with_capacity(2 * pad_h + 1);
        rows.extend((0..pad_h).map(|_| top.clone()));
        rows.push(result);
        rows.extend((0..pad_h).map(|_| bottom.clone()));
        result = Tensor::cat(rows, 0);
    }

    if pad_w > 0 {
        let padded_h = height + 2 * pad_h;
        let left = result.clone().slice([0..padded_h, 0..1]);
        let right = result.clone().slice([0..padded_h, width - 1..width]);
        let mut cols = Vec::with_capacity(2 * pad_w + 1);
        cols.extend((0..pad_w).map(|_| left.clone()));
        cols.push(result);
        cols.extend((0..pad_w).map(|_| right.clone()));
        result = Tensor::cat(cols, 1);
    }

    result
}
