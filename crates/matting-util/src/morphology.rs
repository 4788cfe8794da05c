//! Morphological dilation for binary masks
//!
//! The structuring element follows the OpenCV `MORPH_ELLIPSE` construction so
//! that a mask grown here matches one grown by `cv2.dilate` pixel for pixel.
//! Every row of an elliptical element is a single contiguous run, which lets
//! dilation test a whole kernel row with one prefix-sum lookup.

use std::ops::Range;

use burn::tensor::{backend::Backend, Tensor};

use crate::array_ops::{tensor_from_vec, tensor_to_vec};

/// Structuring element for morphological operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuringElement {
    /// Kernel height in pixels
    pub height: usize,
    /// Kernel width in pixels
    pub width: usize,
    /// Anchor point `(row, column)` aligned with the output pixel
    pub anchor: (usize, usize),
    /// "On" columns of each kernel row; an empty range means the row is off
    pub rows: Vec<Range<usize>>,
}

impl StructuringElement {
    /// Create an elliptical structuring element inscribed in a `width x height` box.
    ///
    /// Row `i` covers `[c - dx, c + dx + 1)` clipped to the box, where
    /// `r = height / 2`, `c = width / 2`, `dy = i - r` and
    /// `dx = round(c * sqrt((r^2 - dy^2) / r^2))`. The anchor is the box center.
    pub fn ellipse(width: usize, height: usize) -> Self {
        let r = (height / 2) as i64;
        let c = (width / 2) as i64;
        let inv_r2 = if r > 0 { 1.0 / (r * r) as f64 } else { 0.0 };

        let rows = (0..height as i64)
            .map(|i| {
                let dy = i - r;
                if dy.abs() > r {
                    return 0..0;
                }
                let dx = (c as f64 * (((r * r - dy * dy) as f64) * inv_r2).sqrt()).round() as i64;
                let start = (c - dx).max(0) as usize;
                let end = (c + dx + 1).min(width as i64) as usize;
                start..end.max(start)
            })
            .collect();

        Self {
            height,
            width,
            anchor: (height / 2, width / 2),
            rows,
        }
    }
}

/// Morphological dilation of a binary mask
///
/// Output pixel `(y, x)` is foreground when any "on" element `(ky, kx)` of the
/// structuring element lands on an input foreground pixel at
/// `(y + ky - anchor.0, x + kx - anchor.1)`. Pixels outside the frame count as
/// background. Input values above 0.5 are foreground.
///
/// # Arguments
/// * `mask` - Binary mask `[height, width]`
/// * `element` - Structuring element
///
/// # Returns
/// Dilated mask with values in {0, 1}
pub fn dilation<B: Backend>(mask: Tensor<B, 2>, element: &StructuringElement) -> Tensor<B, 2> {
    let [height, width] = mask.dims();
    let device = mask.device();
    let values = tensor_to_vec(mask);

    // prefix[y * stride + x] = number of foreground pixels in row y before column x
    let stride = width + 1;
    let mut prefix = vec![0_u32; height * stride];
    for y in 0..height {
        for x in 0..width {
            let fg = u32::from(values[y * width + x] > 0.5);
            prefix[y * stride + x + 1] = prefix[y * stride + x] + fg;
        }
    }

    let (anchor_y, anchor_x) = element.anchor;
    let mut output = vec![0.0_f32; height * width];

    for y in 0..height {
        for x in 0..width {
            let hit = element.rows.iter().enumerate().any(|(ky, cols)| {
                if cols.is_empty() {
                    return false;
                }
                let src_y = (y + ky).checked_sub(anchor_y);
                let Some(src_y) = src_y.filter(|&sy| sy < height) else {
                    return false;
                };
                let from = (x + cols.start).saturating_sub(anchor_x).min(width);
                let to = (x + cols.end).saturating_sub(anchor_x).min(width);
                let row = src_y * stride;
                to > from && prefix[row + to] > prefix[row + from]
            });
            if hit {
                output[y * width + x] = 1.0;
            }
        }
    }

    tensor_from_vec(output, [height, width], &device)
}

/// Grow a binary mask with a `diameter x diameter` elliptical element.
///
/// A diameter of 0 or 1 leaves the mask unchanged.
pub fn dilate_mask<B: Backend>(mask: Tensor<B, 2>, diameter: usize) -> Tensor<B, 2> {
    if diameter <= 1 {
        return mask;
    }
    dilation(mask, &StructuringElement::ellipse(diameter, diameter))
}
