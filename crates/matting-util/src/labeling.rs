//! Connected-component labelling with 4-connectivity

use std::collections::VecDeque;

/// Result of [`label_components`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentLabels {
    /// Per-pixel label; 0 is background, components are numbered from 1 in
    /// raster order of their first pixel
    pub labels: Vec<u32>,
    /// `sizes[k]` is the pixel count of component `k + 1`
    pub sizes: Vec<usize>,
}

impl ComponentLabels {
    /// Label of the largest component, the earliest one on ties.
    pub fn largest(&self) -> Option<u32> {
        let mut best: Option<(usize, usize)> = None;
        for (index, &size) in self.sizes.iter().enumerate() {
            if best.map_or(true, |(_, best_size)| size > best_size) {
                best = Some((index, size));
            }
        }
        best.map(|(index, _)| index as u32 + 1)
    }
}

/// Label the 4-connected foreground regions of a row-major binary image.
///
/// # Panics
/// Panics if `foreground.len() != height * width`.
pub fn label_components(foreground: &[bool], height: usize, width: usize) -> ComponentLabels {
    assert_eq!(foreground.len(), height * width);

    let mut labels = vec![0_u32; foreground.len()];
    let mut sizes = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..foreground.len() {
        if !foreground[start] || labels[start] != 0 {
            continue;
        }

        let label = sizes.len() as u32 + 1;
        let mut size = 0;
        labels[start] = label;
        queue.push_back(start);

        while let Some(index) = queue.pop_front() {
            size += 1;
            let (y, x) = (index / width, index % width);

            let neighbors = [
                (y > 0).then(|| index - width),
                (y + 1 < height).then(|| index + width),
                (x > 0).then(|| index - 1),
                (x + 1 < width).then(|| index + 1),
            ];
            for next in neighbors.into_iter().flatten() {
                if foreground[next] && labels[next] == 0 {
                    labels[next] = label;
                    queue.push_back(next);
                }
            }
        }

        sizes.push(size);
    }

    ComponentLabels { labels, sizes }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(rows: &[&str]) -> (Vec<bool>, usize, usize) {
        let height = rows.len();
        let width = rows[0].len();
        let pixels = rows
            .iter()
            .flat_map(|r| r.chars().map(|c| c == '#'))
            .collect();
        (pixels, height, width)
    }

    #[test]
    fn diagonal_pixels_are_separate_components() {
        let (pixels, h, w) = parse(&["#..", ".#.", "..#"]);
        let result = label_components(&pixels, h, w);

        assert_eq!(result.sizes, vec![1, 1, 1]);
        assert_eq!(result.labels[0], 1);
        assert_eq!(result.labels[4], 2);
        assert_eq!(result.labels[8], 3);
    }

    #[test]
    fn largest_component_is_found() {
        let (pixels, h, w) = parse(&["##..#", "#...#", "....#", "##..#"]);
        let result = label_components(&pixels, h, w);

        assert_eq!(result.sizes, vec![3, 4, 2]);
        assert_eq!(result.largest(), Some(2));
        assert_eq!(result.labels[4], 2);
        assert_eq!(result.labels[15], 3);
    }

    #[test]
    fn ties_resolve_to_first_component() {
        let (pixels, h, w) = parse(&["#.#"]);
        let result = label_components(&pixels, h, w);

        assert_eq!(result.largest(), Some(1));
    }

    #[test]
    fn empty_image_has_no_components() {
        let result = label_components(&[false; 6], 2, 3);

        assert!(result.sizes.is_empty());
        assert_eq!(result.largest(), None);
        assert!(result.labels.iter().all(|&l| l == 0));
    }

    #[test]
    fn u_shape_is_one_component() {
        let (pixels, h, w) = parse(&["#.#", "#.#", "###"]);
        let result = label_components(&pixels, h, w);

        assert_eq!(result.sizes, vec![7]);
    }
}
