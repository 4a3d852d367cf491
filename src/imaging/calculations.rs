//! Pure calculation functions for variant dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// A single variant size to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSize {
    pub width: u32,
    pub height: u32,
}

/// Scale `original` to `target_width`, preserving aspect ratio.
///
/// Height is rounded to the nearest pixel and never drops below 1.
pub fn scale_to_width(original: (u32, u32), target_width: u32) -> VariantSize {
    let (orig_w, orig_h) = original;
    let height = if orig_w == 0 {
        orig_h
    } else {
        (orig_h as f64 * target_width as f64 / orig_w as f64).round() as u32
    };
    VariantSize {
        width: target_width,
        height: height.max(1),
    }
}

/// Calculate which widths to generate and their dimensions.
///
/// Widths wider than the original are dropped (no upscaling). If every
/// requested width exceeds the original, the original width is used as the
/// only variant. The result is ascending by width with duplicates removed.
///
/// # Examples
/// ```
/// # use simple_folio::imaging::calculate_variant_sizes;
/// let sizes = calculate_variant_sizes((1000, 500), &[505, 800, 1200]);
/// let widths: Vec<u32> = sizes.iter().map(|s| s.width).collect();
/// assert_eq!(widths, vec![505, 800]);
/// ```
pub fn calculate_variant_sizes(original: (u32, u32), widths: &[u32]) -> Vec<VariantSize> {
    let (orig_w, orig_h) = original;

    let mut wanted: Vec<u32> = widths
        .iter()
        .copied()
        .filter(|&w| w > 0 && w <= orig_w)
        .collect();
    wanted.sort_unstable();
    wanted.dedup();

    if wanted.is_empty() {
        return vec![VariantSize {
            width: orig_w,
            height: orig_h,
        }];
    }

    wanted
        .into_iter()
        .map(|w| scale_to_width(original, w))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widths(sizes: &[VariantSize]) -> Vec<u32> {
        sizes.iter().map(|s| s.width).collect()
    }

    #[test]
    fn scale_landscape() {
        // 2400x1600 (3:2) at 1200 wide → 1200x800
        assert_eq!(
            scale_to_width((2400, 1600), 1200),
            VariantSize {
                width: 1200,
                height: 800
            }
        );
    }

    #[test]
    fn scale_portrait() {
        // 1600x2400 at 505 wide → 505x757.5 → 758
        assert_eq!(scale_to_width((1600, 2400), 505).height, 758);
    }

    #[test]
    fn scale_tiny_placeholder_never_zero_height() {
        // Extreme panorama: 20 wide would round to 0 rows
        assert_eq!(scale_to_width((10000, 100), 20).height, 1);
    }

    #[test]
    fn all_widths_kept_when_original_is_large() {
        let sizes = calculate_variant_sizes((3000, 2000), &[505, 800, 1200]);
        assert_eq!(widths(&sizes), vec![505, 800, 1200]);
        assert_eq!(sizes[2].height, 800);
    }

    #[test]
    fn widths_larger_than_original_dropped() {
        let sizes = calculate_variant_sizes((1000, 750), &[505, 800, 1200]);
        assert_eq!(widths(&sizes), vec![505, 800]);
    }

    #[test]
    fn width_equal_to_original_kept() {
        let sizes = calculate_variant_sizes((800, 600), &[505, 800, 1200]);
        assert_eq!(widths(&sizes), vec![505, 800]);
        assert_eq!(sizes[1].height, 600);
    }

    #[test]
    fn falls_back_to_original_when_all_exceed() {
        let sizes = calculate_variant_sizes((400, 300), &[505, 800, 1200]);
        assert_eq!(
            sizes,
            vec![VariantSize {
                width: 400,
                height: 300
            }]
        );
    }

    #[test]
    fn unsorted_and_duplicate_widths_normalised() {
        let sizes = calculate_variant_sizes((2000, 1000), &[1200, 505, 800, 505]);
        assert_eq!(widths(&sizes), vec![505, 800, 1200]);
    }

    #[test]
    fn empty_widths_returns_original() {
        let sizes = calculate_variant_sizes((640, 480), &[]);
        assert_eq!(widths(&sizes), vec![640]);
    }
}
