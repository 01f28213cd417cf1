//! Proportional resize computation
//!
//! Pure arithmetic, separated from the renderer so the rounding contract can
//! be pinned down by unit tests.

use crate::error::{AppError, Result};

/// Outcome of planning a resize for one target width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizePlan {
    /// Target width is not smaller than the original; keep dimensions as-is
    Keep,
    /// Scale down to `width`, height derived proportionally
    Scale { width: u32, height: u32 },
}

impl ResizePlan {
    /// Compute the plan for resizing `original_width` x `original_height`
    /// down to `target_width`, preserving aspect ratio.
    ///
    /// Height is `round(target_width * original_height / original_width)`,
    /// rounding half away from zero.
    pub fn compute(original_width: u32, original_height: u32, target_width: u32) -> Result<Self> {
        if original_width == 0 || original_height == 0 {
            return Err(AppError::InvalidDimensions(format!(
                "source is {original_width}x{original_height}"
            )));
        }
        if target_width == 0 {
            return Err(AppError::InvalidDimensions(
                "target width is zero".to_string(),
            ));
        }
        if target_width >= original_width {
            return Ok(ResizePlan::Keep);
        }

        let height = (target_width as f64 * original_height as f64 / original_width as f64).round()
            as u32;
        Ok(ResizePlan::Scale {
            width: target_width,
            height,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_at_or_above_original_keeps() {
        assert_eq!(ResizePlan::compute(800, 600, 800).unwrap(), ResizePlan::Keep);
        assert_eq!(
            ResizePlan::compute(800, 600, 1200).unwrap(),
            ResizePlan::Keep
        );
    }

    #[test]
    fn test_proportional_height() {
        assert_eq!(
            ResizePlan::compute(1000, 500, 400).unwrap(),
            ResizePlan::Scale {
                width: 400,
                height: 200
            }
        );
        assert_eq!(
            ResizePlan::compute(1000, 800, 100).unwrap(),
            ResizePlan::Scale {
                width: 100,
                height: 80
            }
        );
        assert_eq!(
            ResizePlan::compute(1000, 800, 500).unwrap(),
            ResizePlan::Scale {
                width: 500,
                height: 400
            }
        );
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        // 300 * 500 / 1000 = 150 exactly; 333 * 500 / 1000 = 166.5 rounds up
        assert_eq!(
            ResizePlan::compute(1000, 500, 333).unwrap(),
            ResizePlan::Scale {
                width: 333,
                height: 167
            }
        );
    }

    #[test]
    fn test_zero_source_dimension_is_rejected() {
        assert!(ResizePlan::compute(0, 600, 100).is_err());
        assert!(ResizePlan::compute(800, 0, 100).is_err());
    }

    #[test]
    fn test_zero_target_width_is_rejected() {
        assert!(ResizePlan::compute(800, 600, 0).is_err());
    }
}
