#![forbid(unsafe_code)]

//! Aspect/fill layout decisions.
//!
//! [`plan`] turns an image's natural size, the resolved container and the
//! parsed [`ImageOptions`] into a [`LayoutPlan`]. The plan says whether the
//! toolkit may stretch the image, should treat its size as an aspect hint,
//! or needs a baked snapshot with a crop offset.

use std::fmt;

use sbx_core::{Rect, SbxError, Size};

use crate::options::{Fill, ImageOptions};

/// How a decoded image is presented inside its part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LayoutPlan {
    /// Show the image scaled to exactly this size.
    Stretch(Size),
    /// Show the image and announce this size as its aspect hint.
    AspectHint(Size),
    /// Bake the image into a new buffer the size of the container.
    Snapshot(CropPlan),
}

/// Geometry of a baked snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropPlan {
    /// Uniform scale factor applied to the natural size.
    pub factor: f64,
    /// Natural size times `factor`, truncated.
    pub scaled: Size,
    /// Size of the baked buffer (the container).
    pub viewport: Size,
    /// Placement of the scaled image relative to the viewport origin.
    pub offset_x: i32,
    pub offset_y: i32,
}

impl CropPlan {
    /// Rectangle the scaled image occupies in viewport coordinates.
    #[must_use]
    pub fn placement(&self) -> Rect {
        Rect::new(
            self.offset_x,
            self.offset_y,
            self.scaled.width,
            self.scaled.height,
        )
    }
}

/// The fill computation produced a degenerate size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutError {
    pub natural: Size,
    pub container: Size,
    pub scaled: Size,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "degenerate fill: natural {}x{} in container {}x{} scales to {}x{}",
            self.natural.width,
            self.natural.height,
            self.container.width,
            self.container.height,
            self.scaled.width,
            self.scaled.height,
        )
    }
}

impl std::error::Error for LayoutError {}

impl From<LayoutError> for SbxError {
    fn from(err: LayoutError) -> Self {
        SbxError::invalid(err.to_string())
    }
}

/// Scale factor for a fill mode. `None` for [`Fill::Disable`].
#[must_use]
pub fn fill_factor(fill: Fill, natural: Size, container: Size) -> Option<f64> {
    let (w, h) = (f64::from(natural.width), f64::from(natural.height));
    let (pw, ph) = (f64::from(container.width), f64::from(container.height));
    let factor = match fill {
        Fill::Disable => return None,
        Fill::InSize if pw < w || ph < h => (pw / w).min(ph / h),
        Fill::OverSize if pw > w || ph > h => (pw / w).max(ph / h),
        Fill::InSize | Fill::OverSize => 1.0,
        Fill::FitSize => (pw / w).max(ph / h),
    };
    Some(factor)
}

/// Decide the presentation of an image.
///
/// `explicit` is the `size` option already multiplied by the UI scale;
/// `part` is the current geometry of the target part, used as container
/// when no explicit size is given.
///
/// # Errors
///
/// Returns [`LayoutError`] when a fill mode is requested and the natural
/// size, the container, or the scaled size has a zero dimension.
pub fn plan(
    natural: Size,
    explicit: Option<Size>,
    part: Option<Size>,
    options: &ImageOptions,
) -> Result<LayoutPlan, LayoutError> {
    if !options.aspect {
        return Ok(LayoutPlan::Stretch(explicit.unwrap_or(natural)));
    }

    let container = explicit.or(part).unwrap_or_default();
    let Some(factor) = fill_factor(options.fill, natural, container) else {
        return Ok(LayoutPlan::AspectHint(natural));
    };

    let scaled = Size::new(
        (f64::from(natural.width) * factor) as u32,
        (f64::from(natural.height) * factor) as u32,
    );
    if natural.is_empty() || container.is_empty() || scaled.is_empty() {
        return Err(LayoutError {
            natural,
            container,
            scaled,
        });
    }

    let offset_x = -((i64::from(scaled.width) - i64::from(container.width)) / 2);
    let offset_y = -((i64::from(scaled.height) - i64::from(container.height)) / 2);
    let crop = CropPlan {
        factor,
        scaled,
        viewport: container,
        offset_x: clamp_i32(offset_x),
        offset_y: clamp_i32(offset_y),
    };
    tracing::debug!(
        target: "sbx.layout",
        fill = ?options.fill,
        factor,
        scaled_w = scaled.width,
        scaled_h = scaled.height,
        offset_x = crop.offset_x,
        offset_y = crop.offset_y,
        "snapshot planned"
    );
    Ok(LayoutPlan::Snapshot(crop))
}

fn clamp_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::parse;

    fn snapshot(plan: LayoutPlan) -> CropPlan {
        match plan {
            LayoutPlan::Snapshot(crop) => crop,
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn in_size_letterboxes_wide_image() {
        let opts = parse(Some("aspect=true;fill=in-size"));
        let crop = snapshot(
            plan(Size::new(200, 100), None, Some(Size::new(100, 100)), &opts).unwrap(),
        );
        assert_eq!(crop.factor, 0.5);
        assert_eq!(crop.scaled, Size::new(100, 50));
        assert_eq!((crop.offset_x, crop.offset_y), (0, 25));
        assert_eq!(crop.viewport, Size::new(100, 100));
    }

    #[test]
    fn over_size_covers_and_crops() {
        let opts = parse(Some("aspect=true;fill=over-size"));
        let crop = snapshot(
            plan(Size::new(50, 50), None, Some(Size::new(100, 40)), &opts).unwrap(),
        );
        assert_eq!(crop.factor, 2.0);
        assert_eq!(crop.scaled, Size::new(100, 100));
        assert_eq!((crop.offset_x, crop.offset_y), (0, -30));
        assert_eq!(crop.placement(), Rect::new(0, -30, 100, 100));
    }

    #[test]
    fn in_size_keeps_small_image() {
        let opts = parse(Some("aspect=true;fill=in-size"));
        let crop = snapshot(
            plan(Size::new(40, 20), None, Some(Size::new(100, 100)), &opts).unwrap(),
        );
        assert_eq!(crop.factor, 1.0);
        assert_eq!((crop.offset_x, crop.offset_y), (30, 40));
    }

    #[test]
    fn over_size_keeps_large_image() {
        let opts = parse(Some("aspect=true;fill=over-size"));
        let crop = snapshot(
            plan(Size::new(300, 200), None, Some(Size::new(100, 100)), &opts).unwrap(),
        );
        assert_eq!(crop.factor, 1.0);
        assert_eq!((crop.offset_x, crop.offset_y), (-100, -50));
    }

    #[test]
    fn fit_size_always_covers() {
        let opts = parse(Some("aspect=true;fill=fit-size"));
        let crop = snapshot(
            plan(Size::new(300, 200), None, Some(Size::new(100, 100)), &opts).unwrap(),
        );
        assert_eq!(crop.factor, 0.5);
        assert_eq!(crop.scaled, Size::new(150, 100));
        assert_eq!((crop.offset_x, crop.offset_y), (-25, 0));
    }

    #[test]
    fn explicit_size_wins_over_part_geometry() {
        let opts = parse(Some("aspect=true;fill=in-size"));
        let crop = snapshot(
            plan(
                Size::new(200, 100),
                Some(Size::new(50, 50)),
                Some(Size::new(400, 400)),
                &opts,
            )
            .unwrap(),
        );
        assert_eq!(crop.viewport, Size::new(50, 50));
        assert_eq!(crop.scaled, Size::new(50, 25));
    }

    #[test]
    fn aspect_off_stretches() {
        let opts = parse(Some("fill=in-size"));
        assert_eq!(
            plan(Size::new(10, 20), None, None, &opts).unwrap(),
            LayoutPlan::Stretch(Size::new(10, 20))
        );
        assert_eq!(
            plan(Size::new(10, 20), Some(Size::new(30, 30)), None, &opts).unwrap(),
            LayoutPlan::Stretch(Size::new(30, 30))
        );
    }

    #[test]
    fn fill_disabled_is_aspect_hint() {
        let opts = parse(Some("aspect=true"));
        assert_eq!(
            plan(Size::new(64, 48), Some(Size::new(10, 10)), None, &opts).unwrap(),
            LayoutPlan::AspectHint(Size::new(64, 48))
        );
    }

    #[test]
    fn degenerate_sizes_are_rejected() {
        let opts = parse(Some("aspect=true;fill=in-size"));
        assert!(plan(Size::new(10, 10), None, Some(Size::new(0, 10)), &opts).is_err());
        assert!(plan(Size::new(10, 10), None, None, &opts).is_err());
        assert!(plan(Size::new(0, 10), None, Some(Size::new(10, 10)), &opts).is_err());
        // 1000x1 into 10x10 scales the height to 0.
        let err = plan(Size::new(1000, 1), None, Some(Size::new(10, 10)), &opts).unwrap_err();
        assert_eq!(err.scaled, Size::new(10, 0));
        assert_eq!(SbxError::from(err).status(), sbx_core::Status::InvalidParameter);
    }
}
