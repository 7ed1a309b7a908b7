//! Page transform engine: per-page selection and placement.
//!
//! Given a source page's [`PageGeometry`] and either a global
//! [`PageTransformRequest`] (trigger-driven mode) or a list of
//! [`PerPageOverride`]s (index-driven mode), decide whether the page is
//! selected and compute the [`Placement`] that draws its content onto the
//! destination page.
//!
//! ```text
//!  PageGeometry ──┐
//!                 ├─▶ select (trigger) ─▶ normalise rotation ─▶ auto-scale ─▶ Placement
//!  Request ───────┘                                                            │
//!                                                                              ▼
//!                                         [sx·cos  sy·sin  −sx·sin  sy·cos  e  f]
//! ```
//!
//! Every function is pure: a page's plan depends only on that page and the
//! request, never on the pages processed before it.
//!
//! ## Rotation normalisation
//!
//! A page that already carries `/Rotate 90` or `/Rotate 270` is shown turned
//! by viewers. The destination page is written without `/Rotate`, so the
//! stored turn is baked into the placement instead: stored 90 becomes an
//! effective 270 and stored 270 an effective 90, overriding the request.
//! Stored 0 and 180 let the requested rotation through.
//!
//! ## Placement
//!
//! Destination point = `shift + S·(T + R·p)`: rotate counter-clockwise about
//! the origin, translate back into the positive quadrant, scale, shift. `T`
//! is in source content units, so it is scaled along with the content:
//!
//! | effective | offset T (x, y)                 |
//! |-----------|---------------------------------|
//! | 0         | (0, 0)                          |
//! | 90        | (source height, 0)              |
//! | 180       | (source width, source height)   |
//! | 270       | (0, source width)               |
//!
//! Under auto-scale `S·T` comes out as the target width or height.

use super::{Affine, PageGeometry, PageSize, Rotation, TriggerPolicy};
use crate::error::TransformError;
use serde::{Deserialize, Serialize};

// ── Scale ────────────────────────────────────────────────────────────────

/// Horizontal and vertical scale factors. `(0, 0)` means "derive from sizes".
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

impl ScaleFactors {
    pub const AUTO: ScaleFactors = ScaleFactors { x: 0.0, y: 0.0 };
    pub const UNIT: ScaleFactors = ScaleFactors { x: 1.0, y: 1.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_auto(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    fn validate(&self) -> Result<(), TransformError> {
        if self.x < 0.0 || self.y < 0.0 || !self.x.is_finite() || !self.y.is_finite() {
            return Err(TransformError::InvalidScale {
                x: self.x,
                y: self.y,
            });
        }
        Ok(())
    }

    /// Resolve the auto sentinel against the source and target sizes.
    fn resolve(self, rotation: Rotation, source: PageSize, target: PageSize) -> ScaleFactors {
        if !self.is_auto() {
            return self;
        }
        if rotation.swaps_axes() {
            ScaleFactors::new(target.width / source.height, target.height / source.width)
        } else {
            ScaleFactors::new(target.width / source.width, target.height / source.height)
        }
    }
}

fn validate_target(target: PageSize) -> Result<(), TransformError> {
    if !target.is_positive() || !target.width.is_finite() || !target.height.is_finite() {
        return Err(TransformError::InvalidTargetSize {
            width: target.width,
            height: target.height,
        });
    }
    Ok(())
}

// ── Placement ────────────────────────────────────────────────────────────

/// How a source page's content is drawn onto its destination page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Resolved scale (never the auto sentinel).
    pub scale: ScaleFactors,
    pub shift_x: f64,
    pub shift_y: f64,
    /// Effective rotation after normalisation.
    pub rotation: Rotation,
    /// Translation, in source units, that keeps rotated content in the
    /// positive quadrant. Applied before scaling.
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Placement {
    /// Draw the source unchanged at the destination origin.
    pub const IDENTITY: Placement = Placement {
        scale: ScaleFactors::UNIT,
        shift_x: 0.0,
        shift_y: 0.0,
        rotation: Rotation::None,
        offset_x: 0.0,
        offset_y: 0.0,
    };

    fn compute(
        source: PageSize,
        target: PageSize,
        scale: ScaleFactors,
        shift: (f64, f64),
        rotation: Rotation,
    ) -> Placement {
        let scale = scale.resolve(rotation, source, target);
        let (offset_x, offset_y) = match rotation {
            Rotation::None => (0.0, 0.0),
            Rotation::Quarter => (source.height, 0.0),
            Rotation::Half => (source.width, source.height),
            Rotation::ThreeQuarter => (0.0, source.width),
        };
        Placement {
            scale,
            shift_x: shift.0,
            shift_y: shift.1,
            rotation,
            offset_x,
            offset_y,
        }
    }

    /// The `cm` matrix for this placement.
    pub fn matrix(&self) -> Affine {
        let (cos, sin) = self.rotation.cos_sin();
        let (sx, sy) = (self.scale.x, self.scale.y);
        Affine {
            a: sx * cos,
            b: sy * sin,
            c: -sx * sin,
            d: sy * cos,
            e: self.shift_x + sx * self.offset_x,
            f: self.shift_y + sy * self.offset_y,
        }
    }
}

/// The engine's decision for one page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PagePlan {
    /// 1-indexed page number.
    pub page_number: u32,
    /// Whether the trigger picked this page for rotation.
    pub selected: bool,
    /// Destination page size.
    pub target: PageSize,
    pub placement: Placement,
}

impl PagePlan {
    pub fn matrix(&self) -> Affine {
        self.placement.matrix()
    }
}

/// Bake a stored quarter turn into the effective rotation.
pub fn effective_rotation(requested: Rotation, stored: Rotation) -> Rotation {
    match stored {
        Rotation::Quarter => Rotation::ThreeQuarter,
        Rotation::ThreeQuarter => Rotation::Quarter,
        Rotation::None | Rotation::Half => requested,
    }
}

// ── Trigger-driven mode ──────────────────────────────────────────────────

/// One transform applied to a whole document, filtered by a trigger.
///
/// Validated at construction: an instance always holds a quarter-turn
/// rotation, a positive target and non-negative scale factors, and never
/// combines a half turn with an orientation trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageTransformRequest {
    target: PageSize,
    scale: ScaleFactors,
    shift_x: f64,
    shift_y: f64,
    rotation: Rotation,
    trigger: TriggerPolicy,
}

impl PageTransformRequest {
    /// Build and validate a request.
    ///
    /// `degrees` must be 0, 90, 180 or 270. A scale of `(0, 0)` asks for
    /// auto-scaling.
    pub fn new(
        target: PageSize,
        scale: ScaleFactors,
        shift: (f64, f64),
        degrees: i64,
        trigger: TriggerPolicy,
    ) -> Result<Self, TransformError> {
        let rotation = Rotation::try_from(degrees)?;
        if rotation == Rotation::Half && trigger.is_orientation_based() {
            return Err(TransformError::HalfTurnWithOrientationTrigger { trigger });
        }
        validate_target(target)?;
        scale.validate()?;
        Ok(Self {
            target,
            scale,
            shift_x: shift.0,
            shift_y: shift.1,
            rotation,
            trigger,
        })
    }

    pub fn target(&self) -> PageSize {
        self.target
    }

    pub fn trigger(&self) -> TriggerPolicy {
        self.trigger
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Plan one page. `page_number` is 1-indexed.
    pub fn plan(&self, page_number: u32, page: &PageGeometry) -> PagePlan {
        let effective = effective_rotation(self.rotation, page.rotation);
        match self.trigger {
            TriggerPolicy::All => self.rotated(page_number, page, effective, true),
            TriggerPolicy::Odd if page_number % 2 == 1 => {
                self.rotated(page_number, page, effective, true)
            }
            TriggerPolicy::Even if page_number % 2 == 0 => {
                self.rotated(page_number, page, effective, true)
            }
            TriggerPolicy::Odd | TriggerPolicy::Even => PagePlan {
                page_number,
                selected: false,
                target: self.target,
                placement: Placement::IDENTITY,
            },
            TriggerPolicy::XYDiff | TriggerPolicy::XYDiffDisableSquareRotation => {
                let size = page.size;
                let needs_turn = if self.target.is_landscape() {
                    size.height >= size.width
                } else {
                    size.width >= size.height
                };
                let suppressed = self.trigger == TriggerPolicy::XYDiffDisableSquareRotation
                    && size.is_square();
                if needs_turn && !suppressed {
                    self.rotated(page_number, page, effective, true)
                } else {
                    self.rotated(page_number, page, Rotation::None, false)
                }
            }
        }
    }

    fn rotated(
        &self,
        page_number: u32,
        page: &PageGeometry,
        rotation: Rotation,
        selected: bool,
    ) -> PagePlan {
        PagePlan {
            page_number,
            selected,
            target: self.target,
            placement: Placement::compute(
                page.size,
                self.target,
                self.scale,
                (self.shift_x, self.shift_y),
                rotation,
            ),
        }
    }
}

// ── Index-driven mode ────────────────────────────────────────────────────

/// One record of a per-page override index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerPageOverride {
    pub counter: u32,
    /// 1-indexed page the override applies to.
    pub page: u32,
    pub target: PageSize,
    pub scale: ScaleFactors,
    pub shift_x: f64,
    pub shift_y: f64,
    /// Raw degrees as written in the index; validated when applied.
    pub degrees: i64,
}

/// Plan a page from an override list.
///
/// The first override whose page matches wins; later duplicates are ignored.
/// `Ok(None)` means no override names this page and it stays as it is.
pub fn plan_override(
    page_number: u32,
    page: &PageGeometry,
    overrides: &[PerPageOverride],
) -> Result<Option<PagePlan>, TransformError> {
    let Some(entry) = overrides.iter().find(|o| o.page == page_number) else {
        return Ok(None);
    };
    let requested = Rotation::try_from(entry.degrees)?;
    validate_target(entry.target)?;
    entry.scale.validate()?;

    let effective = effective_rotation(requested, page.rotation);
    Ok(Some(PagePlan {
        page_number,
        selected: true,
        target: entry.target,
        placement: Placement::compute(
            page.size,
            entry.target,
            entry.scale,
            (entry.shift_x, entry.shift_y),
            effective,
        ),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LETTER: PageGeometry = PageGeometry {
        size: PageSize {
            width: 612.0,
            height: 792.0,
        },
        rotation: Rotation::None,
    };
    const LETTER_LANDSCAPE: PageSize = PageSize {
        width: 792.0,
        height: 612.0,
    };

    fn request(trigger: TriggerPolicy, degrees: i64) -> PageTransformRequest {
        PageTransformRequest::new(LETTER_LANDSCAPE, ScaleFactors::AUTO, (0.0, 0.0), degrees, trigger)
            .unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn inside(target: PageSize, (x, y): (f64, f64)) -> bool {
        x >= -1e-9 && y >= -1e-9 && x <= target.width + 1e-9 && y <= target.height + 1e-9
    }

    // ── Validation ───────────────────────────────────────────────────────

    #[test]
    fn rejects_non_quarter_rotation() {
        let err = PageTransformRequest::new(
            LETTER_LANDSCAPE,
            ScaleFactors::AUTO,
            (0.0, 0.0),
            45,
            TriggerPolicy::All,
        )
        .unwrap_err();
        assert_eq!(err, TransformError::InvalidRotation { degrees: 45 });
    }

    #[test]
    fn half_turn_with_orientation_trigger_always_fails() {
        for trigger in [TriggerPolicy::XYDiff, TriggerPolicy::XYDiffDisableSquareRotation] {
            let err = PageTransformRequest::new(
                LETTER_LANDSCAPE,
                ScaleFactors::AUTO,
                (0.0, 0.0),
                180,
                trigger,
            )
            .unwrap_err();
            assert_eq!(err, TransformError::HalfTurnWithOrientationTrigger { trigger });
        }
        // Other triggers accept a half turn.
        assert!(PageTransformRequest::new(
            LETTER_LANDSCAPE,
            ScaleFactors::AUTO,
            (0.0, 0.0),
            180,
            TriggerPolicy::Even
        )
        .is_ok());
    }

    #[test]
    fn rejects_degenerate_target_and_negative_scale() {
        assert!(matches!(
            PageTransformRequest::new(
                PageSize::new(0.0, 612.0),
                ScaleFactors::AUTO,
                (0.0, 0.0),
                0,
                TriggerPolicy::All
            ),
            Err(TransformError::InvalidTargetSize { .. })
        ));
        assert!(matches!(
            PageTransformRequest::new(
                LETTER_LANDSCAPE,
                ScaleFactors::new(-1.0, 1.0),
                (0.0, 0.0),
                0,
                TriggerPolicy::All
            ),
            Err(TransformError::InvalidScale { .. })
        ));
    }

    // ── Selection ────────────────────────────────────────────────────────

    #[test]
    fn identity_request_matches_pass_through() {
        let req = PageTransformRequest::new(
            PageSize::new(612.0, 792.0),
            ScaleFactors::UNIT,
            (0.0, 0.0),
            0,
            TriggerPolicy::All,
        )
        .unwrap();
        let plan = req.plan(1, &LETTER);
        assert!(plan.selected);
        assert_eq!(plan.placement, Placement::IDENTITY);
        assert!(plan.matrix().is_identity());
    }

    #[test]
    fn odd_and_even_select_by_one_indexed_parity() {
        let odd = request(TriggerPolicy::Odd, 90);
        let even = request(TriggerPolicy::Even, 90);
        let picked = |req: &PageTransformRequest| -> Vec<u32> {
            (1..=5).filter(|&n| req.plan(n, &LETTER).selected).collect()
        };
        assert_eq!(picked(&odd), vec![1, 3, 5]);
        assert_eq!(picked(&even), vec![2, 4]);
    }

    #[test]
    fn unselected_parity_page_is_identity_on_target_size() {
        let plan = request(TriggerPolicy::Odd, 90).plan(2, &LETTER);
        assert!(!plan.selected);
        assert_eq!(plan.target, LETTER_LANDSCAPE);
        assert_eq!(plan.placement, Placement::IDENTITY);
    }

    #[test]
    fn xydiff_leaves_matching_orientation_unrotated_but_scaled() {
        let req = request(TriggerPolicy::XYDiff, 90);
        let source = PageGeometry::new(1000.0, 500.0, Rotation::None);
        let plan = req.plan(1, &source);
        assert!(!plan.selected);
        assert_eq!(plan.placement.rotation, Rotation::None);
        assert!(approx(plan.placement.scale.x, 792.0 / 1000.0));
        assert!(approx(plan.placement.scale.y, 612.0 / 500.0));
    }

    #[test]
    fn xydiff_turns_mismatched_orientation() {
        let plan = request(TriggerPolicy::XYDiff, 90).plan(1, &LETTER);
        assert!(plan.selected);
        assert_eq!(plan.placement.rotation, Rotation::Quarter);

        let portrait_target = PageTransformRequest::new(
            PageSize::new(612.0, 792.0),
            ScaleFactors::AUTO,
            (0.0, 0.0),
            90,
            TriggerPolicy::XYDiff,
        )
        .unwrap();
        let landscape_source = PageGeometry::new(792.0, 612.0, Rotation::None);
        assert!(portrait_target.plan(1, &landscape_source).selected);
        assert!(!portrait_target.plan(1, &LETTER).selected);
    }

    #[test]
    fn square_pages_turn_unless_suppressed() {
        let square = PageGeometry::new(500.0, 500.0, Rotation::None);
        let plain = request(TriggerPolicy::XYDiff, 90).plan(1, &square);
        assert!(plain.selected);
        assert_eq!(plain.placement.rotation, Rotation::Quarter);

        let suppressed = request(TriggerPolicy::XYDiffDisableSquareRotation, 90).plan(1, &square);
        assert!(!suppressed.selected);
        assert_eq!(suppressed.placement.rotation, Rotation::None);
    }

    // ── Normalisation ────────────────────────────────────────────────────

    #[test]
    fn stored_quarter_turns_are_inverted() {
        assert_eq!(
            effective_rotation(Rotation::None, Rotation::Quarter),
            Rotation::ThreeQuarter
        );
        assert_eq!(
            effective_rotation(Rotation::Half, Rotation::ThreeQuarter),
            Rotation::Quarter
        );
        assert_eq!(effective_rotation(Rotation::Quarter, Rotation::Half), Rotation::Quarter);
        assert_eq!(effective_rotation(Rotation::Half, Rotation::None), Rotation::Half);
    }

    #[test]
    fn no_rotation_leaks_between_pages() {
        let req = request(TriggerPolicy::Odd, 0);
        let turned = PageGeometry::new(612.0, 792.0, Rotation::Quarter);
        assert_eq!(req.plan(1, &turned).placement.rotation, Rotation::ThreeQuarter);
        // Page 2 is unselected: the previous page's stored turn must not carry over.
        assert_eq!(req.plan(2, &LETTER).placement.rotation, Rotation::None);
        assert_eq!(req.plan(3, &LETTER).placement.rotation, Rotation::None);
    }

    // ── Placement ────────────────────────────────────────────────────────

    #[test]
    fn letter_to_landscape_quarter_turn() {
        let plan = request(TriggerPolicy::All, 90).plan(1, &LETTER);
        assert_eq!(plan.target, LETTER_LANDSCAPE);
        // sx = targetW / srcH, sy = targetH / srcW
        assert!(approx(plan.placement.scale.x, 792.0 / 792.0));
        assert!(approx(plan.placement.scale.y, 612.0 / 612.0));

        let m = plan.matrix();
        for (x, y) in [(0.0, 0.0), (612.0, 0.0), (0.0, 792.0), (612.0, 792.0), (306.0, 396.0)] {
            let p = m.apply(x, y);
            assert!(inside(plan.target, p), "({x},{y}) mapped outside: {p:?}");
        }
        assert_eq!(m.apply(0.0, 0.0), (792.0, 0.0));
        assert_eq!(m.apply(612.0, 792.0), (0.0, 612.0));
    }

    #[test]
    fn auto_scale_fills_target_for_every_rotation() {
        let a4 = PageGeometry::new(595.0, 842.0, Rotation::None);
        for degrees in [0, 90, 180, 270] {
            let req = request(TriggerPolicy::All, degrees);
            let plan = req.plan(1, &a4);
            let m = plan.matrix();
            let corners = [(0.0, 0.0), (595.0, 0.0), (0.0, 842.0), (595.0, 842.0)];
            let mapped: Vec<_> = corners.iter().map(|&(x, y)| m.apply(x, y)).collect();
            for p in &mapped {
                assert!(inside(plan.target, *p), "{degrees}°: {p:?} outside target");
            }
            let max_x = mapped.iter().map(|p| p.0).fold(f64::MIN, f64::max);
            let max_y = mapped.iter().map(|p| p.1).fold(f64::MIN, f64::max);
            assert!(approx(max_x, 792.0), "{degrees}°: max x {max_x}");
            assert!(approx(max_y, 612.0), "{degrees}°: max y {max_y}");
        }
    }

    #[test]
    fn explicit_scale_and_shift_land_in_matrix() {
        let req = PageTransformRequest::new(
            PageSize::new(612.0, 792.0),
            ScaleFactors::new(0.5, 0.5),
            (10.0, 20.0),
            0,
            TriggerPolicy::All,
        )
        .unwrap();
        let m = req.plan(1, &LETTER).matrix();
        assert_eq!(m.operands(), [0.5, 0.0, 0.0, 0.5, 10.0, 20.0]);
    }

    #[test]
    fn half_turn_offsets_both_axes() {
        let req = PageTransformRequest::new(
            PageSize::new(612.0, 792.0),
            ScaleFactors::UNIT,
            (0.0, 0.0),
            180,
            TriggerPolicy::All,
        )
        .unwrap();
        let m = req.plan(1, &LETTER).matrix();
        assert_eq!(m.apply(0.0, 0.0), (612.0, 792.0));
        assert_eq!(m.apply(612.0, 792.0), (0.0, 0.0));
    }

    #[test]
    fn explicit_scale_keeps_rotated_content_at_scaled_origin() {
        // Half-size content stays in the bottom-left part of the target,
        // whatever the rotation.
        for (degrees, origin) in [
            (90, (396.0, 0.0)),
            (180, (306.0, 396.0)),
            (270, (0.0, 306.0)),
        ] {
            let req = PageTransformRequest::new(
                PageSize::new(612.0, 792.0),
                ScaleFactors::new(0.5, 0.5),
                (0.0, 0.0),
                degrees,
                TriggerPolicy::All,
            )
            .unwrap();
            let m = req.plan(1, &LETTER).matrix();
            assert_eq!(m.apply(0.0, 0.0), origin, "{degrees}°");

            let corners = [(0.0, 0.0), (612.0, 0.0), (0.0, 792.0), (612.0, 792.0)];
            let mapped: Vec<_> = corners.iter().map(|&(x, y)| m.apply(x, y)).collect();
            let min_x = mapped.iter().map(|p| p.0).fold(f64::MAX, f64::min);
            let min_y = mapped.iter().map(|p| p.1).fold(f64::MAX, f64::min);
            assert!(approx(min_x, 0.0) && approx(min_y, 0.0), "{degrees}°: {mapped:?}");
        }
    }

    #[test]
    fn explicit_scale_offset_is_scaled_before_shift() {
        let req = PageTransformRequest::new(
            PageSize::new(792.0, 612.0),
            ScaleFactors::new(0.5, 0.25),
            (10.0, 20.0),
            90,
            TriggerPolicy::All,
        )
        .unwrap();
        let m = req.plan(1, &LETTER).matrix();
        // e = shift_x + sx * source height
        assert_eq!(m.operands()[4], 10.0 + 0.5 * 792.0);
        assert_eq!(m.operands()[5], 20.0);
    }

    #[test]
    fn square_suppression_ignores_stored_quarter_turns() {
        let req = request(TriggerPolicy::XYDiffDisableSquareRotation, 90);
        for stored in [Rotation::Quarter, Rotation::ThreeQuarter] {
            let square = PageGeometry::new(500.0, 500.0, stored);
            let plan = req.plan(1, &square);
            assert!(!plan.selected, "stored {stored:?}");
            assert_eq!(plan.placement.rotation, Rotation::None, "stored {stored:?}");
        }

        // Without suppression the stored turn overrides the request.
        let plain = request(TriggerPolicy::XYDiff, 90);
        let square = PageGeometry::new(500.0, 500.0, Rotation::Quarter);
        let plan = plain.plan(1, &square);
        assert!(plan.selected);
        assert_eq!(plan.placement.rotation, Rotation::ThreeQuarter);
    }

    #[test]
    fn square_suppression_still_turns_non_square_stored_pages() {
        let req = request(TriggerPolicy::XYDiffDisableSquareRotation, 90);
        let turned = PageGeometry::new(612.0, 792.0, Rotation::ThreeQuarter);
        let plan = req.plan(1, &turned);
        assert!(plan.selected);
        assert_eq!(plan.placement.rotation, Rotation::Quarter);
    }

    // ── Index-driven mode ────────────────────────────────────────────────

    fn entry(counter: u32, page: u32, degrees: i64, width: f64) -> PerPageOverride {
        PerPageOverride {
            counter,
            page,
            target: PageSize::new(width, 612.0),
            scale: ScaleFactors::AUTO,
            shift_x: 0.0,
            shift_y: 0.0,
            degrees,
        }
    }

    #[test]
    fn first_override_for_a_page_wins() {
        let overrides = vec![entry(1, 2, 90, 792.0), entry(2, 2, 0, 1000.0)];
        let plan = plan_override(2, &LETTER, &overrides).unwrap().unwrap();
        assert_eq!(plan.target.width, 792.0);
        assert_eq!(plan.placement.rotation, Rotation::Quarter);
    }

    #[test]
    fn unmatched_page_has_no_plan() {
        let overrides = vec![entry(1, 2, 90, 792.0)];
        assert_eq!(plan_override(1, &LETTER, &overrides).unwrap(), None);
    }

    #[test]
    fn override_rotation_is_validated_and_normalised() {
        let bad = vec![entry(1, 1, 45, 792.0)];
        assert_eq!(
            plan_override(1, &LETTER, &bad),
            Err(TransformError::InvalidRotation { degrees: 45 })
        );

        let turned = PageGeometry::new(612.0, 792.0, Rotation::ThreeQuarter);
        let plan = plan_override(1, &turned, &[entry(1, 1, 0, 792.0)])
            .unwrap()
            .unwrap();
        assert_eq!(plan.placement.rotation, Rotation::Quarter);
    }
}
