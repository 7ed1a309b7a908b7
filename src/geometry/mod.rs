//! Page geometry: the value types the transform engine works with.
//!
//! Everything here is plain data in PDF user-space units (1/72 inch). No
//! type in this module touches a document; [`transform`] turns these values
//! into per-page placement decisions and [`crate::pdf`] applies them.
//!
//! ## Coordinate convention
//!
//! Rotations are counter-clockwise in PDF user space (y axis pointing up),
//! the same convention the `cm` operator uses. A [`Affine`] is stored as the
//! six `cm` operands `[a b c d e f]` and maps `(x, y)` to
//! `(a·x + c·y + e, b·x + d·y + f)`.

pub mod transform;

pub use transform::{
    plan_override, PagePlan, PageTransformRequest, PerPageOverride, Placement, ScaleFactors,
};

use crate::error::TransformError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ── Rotation ─────────────────────────────────────────────────────────────

/// A quarter-turn rotation. Any other angle is rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    /// Angle in degrees (0, 90, 180 or 270).
    pub fn degrees(self) -> i64 {
        match self {
            Rotation::None => 0,
            Rotation::Quarter => 90,
            Rotation::Half => 180,
            Rotation::ThreeQuarter => 270,
        }
    }

    /// Exact `(cos, sin)` pair; avoids the `6.1e-17` noise of `f64::cos`.
    pub fn cos_sin(self) -> (f64, f64) {
        match self {
            Rotation::None => (1.0, 0.0),
            Rotation::Quarter => (0.0, 1.0),
            Rotation::Half => (-1.0, 0.0),
            Rotation::ThreeQuarter => (0.0, -1.0),
        }
    }

    /// `true` for 90 and 270, where width and height trade places.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Quarter | Rotation::ThreeQuarter)
    }

    /// Interpret a page's stored `/Rotate` value.
    ///
    /// Stored values may be negative or exceed a full turn (`-90`, `450`);
    /// they are reduced modulo 360 before validation.
    pub fn from_page_rotate(degrees: i64) -> Result<Self, TransformError> {
        Rotation::try_from(degrees.rem_euclid(360))
            .map_err(|_| TransformError::InvalidRotation { degrees })
    }
}

impl TryFrom<i64> for Rotation {
    type Error = TransformError;

    fn try_from(degrees: i64) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::None),
            90 => Ok(Rotation::Quarter),
            180 => Ok(Rotation::Half),
            270 => Ok(Rotation::ThreeQuarter),
            other => Err(TransformError::InvalidRotation { degrees: other }),
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

// ── Trigger policy ───────────────────────────────────────────────────────

/// Rule deciding which pages of a document receive the requested rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TriggerPolicy {
    /// Every page.
    All,
    /// Pages 1, 3, 5, … (1-indexed).
    Odd,
    /// Pages 2, 4, 6, … (1-indexed).
    Even,
    /// Pages whose orientation differs from the target orientation.
    #[default]
    XYDiff,
    /// As [`TriggerPolicy::XYDiff`], but exactly square pages are never rotated.
    XYDiffDisableSquareRotation,
}

impl TriggerPolicy {
    /// Orientation-based triggers only ever turn a page by a quarter.
    pub fn is_orientation_based(self) -> bool {
        matches!(
            self,
            TriggerPolicy::XYDiff | TriggerPolicy::XYDiffDisableSquareRotation
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            TriggerPolicy::All => "All",
            TriggerPolicy::Odd => "Odd",
            TriggerPolicy::Even => "Even",
            TriggerPolicy::XYDiff => "XYDiff",
            TriggerPolicy::XYDiffDisableSquareRotation => "XYDiffDisableSquareRotation",
        }
    }
}

impl fmt::Display for TriggerPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parse error for [`TriggerPolicy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTrigger(pub String);

impl fmt::Display for UnknownTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown trigger '{}' (expected All, Odd, Even, XYDiff or XYDiffDisableSquareRotation)",
            self.0
        )
    }
}

impl std::error::Error for UnknownTrigger {}

impl FromStr for TriggerPolicy {
    type Err = UnknownTrigger;

    /// Case-insensitive; `_` and `-` are ignored (`xy_diff` == `XYDiff`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "all" => Ok(TriggerPolicy::All),
            "odd" => Ok(TriggerPolicy::Odd),
            "even" => Ok(TriggerPolicy::Even),
            "xydiff" => Ok(TriggerPolicy::XYDiff),
            "xydiffdisablesquarerotation" => Ok(TriggerPolicy::XYDiffDisableSquareRotation),
            _ => Err(UnknownTrigger(s.to_string())),
        }
    }
}

impl Serialize for TriggerPolicy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for TriggerPolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ── Sizes ────────────────────────────────────────────────────────────────

/// Width × height in user-space units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Strictly wider than tall.
    pub fn is_landscape(&self) -> bool {
        self.width > self.height
    }

    pub fn is_square(&self) -> bool {
        self.width == self.height
    }

    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// What the engine needs to know about a source page.
///
/// `size` is the MediaBox extent as stored, before the page's own
/// `/Rotate` is applied; `rotation` is that stored `/Rotate`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub size: PageSize,
    pub rotation: Rotation,
}

impl PageGeometry {
    pub fn new(width: f64, height: f64, rotation: Rotation) -> Self {
        Self {
            size: PageSize::new(width, height),
            rotation,
        }
    }
}

// ── Affine ───────────────────────────────────────────────────────────────

/// A 2-D affine transform in `cm` operand order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn translate(x: f64, y: f64) -> Self {
        Affine {
            e: x,
            f: y,
            ..Affine::IDENTITY
        }
    }

    /// Map a point through the transform.
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// `self` applied after `inner`: `self.then_after(inner).apply(p) == self.apply(inner.apply(p))`.
    pub fn then_after(&self, inner: &Affine) -> Affine {
        Affine {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Affine::IDENTITY
    }

    /// The six operands as written before a `cm` operator.
    pub fn operands(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

impl Default for Affine {
    fn default() -> Self {
        Affine::IDENTITY
    }
}
