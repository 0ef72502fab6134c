//! Output size computation.
//!
//! The longer side is pinned to [`TARGET_LONG_SIDE`] and the shorter one is
//! scaled with truncating integer division, so `100x300` becomes `170x512`
//! rather than `171x512`. Existing clips depend on these exact sizes.

use std::{fmt, sync::LazyLock};

use regex::Regex;

/// Length of the longer output side in pixels.
pub const TARGET_LONG_SIDE: u32 = 512;

#[allow(clippy::expect_used)]
static DIMENSIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)x(\d+)").expect("dimensions pattern is valid"));

/// Frame size in pixels. `(0, 0)` means "unknown" and is never valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const ZERO: Self = Self {
        width: 0,
        height: 0,
    };

    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Argument for the engine's `scale` filter: `W:H`.
    #[must_use]
    pub fn filter_arg(&self) -> String {
        format!("scale={}:{}", self.width, self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Parse the probe's `WIDTHxHEIGHT` output.
///
/// Only the first line is considered; anything after the height (some
/// containers append a trailing separator) is ignored.
#[must_use]
pub fn parse_dimensions(raw: &str) -> Option<Dimensions> {
    let line = raw.trim_start().lines().next()?.trim();
    let caps = DIMENSIONS_RE.captures(line)?;
    let width = caps.get(1)?.as_str().parse().ok()?;
    let height = caps.get(2)?.as_str().parse().ok()?;
    Some(Dimensions::new(width, height))
}

/// Map source dimensions to output dimensions.
///
/// Landscape sources get a width of 512; portrait and square sources get a
/// height of 512. Degenerate sources map to [`Dimensions::ZERO`].
#[must_use]
pub fn scale_to_target(source: Dimensions) -> Dimensions {
    if !source.is_valid() {
        return Dimensions::ZERO;
    }

    let (w, h) = (u64::from(source.width), u64::from(source.height));
    let target = u64::from(TARGET_LONG_SIDE);

    if w > h {
        Dimensions::new(TARGET_LONG_SIDE, narrow(h * target / w))
    } else {
        Dimensions::new(narrow(w * target / h), TARGET_LONG_SIDE)
    }
}

/// Parse and scale in one step. Unparsable input yields
/// [`Dimensions::ZERO`]; callers must check [`Dimensions::is_valid`].
#[must_use]
pub fn compute_output_dimensions(raw: &str) -> Dimensions {
    parse_dimensions(raw).map_or(Dimensions::ZERO, scale_to_target)
}

// The scaled side never exceeds TARGET_LONG_SIDE.
fn narrow(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(TARGET_LONG_SIDE)
}
