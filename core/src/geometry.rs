//! Frame geometry: padding applied to requested window bounds and the border
//! drawn around the webview.
//!
//! All constants live in [`ChromePolicy`]; `HostBuilder::use_chrome_policy`
//! replaces them.

/// Edge thickness in logical pixels, `(left, top, right, bottom)`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Thickness {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Thickness {
    pub const ZERO: Self = Self::uniform(0.0);

    #[must_use]
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    #[must_use]
    pub const fn uniform(v: f64) -> Self {
        Self::new(v, v, v, v)
    }

    #[must_use]
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    #[must_use]
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// Height/width delta added to requested bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub height: f64,
    pub width: f64,
}

/// Padding and border constants used by the chrome controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromePolicy {
    /// Added to requested bounds when the native frame is shown.
    pub framed_padding: Padding,
    /// Added to requested bounds when the window is frameless.
    pub frameless_padding: Padding,
    /// Border around the webview for a maximized frameless window (outside fullscreen).
    pub frameless_maximized_border: Thickness,
    /// Border around the webview for a restored frameless window.
    pub frameless_restored_border: Thickness,
}

impl Default for ChromePolicy {
    fn default() -> Self {
        Self {
            framed_padding: Padding {
                height: 7.0,
                width: 14.0,
            },
            frameless_padding: Padding {
                height: 3.0,
                width: 6.0,
            },
            frameless_maximized_border: Thickness::uniform(8.0),
            frameless_restored_border: Thickness::new(3.0, 0.0, 3.0, 3.0),
        }
    }
}

/// Requested window bounds. `min_*` of 0 and `max_*` of infinity mean unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeBounds {
    pub height: f64,
    pub width: f64,
    pub min_height: f64,
    pub min_width: f64,
    pub max_height: f64,
    pub max_width: f64,
}

impl SizeBounds {
    #[must_use]
    pub fn new(height: f64, width: f64) -> Self {
        Self {
            height,
            width,
            min_height: 0.0,
            min_width: 0.0,
            max_height: f64::INFINITY,
            max_width: f64::INFINITY,
        }
    }

    /// Minimum size if either dimension is set.
    #[must_use]
    pub fn min_size(&self) -> Option<(f64, f64)> {
        (self.min_width != 0.0 || self.min_height != 0.0).then_some((self.min_width, self.min_height))
    }

    /// Maximum size if either dimension is set. An unset dimension stays infinite.
    #[must_use]
    pub fn max_size(&self) -> Option<(f64, f64)> {
        (self.max_width.is_finite() || self.max_height.is_finite())
            .then_some((self.max_width, self.max_height))
    }
}

impl ChromePolicy {
    #[must_use]
    pub fn padding(&self, framed: bool) -> Padding {
        if framed {
            self.framed_padding
        } else {
            self.frameless_padding
        }
    }

    /// Adds the frame padding to `bounds`. Sentinel min/max values are left alone.
    #[must_use]
    pub fn adjust_bounds(&self, bounds: SizeBounds, framed: bool) -> SizeBounds {
        let pad = self.padding(framed);
        let min = |v: f64, d: f64| if v != 0.0 { v + d } else { v };
        let max = |v: f64, d: f64| if v != f64::INFINITY { v + d } else { v };
        SizeBounds {
            height: bounds.height + pad.height,
            width: bounds.width + pad.width,
            min_height: min(bounds.min_height, pad.height),
            min_width: min(bounds.min_width, pad.width),
            max_height: max(bounds.max_height, pad.height),
            max_width: max(bounds.max_width, pad.width),
        }
    }

    /// Border drawn around the webview for the given chrome state.
    #[must_use]
    pub fn border(&self, framed: bool, maximized: bool, fullscreen: bool) -> Thickness {
        if maximized && !framed && !fullscreen {
            self.frameless_maximized_border
        } else if !maximized && !framed {
            self.frameless_restored_border
        } else {
            Thickness::ZERO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn framed_adds_seven_and_fourteen() {
        let policy = ChromePolicy::default();
        for (h, w) in [(0.0, 0.0), (768.0, 1366.0), (1.0, 3.0), (4000.0, 9000.0)] {
            let out = policy.adjust_bounds(SizeBounds::new(h, w), true);
            assert_eq!(out.height, h + 7.0);
            assert_eq!(out.width, w + 14.0);
        }
    }

    #[test]
    fn frameless_adds_three_and_six() {
        let policy = ChromePolicy::default();
        for (h, w) in [(0.0, 0.0), (768.0, 1366.0), (600.0, 800.0)] {
            let out = policy.adjust_bounds(SizeBounds::new(h, w), false);
            assert_eq!(out.height, h + 3.0);
            assert_eq!(out.width, w + 6.0);
        }
    }

    #[test]
    fn sentinel_bounds_are_untouched() {
        let policy = ChromePolicy::default();
        for framed in [true, false] {
            let out = policy.adjust_bounds(SizeBounds::new(600.0, 800.0), framed);
            assert_eq!(out.min_height, 0.0);
            assert_eq!(out.min_width, 0.0);
            assert_eq!(out.max_height, f64::INFINITY);
            assert_eq!(out.max_width, f64::INFINITY);
            assert_eq!(out.min_size(), None);
            assert_eq!(out.max_size(), None);
        }
    }

    #[test]
    fn set_bounds_get_the_same_delta() {
        let policy = ChromePolicy::default();
        let bounds = SizeBounds {
            height: 600.0,
            width: 800.0,
            min_height: 300.0,
            min_width: 400.0,
            max_height: 1000.0,
            max_width: 1600.0,
        };
        let framed = policy.adjust_bounds(bounds, true);
        assert_eq!((framed.min_height, framed.min_width), (307.0, 414.0));
        assert_eq!((framed.max_height, framed.max_width), (1007.0, 1614.0));
        let frameless = policy.adjust_bounds(bounds, false);
        assert_eq!((frameless.min_height, frameless.min_width), (303.0, 406.0));
        assert_eq!((frameless.max_height, frameless.max_width), (1003.0, 1606.0));
    }

    #[test]
    fn mixed_sentinels_adjust_only_set_dimensions() {
        let policy = ChromePolicy::default();
        let mut bounds = SizeBounds::new(600.0, 800.0);
        bounds.min_width = 200.0;
        bounds.max_height = 900.0;
        let out = policy.adjust_bounds(bounds, true);
        assert_eq!(out.min_width, 214.0);
        assert_eq!(out.min_height, 0.0);
        assert_eq!(out.max_height, 907.0);
        assert_eq!(out.max_width, f64::INFINITY);
        assert_eq!(out.max_size(), Some((f64::INFINITY, 907.0)));
    }

    #[test]
    fn border_rules() {
        let policy = ChromePolicy::default();
        assert_eq!(policy.border(false, true, false), Thickness::uniform(8.0));
        assert_eq!(policy.border(false, false, false), Thickness::new(3.0, 0.0, 3.0, 3.0));
        assert_eq!(policy.border(false, true, true), Thickness::ZERO);
        assert_eq!(policy.border(true, true, false), Thickness::ZERO);
        assert_eq!(policy.border(true, false, false), Thickness::ZERO);
    }

    #[test]
    fn custom_policy_is_honored() {
        let policy = ChromePolicy {
            framed_padding: Padding {
                height: 0.0,
                width: 0.0,
            },
            ..ChromePolicy::default()
        };
        let out = policy.adjust_bounds(SizeBounds::new(100.0, 200.0), true);
        assert_eq!((out.height, out.width), (100.0, 200.0));
    }
}
