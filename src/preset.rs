//! Named size presets for responsive images.
//!
//! A preset decides which widths get generated for an image and which `sizes`
//! hint accompanies the resulting `srcset`. The preset name doubles as the CSS
//! class on the rendered `<picture>`, so layout and image widths stay in step.
//!
//! | Preset | Widths | Largest layout slot |
//! |---|---|---|
//! | `small` | 270, 400, 600 | 230px |
//! | `regular` | 505, 800, 1200 | 505px |
//! | `medium` | 600, 900, 1200 | 600px |
//! | `large` | 1010, 1400, 1600 | 1010px |
//!
//! Class names come straight from page content, so resolution is total:
//! anything unrecognised becomes [`Preset::Regular`].

use std::fmt;

/// One of the four image layout classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Preset {
    Small,
    #[default]
    Regular,
    Medium,
    Large,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Small,
        Preset::Regular,
        Preset::Medium,
        Preset::Large,
    ];

    /// Resolve a class name to a preset. Never fails.
    ///
    /// Matching is exact: `"Large"` or `" large"` fall back to `regular`
    /// just like any other unknown name.
    pub fn from_class_name(name: &str) -> Self {
        match name {
            "small" => Preset::Small,
            "regular" => Preset::Regular,
            "medium" => Preset::Medium,
            "large" => Preset::Large,
            _ => Preset::Regular,
        }
    }

    /// Class name, as used in markup.
    pub fn name(self) -> &'static str {
        match self {
            Preset::Small => "small",
            Preset::Regular => "regular",
            Preset::Medium => "medium",
            Preset::Large => "large",
        }
    }

    /// Target widths in ascending order.
    pub fn widths(self) -> &'static [u32] {
        match self {
            Preset::Small => &[270, 400, 600],
            Preset::Regular => &[505, 800, 1200],
            Preset::Medium => &[600, 900, 1200],
            Preset::Large => &[1010, 1400, 1600],
        }
    }

    /// Value for the `sizes` attribute on each `<source>`.
    pub fn sizes(self) -> &'static str {
        match self {
            Preset::Small => "(max-width: 600px) 90vw, (max-width: 1040px) 30vw, 230px",
            Preset::Regular => "(max-width: 700px) 90vw, (max-width: 1040px) 50vw, 505px",
            Preset::Medium => "(max-width: 700px) 90vw, (max-width: 1040px) 60vw, 600px",
            Preset::Large => "(max-width: 700px) 90vw, (max-width: 1600px) 70vw, 1010px",
        }
    }

    /// Smallest width across all presets. The placeholder must stay below it.
    pub fn min_width() -> u32 {
        Self::ALL
            .iter()
            .filter_map(|p| p.widths().first().copied())
            .min()
            .unwrap_or(0)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_names_resolve() {
        assert_eq!(Preset::from_class_name("small"), Preset::Small);
        assert_eq!(Preset::from_class_name("regular"), Preset::Regular);
        assert_eq!(Preset::from_class_name("medium"), Preset::Medium);
        assert_eq!(Preset::from_class_name("large"), Preset::Large);
    }

    #[test]
    fn unknown_names_fall_back_to_regular() {
        for name in ["", "huge", "Large", " small", "regular ", "hero", "0"] {
            assert_eq!(
                Preset::from_class_name(name),
                Preset::Regular,
                "{name:?} should resolve to regular"
            );
        }
    }

    #[test]
    fn name_roundtrips_through_resolver() {
        for preset in Preset::ALL {
            assert_eq!(Preset::from_class_name(preset.name()), preset);
        }
    }

    #[test]
    fn widths_are_ascending_and_positive() {
        for preset in Preset::ALL {
            let widths = preset.widths();
            assert!(!widths.is_empty());
            assert!(widths.iter().all(|&w| w > 0));
            assert!(widths.windows(2).all(|w| w[0] < w[1]), "{preset}");
        }
    }

    #[test]
    fn regular_preset_values() {
        let p = Preset::default();
        assert_eq!(p, Preset::Regular);
        assert_eq!(p.widths(), &[505, 800, 1200]);
        assert!(p.sizes().ends_with("505px"));
    }

    #[test]
    fn min_width_is_small_preset_floor() {
        assert_eq!(Preset::min_width(), 270);
    }

    #[test]
    fn display_uses_class_name() {
        assert_eq!(Preset::Large.to_string(), "large");
    }
}
