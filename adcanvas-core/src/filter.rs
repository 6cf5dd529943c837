//! Image filters and single-valued effects.
//!
//! Filters form an ordered list on image objects. Adjustment filters
//! (brightness, contrast, saturation, tint) are singletons per type: applying
//! one replaces any earlier instance of the same type. Stylistic filters
//! (grayscale, sepia, invert, blur, sharpen) pick one look, so applying one
//! resets the whole list.
//!
//! Shadow and stroke are not list entries; an object carries at most one of
//! each.

use serde::{Deserialize, Serialize};

/// A non-destructive image filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Filter {
    /// Remove all colour.
    Grayscale,
    /// Warm brown toning.
    Sepia,
    /// Invert every channel.
    Invert,
    /// Gaussian blur.
    Blur {
        /// Strength in `[0, 1]`.
        amount: f64,
    },
    /// 3×3 sharpen kernel.
    Sharpen,
    /// Additive brightness.
    Brightness {
        /// Offset in `[-1, 1]`.
        value: f64,
    },
    /// Contrast around mid-grey.
    Contrast {
        /// Strength in `[-1, 1]`.
        value: f64,
    },
    /// Colour saturation.
    Saturation {
        /// Change in `[-1, 1]`; `-1` is fully desaturated.
        value: f64,
    },
    /// Blend toward a colour.
    Tint {
        /// CSS colour to blend toward.
        color: String,
        /// Blend amount in `[0, 1]`.
        alpha: f64,
    },
}

/// Discriminant of a [`Filter`], without parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterType {
    /// See [`Filter::Grayscale`].
    Grayscale,
    /// See [`Filter::Sepia`].
    Sepia,
    /// See [`Filter::Invert`].
    Invert,
    /// See [`Filter::Blur`].
    Blur,
    /// See [`Filter::Sharpen`].
    Sharpen,
    /// See [`Filter::Brightness`].
    Brightness,
    /// See [`Filter::Contrast`].
    Contrast,
    /// See [`Filter::Saturation`].
    Saturation,
    /// See [`Filter::Tint`].
    Tint,
}

impl FilterType {
    /// Adjustment types are singletons per type within a filter list.
    #[must_use]
    pub fn is_adjustment(self) -> bool {
        matches!(
            self,
            Self::Brightness | Self::Contrast | Self::Saturation | Self::Tint
        )
    }
}

impl Filter {
    /// The filter's type.
    #[must_use]
    pub fn filter_type(&self) -> FilterType {
        match self {
            Self::Grayscale => FilterType::Grayscale,
            Self::Sepia => FilterType::Sepia,
            Self::Invert => FilterType::Invert,
            Self::Blur { .. } => FilterType::Blur,
            Self::Sharpen => FilterType::Sharpen,
            Self::Brightness { .. } => FilterType::Brightness,
            Self::Contrast { .. } => FilterType::Contrast,
            Self::Saturation { .. } => FilterType::Saturation,
            Self::Tint { .. } => FilterType::Tint,
        }
    }

    /// Whether this is an adjustment filter.
    #[must_use]
    pub fn is_adjustment(&self) -> bool {
        self.filter_type().is_adjustment()
    }

    /// Copy of this filter with numeric parameters clamped to their ranges.
    #[must_use]
    pub fn clamped(self) -> Self {
        match self {
            Self::Blur { amount } => Self::Blur {
                amount: amount.clamp(0.0, 1.0),
            },
            Self::Brightness { value } => Self::Brightness {
                value: value.clamp(-1.0, 1.0),
            },
            Self::Contrast { value } => Self::Contrast {
                value: value.clamp(-1.0, 1.0),
            },
            Self::Saturation { value } => Self::Saturation {
                value: value.clamp(-1.0, 1.0),
            },
            Self::Tint { color, alpha } => Self::Tint {
                color,
                alpha: alpha.clamp(0.0, 1.0),
            },
            other => other,
        }
    }
}

/// Apply a filter choice to a filter list.
///
/// `None` is the "no filter" look and empties the list. Returns whether the
/// list changed.
pub fn apply_filter(filters: &mut Vec<Filter>, choice: Option<Filter>) -> bool {
    let before = filters.clone();
    match choice.map(Filter::clamped) {
        None => filters.clear(),
        Some(filter) if filter.is_adjustment() => {
            let ty = filter.filter_type();
            filters.retain(|f| f.filter_type() != ty);
            filters.push(filter);
        }
        Some(filter) => {
            filters.clear();
            filters.push(filter);
        }
    }
    *filters != before
}

/// Shadow or glow behind an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shadow {
    /// CSS colour.
    pub color: String,
    /// Blur radius in document pixels.
    pub blur: f64,
    /// Horizontal offset.
    pub offset_x: f64,
    /// Vertical offset.
    pub offset_y: f64,
}

impl Shadow {
    /// A drop shadow.
    #[must_use]
    pub fn drop(color: impl Into<String>, blur: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            color: color.into(),
            blur,
            offset_x,
            offset_y,
        }
    }

    /// A glow: an unshifted shadow.
    #[must_use]
    pub fn glow(color: impl Into<String>, blur: f64) -> Self {
        Self::drop(color, blur, 0.0, 0.0)
    }
}

/// Outline around an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    /// CSS colour.
    pub color: String,
    /// Width in local units.
    pub width: f64,
}

impl Stroke {
    /// Create a stroke.
    #[must_use]
    pub fn new(color: impl Into<String>, width: f64) -> Self {
        Self {
            color: color.into(),
            width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjustment_replaces_same_type() {
        let mut filters = Vec::new();
        apply_filter(&mut filters, Some(Filter::Brightness { value: 0.3 }));
        apply_filter(&mut filters, Some(Filter::Contrast { value: 0.1 }));
        apply_filter(&mut filters, Some(Filter::Brightness { value: -0.2 }));

        assert_eq!(
            filters,
            vec![
                Filter::Contrast { value: 0.1 },
                Filter::Brightness { value: -0.2 },
            ]
        );
    }

    #[test]
    fn test_stylistic_resets_list() {
        let mut filters = vec![
            Filter::Brightness { value: 0.3 },
            Filter::Tint {
                color: "#ff0000".to_string(),
                alpha: 0.5,
            },
        ];
        apply_filter(&mut filters, Some(Filter::Sepia));
        assert_eq!(filters, vec![Filter::Sepia]);

        apply_filter(&mut filters, Some(Filter::Grayscale));
        assert_eq!(filters, vec![Filter::Grayscale]);
    }

    #[test]
    fn test_none_clears() {
        let mut filters = vec![Filter::Invert];
        assert!(apply_filter(&mut filters, None));
        assert!(filters.is_empty());
        assert!(!apply_filter(&mut filters, None));
    }

    #[test]
    fn test_params_clamped() {
        let mut filters = Vec::new();
        apply_filter(&mut filters, Some(Filter::Brightness { value: 4.0 }));
        assert_eq!(filters, vec![Filter::Brightness { value: 1.0 }]);
    }

    #[test]
    fn test_serialized_tag() {
        let json = serde_json::to_string(&Filter::Blur { amount: 0.5 }).expect("serialize");
        assert_eq!(json, r#"{"type":"blur","amount":0.5}"#);
    }
}
