//! Directionality engine: direction-aware layout transforms.
//!
//! Logical start/end properties are resolved to physical left/right values
//! by pure functions of a single RTL flag. Every transform here is an
//! involution: applying it twice with the same flag restores the input.

use std::sync::OnceLock;

use regex::Regex;

use crate::registry::Direction;

/// Physical left/right side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    fn flipped(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Right,
    Center,
}

/// Physical left/right values resolved from logical start/end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideValues {
    pub left: f32,
    pub right: f32,
}

/// Four physical corner radii.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_left: f32,
    pub bottom_right: f32,
}

/// A bag of physical style properties subject to direction mirroring.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhysicalStyle {
    pub margin_left: Option<String>,
    pub margin_right: Option<String>,
    pub padding_left: Option<String>,
    pub padding_right: Option<String>,
    pub left: Option<String>,
    pub right: Option<String>,
    pub border_left: Option<String>,
    pub border_right: Option<String>,
    pub text_align: Option<TextAlign>,
    pub transform: Option<String>,
}

static TRANSLATE_X: OnceLock<Regex> = OnceLock::new();

fn translate_x_regex() -> &'static Regex {
    TRANSLATE_X
        .get_or_init(|| Regex::new(r"translateX\(\s*(-?[0-9]*\.?[0-9]+)").unwrap())
}

/// Direction-aware style transforms derived from the active locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionalityEngine {
    rtl: bool,
}

impl DirectionalityEngine {
    pub fn new(rtl: bool) -> Self {
        Self { rtl }
    }

    pub fn is_rtl(&self) -> bool {
        self.rtl
    }

    pub fn direction(&self) -> Direction {
        if self.rtl {
            Direction::Rtl
        } else {
            Direction::Ltr
        }
    }

    fn resolve(&self, start: f32, end: f32) -> SideValues {
        if self.rtl {
            SideValues { left: end, right: start }
        } else {
            SideValues { left: start, right: end }
        }
    }

    /// Resolve logical start/end margins to physical left/right.
    pub fn margin(&self, start: f32, end: f32) -> SideValues {
        self.resolve(start, end)
    }

    pub fn padding(&self, start: f32, end: f32) -> SideValues {
        self.resolve(start, end)
    }

    pub fn border(&self, start: f32, end: f32) -> SideValues {
        self.resolve(start, end)
    }

    /// Resolve logical start/end offsets; start maps to right under RTL.
    pub fn position(&self, start: f32, end: f32) -> SideValues {
        self.resolve(start, end)
    }

    /// Mirror a bag of physical properties.
    ///
    /// Under LTR the input is returned unchanged. Under RTL every
    /// left/right pair is swapped, text alignment flips, and a horizontal
    /// translate inside `transform` has its magnitude negated.
    pub fn rtl_style(&self, style: &PhysicalStyle) -> PhysicalStyle {
        if !self.rtl {
            return style.clone();
        }
        PhysicalStyle {
            margin_left: style.margin_right.clone(),
            margin_right: style.margin_left.clone(),
            padding_left: style.padding_right.clone(),
            padding_right: style.padding_left.clone(),
            left: style.right.clone(),
            right: style.left.clone(),
            border_left: style.border_right.clone(),
            border_right: style.border_left.clone(),
            text_align: style.text_align.map(|align| match align {
                TextAlign::Left => TextAlign::Right,
                TextAlign::Right => TextAlign::Left,
                TextAlign::Center => TextAlign::Center,
            }),
            transform: style.transform.as_deref().map(negate_translate_x),
        }
    }

    /// `row` becomes `row-reverse` under RTL; column values pass through.
    pub fn flex_direction(&self, value: &str) -> String {
        if !self.rtl {
            return value.to_string();
        }
        match value {
            "row" => "row-reverse".to_string(),
            "row-reverse" => "row".to_string(),
            other => other.to_string(),
        }
    }

    pub fn float_side(&self, side: Side) -> Side {
        if self.rtl {
            side.flipped()
        } else {
            side
        }
    }

    pub fn clear_side(&self, side: Side) -> Side {
        if self.rtl {
            side.flipped()
        } else {
            side
        }
    }

    /// Swipe gestures mirror with the layout.
    pub fn swipe_direction(&self, side: Side) -> Side {
        if self.rtl {
            side.flipped()
        } else {
            side
        }
    }

    /// Horizontal corner swap: top-left with top-right, bottom-left with
    /// bottom-right.
    pub fn border_radius(&self, radius: BorderRadius) -> BorderRadius {
        if !self.rtl {
            return radius;
        }
        BorderRadius {
            top_left: radius.top_right,
            top_right: radius.top_left,
            bottom_left: radius.bottom_right,
            bottom_right: radius.bottom_left,
        }
    }

    /// Table-driven animation name substitution, e.g. `slideInLeft` becomes
    /// `slideInRight`. Names without a mirrored counterpart pass through.
    pub fn animation_name<'a>(&self, name: &'a str) -> &'a str {
        if !self.rtl {
            return name;
        }
        const PAIRS: [(&str, &str); 4] = [
            ("slideInLeft", "slideInRight"),
            ("slideOutLeft", "slideOutRight"),
            ("fadeInLeft", "fadeInRight"),
            ("fadeOutLeft", "fadeOutRight"),
        ];
        for (left, right) in PAIRS {
            if name == left {
                return right;
            }
            if name == right {
                return left;
            }
        }
        name
    }
}

/// Negate the magnitude of a `translateX(..)` component, leaving the rest
/// of the transform string untouched.
fn negate_translate_x(transform: &str) -> String {
    translate_x_regex()
        .replace_all(transform, |caps: &regex::Captures<'_>| {
            let magnitude = &caps[1];
            if let Some(stripped) = magnitude.strip_prefix('-') {
                format!("translateX({stripped}")
            } else {
                format!("translateX(-{magnitude}")
            }
        })
        .into_owned()
}
