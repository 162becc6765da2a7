//! Color-bearing style properties
//!
//! Every property the pipeline touches is classified into a
//! [`PropertyKind`], and a single table maps each kind to what each pass
//! does with it. Well-known names are listed in [`ColorProperty`]; any other
//! name containing `color` or `shadow` (ASCII case-insensitive) still
//! classifies through the name rule.

/// What kind of visual value a property carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    /// A single color value
    Color,
    /// A (possibly layered) shadow list, which may embed several colors
    Shadow,
}

/// How a pass treats a property of a given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Run the value through the color normalizer
    Normalize,
    /// Replace the value with [`NO_SHADOW`] regardless of what it was
    ForceClear,
}

/// The two passes that rewrite clone styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    Sync,
    Scrub,
}

/// Sentinel written for cleared shadows.
pub const NO_SHADOW: &str = "none";

/// kind → (sync strategy, scrub strategy)
const STRATEGY_TABLE: &[(PropertyKind, Strategy, Strategy)] = &[
    (PropertyKind::Color, Strategy::Normalize, Strategy::Normalize),
    (PropertyKind::Shadow, Strategy::Normalize, Strategy::ForceClear),
];

pub fn strategy(kind: PropertyKind, pass: Pass) -> Strategy {
    STRATEGY_TABLE
        .iter()
        .find(|(k, _, _)| *k == kind)
        .map(|(_, sync, scrub)| match pass {
            Pass::Sync => *sync,
            Pass::Scrub => *scrub,
        })
        .unwrap_or(Strategy::Normalize)
}

/// Well-known color-bearing properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorProperty {
    Color,
    BackgroundColor,
    BorderTopColor,
    BorderRightColor,
    BorderBottomColor,
    BorderLeftColor,
    OutlineColor,
    TextDecorationColor,
    TextShadow,
    BoxShadow,
    CaretColor,
    AccentColor,
    ColumnRuleColor,
    TextEmphasisColor,
    FloodColor,
    LightingColor,
    StopColor,
}

impl ColorProperty {
    /// The properties the deep scrubber always rewrites, in the order it
    /// visits them.
    pub const SCRUBBED: [ColorProperty; 10] = [
        ColorProperty::Color,
        ColorProperty::BackgroundColor,
        ColorProperty::BorderTopColor,
        ColorProperty::BorderRightColor,
        ColorProperty::BorderBottomColor,
        ColorProperty::BorderLeftColor,
        ColorProperty::OutlineColor,
        ColorProperty::TextDecorationColor,
        ColorProperty::TextShadow,
        ColorProperty::BoxShadow,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorProperty::Color => "color",
            ColorProperty::BackgroundColor => "background-color",
            ColorProperty::BorderTopColor => "border-top-color",
            ColorProperty::BorderRightColor => "border-right-color",
            ColorProperty::BorderBottomColor => "border-bottom-color",
            ColorProperty::BorderLeftColor => "border-left-color",
            ColorProperty::OutlineColor => "outline-color",
            ColorProperty::TextDecorationColor => "text-decoration-color",
            ColorProperty::TextShadow => "text-shadow",
            ColorProperty::BoxShadow => "box-shadow",
            ColorProperty::CaretColor => "caret-color",
            ColorProperty::AccentColor => "accent-color",
            ColorProperty::ColumnRuleColor => "column-rule-color",
            ColorProperty::TextEmphasisColor => "text-emphasis-color",
            ColorProperty::FloodColor => "flood-color",
            ColorProperty::LightingColor => "lighting-color",
            ColorProperty::StopColor => "stop-color",
        }
    }

    pub fn kind(self) -> PropertyKind {
        match self {
            ColorProperty::TextShadow | ColorProperty::BoxShadow => PropertyKind::Shadow,
            _ => PropertyKind::Color,
        }
    }

    pub fn from_name(name: &str) -> Option<ColorProperty> {
        const ALL: [ColorProperty; 17] = [
            ColorProperty::Color,
            ColorProperty::BackgroundColor,
            ColorProperty::BorderTopColor,
            ColorProperty::BorderRightColor,
            ColorProperty::BorderBottomColor,
            ColorProperty::BorderLeftColor,
            ColorProperty::OutlineColor,
            ColorProperty::TextDecorationColor,
            ColorProperty::TextShadow,
            ColorProperty::BoxShadow,
            ColorProperty::CaretColor,
            ColorProperty::AccentColor,
            ColorProperty::ColumnRuleColor,
            ColorProperty::TextEmphasisColor,
            ColorProperty::FloodColor,
            ColorProperty::LightingColor,
            ColorProperty::StopColor,
        ];
        ALL.into_iter().find(|p| p.name().eq_ignore_ascii_case(name))
    }
}

/// Classify a property name. Returns `None` for properties that carry no
/// color or shadow.
pub fn classify(name: &str) -> Option<PropertyKind> {
    if let Some(prop) = ColorProperty::from_name(name) {
        return Some(prop.kind());
    }
    let lower = name.to_ascii_lowercase();
    // names containing both words are treated as shadows
    if lower.contains("shadow") {
        Some(PropertyKind::Shadow)
    } else if lower.contains("color") {
        Some(PropertyKind::Color)
    } else {
        None
    }
}

/// True when the name carries a color or shadow.
pub fn is_color_bearing(name: &str) -> bool {
    classify(name).is_some()
}

/// Color-bearing properties whose values inherit from the parent when the
/// node itself does not enumerate them.
pub const INHERITED_COLOR_PROPERTIES: &[&str] = &[
    "color",
    "text-shadow",
    "caret-color",
    "accent-color",
    "color-scheme",
    "text-emphasis-color",
];

pub fn is_inherited(name: &str) -> bool {
    INHERITED_COLOR_PROPERTIES
        .iter()
        .any(|p| p.eq_ignore_ascii_case(name))
}
