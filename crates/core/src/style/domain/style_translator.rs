use super::subtitle_style::{SubtitleStyle, VerticalAnchor};

pub const STYLE_NAME: &str = "Default";

/// Column names of a `[V4+ Styles]` record, in the order ASS requires.
pub const STYLE_FORMAT_FIELDS: [&str; 23] = [
    "Name",
    "Fontname",
    "Fontsize",
    "PrimaryColour",
    "SecondaryColour",
    "OutlineColour",
    "BackColour",
    "Bold",
    "Italic",
    "Underline",
    "StrikeOut",
    "ScaleX",
    "ScaleY",
    "Spacing",
    "Angle",
    "BorderStyle",
    "Outline",
    "Shadow",
    "Alignment",
    "MarginL",
    "MarginR",
    "MarginV",
    "Encoding",
];

const SECONDARY_COLOUR: &str = "&H000000FF";
const BACK_COLOUR: &str = "&H80000000";
const OPAQUE_ALPHA: &str = "00";
const HORIZONTAL_MARGIN: u32 = 30;
const BORDER_STYLE_OUTLINE: u32 = 1;
const ENCODING_DEFAULT: u32 = 1;

/// Both styling syntaxes derived from one `SubtitleStyle`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslatedStyle {
    /// A `Style:` record for formats that carry their own style section.
    pub embedded_block: String,
    /// A `key=value` list for the `force_style` option of plain-text formats.
    pub inline_override: String,
}

/// ASS numpad-style alignment code for the anchor.
pub fn alignment_code(anchor: VerticalAnchor) -> u8 {
    match anchor {
        VerticalAnchor::Top => 10,
        VerticalAnchor::Middle => 5,
        VerticalAnchor::Bottom => 2,
    }
}

pub fn translate(style: &SubtitleStyle) -> TranslatedStyle {
    TranslatedStyle {
        embedded_block: embedded_block(style),
        inline_override: inline_override(style),
    }
}

fn embedded_block(style: &SubtitleStyle) -> String {
    let fields: [String; 23] = [
        STYLE_NAME.to_string(),
        style.font_family.replace(' ', "_"),
        style.font_size_pt.to_string(),
        format!("&H{OPAQUE_ALPHA}{}", style.primary_color.to_ass_bgr()),
        SECONDARY_COLOUR.to_string(),
        format!("&H{OPAQUE_ALPHA}{}", style.outline_color.to_ass_bgr()),
        BACK_COLOUR.to_string(),
        "0".to_string(),
        "0".to_string(),
        "0".to_string(),
        "0".to_string(),
        "100".to_string(),
        "100".to_string(),
        "0".to_string(),
        "0".to_string(),
        BORDER_STYLE_OUTLINE.to_string(),
        style.outline_width_px.to_string(),
        style.shadow_depth_px.to_string(),
        alignment_code(style.vertical_anchor).to_string(),
        HORIZONTAL_MARGIN.to_string(),
        HORIZONTAL_MARGIN.to_string(),
        style.margin_px.to_string(),
        ENCODING_DEFAULT.to_string(),
    ];
    format!("Style: {}", fields.join(","))
}

fn inline_override(style: &SubtitleStyle) -> String {
    [
        format!("FontName={}", style.font_family),
        format!("FontSize={}", style.font_size_pt),
        format!("PrimaryColour=&H{}", style.primary_color.to_ass_bgr()),
        format!("OutlineColour=&H{}", style.outline_color.to_ass_bgr()),
        format!("BorderStyle={BORDER_STYLE_OUTLINE}"),
        format!("Outline={}", style.outline_width_px),
        format!("Shadow={}", style.shadow_depth_px),
        format!("Alignment={}", alignment_code(style.vertical_anchor)),
        format!("MarginV={}", style.margin_px),
    ]
    .join(",")
}

/// Renders a complete `[V4+ Styles]` section holding the translated record.
pub struct StyleSheet;

impl StyleSheet {
    pub fn render(style: &SubtitleStyle) -> String {
        format!(
            "[V4+ Styles]\nFormat: {}\n{}\n",
            STYLE_FORMAT_FIELDS.join(", "),
            embedded_block(style)
        )
    }
}
