use std::fmt;

use crate::shared::constants::NULL_FILTER;
use crate::style::domain::frame_rate::{FrameRate, FrameRatePreference};
use crate::style::domain::style_translator::TranslatedStyle;
use crate::style::domain::subtitle_style::SubtitleStyle;
use crate::subtitle::domain::subtitle_asset::SubtitleFormat;

/// A subtitle file already written into the engine's working filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagedSubtitle {
    pub name: String,
    pub format: SubtitleFormat,
}

impl StagedSubtitle {
    pub fn new(name: impl Into<String>, format: SubtitleFormat) -> Self {
        Self {
            name: name.into(),
            format,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterStage {
    /// Retimes the stream to an exact rate.
    RateConversion(FrameRate),
    /// Renders a subtitle file onto the frames with a `force_style` override.
    SubtitleBurn { file_name: String, force_style: String },
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStage::RateConversion(rate) => write!(f, "fps={rate}"),
            FilterStage::SubtitleBurn {
                file_name,
                force_style,
            } => write!(f, "subtitles={file_name}:force_style='{force_style}'"),
        }
    }
}

/// Ordered video filter chain. Empty means the stream passes unmodified.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterExpression {
    stages: Vec<FilterStage>,
}

impl FilterExpression {
    pub fn stages(&self) -> &[FilterStage] {
        &self.stages
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Value for `-vf`: the joined chain, or the null filter when empty.
    pub fn to_arg(&self) -> String {
        if self.is_empty() {
            NULL_FILTER.to_string()
        } else {
            self.to_string()
        }
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, stage) in self.stages.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{stage}")?;
        }
        Ok(())
    }
}

/// Composes the filter chain: rate conversion first, then subtitle burn-in.
///
/// Formats with their own style section keep it and only get the vertical
/// margin forced; plain-text formats get the full inline override.
pub fn build(
    subtitle: Option<&StagedSubtitle>,
    style: &SubtitleStyle,
    frame_pref: FrameRatePreference,
    translated: &TranslatedStyle,
) -> FilterExpression {
    let mut stages = Vec::with_capacity(2);

    if let FrameRatePreference::Fixed(rate) = frame_pref {
        stages.push(FilterStage::RateConversion(rate));
    }

    if let Some(subtitle) = subtitle {
        let force_style = if subtitle.format.has_embedded_styles() {
            format!("MarginV={}", style.margin_px)
        } else {
            translated.inline_override.clone()
        };
        stages.push(FilterStage::SubtitleBurn {
            file_name: subtitle.name.clone(),
            force_style,
        });
    }

    FilterExpression { stages }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::domain::style_translator::translate;
    use rstest::rstest;

    fn build_with(
        subtitle: Option<&StagedSubtitle>,
        frame_pref: FrameRatePreference,
    ) -> FilterExpression {
        let style = SubtitleStyle::default();
        build(subtitle, &style, frame_pref, &translate(&style))
    }

    #[test]
    fn test_no_subtitle_and_auto_is_no_filter() {
        let expr = build_with(None, FrameRatePreference::Auto);
        assert!(expr.is_empty());
        assert_eq!(expr.to_arg(), "null");
    }

    #[rstest]
    #[case::ntsc_film("23.976", "fps=24000/1001")]
    #[case::ntsc_video("29.97", "fps=30000/1001")]
    #[case::integer("25", "fps=25")]
    fn test_rate_stage_uses_exact_rational(#[case] rate: &str, #[case] expected: &str) {
        let pref = FrameRatePreference::Fixed(rate.parse().unwrap());
        let expr = build_with(None, pref);
        assert_eq!(expr.to_arg(), expected);
    }

    #[test]
    fn test_rate_stage_precedes_subtitle_stage() {
        let sub = StagedSubtitle::new("job-1-sub.srt", SubtitleFormat::Srt);
        let pref = FrameRatePreference::Fixed("23.976".parse().unwrap());
        let expr = build_with(Some(&sub), pref);

        assert_eq!(expr.stages().len(), 2);
        assert!(matches!(expr.stages()[0], FilterStage::RateConversion(_)));
        assert!(matches!(expr.stages()[1], FilterStage::SubtitleBurn { .. }));
        assert!(expr.to_arg().starts_with("fps=24000/1001,subtitles=job-1-sub.srt:"));
    }

    #[rstest]
    #[case::srt(SubtitleFormat::Srt, "job-2-sub.srt")]
    #[case::vtt(SubtitleFormat::Vtt, "job-2-sub.vtt")]
    fn test_plain_text_formats_get_full_override(
        #[case] format: SubtitleFormat,
        #[case] name: &str,
    ) {
        let style = SubtitleStyle::default();
        let translated = translate(&style);
        let sub = StagedSubtitle::new(name, format);
        let expr = build(Some(&sub), &style, FrameRatePreference::Auto, &translated);

        assert_eq!(
            expr.to_arg(),
            format!("subtitles={name}:force_style='{}'", translated.inline_override)
        );
    }

    #[test]
    fn test_ass_keeps_own_styles_and_forces_margin_only() {
        let style = SubtitleStyle {
            margin_px: 55,
            ..SubtitleStyle::default()
        };
        let sub = StagedSubtitle::new("job-5-sub.ass", SubtitleFormat::Ass);
        let expr = build(Some(&sub), &style, FrameRatePreference::Auto, &translate(&style));

        assert_eq!(
            expr.to_arg(),
            "subtitles=job-5-sub.ass:force_style='MarginV=55'"
        );
    }

    #[test]
    fn test_single_subtitle_stage_has_no_separator() {
        let sub = StagedSubtitle::new("job-9-sub.srt", SubtitleFormat::Srt);
        let expr = build_with(Some(&sub), FrameRatePreference::Auto);
        assert_eq!(expr.stages().len(), 1);
        assert!(!expr.to_arg().starts_with(','));
        assert!(!expr.to_arg().contains("fps="));
    }
}
