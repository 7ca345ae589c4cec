pub mod json_style_preset;
