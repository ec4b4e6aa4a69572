use super::*;
use crate::foundation::core::Rgba8;
use serde_json::json;

fn sample_json() -> serde_json::Value {
    json!({
        "Thumbnail": {
            "Resolution": { "type": "preset", "value": "16:9" },
            "Background": { "type": "solid", "color": "#000000" },
            "Texts": [
                {
                    "enabled": true,
                    "type": "title",
                    "content": "Hello",
                    "font": {
                        "name": "Pretendard",
                        "faces": [
                            { "name": "Pretendard", "url": "fonts/p.woff2", "weight": 700, "style": "normal" }
                        ]
                    },
                    "fontSize": 48,
                    "color": "#ffffff",
                    "outline": { "color": "#000", "thickness": 2 },
                    "position": { "vertical": "bottom", "horizontal": "center" }
                },
                {
                    "enabled": false,
                    "type": "subtitle",
                    "content": "hidden",
                    "font": { "name": "Pretendard" },
                    "fontSize": 24,
                    "color": "#ccc"
                }
            ]
        }
    })
}

fn sample() -> ThumbnailSpec {
    serde_json::from_value::<ThumbnailDocument>(sample_json())
        .unwrap()
        .thumbnail
}

#[test]
fn parses_full_document() {
    let spec = sample();
    assert_eq!(
        spec.resolution,
        Resolution::Preset {
            value: "16:9".to_string()
        }
    );
    assert_eq!(spec.texts.len(), 2);

    let title = &spec.texts[0];
    assert_eq!(title.kind, TextKind::Title);
    assert_eq!(title.position.vertical, VerticalAnchor::Bottom);
    assert_eq!(title.position.horizontal, HorizontalAnchor::Center);
    assert_eq!(title.font.faces[0].weight, FontWeight::BOLD);
    assert_eq!(title.effective_weight(), FontWeight::BOLD);
    assert_eq!(
        title.outline.as_ref().unwrap().color.rgba8(),
        Rgba8::rgb(0, 0, 0)
    );

    let subtitle = &spec.texts[1];
    assert_eq!(subtitle.effective_weight(), FontWeight::NORMAL);
    assert_eq!(subtitle.position, Position::default());
    spec.validate().unwrap();
}

#[test]
fn enabled_layers_skip_disabled() {
    let spec = sample();
    let enabled: Vec<_> = spec.enabled_layers().map(|l| l.content.as_str()).collect();
    assert_eq!(enabled, vec!["Hello"]);
}

#[test]
fn unknown_background_type_is_config_error() {
    let mut v = sample_json();
    v["Thumbnail"]["Background"] = json!({ "type": "pattern", "color": "#fff" });
    let err = ThumbnailDocument::from_json_str(&v.to_string()).unwrap_err();
    assert!(matches!(err, ThumbError::Config(_)), "{err}");
}

#[test]
fn missing_required_field_is_config_error() {
    let mut v = sample_json();
    v["Thumbnail"]["Texts"][0]
        .as_object_mut()
        .unwrap()
        .remove("fontSize");
    let err = ThumbnailDocument::from_json_str(&v.to_string()).unwrap_err();
    assert!(matches!(err, ThumbError::Config(_)), "{err}");
}

#[test]
fn unknown_anchor_keyword_is_config_error() {
    let mut v = sample_json();
    v["Thumbnail"]["Texts"][0]["position"]["vertical"] = json!("upper");
    assert!(matches!(
        ThumbnailDocument::from_json_str(&v.to_string()),
        Err(ThumbError::Config(_))
    ));
}

#[test]
fn single_color_gradient_is_validation_error() {
    let mut spec = sample();
    spec.background = Background::Gradient {
        colors: vec![Color::parse("#fff").unwrap()],
    };
    assert!(matches!(spec.validate(), Err(ThumbError::Validation(_))));
}

#[test]
fn zero_custom_resolution_is_validation_error() {
    let mut spec = sample();
    spec.resolution = Resolution::Custom {
        width: 0,
        height: 10,
    };
    assert!(matches!(spec.validate(), Err(ThumbError::Validation(_))));
}

#[test]
fn non_positive_font_size_is_validation_error() {
    let mut spec = sample();
    spec.texts[0].font_size = 0.0;
    assert!(matches!(spec.validate(), Err(ThumbError::Validation(_))));
}

#[test]
fn image_background_defaults_and_bounds() {
    let bg: Background =
        serde_json::from_value(json!({ "type": "image", "imagePath": "bg.png" })).unwrap();
    assert_eq!(
        bg,
        Background::Image {
            image_path: "bg.png".to_string(),
            image_blur: 0.0,
            image_opacity: 1.0
        }
    );

    let mut spec = sample();
    spec.background = Background::Image {
        image_path: "bg.png".to_string(),
        image_blur: 0.0,
        image_opacity: 1.5,
    };
    assert!(matches!(spec.validate(), Err(ThumbError::Validation(_))));
}

#[test]
fn fixed_ratio_resolution_parses_camel_case() {
    let r: Resolution = serde_json::from_value(
        json!({ "type": "fixedRatio", "ratioValue": "4:3", "width": 400 }),
    )
    .unwrap();
    assert_eq!(
        r,
        Resolution::FixedRatio {
            ratio_value: "4:3".to_string(),
            width: Some(400),
            height: None
        }
    );
}

#[test]
fn font_weight_accepts_keywords_and_numeric_strings() {
    let w: FontWeight = serde_json::from_value(json!("bold")).unwrap();
    assert_eq!(w, FontWeight::BOLD);
    let w: FontWeight = serde_json::from_value(json!("600")).unwrap();
    assert_eq!(w, FontWeight(600));
    assert!(serde_json::from_value::<FontWeight>(json!("heavy-ish")).is_err());
    assert!(serde_json::from_value::<FontWeight>(json!(5000)).is_err());
}

#[test]
fn override_content_targets_matching_kind_and_normalizes_newlines() {
    let mut spec = sample();
    let n = spec.override_content(TextKind::Title, "A\\nB\r\nC");
    assert_eq!(n, 1);
    assert_eq!(spec.texts[0].content, "A\nB\nC");
    assert_eq!(spec.texts[1].content, "hidden");
}

#[test]
fn override_background_image_replaces_solid() {
    let mut spec = sample();
    spec.override_background_image("cover.jpg");
    assert_eq!(
        spec.background,
        Background::Image {
            image_path: "cover.jpg".to_string(),
            image_blur: 0.0,
            image_opacity: 1.0
        }
    );
}
