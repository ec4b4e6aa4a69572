use super::*;
use serde_json::json;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

fn layer(v: serde_json::Value) -> TextLayer {
    let mut base = json!({
        "type": "title",
        "content": "Hello",
        "font": { "name": "Noto Sans JP" },
        "fontSize": 48,
        "color": "#ffffff",
    });
    if let (Some(base), Some(extra)) = (base.as_object_mut(), v.as_object()) {
        for (k, val) in extra {
            base.insert(k.clone(), val.clone());
        }
    }
    serde_json::from_value(base).unwrap()
}

/// Every character advances by half the font size.
struct HalfEm;

impl TextMeasure for HalfEm {
    fn line_width(&mut self, font: &FontRequest, text: &str) -> ThumbResult<f64> {
        Ok(text.chars().count() as f64 * font.size * 0.5)
    }
}

fn approx(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

#[test]
fn splits_on_every_newline_convention() {
    assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
    assert_eq!(split_lines("a\r\nb\rc"), vec!["a", "b", "c"]);
    assert_eq!(split_lines("Line1\\nLine2"), vec!["Line1", "Line2"]);
    assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
    assert_eq!(split_lines("a\n"), vec!["a", ""]);
    assert_eq!(split_lines(""), vec![""]);
}

#[test]
fn normalizes_newlines_to_lf() {
    assert_eq!(normalize_newlines("a\r\nb\\nc"), "a\nb\nc");
}

#[test]
fn bottom_center_title_on_default_canvas() {
    let block = layout_text_layer(
        &layer(json!({ "position": { "vertical": "bottom", "horizontal": "center" } })),
        canvas(480, 270),
        &LayoutConfig::default(),
    );

    approx(block.line_height, 52.8);
    approx(block.block_height, 52.8);
    approx(block.origin_y, 270.0 - 52.8 - 20.0);
    assert_eq!(block.lines.len(), 1);

    let line = &block.lines[0];
    approx(line.anchor_x, 240.0);
    assert_eq!(line.align, Align::Center);

    let w = HalfEm.line_width(&block.font_request(), &line.text).unwrap();
    approx(line.origin_x(w), (480.0 - w) / 2.0);
    assert_eq!(block.weight, FontWeight::BOLD);
}

#[test]
fn literal_and_real_newlines_give_the_same_lines() {
    let cfg = LayoutConfig::default();
    let a = layout_text_layer(&layer(json!({ "content": "Line1\\nLine2" })), canvas(480, 270), &cfg);
    let b = layout_text_layer(&layer(json!({ "content": "Line1\nLine2" })), canvas(480, 270), &cfg);

    assert_eq!(a, b);
    assert_eq!(a.lines.len(), 2);
    approx(a.lines[1].y - a.lines[0].y, a.line_height);
    approx(a.block_height, 2.0 * a.line_height);
}

#[test]
fn vertical_anchors_respect_margin_and_centering() {
    let cfg = LayoutConfig::default();
    let c = canvas(480, 270);
    let top = layout_text_layer(&layer(json!({ "position": { "vertical": "top" } })), c, &cfg);
    let mid = layout_text_layer(&layer(json!({ "position": { "vertical": "middle" } })), c, &cfg);
    let bot = layout_text_layer(&layer(json!({ "position": { "vertical": "bottom" } })), c, &cfg);

    approx(top.origin_y, 20.0);
    approx(mid.origin_y + mid.block_height / 2.0, 135.0);
    approx(bot.origin_y + bot.block_height, 250.0);
}

#[test]
fn trailing_empty_line_counts_toward_block_height() {
    let block = layout_text_layer(
        &layer(json!({ "content": "a\n", "position": { "vertical": "bottom" } })),
        canvas(480, 270),
        &LayoutConfig::default(),
    );
    assert_eq!(block.lines.len(), 2);
    approx(block.origin_y, 270.0 - 2.0 * 52.8 - 20.0);
}

#[test]
fn horizontal_anchor_formulas() {
    let cfg = LayoutConfig::default();
    let c = canvas(480, 270);
    let w = 100.0;

    let left = layout_text_layer(&layer(json!({ "position": { "horizontal": "left" } })), c, &cfg);
    let right =
        layout_text_layer(&layer(json!({ "position": { "horizontal": "right" } })), c, &cfg);

    approx(left.lines[0].origin_x(w), 20.0);
    approx(right.lines[0].origin_x(w), 480.0 - w - 20.0);
}

#[test]
fn over_wide_lines_are_not_clamped() {
    let block = layout_text_layer(
        &layer(json!({ "position": { "horizontal": "center" } })),
        canvas(480, 270),
        &LayoutConfig::default(),
    );
    approx(block.lines[0].origin_x(600.0), -60.0);
}

#[test]
fn text_align_overrides_alignment_about_the_anchor() {
    let block = layout_text_layer(
        &layer(json!({
            "position": { "horizontal": "center" },
            "textAlign": "left",
        })),
        canvas(480, 270),
        &LayoutConfig::default(),
    );
    assert_eq!(block.lines[0].align, Align::Start);
    approx(block.lines[0].origin_x(80.0), 240.0);
}

#[test]
fn line_height_override_and_margin_config() {
    let cfg = LayoutConfig::default().with_margin(10.0);
    let block = layout_text_layer(
        &layer(json!({ "lineHeight": 1.5, "fontSize": 20 })),
        canvas(480, 270),
        &cfg,
    );
    approx(block.line_height, 30.0);
    approx(block.origin_y, 10.0);
    approx(block.lines[0].anchor_x, 10.0);
}

#[test]
fn subtitle_defaults_to_normal_weight_and_outline_resolves() {
    let block = layout_text_layer(
        &layer(json!({
            "type": "subtitle",
            "outline": { "color": "#000000" },
        })),
        canvas(480, 270),
        &LayoutConfig::default(),
    );
    assert_eq!(block.weight, FontWeight::NORMAL);
    assert_eq!(block.outline.map(|o| o.thickness), Some(4.0));
}
