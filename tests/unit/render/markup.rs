use super::*;
use crate::{
    compose::loader::{FsImageLoader, ImageLoader, LoadedImage},
    layout::text::LayoutConfig,
    model::document::ThumbnailDocument,
    plan::resolve_plan,
};

struct MemLoader(Option<(u32, u32)>);

impl ImageLoader for MemLoader {
    fn load_image(&self, source: &str) -> ThumbResult<LoadedImage> {
        match self.0 {
            Some((w, h)) => LoadedImage::from_rgba8(w, h, vec![0; (w * h * 4) as usize]),
            None => Err(ThumbError::resource(format!("offline: {source}"))),
        }
    }
}

fn markup(background: &str, texts: &str, loader: &dyn ImageLoader) -> MarkupDocument {
    let json = format!(
        r#"{{ "Thumbnail": {{
            "Resolution": {{ "type": "preset", "value": "16:9" }},
            "Background": {background},
            "Texts": {texts}
        }} }}"#
    );
    let spec = ThumbnailDocument::from_json_str(&json).unwrap().thumbnail;
    let plan = resolve_plan(&spec, loader, &LayoutConfig::default()).unwrap();
    MarkupBackend.render(&plan).unwrap()
}

fn value<'a>(style: &'a [CssDecl], property: &str) -> Option<&'a str> {
    style
        .iter()
        .find(|d| d.property == property)
        .map(|d| d.value.as_str())
}

const SOLID: &str = r##"{ "type": "solid", "color": "#000000" }"##;

const TITLE: &str = r##"[{
    "type": "title",
    "content": "Hello\\nWorld",
    "font": {
        "name": "Noto Sans JP",
        "faces": [{ "url": "fonts/NotoSansJP-Bold.ttf", "weight": "bold" }]
    },
    "fontSize": 48,
    "color": "#ffffff",
    "outline": { "color": "#000000", "thickness": 2 },
    "position": { "vertical": "bottom", "horizontal": "center" }
}]"##;

#[test]
fn solid_background_sets_container_color() {
    let doc = markup(SOLID, "[]", &MemLoader(None));
    assert_eq!((doc.width, doc.height), (480, 270));
    assert_eq!(value(&doc.container_style, "background-color"), Some("#000000"));
    assert!(doc.elements.is_empty());
}

#[test]
fn gradient_lists_stops_in_percent() {
    let doc = markup(
        r##"{ "type": "gradient", "colors": ["#fff", "#888", "#000"] }"##,
        "[]",
        &MemLoader(None),
    );
    assert_eq!(
        value(&doc.container_style, "background-image"),
        Some("linear-gradient(to right, #ffffff 0%, #888888 50%, #000000 100%)")
    );
}

#[test]
fn image_background_is_sized_from_the_cover_crop() {
    let doc = markup(
        r#"{ "type": "image", "imagePath": "bg.png", "imageBlur": 3, "imageOpacity": 0.25 }"#,
        "[]",
        &MemLoader(Some((1000, 500))),
    );
    let bg = &doc.elements[0];
    assert_eq!(bg.class, "bg");
    // 480 / (500 * 16/9) scales the crop onto the canvas; the height lands on 270.
    assert_eq!(value(&bg.style, "background-size"), Some("540px 270px"));
    assert_eq!(value(&bg.style, "background-position"), Some("-30px 0px"));
    assert_eq!(value(&bg.style, "filter"), Some("blur(3px)"));
    assert_eq!(value(&bg.style, "opacity"), Some("0.25"));
}

#[test]
fn image_url_points_at_the_file_the_loader_read() {
    let dir = std::env::temp_dir().join(format!("thumbnail-maker-markup-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    image::RgbaImage::from_pixel(8, 8, image::Rgba([10, 20, 30, 255]))
        .save(dir.join("bg.png"))
        .unwrap();

    let loader = FsImageLoader::for_document(&dir.join("thumb.json"));
    let doc = markup(r#"{ "type": "image", "imagePath": "bg.png" }"#, "[]", &loader);
    let expected = url::Url::from_file_path(dir.join("bg.png")).unwrap();
    assert_eq!(
        value(&doc.elements[0].style, "background-image"),
        Some(format!("url(\"{expected}\")").as_str())
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn failed_image_uses_placeholder_color() {
    let doc = markup(
        r#"{ "type": "image", "imagePath": "gone.png" }"#,
        "[]",
        &MemLoader(None),
    );
    assert_eq!(value(&doc.container_style, "background-color"), Some("#cccccc"));
    assert!(doc.elements.is_empty());
}

#[test]
fn lines_are_anchored_and_aligned_by_the_host() {
    let doc = markup(SOLID, TITLE, &MemLoader(None));
    let lines: Vec<&MarkupElement> = doc.elements.iter().filter(|e| e.class == "line").collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text.as_deref(), Some("Hello"));
    assert_eq!(lines[1].text.as_deref(), Some("World"));

    let first = &lines[0].style;
    assert_eq!(value(first, "left"), Some("240px"));
    assert_eq!(value(first, "transform"), Some("translateX(-50%)"));
    assert_eq!(value(first, "text-align"), Some("center"));
    // 270 - 2 * 52.8 - 20
    assert_eq!(value(first, "top"), Some("144.4px"));
    assert_eq!(value(&lines[1].style, "top"), Some("197.2px"));
    assert_eq!(value(first, "font-weight"), Some("700"));
}

#[test]
fn right_anchor_uses_right_offset() {
    let texts = TITLE.replace(r#""horizontal": "center""#, r#""horizontal": "right""#);
    let doc = markup(SOLID, &texts, &MemLoader(None));
    let style = &doc.elements[0].style;
    assert_eq!(value(style, "right"), Some("20px"));
    assert_eq!(value(style, "text-align"), Some("right"));
    assert_eq!(value(style, "left"), None);
}

#[test]
fn outline_becomes_shadow_rings() {
    let doc = markup(SOLID, TITLE, &MemLoader(None));
    let shadow = value(&doc.elements[0].style, "text-shadow").unwrap();
    assert_eq!(shadow.split(", ").count(), 16);
    assert!(shadow.starts_with("1px 0px 0 #000000"));
    assert!(shadow.contains("-2px -2px 0 #000000"));
}

#[test]
fn font_faces_are_registered_once() {
    let texts = format!(
        "[{}, {}]",
        &TITLE[1..TITLE.len() - 1],
        &TITLE[1..TITLE.len() - 1]
    );
    let doc = markup(SOLID, &texts, &MemLoader(None));
    assert_eq!(doc.font_faces.len(), 1);
    assert_eq!(doc.font_faces[0].weight, 700);
    assert!(
        doc.font_faces[0]
            .to_css()
            .contains(r#"src: url("fonts/NotoSansJP-Bold.ttf")"#)
    );
}

#[test]
fn face_aliases_join_the_line_font_stack() {
    let texts = TITLE.replace(
        r#"{ "url": "fonts/NotoSansJP-Bold.ttf", "weight": "bold" }"#,
        r#"{ "url": "fonts/NotoSansJP-Bold.ttf", "weight": "bold", "name": "Noto Bold" },
           { "url": "fonts/NotoSansJP-Regular.ttf", "name": "Noto Bold" }"#,
    );
    let doc = markup(SOLID, &texts, &MemLoader(None));
    assert!(doc.font_faces.iter().all(|f| f.family == "Noto Bold"));
    assert_eq!(
        value(&doc.elements[0].style, "font-family"),
        Some(r#""Noto Sans JP", "Noto Bold", sans-serif"#)
    );

    let plain = markup(SOLID, TITLE, &MemLoader(None));
    assert_eq!(
        value(&plain.elements[0].style, "font-family"),
        Some(r#""Noto Sans JP", sans-serif"#)
    );
}

#[test]
fn html_page_contains_container_and_escaped_text() {
    let texts = TITLE.replace("Hello", "<b>&");
    let html = markup(SOLID, &texts, &MemLoader(None)).to_html();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(r#"id="thumb""#));
    assert!(html.contains("@font-face"));
    assert!(html.contains("&lt;b&gt;&amp;"));
}

#[test]
fn json_round_trips_through_serde_json() {
    let doc = markup(SOLID, TITLE, &MemLoader(None));
    let v: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
    assert_eq!(v["width"], 480);
    assert_eq!(v["fontFaces"][0]["family"], "Noto Sans JP");
    assert_eq!(v["elements"][0]["text"], "Hello");
}

#[test]
fn numbers_are_trimmed() {
    assert_eq!(fmt_num(20.0), "20");
    assert_eq!(fmt_num(144.4000000001), "144.4");
    assert_eq!(fmt_num(-0.0001), "0");
}
