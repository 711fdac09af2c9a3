#![cfg(feature = "surface")]

//! Exports through the built-in off-screen HTML surface

use longshot::rendering::{HtmlSurface, SurfaceConfig};
use longshot::{
    ContentRenderer, ExportFormat, ExportLimits, ExportSource, ImageExportService, Progress,
    Viewport,
};

fn long_page(paragraphs: usize) -> String {
    let mut html = String::from("<html><body><h1>Long document</h1>");
    for i in 0..paragraphs {
        html.push_str(&format!(
            "<h2>Section {i}</h2><p>{}</p>",
            "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(6)
        ));
        if i % 25 == 0 {
            html.push_str(r#"<div class="mermaid">graph TD; A-->B</div>"#);
        }
    }
    html.push_str("<pre><code>fn main() {\n    println!(\"done\");\n}</code></pre></body></html>");
    html
}

fn surface(html: &str) -> HtmlSurface {
    HtmlSurface::load(
        html,
        SurfaceConfig {
            viewport: Viewport { width: 800, height: 900 },
            ..Default::default()
        },
    )
}

#[tokio::test(start_paused = true)]
async fn long_html_exports_as_one_image() {
    let html = long_page(80);
    let mut live = surface(&html);
    let doc = live.measure().await.unwrap();
    assert!(doc.height > 5.0 * 900.0, "page should need several tiles");

    let service = ImageExportService::new(ExportLimits::default());
    let output = service
        .export_single_image(
            ExportSource::Live(Some(&mut live)),
            ExportFormat::Png,
            &mut Progress::none(),
        )
        .await
        .expect("export");

    let expected_height = (doc.height * (1080.0 / 800.0)).round() as u32;
    assert_eq!((output.width, output.height), (1080, expected_height));

    let decoded = image::load_from_memory(&output.bytes).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (1080, expected_height));
    // Page background is painted everywhere outside content blocks.
    assert_eq!(decoded.get_pixel(2, 2).0, [255, 255, 255, 255]);
    assert_eq!(decoded.get_pixel(2, expected_height - 3).0, [255, 255, 255, 255]);
    assert!(!live.is_torn_down());
}

#[tokio::test(start_paused = true)]
async fn exports_are_deterministic() {
    let html = long_page(30);
    let service = ImageExportService::default();

    let first = service
        .export_single_image(
            ExportSource::Background(surface(&html)),
            ExportFormat::Png,
            &mut Progress::none(),
        )
        .await
        .unwrap();
    let second = service
        .export_single_image(
            ExportSource::Background(surface(&html)),
            ExportFormat::Png,
            &mut Progress::none(),
        )
        .await
        .unwrap();

    assert_eq!(first.digest(), second.digest());
    assert_eq!(first.digest().len(), 64);
}

#[tokio::test(start_paused = true)]
async fn jpeg_export_of_html() {
    let output = ImageExportService::default()
        .export_single_image(
            ExportSource::Background(surface("<h1>Hi</h1><p>short</p>")),
            ExportFormat::Jpeg,
            &mut Progress::none(),
        )
        .await
        .unwrap();
    assert_eq!(output.format_used, ExportFormat::Jpeg);
    assert!(image::load_from_memory(&output.bytes).is_ok());
}
