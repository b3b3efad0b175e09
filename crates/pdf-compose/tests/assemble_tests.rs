use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::Document;
use lopdf::content::Content;
use pdf_compose::*;
use std::io::Cursor;

fn png_asset(name: &str, width: u32, height: u32) -> ImageAsset {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, 128])
    }));
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, ImageFormat::Png).unwrap();
    let bytes = buffer.into_inner();
    let size = bytes.len();
    ImageAsset::new(name, RasterHandle::from_encoded(bytes), width, height, size).unwrap()
}

fn corrupt_asset(name: &str) -> ImageAsset {
    ImageAsset::new(
        name,
        RasterHandle::from_encoded(b"truncated".to_vec()),
        10,
        10,
        9,
    )
    .unwrap()
}

/// Low DPI keeps test images tiny: 30 px at 30 dpi is one inch
fn preserve_settings() -> LayoutSettings {
    LayoutSettings {
        dpi: 30,
        ..Default::default()
    }
}

/// Page sizes in points, in page order
fn media_boxes(bytes: &[u8]) -> Vec<(f32, f32)> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|page_id| {
            let page = doc.get_dictionary(*page_id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            let coords: Vec<f32> = media_box.iter().map(|o| o.as_float().unwrap()).collect();
            (coords[2] - coords[0], coords[3] - coords[1])
        })
        .collect()
}

/// Width, height and filter of every embedded image
fn image_xobjects(bytes: &[u8]) -> Vec<(i64, i64, String)> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.objects
        .values()
        .filter_map(|object| object.as_stream().ok())
        .filter(|stream| {
            stream
                .dict
                .get(b"Subtype")
                .and_then(|t| t.as_name())
                .is_ok_and(|name| name == b"Image")
        })
        .map(|stream| {
            let dim = |key: &[u8]| stream.dict.get(key).unwrap().as_i64().unwrap();
            let filter = stream
                .dict
                .get(b"Filter")
                .and_then(|f| f.as_name())
                .map(|name| String::from_utf8_lossy(name).into_owned())
                .unwrap_or_default();
            (dim(b"Width"), dim(b"Height"), filter)
        })
        .collect()
}

/// The `cm` matrix the image of each page is drawn with
fn draw_matrices(bytes: &[u8]) -> Vec<Vec<f32>> {
    let doc = Document::load_mem(bytes).unwrap();
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = Content::decode(&doc.get_page_content(*page_id).unwrap()).unwrap();
            let draw = content
                .operations
                .iter()
                .position(|op| op.operator == "Do")
                .unwrap();
            let cm = content.operations[..draw]
                .iter()
                .rev()
                .find(|op| op.operator == "cm")
                .unwrap();
            cm.operands.iter().map(|o| o.as_float().unwrap()).collect()
        })
        .collect()
}

fn assert_matrix(actual: &[f32], expected: [f32; 6]) {
    assert!(
        actual.len() == 6
            && actual
                .iter()
                .zip(expected)
                .all(|(a, e)| (a - e).abs() < 0.1),
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

async fn assemble_file(sequence: &ImageSequence, settings: &LayoutSettings) -> PdfFile {
    let output = assemble(&sequence.snapshot(), settings, OutputMode::Persist, |_| {})
        .await
        .unwrap()
        .unwrap();
    let DocumentOutput::File(file) = output else {
        panic!("Expected a file");
    };
    file
}

fn assert_close(actual: (f32, f32), expected: (f32, f32)) {
    assert!(
        (actual.0 - expected.0).abs() < 0.5 && (actual.1 - expected.1).abs() < 0.5,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

#[tokio::test]
async fn test_empty_document_is_noop() {
    let snapshot = ImageSequence::new().snapshot();
    let mut events = Vec::new();

    let output = assemble(
        &snapshot,
        &LayoutSettings::default(),
        OutputMode::Persist,
        |p| events.push(p),
    )
    .await
    .unwrap();

    assert!(output.is_none());
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_empty_document_ignores_invalid_settings() {
    let snapshot = ImageSequence::new().snapshot();
    let settings = LayoutSettings {
        quality: 0.0,
        dpi: 0,
        ..Default::default()
    };

    let output = assemble(&snapshot, &settings, OutputMode::Preview, |_| {})
        .await
        .unwrap();
    assert!(output.is_none());
}

#[tokio::test]
async fn test_pages_follow_document_order() {
    let mut sequence = ImageSequence::new();
    sequence.append_batch(vec![
        png_asset("a.png", 30, 60),
        png_asset("b.png", 60, 30),
        png_asset("c.png", 45, 45),
    ]);
    // Move c to the front: c, a, b
    sequence.reorder(2, 0).unwrap();

    let output = assemble(
        &sequence.snapshot(),
        &preserve_settings(),
        OutputMode::Persist,
        |_| {},
    )
    .await
    .unwrap()
    .unwrap();

    let DocumentOutput::File(file) = output else {
        panic!("Expected a file");
    };
    assert_eq!(file.filename, "converted-images.pdf");
    assert_eq!(file.page_count, 3);

    let boxes = media_boxes(&file.bytes);
    assert_eq!(boxes.len(), 3);
    assert_close(boxes[0], (108.0, 108.0));
    assert_close(boxes[1], (72.0, 144.0));
    assert_close(boxes[2], (144.0, 72.0));
}

#[tokio::test]
async fn test_rotation_changes_page_shape() {
    let mut sequence = ImageSequence::new();
    sequence.append_batch(vec![png_asset("tall.png", 30, 60)]);
    sequence.rotate(sequence.ids()[0]).unwrap();

    let output = assemble(
        &sequence.snapshot(),
        &preserve_settings(),
        OutputMode::Persist,
        |_| {},
    )
    .await
    .unwrap()
    .unwrap();

    let DocumentOutput::File(file) = output else {
        panic!("Expected a file");
    };
    assert_close(media_boxes(&file.bytes)[0], (144.0, 72.0));
}

#[tokio::test]
async fn test_standard_page_size() {
    let mut sequence = ImageSequence::new();
    sequence.append_batch(vec![png_asset("a.png", 40, 20), png_asset("b.png", 20, 40)]);

    let settings = LayoutSettings {
        preserve_size: false,
        page_size: PageSize::A4,
        orientation: Orientation::Landscape,
        fit_to_page: true,
        ..Default::default()
    };

    let output = assemble(&sequence.snapshot(), &settings, OutputMode::Persist, |_| {})
        .await
        .unwrap()
        .unwrap();

    let DocumentOutput::File(file) = output else {
        panic!("Expected a file");
    };
    for page in media_boxes(&file.bytes) {
        assert_close(page, (841.89, 595.28));
    }
}

#[tokio::test]
async fn test_progress_reported_per_image() {
    let mut sequence = ImageSequence::new();
    sequence.append_batch(vec![
        png_asset("1.png", 10, 10),
        png_asset("2.png", 10, 10),
        png_asset("3.png", 10, 10),
    ]);

    let mut events = Vec::new();
    assemble(
        &sequence.snapshot(),
        &preserve_settings(),
        OutputMode::Persist,
        |p| events.push(p),
    )
    .await
    .unwrap();

    assert_eq!(events.len(), 4);
    assert_eq!(events[0].phase, "Processing image 1 of 3...");
    assert_eq!(events[0].completed, 1);
    assert_eq!(events[0].total, 3);
    assert_eq!(events[0].percent(), 33);
    assert_eq!(events[2].percent(), 100);
    assert_eq!(events[3].phase, "Saving PDF...");
}

#[tokio::test]
async fn test_failure_produces_no_output() {
    let mut assets: Vec<ImageAsset> = (1..=9)
        .map(|i| png_asset(&format!("page{i}.png"), 12, 12))
        .collect();
    assets.insert(4, corrupt_asset("page4b.png"));
    let mut sequence = ImageSequence::new();
    sequence.append_batch(assets);

    let mut events = Vec::new();
    let result = assemble(
        &sequence.snapshot(),
        &preserve_settings(),
        OutputMode::Persist,
        |p| events.push(p),
    )
    .await;

    match result {
        Err(ComposeError::Decode { name, .. }) => assert_eq!(name, "page4b.png"),
        other => panic!("Expected Decode error, got {:?}", other.map(|o| o.is_some())),
    }
    // page1..page4 succeeded before the corrupt one, no "Saving PDF..." phase
    assert_eq!(events.len(), 4);
    assert!(events.iter().all(|e| e.phase.starts_with("Processing")));
}

#[tokio::test]
async fn test_invalid_settings_rejected() {
    let mut sequence = ImageSequence::new();
    sequence.append_batch(vec![png_asset("a.png", 10, 10)]);
    let settings = LayoutSettings {
        quality: 0.0,
        ..Default::default()
    };

    let result = assemble(&sequence.snapshot(), &settings, OutputMode::Persist, |_| {}).await;
    assert!(matches!(result, Err(ComposeError::Config(_))));
}

#[tokio::test]
async fn test_persist_saves_named_file() {
    let mut sequence = ImageSequence::new();
    sequence.append_batch(vec![png_asset("a.png", 10, 10)]);
    let settings = LayoutSettings {
        filename_base: "holiday".to_string(),
        ..preserve_settings()
    };

    let output = assemble(&sequence.snapshot(), &settings, OutputMode::Persist, |_| {})
        .await
        .unwrap()
        .unwrap();
    let DocumentOutput::File(file) = output else {
        panic!("Expected a file");
    };

    let dir = tempfile::tempdir().unwrap();
    let path = file.save(dir.path()).await.unwrap();
    assert_eq!(path, dir.path().join("holiday.pdf"));
    assert_eq!(std::fs::read(&path).unwrap(), file.bytes);
    // No leftover partial file
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_preview_reuses_bytes_and_revokes() {
    let mut sequence = ImageSequence::new();
    sequence.append_batch(vec![png_asset("a.png", 10, 20), png_asset("b.png", 20, 10)]);

    let output = assemble(
        &sequence.snapshot(),
        &preserve_settings(),
        OutputMode::Preview,
        |_| {},
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(output.page_count(), 2);
    let DocumentOutput::Preview(handle) = output else {
        panic!("Expected a preview");
    };
    let bytes = handle.bytes().unwrap();
    assert_eq!(media_boxes(&bytes).len(), 2);

    let dir = tempfile::tempdir().unwrap();
    let path = handle.download(dir.path()).await.unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), bytes.to_vec());

    let shared = handle.clone();
    handle.revoke();
    assert!(shared.is_revoked());
    assert!(matches!(shared.bytes(), Err(ComposeError::PreviewRevoked)));
    assert!(matches!(
        shared.download(dir.path()).await,
        Err(ComposeError::PreviewRevoked)
    ));
}

#[tokio::test]
async fn test_fill_stretches_to_margin_box() {
    let mut sequence = ImageSequence::new();
    sequence.append_batch(vec![png_asset("wide.png", 30, 20)]);
    let settings = LayoutSettings {
        preserve_size: false,
        fit_to_page: false,
        ..Default::default()
    };

    let file = assemble_file(&sequence, &settings).await;
    // 190x277mm at a 10mm margin on A4 portrait
    assert_matrix(
        &draw_matrices(&file.bytes)[0],
        [538.58, 0.0, 0.0, 785.2, 28.35, 28.35],
    );
}

#[tokio::test]
async fn test_fit_centers_on_page() {
    let mut sequence = ImageSequence::new();
    sequence.append_batch(vec![png_asset("wide.png", 30, 20)]);
    let settings = LayoutSettings {
        preserve_size: false,
        fit_to_page: true,
        ..Default::default()
    };

    let file = assemble_file(&sequence, &settings).await;
    // 190x126.67mm, vertically centered: (297 - 126.67) / 2 = 85.17mm from the bottom
    assert_matrix(
        &draw_matrices(&file.bytes)[0],
        [538.58, 0.0, 0.0, 359.06, 28.35, 241.42],
    );
}

#[tokio::test]
async fn test_rotated_preserve_fills_page() {
    let mut sequence = ImageSequence::new();
    sequence.append_batch(vec![png_asset("wide.png", 90, 60)]);
    sequence.rotate(sequence.ids()[0]).unwrap();

    let file = assemble_file(&sequence, &preserve_settings()).await;
    assert_close(media_boxes(&file.bytes)[0], (144.0, 216.0));
    assert_matrix(
        &draw_matrices(&file.bytes)[0],
        [144.0, 0.0, 0.0, 216.0, 0.0, 0.0],
    );

    let images = image_xobjects(&file.bytes);
    assert_eq!(images.len(), 1);
    assert_eq!((images[0].0, images[0].1), (60, 90));
}

#[tokio::test]
async fn test_large_images_embedded_at_full_resolution() {
    let mut sequence = ImageSequence::new();
    // 1000x900 RGB is 2.7MB of pixels
    sequence.append_batch(vec![png_asset("scan.png", 1000, 900)]);

    let file = assemble_file(&sequence, &LayoutSettings::default()).await;
    assert_eq!(
        image_xobjects(&file.bytes),
        vec![(1000, 900, "DCTDecode".to_string())]
    );
}

#[tokio::test]
async fn test_quality_controls_output_size() {
    let mut sequence = ImageSequence::new();
    sequence.append_batch(vec![png_asset("scan.png", 400, 300)]);

    let high = assemble_file(
        &sequence,
        &LayoutSettings {
            quality: 1.0,
            ..Default::default()
        },
    )
    .await;
    let low = assemble_file(
        &sequence,
        &LayoutSettings {
            quality: 0.1,
            ..Default::default()
        },
    )
    .await;

    assert!(
        low.bytes.len() < high.bytes.len(),
        "quality 0.1 gave {} bytes, quality 1.0 gave {}",
        low.bytes.len(),
        high.bytes.len()
    );
}
