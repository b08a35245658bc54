mod common;

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use pageflow_pdf::filename::{document_filename, sanitize_filename};
use pageflow_pdf::fonts::FontMetrics;
use pageflow_pdf::geometry::{mm_to_pt, pt_to_mm};
use pageflow_pdf::{
    Block, Error, FontChoice, Orientation, PageFormat, PageGeometry, RenderOptions, StaticSurface, export_blocks,
    export_surface, render_blocks,
};
use rayon::prelude::*;

fn sample_blocks() -> Vec<Block> {
    vec![
        Block::heading(1, "Consent form"),
        Block::key_value("Name", "Jane Doe"),
        Block::key_value("Date of birth", "1970-01-01"),
        Block::spacer(12.0),
        Block::heading(2, "Statement"),
        Block::paragraph("I agree to the procedure described above.\nSigned on paper."),
    ]
}

/// Fresh, empty directory under tests/output/.
fn clean_dir(name: &str) -> PathBuf {
    let dir = common::output_dir("export").unwrap().join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn blocks_export_into_directory_with_sanitized_name() {
    common::init_logging();
    let dir = clean_dir("directory");
    let options = RenderOptions {
        filename: "Consent form: Jane/Doe".into(),
        ..Default::default()
    };
    let path = export_blocks(&sample_blocks(), &options, &dir).unwrap();

    assert_eq!(path, dir.join("Consent_form_Jane_Doe.pdf"));
    let bytes = fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(common::count_pages(&bytes), 1);

    let names: Vec<String> = fs::read_dir(&dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["Consent_form_Jane_Doe.pdf".to_string()]);
}

#[test]
fn explicit_file_path_is_used_as_is() {
    let dir = clean_dir("explicit");
    let target = dir.join("out.pdf");
    let path = export_blocks(&sample_blocks(), &RenderOptions::default(), &target).unwrap();
    assert_eq!(path, target);
    assert!(target.is_file());
}

#[test]
fn missing_source_writes_nothing() {
    let dir = clean_dir("missing");
    let err = export_surface(&StaticSurface::missing(), &RenderOptions::default(), &dir).unwrap_err();
    assert!(matches!(err, Error::MissingSource(_)));
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
}

#[test]
fn unwritable_target_is_an_io_error() {
    let dir = clean_dir("unwritable");
    let target = dir.join("no-such-dir").join("out.pdf");
    let err = export_blocks(&sample_blocks(), &RenderOptions::default(), &target).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "{err}");
    assert!(!target.exists());
}

#[test]
fn title_and_producer_are_recorded() {
    let options = RenderOptions {
        title: Some("Quarterly report".into()),
        ..Default::default()
    };
    let bytes = render_blocks(&sample_blocks(), &options).unwrap();
    assert!(common::contains(&bytes, "Quarterly report"));
    assert!(common::contains(&bytes, "pageflow-pdf"));
    assert!(common::contains(&bytes, "/BaseFont /Helvetica-Bold"));
}

#[test]
fn many_pages_of_text() {
    let blocks: Vec<Block> = (0..60)
        .flat_map(|i| {
            [
                Block::heading(2, format!("Part {i}")),
                Block::paragraph("Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(8)),
            ]
        })
        .collect();
    let bytes = render_blocks(&blocks, &RenderOptions::default()).unwrap();
    assert!(common::count_pages(&bytes) > 5);
}

#[test]
fn concurrent_exports_are_identical() {
    let blocks = sample_blocks();
    let options = RenderOptions::default();
    let reference = render_blocks(&blocks, &options).unwrap();
    let results: Vec<Vec<u8>> = (0..8)
        .into_par_iter()
        .map(|_| render_blocks(&blocks, &options).unwrap())
        .collect();
    assert!(results.iter().all(|r| *r == reference));
}

#[test]
fn missing_font_file_is_a_font_error() {
    let options = RenderOptions {
        font: FontChoice::File {
            regular: PathBuf::from("tests/output/does-not-exist.ttf"),
            bold: None,
        },
        ..Default::default()
    };
    let err = render_blocks(&sample_blocks(), &options).unwrap_err();
    assert!(matches!(err, Error::Font(_)), "{err}");
}

/// `/Length1` of every embedded font program.
fn embedded_font_lengths(pdf: &[u8]) -> Vec<usize> {
    let needle = b"/Length1 ";
    pdf.windows(needle.len())
        .enumerate()
        .filter(|(_, w)| *w == needle)
        .filter_map(|(i, _)| {
            let digits: String = pdf[i + needle.len()..]
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .map(|&b| b as char)
                .collect();
            digits.parse().ok()
        })
        .collect()
}

#[test]
fn garbage_font_file_is_a_font_error() {
    let dir = clean_dir("garbage-font");
    let path = dir.join("not-a-font.ttf");
    fs::write(&path, b"this is not a font").unwrap();
    let options = RenderOptions {
        font: FontChoice::File {
            regular: path,
            bold: None,
        },
        ..Default::default()
    };
    let err = render_blocks(&sample_blocks(), &options).unwrap_err();
    assert!(matches!(err, Error::Font(_)), "{err}");
}

#[test]
fn system_truetype_font_is_embedded_and_subset() {
    let Some((regular, bold)) = common::system_font() else {
        panic!(
            "no TrueType font found; install one (e.g. fonts-dejavu-core) or set {}",
            pageflow_pdf::options::FONT_ENV_VAR
        );
    };
    eprintln!("embedding {} (bold: {:?})", regular.display(), bold);

    let metrics = FontMetrics::load(&regular, &HashSet::from(['A', 'Ω'])).unwrap();
    assert!(metrics.word_width("A", 10.0) > 0.0);

    let mut blocks = sample_blocks();
    blocks.push(Block::paragraph("Ωmega café, naïve"));
    let options = RenderOptions {
        font: FontChoice::File {
            regular: regular.clone(),
            bold,
        },
        ..Default::default()
    };
    let bytes = render_blocks(&blocks, &options).unwrap();
    for needle in ["/FontFile2", "/ToUnicode", "/Type0", "/CIDFontType2"] {
        assert!(common::contains(&bytes, needle), "missing {needle}");
    }
    assert!(!common::contains(&bytes, "/BaseFont /Helvetica"));

    // Only the used glyphs are embedded.
    let font_size = fs::metadata(&regular).unwrap().len() as usize;
    let embedded = embedded_font_lengths(&bytes);
    assert!(!embedded.is_empty());
    assert!(embedded.iter().all(|&len| len < font_size), "{embedded:?} vs font {font_size}");
    let path = common::output_dir("export").unwrap().join("system_font.pdf");
    fs::write(path, &bytes).unwrap();
}

#[test]
fn filename_sanitizing() {
    assert_eq!(sanitize_filename("report"), "report.pdf");
    assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
    assert_eq!(sanitize_filename("  a<b>c|d  "), "a_b_c_d.pdf");
    assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd.pdf");
    assert_eq!(sanitize_filename("???"), "document.pdf");
    assert_eq!(
        document_filename(&["consent", " Jane Doe ", "", "2024-05-01"]),
        "consent_Jane_Doe_2024-05-01.pdf"
    );
}

#[test]
fn landscape_swaps_page_sides() {
    let portrait = PageGeometry::from_format(PageFormat::Letter, Orientation::Portrait, 10.0, 2.0).unwrap();
    let landscape = PageGeometry::from_format(PageFormat::Letter, Orientation::Landscape, 10.0, 2.0).unwrap();
    assert_eq!(portrait.page_width, landscape.page_height);
    assert_eq!(portrait.page_height, landscape.page_width);
    assert!((portrait.margin - mm_to_pt(10.0)).abs() < 1e-4);
}

#[test]
fn margins_must_leave_printable_area() {
    let err = PageGeometry::from_format(PageFormat::A4, Orientation::Portrait, 120.0, 2.0).unwrap_err();
    assert!(matches!(err, Error::InvalidGeometry(_)));
    assert!(PageGeometry::new(595.0, 842.0, -1.0, 2.0).is_err());
    assert!(PageGeometry::new(595.0, 842.0, 20.0, 0.0).is_err());
}

#[test]
fn millimetre_conversion() {
    assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-4);
    assert!((pt_to_mm(mm_to_pt(12.0)) - 12.0).abs() < 1e-4);
}

#[cfg(feature = "serde")]
#[test]
fn json_inputs_deserialize() {
    use pageflow_pdf::{ContentElement, NodeKind};

    let blocks: Vec<Block> = serde_json::from_str(
        r#"[
            {"type": "heading", "level": 1, "text": "Intake"},
            {"type": "key_value", "key": "Name", "value": "Jane Doe"},
            {"type": "spacer", "height": 8},
            {"type": "paragraph", "text": "Notes"}
        ]"#,
    )
    .unwrap();
    assert_eq!(blocks[1], Block::key_value("Name", "Jane Doe"));
    assert_eq!(blocks[2], Block::spacer(8.0));

    let tree: ContentElement = serde_json::from_str(
        r#"{
            "bounds": {"x": 0, "y": 0, "width": 300, "height": 900},
            "children": [
                {"kind": {"heading": 2}, "text": "Vitals",
                 "bounds": {"x": 0, "y": 0, "width": 300, "height": 20}},
                {"text": "120/80", "markers": {"keep_together": true},
                 "bounds": {"x": 0, "y": 20, "width": 300, "height": 40}}
            ]
        }"#,
    )
    .unwrap();
    assert_eq!(tree.kind, NodeKind::Block);
    assert_eq!(tree.children[0].kind, NodeKind::Heading(2));
    assert!(tree.children[1].markers.keep_together);
}

#[cfg(feature = "serde")]
#[test]
fn malformed_json_is_invalid_input() {
    use pageflow_pdf::input::{parse_blocks, read_layout};

    let err = parse_blocks(r#"[{"type": "heading", "level": 1"#).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "{err}");
    let err = parse_blocks(r#"[{"type": "table"}]"#).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "{err}");

    let dir = clean_dir("malformed");
    let path = dir.join("layout.json");
    fs::write(&path, "{ not json").unwrap();
    let err = read_layout(&path).unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "{err}");
    assert!(err.to_string().contains("layout.json"));

    let err = read_layout(&dir.join("absent.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "{err}");
}
