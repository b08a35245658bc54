#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::{fs, io};

use image::{Rgba, RgbaImage};
use pageflow_pdf::{Annotations, Bounds, ContentElement, NodeKind};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Output directory: tests/output/<group>/, created on demand.
pub fn output_dir(group: &str) -> io::Result<PathBuf> {
    let dir = PathBuf::from("tests/output").join(group);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Number of page objects in a serialized PDF.
pub fn count_pages(pdf: &[u8]) -> usize {
    let needle = b"/Type /Page";
    pdf.windows(needle.len() + 1)
        .filter(|w| &w[..needle.len()] == needle && w[needle.len()] != b's')
        .count()
}

pub fn contains(pdf: &[u8], needle: &str) -> bool {
    pdf.windows(needle.len()).any(|w| w == needle.as_bytes())
}

/// Annotations built by hand, in the selector's own units.
pub fn annotations(content_end: f32, break_points: &[f32]) -> Annotations {
    Annotations {
        content_end,
        break_points: break_points.to_vec(),
        ..Default::default()
    }
}

/// Every `step` units from 0 to `end`, inclusive.
pub fn seams(end: f32, step: f32) -> Vec<f32> {
    let mut out = Vec::new();
    let mut y = 0.0;
    while y < end {
        out.push(y);
        y += step;
    }
    out.push(end);
    out
}

pub fn block(y: f32, height: f32, text: &str) -> ContentElement {
    ContentElement::new(NodeKind::Block, Bounds::new(0.0, y, 100.0, height)).with_text(text)
}

pub fn heading(y: f32, height: f32, text: &str) -> ContentElement {
    ContentElement::new(NodeKind::Heading(2), Bounds::new(0.0, y, 100.0, height)).with_text(text)
}

pub fn separator(y: f32, height: f32) -> ContentElement {
    ContentElement::new(NodeKind::Separator, Bounds::new(0.0, y, 100.0, height))
}

pub fn region(width: f32, height: f32, children: Vec<ContentElement>) -> ContentElement {
    ContentElement::new(NodeKind::Block, Bounds::new(0.0, 0.0, width, height)).with_children(children)
}

/// A surface with one horizontal band of color per 100 rows, so slices can
/// be told apart by their pixels.
pub fn banded_surface(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |_, y| {
        let band = (y / 100) as u8;
        Rgba([band.wrapping_mul(37), 80, 160, 255])
    })
}

/// Standard font directories, most specific first.
fn font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Ok(home) = std::env::var("HOME") {
        dirs.push(PathBuf::from(&home).join(".local/share/fonts"));
        dirs.push(PathBuf::from(&home).join("Library/Fonts"));
    }
    dirs.extend([
        "/usr/share/fonts".into(),
        "/usr/local/share/fonts".into(),
        "/Library/Fonts".into(),
        "/System/Library/Fonts/Supplemental".into(),
    ]);
    let windir = std::env::var("WINDIR").unwrap_or_else(|_| r"C:\Windows".into());
    dirs.push(PathBuf::from(windir).join("Fonts"));
    dirs
}

fn collect_ttf(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() && depth > 0 {
            collect_ttf(&path, depth - 1, out);
        } else if path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("ttf"))
        {
            out.push(path);
        }
    }
}

/// A TrueType regular/bold pair from $PAGEFLOW_FONT or the system font
/// directories. Known families are preferred; any .ttf is the last resort.
pub fn system_font() -> Option<(PathBuf, Option<PathBuf>)> {
    if let Some(path) = std::env::var_os(pageflow_pdf::options::FONT_ENV_VAR).map(PathBuf::from) {
        if path.is_file() {
            return Some((path, None));
        }
    }
    const PAIRS: [(&str, &str); 4] = [
        ("DejaVuSans.ttf", "DejaVuSans-Bold.ttf"),
        ("LiberationSans-Regular.ttf", "LiberationSans-Bold.ttf"),
        ("arial.ttf", "arialbd.ttf"),
        ("Arial.ttf", "Arial Bold.ttf"),
    ];
    let mut found = Vec::new();
    for dir in font_directories() {
        collect_ttf(&dir, 4, &mut found);
    }
    let named = |name: &str| found.iter().find(|p| p.file_name().is_some_and(|n| n == name)).cloned();
    for (regular, bold) in PAIRS {
        if let Some(regular) = named(regular) {
            return Some((regular, named(bold)));
        }
    }
    found.sort();
    found.into_iter().next().map(|p| (p, None))
}
