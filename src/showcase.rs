//! Contact sheet of captured screenshots
//!
//! Lays every captured sequence out in a grid, in enumeration order, with
//! the sequence printed under each thumbnail when a font is available.

use std::path::{Path, PathBuf};

use ab_glyph::{FontVec, PxScale};
use image::{Rgba, RgbaImage, imageops};
use imageproc::drawing::draw_text_mut;
use rayon::prelude::*;
use tracing::{info, warn};

use crate::command::output_path;
use crate::config::BatchConfig;
use crate::error::{Error, Result};

const BACKGROUND: Rgba<u8> = Rgba([30, 30, 35, 255]);
const GRID_LINE: Rgba<u8> = Rgba([50, 50, 55, 255]);
const TEXT_COLOR: Rgba<u8> = Rgba([220, 220, 220, 255]);

/// Thumbnails decoded per parallel round; bounds memory on large batches
const LOAD_CHUNK: usize = 64;

/// Grid layout parameters
#[derive(Debug, Clone)]
pub struct ShowcaseLayout {
    pub cols: u32,
    /// Thumbnail size relative to the screenshot
    pub scale: f32,
    pub padding: u32,
    /// Space under each thumbnail for its label (unused without a font)
    pub label_height: u32,
}

impl Default for ShowcaseLayout {
    fn default() -> Self {
        Self {
            cols: 8,
            scale: 0.1,
            padding: 12,
            label_height: 28,
        }
    }
}

/// One screenshot to place
#[derive(Debug, Clone, PartialEq)]
pub struct ShowcaseEntry {
    pub label: String,
    pub path: PathBuf,
}

/// Screenshots for every configured sequence that has one, in enumeration order
pub fn collect_entries(config: &BatchConfig) -> Vec<ShowcaseEntry> {
    config
        .sequences()
        .filter_map(|sequence| {
            let path = output_path(&config.destination, &sequence, &config.capture.extension);
            path.is_file().then(|| ShowcaseEntry {
                label: sequence.to_string(),
                path,
            })
        })
        .collect()
}

/// Load a TrueType/OpenType font for labels
pub fn load_font(path: &Path) -> Result<FontVec> {
    let data = std::fs::read(path).map_err(|source| Error::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    FontVec::try_from_vec(data).map_err(|e| Error::ParseFile {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Assemble the grid. Returns `None` when there is nothing readable to place.
pub fn build_showcase(
    entries: &[ShowcaseEntry],
    layout: &ShowcaseLayout,
    font: Option<&FontVec>,
) -> Result<Option<RgbaImage>> {
    if layout.cols == 0 {
        return Err(Error::Config("showcase needs at least one column".to_string()));
    }

    // Cell size comes from the first screenshot whose header reads
    let Some((orig_width, orig_height)) = entries
        .iter()
        .find_map(|e| image::image_dimensions(&e.path).ok())
    else {
        return Ok(None);
    };

    let thumb_width = ((orig_width as f32 * layout.scale) as u32).max(1);
    let thumb_height = ((orig_height as f32 * layout.scale) as u32).max(1);
    let label_height = if font.is_some() { layout.label_height } else { 0 };

    let count = entries.len() as u32;
    let cols = layout.cols.min(count);
    let rows = count.div_ceil(cols);

    let cell_width = thumb_width + layout.padding * 2;
    let cell_height = thumb_height + label_height + layout.padding * 2;
    let output_width = cell_width * cols;
    let output_height = cell_height * rows;

    info!(
        "Showcase: {} screenshots, {}x{} thumbnails, {}x{} output ({} cols x {} rows)",
        count, thumb_width, thumb_height, output_width, output_height, cols, rows
    );

    let mut sheet = RgbaImage::from_pixel(output_width, output_height, BACKGROUND);
    let text_scale = PxScale::from(label_height as f32 * 0.75);

    for (chunk_idx, chunk) in entries.chunks(LOAD_CHUNK).enumerate() {
        let thumbs: Vec<_> = chunk
            .par_iter()
            .map(|entry| {
                image::open(&entry.path).map(|img| {
                    imageops::resize(
                        &img.to_rgba8(),
                        thumb_width,
                        thumb_height,
                        imageops::FilterType::Lanczos3,
                    )
                })
            })
            .collect();

        for (offset, (entry, thumb)) in chunk.iter().zip(thumbs).enumerate() {
            let idx = (chunk_idx * LOAD_CHUNK + offset) as u32;
            let cell_x = (idx % cols) * cell_width;
            let cell_y = (idx / cols) * cell_height;

            match thumb {
                Ok(thumb) => {
                    imageops::overlay(
                        &mut sheet,
                        &thumb,
                        (cell_x + layout.padding) as i64,
                        (cell_y + layout.padding) as i64,
                    );
                }
                Err(e) => {
                    warn!("Failed to load {}: {}", entry.path.display(), e);
                    continue;
                }
            }

            if let Some(font) = font {
                let text_x = cell_x + layout.padding;
                let text_y = cell_y + layout.padding + thumb_height + label_height / 8;
                draw_text_mut(
                    &mut sheet,
                    TEXT_COLOR,
                    text_x as i32,
                    text_y as i32,
                    text_scale,
                    font,
                    &entry.label,
                );
            }
        }
    }

    draw_grid(&mut sheet, cols, rows, cell_width, cell_height);
    Ok(Some(sheet))
}

fn draw_grid(sheet: &mut RgbaImage, cols: u32, rows: u32, cell_width: u32, cell_height: u32) {
    let (width, height) = sheet.dimensions();

    for col in 1..cols {
        let x = col * cell_width;
        for y in 0..height {
            sheet.put_pixel(x, y, GRID_LINE);
        }
    }

    for row in 1..rows {
        let y = row * cell_height;
        for x in 0..width {
            sheet.put_pixel(x, y, GRID_LINE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_png(path: &Path, color: [u8; 4]) {
        RgbaImage::from_pixel(40, 20, Rgba(color)).save(path).unwrap();
    }

    fn layout() -> ShowcaseLayout {
        ShowcaseLayout {
            cols: 2,
            scale: 0.5,
            padding: 4,
            label_height: 10,
        }
    }

    fn close(a: &Rgba<u8>, b: [u8; 4]) -> bool {
        a.0.iter().zip(b).all(|(x, y)| (*x as i32 - y as i32).abs() <= 2)
    }

    #[test]
    fn test_collect_entries_in_enumeration_order() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["NN.png", "LL.png", "RL.png", "notes.png", "LR.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let config = BatchConfig {
            min_length: 2,
            max_length: 2,
            destination: dir.path().to_path_buf(),
            ..BatchConfig::default()
        };

        let labels: Vec<String> = collect_entries(&config).into_iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["LL", "RL", "NN"]);
    }

    #[test]
    fn test_grid_dimensions_and_placement() {
        let dir = tempfile::tempdir().unwrap();
        let colors = [[255, 0, 0, 255], [0, 255, 0, 255], [0, 0, 255, 255]];
        let entries: Vec<ShowcaseEntry> = ["LL", "LR", "LU"]
            .iter()
            .zip(colors)
            .map(|(label, color)| {
                let path = dir.path().join(format!("{}.png", label));
                write_png(&path, color);
                ShowcaseEntry {
                    label: label.to_string(),
                    path,
                }
            })
            .collect();

        let sheet = build_showcase(&entries, &layout(), None).unwrap().unwrap();
        // 20x10 thumbs, 28x18 cells, no label row without a font
        assert_eq!(sheet.dimensions(), (56, 36));

        assert!(close(sheet.get_pixel(4 + 10, 4 + 5), colors[0]));
        assert!(close(sheet.get_pixel(28 + 4 + 10, 4 + 5), colors[1]));
        assert!(close(sheet.get_pixel(4 + 10, 18 + 4 + 5), colors[2]));
        // Empty fourth cell keeps the background
        assert_eq!(*sheet.get_pixel(28 + 14, 18 + 9), BACKGROUND);
        assert_eq!(*sheet.get_pixel(28, 0), GRID_LINE);
    }

    #[test]
    fn test_unreadable_screenshot_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("LL.png");
        let bad = dir.path().join("LR.png");
        write_png(&good, [255, 255, 255, 255]);
        fs::write(&bad, b"not a png").unwrap();

        let entries = vec![
            ShowcaseEntry {
                label: "LL".to_string(),
                path: good,
            },
            ShowcaseEntry {
                label: "LR".to_string(),
                path: bad,
            },
        ];
        let sheet = build_showcase(&entries, &layout(), None).unwrap().unwrap();
        assert_eq!(sheet.dimensions(), (56, 18));
        assert_eq!(*sheet.get_pixel(28 + 14, 9), BACKGROUND);
    }

    #[test]
    fn test_nothing_to_show() {
        assert!(build_showcase(&[], &layout(), None).unwrap().is_none());

        let mut bad = layout();
        bad.cols = 0;
        assert!(build_showcase(&[], &bad, None).is_err());
    }

    #[test]
    fn test_load_font_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("font.ttf");
        assert!(matches!(load_font(&path), Err(Error::ReadFile { .. })));
        fs::write(&path, b"garbage").unwrap();
        assert!(matches!(load_font(&path), Err(Error::ParseFile { .. })));
    }
}
