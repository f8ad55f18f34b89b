//! Terminal rendering of Pokémon artwork
//!
//! Decodes sprite bytes and converts them to colored ASCII art: the image
//! is downsampled into character cells, each cell's average luminance picks
//! a glyph from a density ramp, and the glyph is colored with the cell's
//! origin pixel via truecolor escape sequences.

use crossterm::style::{Color, Stylize};
use image::{GenericImageView, Rgba};
use thiserror::Error;

/// Glyphs ordered by increasing visual density
const RAMP: &[u8] = b" .=+#@";

/// Pixel block mapped to one character cell; terminal cells are roughly
/// twice as tall as they are wide.
const CELL_WIDTH: u32 = 8;
const CELL_HEIGHT: u32 = 16;

/// Errors that can occur while rendering a sprite
#[derive(Debug, Error)]
pub enum DrawError {
    /// The sprite bytes did not decode as an image
    #[error("failed to decode sprite: {0}")]
    Decode(#[from] image::ImageError),
}

/// One character cell of the rendered image
#[derive(Debug, Clone, Copy)]
struct Cell {
    glyph: char,
    color: (u8, u8, u8),
}

impl Cell {
    fn is_blank(&self) -> bool {
        self.glyph == ' '
    }
}

/// Renders sprite bytes into printable lines of colored ASCII art.
///
/// Blank border rows and columns are trimmed, so a fully transparent image
/// renders as no lines at all.
pub fn render_sprite(data: &[u8]) -> Result<Vec<String>, DrawError> {
    let img = image::load_from_memory(data)?;
    let grid = rasterize(&img);
    Ok(colorize(trim(grid)))
}

/// Downsamples the image into a grid of glyph cells
fn rasterize(img: &image::DynamicImage) -> Vec<Vec<Cell>> {
    let (width, height) = img.dimensions();
    let mut grid = Vec::new();

    let mut y = 0;
    while y < height {
        let mut row = Vec::new();
        let mut x = 0;
        while x < width {
            let luminance = block_luminance(img, x, y);
            let Rgba([r, g, b, _]) = img.get_pixel(x, y);
            row.push(Cell {
                glyph: luminance_glyph(luminance),
                color: (r, g, b),
            });
            x += CELL_WIDTH;
        }
        grid.push(row);
        y += CELL_HEIGHT;
    }

    grid
}

/// Average luminance (0-255) of the pixel block at the given origin
fn block_luminance(img: &image::DynamicImage, x: u32, y: u32) -> u32 {
    let (width, height) = img.dimensions();
    let mut sum = 0u32;
    let mut count = 0u32;

    for i in x..(x + CELL_WIDTH).min(width) {
        for j in y..(y + CELL_HEIGHT).min(height) {
            let Rgba([r, g, b, alpha]) = img.get_pixel(i, j);
            // Transparent pixels count as black so the background stays
            // blank.
            if alpha > 0 {
                sum += (u32::from(r) + u32::from(g) + u32::from(b)) / 3;
            }
            count += 1;
        }
    }

    if count == 0 {
        0
    } else {
        sum / count
    }
}

/// Maps a 0-255 luminance onto the density ramp
fn luminance_glyph(luminance: u32) -> char {
    let index = (RAMP.len() as u32 * luminance / 256) as usize;
    RAMP[index.min(RAMP.len() - 1)] as char
}

/// Drops blank border rows and columns
fn trim(grid: Vec<Vec<Cell>>) -> Vec<Vec<Cell>> {
    let blank_row = |row: &Vec<Cell>| row.iter().all(Cell::is_blank);

    let top = match grid.iter().position(|row| !blank_row(row)) {
        Some(top) => top,
        None => return Vec::new(),
    };
    let bottom = grid
        .iter()
        .rposition(|row| !blank_row(row))
        .unwrap_or(top);
    let rows = &grid[top..=bottom];

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let column_blank =
        |col: usize| rows.iter().all(|row| row.get(col).map_or(true, Cell::is_blank));

    let left = (0..width).position(|col| !column_blank(col)).unwrap_or(0);
    let right = (0..width).rposition(|col| !column_blank(col)).unwrap_or(0);

    rows.iter()
        .map(|row| {
            row.iter()
                .skip(left)
                .take(right + 1 - left)
                .copied()
                .collect()
        })
        .collect()
}

/// Turns the trimmed grid into printable strings with color escapes
fn colorize(grid: Vec<Vec<Cell>>) -> Vec<String> {
    grid.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| {
                    if cell.is_blank() {
                        ' '.to_string()
                    } else {
                        let (r, g, b) = cell.color;
                        cell.glyph
                            .to_string()
                            .with(Color::Rgb { r, g, b })
                            .to_string()
                    }
                })
                .collect()
        })
        .collect()
}
