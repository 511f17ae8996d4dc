use std::path::Path;

use anyhow::Context;
use image::GrayImage;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    grid::{Cell, GridMap, MapTrait, Point},
    Error,
};

/// How pixels of a maze image are turned into grid cells
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    /// Pixels brighter than this count as bright
    pub threshold: u8,
    /// Dark pixels are free and bright pixels are walls, for mazes drawn as light walls on
    /// a dark background. Turn off for dark walls on a light background.
    pub invert: bool,
    /// Edge length in pixels of one grid cell
    pub cell_size: usize,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            threshold: 127,
            invert: true,
            cell_size: 1,
        }
    }
}

pub fn load_grayscale(path: impl AsRef<Path>) -> Result<GrayImage, anyhow::Error> {
    let path = path.as_ref();
    let img = image::open(path)
        .with_context(|| format!("failed to load image {}", path.display()))?
        .to_luma8();
    debug!("loaded {} ({}x{})", path.display(), img.width(), img.height());

    Ok(img)
}

/// One cell per pixel: free when brighter than `threshold`, or when not brighter if `invert` is set
pub fn binarize(img: &GrayImage, threshold: u8, invert: bool) -> GridMap {
    let rows = img.height() as usize;
    let columns = img.width() as usize;

    let mut map = GridMap::new(rows, columns, Cell::Blocked);

    for (col, row, pixel) in img.enumerate_pixels() {
        let bright = pixel.0[0] > threshold;
        if bright != invert {
            map.set(
                Point {
                    row: row as usize,
                    col: col as usize,
                },
                Cell::Free,
            );
        }
    }

    map
}

/// Merge `cell_size` x `cell_size` blocks into single cells. A block is free
/// only if all of its cells are free; incomplete blocks at the right and
/// bottom edges are dropped.
pub fn downsample(map: &GridMap, cell_size: usize) -> Result<GridMap, Error> {
    if cell_size == 0 {
        return Err(Error::InvalidCellSize);
    }
    if cell_size == 1 {
        return Ok(map.clone());
    }

    let rows = map.rows() / cell_size;
    let columns = map.columns() / cell_size;
    let mut result = GridMap::new(rows, columns, Cell::Free);

    for row in 0..rows {
        for col in 0..columns {
            let all_free = (0..cell_size).all(|r| {
                (0..cell_size).all(|c| {
                    map.is_free(Point {
                        row: row * cell_size + r,
                        col: col * cell_size + c,
                    })
                })
            });
            if !all_free {
                result.set(Point { row, col }, Cell::Blocked);
            }
        }
    }

    Ok(result)
}

/// Turn a grayscale maze image into the grid the searches run on
pub fn parse_img(img: &GrayImage, settings: &ImageSettings) -> Result<GridMap, Error> {
    let map = binarize(img, settings.threshold, settings.invert);
    let map = downsample(&map, settings.cell_size)?;
    debug!(
        "parsed image into a {}x{} grid with {} free cells",
        map.rows(),
        map.columns(),
        map.free_count()
    );

    Ok(map)
}
