use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{find::Algorithm, grid::Point, util::ImageSettings};

/// Settings for one run of the solver, usually read from a JSON file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)] // missing fields fall back to their defaults
pub struct Config {
    /// Maze image to solve
    pub image: PathBuf,
    #[serde(flatten)]
    pub image_settings: ImageSettings,
    /// Overrides the cell picked near the border
    pub start: Option<Point>,
    /// Overrides the cell picked near the center
    pub goal: Option<Point>,
    pub algorithms: Vec<Algorithm>,
    pub print_overlay: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            image: PathBuf::from("data/maze.png"),
            image_settings: ImageSettings::default(),
            start: None,
            goal: None,
            algorithms: vec![Algorithm::Bfs, Algorithm::AStar],
            print_overlay: false,
        }
    }
}

impl Config {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;

        serde_json::from_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Settings for solving `image` with everything else left at the defaults
    pub fn for_image(image: impl Into<PathBuf>) -> Self {
        Self {
            image: image.into(),
            ..Default::default()
        }
    }
}
