use std::path::Path;

use anyhow::{anyhow, Context};
use log::info;
use mazepath::{
    select_goal, select_start,
    util::{load_grayscale, parse_img},
    Config, MapTrait, Overlay,
};

fn solve(config: &Config) -> Result<(), anyhow::Error> {
    let img = load_grayscale(&config.image)?;
    let map = parse_img(&img, &config.image_settings)?;
    info!(
        "grid is {}x{} with {} free cells",
        map.rows(),
        map.columns(),
        map.free_count()
    );

    let start = match config.start {
        Some(start) => start,
        None => select_start(&map)?,
    };
    let goal = match config.goal {
        Some(goal) => goal,
        None => select_goal(&map)?,
    };
    info!("searching from {} to {}", start, goal);

    for algorithm in &config.algorithms {
        let outcome = algorithm
            .run(&map, start, goal)
            .with_context(|| format!("{} search failed", algorithm))?;

        match outcome.path_len() {
            Some(len) => println!(
                "{}: expanded {} cells, path of {} steps",
                algorithm,
                outcome.order.len(),
                len
            ),
            None => println!(
                "{}: expanded {} cells, no path",
                algorithm,
                outcome.order.len()
            ),
        }

        if config.print_overlay {
            println!(
                "{}",
                Overlay {
                    grid: &map,
                    outcome: &outcome,
                    start,
                    goal,
                }
            );
        }
    }

    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::init();

    let arg = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: mazepath <image | config.json>"))?;

    let config = if Path::new(&arg).extension().is_some_and(|ext| ext == "json") {
        Config::from_json_file(&arg)?
    } else {
        Config::for_image(arg)
    };

    solve(&config)
}
