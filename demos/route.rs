//! Route across a generated map, print it, then edit the terrain and show
//! which cached routes are dropped.
//!
//! Usage: `route [seed]`

use std::error::Error;
use std::time::Duration;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use waymark_core::{Area, MapError, Point, Terrain, TileMap};
use waymark_paths::{
    BootsType, CacheConfig, CostConfig, Heuristic, MoveState, Mover, NavSession, Path,
    PathfinderConfig, StatusEffect,
};

const WIDTH: i32 = 48;
const HEIGHT: i32 = 16;

fn random_map(rng: &mut StdRng) -> Result<TileMap, MapError> {
    let mut map = TileMap::new(WIDTH, HEIGHT, Terrain::Ground)?;
    for p in map.bounds() {
        let terrain = match rng.random_range(0..100) {
            0..55 => Terrain::Ground,
            55..65 => Terrain::Grass,
            65..72 => Terrain::Forest,
            72..78 => Terrain::Sand,
            78..83 => Terrain::Swamp,
            83..87 => Terrain::Water,
            87..90 => Terrain::Mountain,
            _ => Terrain::Wall,
        };
        map.set(p, terrain);
    }
    // A road down the middle and clear corners.
    let mid = WIDTH / 2;
    for y in 0..HEIGHT {
        map.set(Point::new(mid, y), Terrain::Road);
    }
    map.set(Point::new(0, 0), Terrain::Ground);
    map.set(Point::new(WIDTH - 1, HEIGHT - 1), Terrain::Ground);
    Ok(map)
}

fn render(map: &TileMap, path: Option<&Path>) -> String {
    let mut rows: Vec<Vec<char>> = map.to_ascii().lines().map(|l| l.chars().collect()).collect();
    if let Some(path) = path {
        for p in path {
            if let Some(c) = rows
                .get_mut(p.y as usize)
                .and_then(|row| row.get_mut(p.x as usize))
            {
                *c = 'o';
            }
        }
    }
    rows.into_iter()
        .map(|row| row.into_iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(7);
    let mut rng = StdRng::seed_from_u64(seed);
    let mut map = random_map(&mut rng)?;

    let mut nav = NavSession::new(
        PathfinderConfig::default().with_heuristic(Heuristic::Euclidean),
        CacheConfig::default().with_max_age(Duration::from_secs(60)),
        CostConfig::default(),
    );

    let (start, goal) = (Point::new(0, 0), Point::new(WIDTH - 1, HEIGHT - 1));
    info!("seed {seed}: routing {start} -> {goal}");

    let Some(path) = nav.route(start, goal, &map)? else {
        warn!("no route on this map, try another seed");
        println!("{}", render(&map, None));
        return Ok(());
    };
    println!("{}\n", render(&map, Some(&path)));
    info!("route has {} steps", path.steps());

    let walker = Mover::new()
        .with_status(StatusEffect::Wet)
        .with_boots(BootsType::Waders);
    let state = MoveState::new(&map, &walker);
    let cost = nav.route_cost(&path, Some(&state))?;
    info!("cost for a wet walker in waders: {cost:.2}");

    // The way back comes from the cache.
    if let Some(back) = nav.route(goal, start, &map)? {
        info!("return route from cache: {} steps", back.steps());
    }
    let stats = nav.cache().get_stats();
    info!(
        "cache: {} hits, {} misses, {} stored, hit rate {:.0}%",
        stats.hits,
        stats.misses,
        stats.size,
        stats.hit_rate * 100.0
    );

    // Wall off the middle of the route.
    let mid = path[path.len() / 2];
    let flood = Area::circle(mid.x, mid.y, 2.0);
    for p in flood.bounds() {
        if flood.contains(p) {
            map.set(p, Terrain::Wall);
        }
    }
    map.set(start, Terrain::Ground);
    map.set(goal, Terrain::Ground);
    let dropped = nav.terrain_changed(&flood);
    info!("walled off {flood:?} around {mid}: {dropped} cached route(s) dropped");

    match nav.route(start, goal, &map)? {
        Some(detour) => {
            println!("{}\n", render(&map, Some(&detour)));
            info!("detour has {} steps", detour.steps());
        }
        None => info!("the wall cut the map in two"),
    }
    Ok(())
}
