//! Benchmark driver for the convex grid-map hierarchy.
//!
//! Runs scenario queries with and without preprocessing, and sweeps map
//! directories into CSV reports on build times, query times, and the
//! behavior of the individual separator heuristics.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use convex_map::{
    bfs_distance, build_hierarchy, count_leaves, find_smallest_containing, imbalance_ratio,
    load_map, load_scenarios, run_heuristic, separator_size, Config, GridGraph, Heuristic,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "convex_map")]
#[command(about = "Convex grid-map hierarchies for fast BFS queries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    tuning: Tuning,
}

#[derive(Args)]
struct Tuning {
    /// Balance ratio alpha in (0, 1].
    #[arg(long, default_value_t = 1.0)]
    alpha: f64,

    /// Per-heuristic deadline in seconds.
    #[arg(long, default_value_t = 30.0)]
    deadline: f64,

    /// Seed for the shortest-path heuristic's shuffle.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Path to an external balanced-partitioner binary (kaffpa).
    #[arg(long)]
    partitioner: Option<PathBuf>,
}

impl Tuning {
    fn config(&self) -> Config {
        Config {
            alpha: self.alpha,
            deadline: Duration::from_secs_f64(self.deadline),
            seed: self.seed,
            partitioner: self.partitioner.clone(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file against one map and print per-query results.
    Query {
        map: PathBuf,
        scen: PathBuf,

        /// Preprocess the map and query the smallest enclosing subgraph.
        #[arg(long)]
        hierarchy: bool,
    },

    /// Compare plain loading against hierarchy building for every map in a
    /// directory.
    BuildStats {
        maps: PathBuf,

        /// Output CSV file.
        #[arg(long, default_value = "build-stats.csv")]
        out: PathBuf,
    },

    /// Compare plain and hierarchy-assisted queries for every map in a
    /// directory, one CSV per map.
    QueryStats {
        maps: PathBuf,
        scens: PathBuf,

        /// Output directory for the per-map CSV files.
        #[arg(long, default_value = "query-stats")]
        out: PathBuf,
    },

    /// Run every separator heuristic once per map and record separator
    /// sizes and imbalance ratios.
    HeuristicStats {
        maps: PathBuf,

        /// Output CSV file.
        #[arg(long, default_value = "heuristic-stats.csv")]
        out: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.tuning.config();
    match cli.command {
        Commands::Query {
            map,
            scen,
            hierarchy,
        } => query(&map, &scen, hierarchy, &config),
        Commands::BuildStats { maps, out } => build_stats(&maps, &out, &config),
        Commands::QueryStats { maps, scens, out } => query_stats(&maps, &scens, &out, &config),
        Commands::HeuristicStats { maps, out } => heuristic_stats(&maps, &out, &config),
    }
}

fn query(map: &Path, scen: &Path, hierarchy: bool, config: &Config) -> Result<()> {
    let mut graph =
        load_map(map).with_context(|| format!("loading map {}", map.display()))?;
    if hierarchy {
        let start = Instant::now();
        build_hierarchy(&mut graph, config);
        info!(elapsed_ms = start.elapsed().as_millis() as u64, "preprocessing done");
    }

    let scenarios =
        load_scenarios(scen).with_context(|| format!("loading scenarios {}", scen.display()))?;
    for scenario in scenarios {
        let (start_id, goal_id) = (scenario.start_id(), scenario.goal_id());
        let timer = Instant::now();
        let distance = if hierarchy {
            match find_smallest_containing(&graph, start_id, goal_id) {
                Some(node) => bfs_distance(node.adjacency(), start_id, goal_id),
                None => -1,
            }
        } else {
            bfs_distance(graph.adjacency(), start_id, goal_id)
        };
        println!(
            "{} {} {} {}",
            start_id,
            goal_id,
            distance,
            timer.elapsed().as_micros()
        );
    }
    Ok(())
}

fn build_stats(maps: &Path, out: &Path, config: &Config) -> Result<()> {
    let mut writer = csv::Writer::from_path(out)
        .with_context(|| format!("creating {}", out.display()))?;
    writer.write_record(["map", "load_ms", "build_ms", "leaves"])?;

    for map_path in map_files(maps)? {
        let name = map_name(&map_path);
        info!(map = %name, "processing");

        let timer = Instant::now();
        let _ = load_map(&map_path);
        let load_ms = timer.elapsed().as_millis();

        let timer = Instant::now();
        let Ok(mut graph) = load_map(&map_path) else {
            warn!(map = %name, "failed to load, skipping");
            continue;
        };
        build_hierarchy(&mut graph, config);
        let build_ms = timer.elapsed().as_millis();

        writer.write_record([
            name.clone(),
            load_ms.to_string(),
            build_ms.to_string(),
            count_leaves(&graph).to_string(),
        ])?;
        writer.flush()?;
    }
    Ok(())
}

fn query_stats(maps: &Path, scens: &Path, out: &Path, config: &Config) -> Result<()> {
    fs::create_dir_all(out)?;

    for map_path in map_files(maps)? {
        let name = map_name(&map_path);
        let scen_path = scens.join(format!("{name}.map.scen"));
        if !scen_path.exists() {
            warn!(map = %name, "scenario file missing, skipping");
            continue;
        }
        let scenarios = load_scenarios(&scen_path)?;
        if scenarios.is_empty() {
            warn!(map = %name, "no valid scenarios, skipping");
            continue;
        }
        let Ok(mut graph) = load_map(&map_path) else {
            warn!(map = %name, "failed to load, skipping");
            continue;
        };
        build_hierarchy(&mut graph, config);
        let leaves = count_leaves(&graph);

        let mut writer = csv::Writer::from_path(out.join(format!("{name}.csv")))?;
        writer.write_record([
            "instance",
            "bucket",
            "plain_us",
            "hierarchy_us",
            "plain_distance",
            "hierarchy_distance",
            "plain_search_size",
            "hierarchy_search_size",
            "descend_us",
            "subgraph_bfs_us",
            "leaves",
        ])?;

        for (index, scenario) in scenarios.iter().enumerate() {
            let (start_id, goal_id) = (scenario.start_id(), scenario.goal_id());

            let timer = Instant::now();
            let plain_distance = bfs_distance(graph.adjacency(), start_id, goal_id);
            let plain_us = timer.elapsed().as_micros();

            let timer = Instant::now();
            let node = find_smallest_containing(&graph, start_id, goal_id);
            let hierarchy_distance = match node {
                Some(node) => bfs_distance(node.adjacency(), start_id, goal_id),
                None => -1,
            };
            let hierarchy_us = timer.elapsed().as_micros();

            let timer = Instant::now();
            let node = find_smallest_containing(&graph, start_id, goal_id);
            let descend_us = timer.elapsed().as_micros();

            let search_size = node.map_or(0, GridGraph::node_count);
            let timer = Instant::now();
            if let Some(node) = node {
                bfs_distance(node.adjacency(), start_id, goal_id);
            }
            let subgraph_bfs_us = timer.elapsed().as_micros();

            writer.write_record([
                format!("instance-{}", index + 1),
                scenario.bucket.to_string(),
                plain_us.to_string(),
                hierarchy_us.to_string(),
                plain_distance.to_string(),
                hierarchy_distance.to_string(),
                graph.node_count().to_string(),
                search_size.to_string(),
                descend_us.to_string(),
                subgraph_bfs_us.to_string(),
                leaves.to_string(),
            ])?;
        }
        writer.flush()?;
    }
    Ok(())
}

fn heuristic_stats(maps: &Path, out: &Path, config: &Config) -> Result<()> {
    let mut writer = csv::Writer::from_path(out)?;
    let mut header = vec!["instance".to_string(), "map".to_string()];
    for heuristic in Heuristic::all() {
        header.push(format!("{}_separator", heuristic.name()));
    }
    for heuristic in Heuristic::all() {
        header.push(format!("{}_imbalance", heuristic.name()));
    }
    writer.write_record(&header)?;

    for (index, map_path) in map_files(maps)?.iter().enumerate() {
        let name = map_name(map_path);
        info!(map = %name, "processing");

        let mut separator_sizes = Vec::new();
        let mut imbalances = Vec::new();
        for heuristic in Heuristic::all() {
            let Ok(graph) = load_map(map_path) else {
                warn!(map = %name, "failed to load, skipping");
                separator_sizes.push(-1_i64);
                imbalances.push(-1.0);
                continue;
            };
            match run_heuristic(&graph, heuristic, config) {
                Some(children) => {
                    separator_sizes.push(separator_size(&graph, &children) as i64);
                    imbalances.push(imbalance_ratio(&children));
                }
                None => {
                    separator_sizes.push(-1);
                    imbalances.push(-1.0);
                }
            }
        }

        let mut record = vec![format!("instance-{}", index + 1), name];
        record.extend(separator_sizes.iter().map(i64::to_string));
        record.extend(imbalances.iter().map(|ratio| format!("{ratio:.4}")));
        writer.write_record(&record)?;
        writer.flush()?;
    }
    Ok(())
}

fn map_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("reading map directory {}", dir.display()))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "map"))
        .collect();
    files.sort();
    Ok(files)
}

fn map_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
