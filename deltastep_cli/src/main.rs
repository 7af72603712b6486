use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};

use deltastep::{DeltaStepping, Digraph, EngineConfig, Mode};

mod input;

fn default_output_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "distances".into());
    name.push(".out");
    input.with_file_name(name)
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(1)
}

fn main() -> Result<()> {
    let matches = Command::new("deltastep")
        .about("Single-source shortest paths over weighted digraphs (delta-stepping)")
        .arg(
            Arg::new("input")
                .required(true)
                .help("Edge-list file: optional % comments, a 'rows cols nnz' header, then 'src dst weight' lines"),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .short('m')
                .default_value("parallel")
                .help("sequential | parallel | parallel-bucket-fusion | dijkstra"),
        )
        .arg(
            Arg::new("delta")
                .long("delta")
                .short('d')
                .default_value("16")
                .value_parser(clap::value_parser!(u64))
                .help("Bucket width; edges heavier than this are relaxed lazily"),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .short('t')
                .value_parser(clap::value_parser!(usize))
                .help("Worker threads for the parallel modes (default: all cores)"),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .default_value("0")
                .value_parser(clap::value_parser!(u32))
                .help("Source node id"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .help("Output file (default: <input>.out)"),
        )
        .arg(
            Arg::new("validate")
                .long("validate")
                .action(ArgAction::SetTrue)
                .help("Differentially check the result against Dijkstra"),
        )
        .get_matches();

    let input_path = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let mode: Mode = matches.get_one::<String>("mode").unwrap().parse()?;
    let delta = *matches.get_one::<u64>("delta").unwrap();
    let threads = matches
        .get_one::<usize>("threads")
        .copied()
        .unwrap_or_else(default_threads);
    let source = *matches.get_one::<u32>("source").unwrap();
    let output_path = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| default_output_path(&input_path));

    let start = Instant::now();
    let edge_list = input::read_edge_list(&input_path)
        .with_context(|| format!("reading {}", input_path.display()))?;
    let graph = Digraph::from_edges(edge_list.num_nodes, &edge_list.edges);
    println!(
        "Loaded {} nodes / {} edges in {:.2?}",
        graph.node_count(),
        graph.edge_count(),
        start.elapsed()
    );

    let mut config = EngineConfig::new(delta, threads);
    config.validate = matches.get_flag("validate");
    let mut engine = DeltaStepping::new(&graph, config)?;

    let start = Instant::now();
    engine.run(source, mode)?;
    println!(
        "{} finished in {:.2?} (delta {}, {} threads)",
        mode.as_str(),
        start.elapsed(),
        delta,
        threads
    );

    let file = File::create(&output_path)
        .with_context(|| format!("create {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    engine
        .write_distances(&mut writer)
        .context("writing distances")?;
    println!("Distances written to {}", output_path.display());

    Ok(())
}
