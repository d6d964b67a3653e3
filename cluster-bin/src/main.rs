//! A command-line front-end for the `clustergroup` crate: reads a
//! tab-delimited similarity file, runs it through a `ClusterGroup`, and
//! prints the resulting clusters.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process;
use std::str::FromStr;

use clap::Parser;
use clustergroup::{Column, ClusterGroup, ClusterReader, LinkageMethod};

/// Cluster a tab-delimited stream of pairwise similarities.
#[derive(Parser, Debug)]
#[command(name = "cluster", version, about)]
struct Args {
    /// Path to the tab-delimited similarity file.
    input: PathBuf,

    /// Linkage method to use: complete, single, or average.
    method: String,

    /// Stop merging once the best remaining similarity drops below this.
    cutoff: f64,

    /// Never merge two clusters into one larger than this many members.
    #[arg(long, default_value_t = usize::MAX)]
    max_size: usize,

    /// Treat the input as a sparse subset of all pairs: skip the dense-mode
    /// expected-vs-actual edge count check.
    #[arg(long, default_value_t = false)]
    sparse: bool,

    /// Column name or 1-based position holding the first cluster id.
    #[arg(long, default_value = "1")]
    id1_col: String,

    /// Column name or 1-based position holding the second cluster id.
    #[arg(long, default_value = "2")]
    id2_col: String,

    /// Column name or 1-based position holding the similarity score.
    #[arg(long, default_value = "3")]
    score_col: String,
}

fn column(spec: &str) -> Column {
    match spec.parse::<usize>() {
        Ok(pos) => Column::Position(pos),
        Err(_) => Column::Name(spec.to_string()),
    }
}

fn run(args: Args) -> clustergroup::Result<()> {
    let method = LinkageMethod::from_str(&args.method)?;

    let file = File::open(&args.input)?;
    let mut group = ClusterGroup::new(1024, method);
    group.set_max_size(args.max_size);

    let reader = ClusterReader::new()
        .with_columns(column(&args.id1_col), column(&args.id2_col), column(&args.score_col))
        .sparse(args.sparse);
    reader.read(BufReader::new(file), &mut group)?;

    while group.merge(args.cutoff) {}

    let stdout = io::stdout();
    let mut out = stdout.lock();
    for cluster in group.get_clusters() {
        let members: Vec<&str> = cluster.members().collect();
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            cluster.id(),
            cluster.len(),
            cluster.height(),
            cluster.score(),
            members.join(",")
        )?;
    }

    Ok(())
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    if let Err(err) = run(args) {
        eprintln!("error: {}", err);
        process::exit(1);
    }
}
