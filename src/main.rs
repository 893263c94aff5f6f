use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use zerofish::{Config, Zerofish};

const STARTPOS: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Parser, Debug)]
#[command(author, version, about = "Analyse a position with the zero/fish engine pair", long_about = None)]
struct Args {
    /// TOML config with engine paths and defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Zero (neural) engine binary; overrides the config
    #[arg(long)]
    zero: Option<PathBuf>,

    /// Fish (classical) engine binary; overrides the config
    #[arg(long)]
    fish: Option<PathBuf>,

    /// Network name recorded for the zero engine
    #[arg(long)]
    net_name: Option<String>,

    /// Weights file handed to the zero engine at startup
    #[arg(long)]
    net_file: Option<PathBuf>,

    /// Position to analyse
    #[arg(long, default_value = STARTPOS)]
    fen: String,

    /// Which engine answers: 'fish' or 'zero'
    #[arg(long, default_value = "fish")]
    engine: String,

    /// Search depth for fish
    #[arg(long)]
    depth: Option<u32>,

    /// Number of ranked variations to report
    #[arg(long)]
    pvs: Option<u32>,

    /// Time budget in milliseconds (overrides depth)
    #[arg(long)]
    movetime: Option<u64>,

    /// Optional: write the ranked variations as JSON to this path
    #[arg(long)]
    json_out: Option<PathBuf>,
}

fn build_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => {
            let (Some(zero), Some(fish)) = (&args.zero, &args.fish) else {
                anyhow::bail!("either --config or both --zero and --fish are required");
            };
            Config::with_engines(zero.clone(), fish.clone())
        }
    };
    if let Some(zero) = &args.zero {
        config.engines.zero = zero.clone();
    }
    if let Some(fish) = &args.fish {
        config.engines.fish = fish.clone();
    }
    if let (Some(name), Some(path)) = (&args.net_name, &args.net_file) {
        config.net = Some(zerofish::config::NetConfig {
            name: name.clone(),
            path: path.clone(),
        });
    }
    if let Some(depth) = args.depth {
        config.search.depth = depth;
    }
    if let Some(pvs) = args.pvs {
        config.search.pvs = pvs;
    }
    if let Some(ms) = args.movetime {
        config.search.movetime_ms = Some(ms);
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = build_config(&args)?;

    let zf = Zerofish::launch(&config)?;

    match args.engine.as_str() {
        "zero" => {
            let mv = zf.go_zero(&args.fen)?.wait()?;
            println!("bestmove {mv}");
        }
        "fish" => {
            let ranks = zf.go_fish(&args.fen, None)?.wait()?;
            for (rank, lines) in ranks.iter().enumerate() {
                match lines.last() {
                    Some(v) => println!(
                        "multipv {} depth {} cp {} pv {}",
                        rank + 1,
                        v.depth,
                        v.score_cp,
                        v.moves.join(" ")
                    ),
                    None => println!("multipv {} (no line)", rank + 1),
                }
            }
            if let Some(path) = &args.json_out {
                std::fs::write(path, serde_json::to_string_pretty(&ranks)?)?;
            }
        }
        other => anyhow::bail!("unknown engine '{other}': use 'fish' or 'zero'"),
    }

    zf.quit()?;
    Ok(())
}
