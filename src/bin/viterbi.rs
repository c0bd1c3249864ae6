use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;
use std::process::ExitCode;
use viterbi_hmm::{ModelConfig, Result, Scoring, TrellisReport};

/// Decode the most likely hidden-state path for a sequence of observation labels.
#[derive(Parser, Debug)]
#[command(name = "viterbi", version)]
struct Opts {
    /// JSON model description; defaults to the built-in healthy/fever model
    #[arg(short, long)]
    model: Option<PathBuf>,
    /// Observation labels; defaults to the model's `observations`
    observations: Vec<String>,
    /// Score in log space so degenerate inputs still yield a full-length path
    #[arg(long)]
    log_space: bool,
    /// Print the score and backpointer tables
    #[arg(long)]
    show_tables: bool,
    /// Print the built-in model as JSON and exit
    #[arg(long)]
    print_default_model: bool,
}

fn run(opts: Opts) -> Result<()> {
    if opts.print_default_model {
        println!("{}", ModelConfig::default().to_json_pretty()?);
        return Ok(());
    }

    let cfg = match &opts.model {
        Some(path) => {
            info!("loading model from {}", path.display());
            ModelConfig::load(path)?
        }
        None => ModelConfig::default(),
    };
    let scoring = if opts.log_space {
        Scoring::LogSpace
    } else {
        Scoring::Probability
    };
    let hmm = cfg.build(scoring)?;
    if !hmm.decoder().model().is_stochastic(1e-6) {
        warn!("model probabilities do not sum to one");
    }

    let observations = if opts.observations.is_empty() {
        cfg.observations.clone()
    } else {
        opts.observations.clone()
    };
    info!("decoding {} observations", observations.len());

    let trellis = hmm.decode_trellis_labels(&observations)?;
    if opts.show_tables {
        print!("{}", TrellisReport::new(&trellis).with_states(hmm.states()));
    }

    let path = trellis.backtrack();
    if path.len() < observations.len() {
        warn!(
            "path covers {} of {} observations (zero-probability cells)",
            path.len(),
            observations.len()
        );
    }
    let names = hmm.states().decode(&path)?;
    println!("Path: {}", names.join(" -> "));
    println!("Score: {}", trellis.best_score());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let opts = Opts::parse();

    match run(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
