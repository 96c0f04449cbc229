use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::SeedableRng;

use nystrom_landmarks::growth::{run_method, GrowthConfig, Progress};
use nystrom_landmarks::io::{read_kernel_file, write_series_file};
use nystrom_landmarks::linalg::DEFAULT_RCOND;
use nystrom_landmarks::select::{Method, SelectorOptions};

/// Compare landmark selection heuristics for Nystrom approximation of a kernel matrix.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Size of the random initial landmark set.
    #[arg(long, default_value = "5")]
    start_n: usize,

    /// Target landmark count (defaults to every item).
    #[arg(long)]
    max_n: Option<usize>,

    /// Landmarks added per step.
    #[arg(long, default_value = "1")]
    step_size: usize,

    /// Selection heuristic: uniform, adapt_full, adapt_full_lev, leverage_full_iter,
    /// leverage_est, determinant_greedy, determinant_greedy_samp or smga_frob.
    #[arg(long, short = 'm')]
    method: String,

    /// Kernel matrix: `.npy` array, `.npz` archive, or delimited text with one row per line.
    #[arg(long, short = 'k')]
    kernel_file: PathBuf,

    /// Name of the array to load from a `.npz` kernel file.
    #[arg(long, short = 'K')]
    kernel_path: Option<String>,

    /// Field delimiter of the kernel file.
    #[arg(long, default_value_t = ',')]
    delimiter: char,

    /// Seed for every random choice of the run; random if omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Candidates scored per step by smga_frob.
    #[arg(long, default_value = "59")]
    eval_size: usize,

    /// Residual rank used by adapt_full_lev (defaults to the landmark count).
    #[arg(long)]
    residual_rank: Option<usize>,

    /// Output CSV path.
    outfile: PathBuf,
}

struct Bar(ProgressBar);

impl Progress for Bar {
    fn start(&mut self, total: usize) {
        self.0.set_length(total as u64);
    }

    fn update(&mut self, n_picked: usize) {
        self.0.set_position(n_picked as u64);
    }

    fn finish(&mut self) {
        self.0.finish();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let method: Method = cli.method.parse()?;
    if !cli.delimiter.is_ascii() {
        return Err(format!("Delimiter `{}` must be a single ASCII character", cli.delimiter).into());
    }
    method.check_step_size(cli.step_size)?;

    let kernel = read_kernel_file(&cli.kernel_file, cli.kernel_path.as_deref(), cli.delimiter as u8)?;

    let config = GrowthConfig { start_n: cli.start_n, max_n: cli.max_n };
    let opts = SelectorOptions {
        step_size: cli.step_size,
        eval_size: cli.eval_size,
        residual_rank: cli.residual_rank,
        rcond: DEFAULT_RCOND,
    };
    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let pb = ProgressBar::new(kernel.nrows() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} landmarks ({eta})")?
            .progress_chars("█▉▊▋▌▍▎▏ "),
    );
    let mut bar = Bar(pb);

    let series = run_method(&kernel, method, &config, &opts, &mut rng, &mut bar)?;
    if let Some(err) = &series.failure {
        log::warn!("Run stopped early after {} rows: {}", series.len(), err);
    }

    write_series_file(&cli.outfile, &series)?;
    log::info!("Wrote {} rows to {}", series.len(), cli.outfile.display());
    Ok(())
}
