use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, Level};

use airtraffic_des::config::SimConfig;
use airtraffic_des::executor::nullmsg::NullMsgExecutor;
use airtraffic_des::executor::sequential::SequentialExecutor;
use airtraffic_des::executor::yawns::YawnsExecutor;
use airtraffic_des::logger::{prepare_output_dir, FileEventLogger, NullEventLogger};
use airtraffic_des::lookahead::{DistanceMatrix, LookaheadMatrix};
use airtraffic_des::rng::rng_for_distance_matrix;
use airtraffic_des::stats::Report;
use airtraffic_des::transport::{InProcessTransport, Transport};

#[derive(Parser)]
#[command(name = "airtraffic-des")]
#[command(about = "Conservative parallel discrete-event simulator of an air-traffic network", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Mode {
    Sequential,
    Yawns,
    Nullmsg,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_possible_value().expect("no skipped variants").get_name().fmt(f)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the simulation once and prints the final report.
    Run {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long, value_enum, default_value_t = Mode::Sequential)]
        mode: Mode,

        /// Number of logical processes. Ignored (forced to 1) for `sequential`.
        #[arg(short, long, default_value_t = 1)]
        lps: u32,

        /// Directory under which per-LP trace files are written. Omit to
        /// discard the trace and keep only the final report.
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Loads and validates a configuration profile without running anything.
    Check {
        #[arg(short, long)]
        config: PathBuf,

        #[arg(short, long, default_value_t = 1)]
        lps: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).with_target(false).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Check { config, lps } => {
            let config = SimConfig::load(&config)?;
            config.validate(lps).context("configuration is invalid")?;
            info!(num_airports = config.num_airports, num_airplanes = config.num_airplanes, "configuration is valid");
        }
        Commands::Run { config, mode, lps, output_dir } => {
            let config = SimConfig::load(&config)?;
            let n_lp = if mode == Mode::Sequential { 1 } else { lps };
            config.validate(n_lp).context("configuration is invalid")?;
            let report = run(config, mode, n_lp, output_dir.as_deref())?;
            print!("{}", report.render());
        }
    }
    Ok(())
}

fn run(config: SimConfig, mode: Mode, n_lp: u32, output_dir: Option<&std::path::Path>) -> Result<Report> {
    let mut rng = rng_for_distance_matrix(config.seed);
    let distances = DistanceMatrix::generate(&config, &mut rng);

    let log_name = match mode {
        Mode::Sequential => "sequential",
        Mode::Yawns => "yawns",
        Mode::Nullmsg => "nullmsg",
    };
    let log_dir = match output_dir {
        Some(base) => Some(prepare_output_dir(base, log_name)?),
        None => None,
    };

    match mode {
        Mode::Sequential => {
            let logger: Box<dyn airtraffic_des::logger::EventLogger> = match &log_dir {
                Some(base) => Box::new(FileEventLogger::new(base.parent().unwrap(), log_name, 0)?),
                None => Box::new(NullEventLogger),
            };
            let mut executor = SequentialExecutor::new(config, distances, logger);
            executor.bootstrap(1);
            info!("starting sequential run");
            Ok(executor.run()?)
        }
        Mode::Yawns => run_parallel(config, distances, n_lp, log_dir.as_deref(), log_name, |cfg, dist, la, transport, logger| {
            let mut executor = YawnsExecutor::new(cfg, dist, la, transport, logger);
            executor.bootstrap();
            executor.run()
        }),
        Mode::Nullmsg => run_parallel(config, distances, n_lp, log_dir.as_deref(), log_name, |cfg, dist, la, transport, logger| {
            let mut executor = NullMsgExecutor::new(cfg, dist, la, transport, logger);
            executor.bootstrap();
            executor.run()
        }),
    }
}

fn run_parallel<F>(
    config: SimConfig,
    distances: DistanceMatrix,
    n_lp: u32,
    log_dir: Option<&std::path::Path>,
    log_name: &str,
    body: F,
) -> Result<Report>
where
    F: Fn(SimConfig, DistanceMatrix, LookaheadMatrix, InProcessTransport, Box<dyn airtraffic_des::logger::EventLogger>) -> Result<Report, airtraffic_des::SimError>
        + Send
        + Copy
        + 'static,
{
    let lookahead = LookaheadMatrix::from_distance(&distances, &config, n_lp);
    let transports = InProcessTransport::build(n_lp);

    info!(n_lp, mode = log_name, "starting parallel run");
    let handles: Vec<_> = transports
        .into_iter()
        .map(|transport| {
            let config = config;
            let distances = distances.clone();
            let lookahead = lookahead.clone();
            let logger: Box<dyn airtraffic_des::logger::EventLogger> = match log_dir {
                Some(base) => Box::new(FileEventLogger::new(base.parent().unwrap(), log_name, transport.rank())?),
                None => Box::new(NullEventLogger),
            };
            Ok(thread::spawn(move || body(config, distances, lookahead, transport, logger)))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut reports = Vec::with_capacity(handles.len());
    for handle in handles {
        let report = handle.join().expect("LP thread panicked")?;
        reports.push(report);
    }
    Ok(reports.remove(0))
}
