use clap::Parser;
use reddit_client::RedditClient;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, Level};
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;
use triangulator_core::{
    load_credentials, load_run_settings, CoreError, ErrorReporter, DEFAULT_AUTH_FILE,
    DEFAULT_RUN_FILE,
};
use watch_service::{
    spawn_signal_listener, ProcessorOptions, RunOutcome, StreamProcessor, PROCESS_NAME,
};

const DEFAULT_LOG_FILTER: &str = "implant_triangulator=info,watch_service=info,reddit_client=info,triangulator_core=info";
const VERBOSE_LOG_FILTER: &str = "implant_triangulator=debug,watch_service=debug,reddit_client=debug,triangulator_core=debug";

/// Watches a subreddit's comment stream and sends a private message to the
/// operator whenever a watched user comments.
#[derive(Parser, Debug)]
#[command(name = "implant-triangulator", version, about)]
struct Cli {
    /// Credentials file
    #[arg(short, long, default_value = DEFAULT_AUTH_FILE)]
    auth: PathBuf,

    /// Run file holding the watch-list
    #[arg(short, long, default_value = DEFAULT_RUN_FILE)]
    run: PathBuf,

    /// Do not print matches to the console (messages are still sent)
    #[arg(short = 'n', long)]
    no_notify: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn setup_logging(verbose: bool) {
    let default = if verbose {
        VERBOSE_LOG_FILTER
    } else {
        DEFAULT_LOG_FILTER
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let writer = std::io::stderr
        .with_max_level(Level::WARN)
        .or_else(std::io::stdout);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(verbose)
        .init();
}

async fn run(cli: &Cli, shutdown: &CancellationToken) -> Result<RunOutcome, CoreError> {
    let credentials = load_credentials(&cli.auth)?;
    let settings = load_run_settings(&cli.run)?;
    debug!(
        "Watching r/{} as u/{}",
        credentials.subreddit, credentials.username
    );

    let client = RedditClient::new().with_skip_existing(settings.skip_existing);
    let options = ProcessorOptions {
        quiet: cli.no_notify,
        continue_on_delivery_error: settings.continue_on_delivery_error,
    };

    let mut processor = StreamProcessor::new(client, settings.watch_list, options);
    processor.run(&credentials, shutdown).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    info!("{} started", PROCESS_NAME);
    info!("Credentials file: {}", cli.auth.display());
    info!("Run file: {}", cli.run.display());

    let shutdown = CancellationToken::new();
    let listener = spawn_signal_listener(shutdown.clone()).await;

    let result = run(&cli, &shutdown).await;
    shutdown.cancel();
    let _ = listener.await;

    ExitCode::from(exit_status(result))
}

/// Logs how the run ended and returns the process exit status.
fn exit_status(result: Result<RunOutcome, CoreError>) -> u8 {
    match result {
        Ok(RunOutcome::Shutdown { stats }) => {
            debug!("{:?}", stats);
            info!("{} terminated", PROCESS_NAME);
            0
        }
        Err(e) => {
            ErrorReporter::new().report_fatal(&e);
            1
        }
    }
}
