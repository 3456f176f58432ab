use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use lucio::capture::{CommandGrabber, FrameBuffer, ScreenStreamer};
use lucio::config::{resolve_config, Config};
use lucio::error::LucioError;
use lucio::pipeline::{NoopProgress, Pipeline, PipelineStatus, RunRequest, RunResponse};
use lucio::telemetry::init_tracing;
use lucio::worker::{PipelineJob, WorkerPool};

const RESULT_POLL: Duration = Duration::from_millis(200);

#[derive(Parser, Debug)]
#[command(
    name = "lucio",
    version,
    about = "Turns a request and what is on screen into a PDF document"
)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Default log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one request through the pipeline
    Run(RunArgs),
    /// Run every request of a JSONL file concurrently
    Batch(BatchArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// What to look up and write about
    prompt: String,

    /// Skip screen inference and use this URL
    #[arg(long)]
    url: Option<String>,

    /// Print the response as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// One `{"prompt": ..., "url": ...}` object per line
    file: PathBuf,

    /// Worker threads (defaults to the configured worker_count)
    #[arg(long)]
    workers: Option<usize>,

    /// Print responses as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, LucioError> {
    let config = resolve_config(cli.config.as_deref())?;
    info!(
        "Starting lucio v{} (output: {})",
        env!("CARGO_PKG_VERSION"),
        config.output_directory
    );

    let buffer = FrameBuffer::new();
    let mut streamer = start_capture(&config, &buffer);
    let pipeline = Arc::new(Pipeline::from_config(&config, Arc::new(buffer.clone()))?);

    let code = match cli.command {
        Command::Run(args) => {
            if args.url.is_none() && streamer.is_some() {
                wait_for_first_frame(&buffer, &config);
            }
            let mut request = RunRequest::new(args.prompt);
            request.url = args.url;

            let response = pipeline.run_request(&request, &NoopProgress);
            print_response(&response, args.json);
            exit_code(response.status == PipelineStatus::Completed)
        }
        Command::Batch(args) => {
            let requests = read_requests(&args.file)?;
            if streamer.is_some() && requests.iter().any(|r| r.url.is_none()) {
                wait_for_first_frame(&buffer, &config);
            }
            let workers = args.workers.unwrap_or(config.worker_count).max(1);
            let all_completed = run_batch(pipeline, requests, workers, args.json)?;
            exit_code(all_completed)
        }
    };

    if let Some(streamer) = streamer.as_mut() {
        streamer.stop();
    }

    Ok(code)
}

/// Starts the screen streamer when capture is enabled. Capture problems are
/// not fatal; runs with a supplied URL still work without frames.
fn start_capture(config: &Config, buffer: &FrameBuffer) -> Option<ScreenStreamer> {
    if !config.capture.enabled {
        info!("Screen capture disabled");
        return None;
    }

    let grabber = match CommandGrabber::new(&config.capture.command) {
        Ok(grabber) => grabber,
        Err(e) => {
            warn!("Screen capture unavailable: {}", e);
            return None;
        }
    };

    info!(
        "Capturing screen with '{}' every {:?}",
        grabber.program(),
        config.capture.interval()
    );
    let mut streamer = ScreenStreamer::new(
        Arc::new(grabber),
        buffer.clone(),
        config.capture.interval(),
    );
    match streamer.start() {
        Ok(()) => Some(streamer),
        Err(e) => {
            warn!("Failed to start screen capture: {}", e);
            None
        }
    }
}

fn wait_for_first_frame(buffer: &FrameBuffer, config: &Config) {
    let timeout = (config.capture.interval() * 3).max(Duration::from_secs(2));
    if !buffer.wait_for_frame(timeout) {
        warn!("No screen frame captured after {:?}", timeout);
    }
}

fn read_requests(path: &Path) -> Result<Vec<RunRequest>, LucioError> {
    let content = std::fs::read_to_string(path).map_err(|source| LucioError::Input {
        path: path.to_path_buf(),
        source,
    })?;

    let mut requests = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<RunRequest>(line) {
            Ok(request) => requests.push(request),
            Err(e) => warn!("Skipping line {} of {}: {}", index + 1, path.display(), e),
        }
    }

    info!("Loaded {} requests from {}", requests.len(), path.display());
    Ok(requests)
}

fn run_batch(
    pipeline: Arc<Pipeline>,
    requests: Vec<RunRequest>,
    workers: usize,
    json: bool,
) -> Result<bool, LucioError> {
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let flag = Arc::clone(&interrupted);
        if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }
    }

    let pool = WorkerPool::new(pipeline, workers);
    let total = requests.len();
    let mut pending: VecDeque<PipelineJob> = requests.into_iter().map(PipelineJob::new).collect();
    let mut received = 0;
    let mut all_completed = true;

    while received < total {
        if interrupted.load(Ordering::SeqCst) {
            warn!("Interrupted; {} requests not finished", total - received);
            all_completed = false;
            break;
        }

        while let Some(job) = pending.pop_front() {
            if let Some(job) = pool.try_submit(job)? {
                pending.push_front(job);
                break;
            }
        }

        if let Some(outcome) = pool.recv_result_timeout(RESULT_POLL) {
            received += 1;
            let response = outcome.response();
            all_completed &= response.status == PipelineStatus::Completed;
            print_response(&response, json);
        }
    }

    pool.shutdown();
    while let Some(outcome) = pool.try_recv_result() {
        print_response(&outcome.response(), json);
    }
    pool.wait();

    Ok(all_completed)
}

fn print_response(response: &RunResponse, json: bool) {
    if json {
        match serde_json::to_string(response) {
            Ok(line) => println!("{}", line),
            Err(e) => error!("Failed to serialize response: {}", e),
        }
        return;
    }

    println!("{} [{}]", response.request_id, response.status);
    if let Some(path) = &response.pdf_file_path {
        println!("  document: {}", path);
    }
    for e in &response.errors {
        println!("  error: {}", e);
    }
}

fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
