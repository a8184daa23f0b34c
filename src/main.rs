use std::fs::OpenOptions;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::Backend, backend::CrosstermBackend, Terminal};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sensorwatch::events;
use sensorwatch::prompt::{self, Prompter};
use sensorwatch::ui::{HeadlessRenderer, Renderable, TerminalRenderer, Theme};
use sensorwatch::{
    finish_run, Acquisition, AcquisitionConfig, App, CancelToken, FileSource, HttpSource,
    LoopStatus, RunSession, SampleSource, Settings, SharedBuffer,
};

/// Redraw at least this often so the elapsed clock keeps moving.
const CLOCK_TICK: Duration = Duration::from_secs(1);

#[derive(Parser, Debug)]
#[command(name = "sensorwatch")]
#[command(about = "Poll an environmental sensor, chart it live and export the run")]
struct Args {
    /// Sensor IPv4 address (asked interactively when missing)
    #[arg(short, long, value_parser = parse_ipv4, conflicts_with = "file")]
    address: Option<String>,

    /// Replay a saved sensor page instead of polling the network
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Zone of the panel, names the output directory and files
    #[arg(short, long, value_parser = parse_zone)]
    zone: Option<String>,

    /// Measurement duration (e.g., "300", "5m"). 0 means no limit.
    #[arg(short, long)]
    duration: Option<String>,

    /// TOML settings file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Parent directory of the per-zone output directories
    #[arg(long)]
    output_root: Option<PathBuf>,

    /// Print readings line by line instead of drawing charts
    #[arg(long)]
    headless: bool,

    /// Keep the charts up after acquisition stops on its own
    #[arg(long, conflicts_with = "headless")]
    keep_open: bool,
}

fn parse_ipv4(s: &str) -> Result<String, String> {
    if prompt::is_valid_ipv4(s) {
        Ok(s.to_string())
    } else {
        Err("Invalid IP address format".to_string())
    }
}

fn parse_zone(s: &str) -> Result<String, String> {
    if prompt::is_valid_zone(s) {
        Ok(s.to_string())
    } else {
        Err("zone must be a non-empty name without path separators".to_string())
    }
}

/// What the user asked for, after prompting for the missing parts.
struct RunRequest {
    address: Option<String>,
    zone: String,
    duration_limit: Option<Duration>,
}

fn collect_request(args: &Args) -> Result<RunRequest> {
    // Holds the stdin lock; dropped before the headless listener needs stdin.
    let mut prompter = Prompter::stdio();

    let address = match (&args.address, &args.file) {
        (_, Some(_)) => None,
        (Some(address), None) => Some(address.clone()),
        (None, None) => Some(prompter.address()?),
    };
    let zone = match &args.zone {
        Some(zone) => zone.clone(),
        None => prompter.zone()?,
    };
    let duration_limit = match &args.duration {
        Some(answer) => prompt::parse_duration_limit(answer)?,
        None => prompter.duration()?,
    };

    Ok(RunRequest {
        address,
        zone,
        duration_limit,
    })
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref())?;
    let request = collect_request(&args)?;
    let config = settings.acquisition_config(request.duration_limit)?;

    let output_root = args
        .output_root
        .clone()
        .unwrap_or_else(|| settings.output_root.clone());
    let session = match RunSession::create(&output_root, &request.zone, request.duration_limit) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("Error creating directories: {}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    // From here on a failure is reported, and whatever was recorded is still exported.
    let log_file = (!args.headless).then(|| session.log_path());
    if let Err(e) = init_tracing(log_file.as_deref()) {
        eprintln!("Logging disabled: {:#}", e);
    }

    let buffer = SharedBuffer::new(settings.capacity);
    let run_result = acquire(&args, &request, &session, config, &buffer);

    let (report, run_error) = finish_run(&session, &buffer, config.expected_ticks(), run_result);
    if let Some(e) = run_error {
        eprintln!("Measurement ended with an error: {:#}", e);
    }
    match &report.csv {
        Ok((path, _)) => println!("CSV file created: {}", path.display()),
        Err(e) => eprintln!("Unable to create CSV file: {}", e),
    }
    for (_, result) in &report.plots {
        match result {
            Ok(path) => println!("Plot created: {}", path.display()),
            Err(e) => eprintln!("Unable to create plot: {}", e),
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Run the acquisition loop and its UI until either stops.
///
/// The loop is always joined before returning, so `buffer` is final.
fn acquire(
    args: &Args,
    request: &RunRequest,
    session: &RunSession,
    config: AcquisitionConfig,
    buffer: &SharedBuffer,
) -> Result<()> {
    let source: Arc<dyn SampleSource> = match (&args.file, &request.address) {
        (Some(path), _) => Arc::new(FileSource::new(path)),
        (None, Some(address)) => Arc::new(
            HttpSource::builder()
                .address(address)
                .timeout(config.fetch_timeout)
                .build()?,
        ),
        (None, None) => anyhow::bail!("no sensor address or file given"),
    };

    let rt = tokio::runtime::Runtime::new()?;
    let cancel = CancelToken::new();

    info!(
        zone = %session.zone,
        source = source.description(),
        output = %session.output_dir.display(),
        started = %session.created_at.format("%Y-%m-%d %H:%M:%S"),
        "starting acquisition"
    );

    let handle = {
        let _guard = rt.enter();
        Acquisition::new(source.clone(), buffer.clone(), config, cancel.clone()).start()
    };

    let mut app = App::new(
        &session.zone,
        source.description(),
        buffer.clone(),
        handle.status(),
        cancel.clone(),
        request.duration_limit,
        config.expected_ticks(),
        args.keep_open,
    );

    let ui_result = if args.headless {
        spawn_stdin_listener(cancel.clone());
        println!(
            "Measurement started at {}. Enter q to stop.",
            session.created_at.format("%H:%M:%S")
        );
        rt.block_on(run_headless(&mut app, handle.status()))
    } else {
        run_tui(&mut app)
    };

    // Whatever ended the UI, the loop must be stopped before exporting.
    cancel.cancel();
    handle.stop();
    match rt.block_on(handle.join()) {
        Ok(reason) => info!(reason = reason.label(), "acquisition stopped"),
        Err(e) => warn!(error = %e, "acquisition task failed"),
    }
    ui_result
}

/// Log to a file while the terminal UI owns the screen, to stderr otherwise.
fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("unable to open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

/// Cancel the run when `q` is entered on stdin.
fn spawn_stdin_listener(cancel: CancelToken) {
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) if line.trim().eq_ignore_ascii_case("q") => {
                    cancel.cancel();
                    return;
                }
                Ok(_) => {}
                Err(_) => return,
            }
        }
    });
}

async fn run_headless(app: &mut App, mut status_rx: watch::Receiver<LoopStatus>) -> Result<()> {
    let mut renderer = HeadlessRenderer::new(io::stdout());

    loop {
        app.poll_updates();
        renderer.draw(&app.snapshot(), &app.run_status())?;
        if app.is_stopped() {
            return Ok(());
        }

        tokio::select! {
            _ = tokio::signal::ctrl_c() => app.quit(),
            changed = status_rx.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
            }
        }
    }
}

/// Run the TUI until the user quits or the loop stops
fn run_tui(app: &mut App) -> Result<()> {
    // Detect before raw mode; the query reads the terminal's reply
    let theme = Theme::auto_detect();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut renderer = TerminalRenderer::new(Terminal::new(backend)?, theme);

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = run_app(&mut renderer, app);

    // Restore terminal
    disable_raw_mode()?;
    let terminal = renderer.terminal_mut();
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(renderer: &mut TerminalRenderer<B>, app: &mut App) -> Result<()> {
    let mut last_draw: Option<Instant> = None;

    while app.running {
        let changed = app.poll_updates();
        let clock_due = last_draw.map_or(true, |at| at.elapsed() >= CLOCK_TICK);
        if changed || clock_due {
            renderer.draw(&app.snapshot(), &app.run_status())?;
            last_draw = Some(Instant::now());
        }

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => {
                    events::handle_key_event(app, key);
                    last_draw = None;
                }
                Event::Resize(_, _) => last_draw = None,
                _ => {}
            }
        }
    }

    Ok(())
}
