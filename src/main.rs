use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use diagchart::app::write_export;
use diagchart::{
    events, ui, App, ChartRenderer, DataSource, FileSource, Overrides, Report, ReportOptions, Scale,
    Settings, StreamSource, TextRenderer,
};

#[derive(Parser, Debug)]
#[command(name = "diagchart")]
#[command(about = "Chart MongoDB diagnostics: grouped aggregation, downsampling and a terminal viewer")]
struct Args {
    /// Diagnostics JSON or newline-delimited JSON file
    #[arg(short, long, conflicts_with = "connect", required_unless_present = "connect")]
    file: Option<PathBuf>,

    /// Connect to a TCP endpoint streaming newline-delimited JSON (host:port)
    #[arg(short, long, conflicts_with_all = ["export", "print"])]
    connect: Option<String>,

    /// Report to build from the input
    #[arg(short, long, value_enum)]
    report: Report,

    /// Settings file (TOML); defaults to diagchart.toml when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial downsampling factor (integer >= 1)
    #[arg(short, long)]
    scale: Option<Scale>,

    /// Hide legends of charts with more datasets than this
    #[arg(long)]
    max_legends: Option<usize>,

    /// Refresh interval in seconds (only used with --file)
    #[arg(long)]
    refresh: Option<u64>,

    /// Records kept from a --connect stream before the oldest are dropped
    #[arg(long)]
    max_records: Option<usize>,

    /// Export the charts as Chart.js JSON to this file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Print a text summary of the charts and exit
    #[arg(short, long)]
    print: bool,

    /// Write logs to this file while the TUI is running
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn batch(&self) -> bool {
        self.export.is_some() || self.print
    }

    fn overrides(&self) -> Overrides {
        Overrides {
            scale: self.scale,
            max_legends: self.max_legends,
            refresh_secs: self.refresh,
            max_records: self.max_records,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let settings = Settings::load(args.config.as_deref(), &args.overrides())?;

    if args.batch() {
        let Some(ref path) = args.file else {
            anyhow::bail!("--export and --print need --file");
        };
        return run_batch(&args, path, &settings);
    }

    if let Some(ref addr) = args.connect {
        return run_with_tcp(addr, args.report, &settings);
    }

    match args.file {
        Some(ref path) => run_with_file(path, args.report, &settings),
        None => anyhow::bail!("either --file or --connect is required"),
    }
}

/// Log to stderr in batch modes, to `--log-file` in TUI mode, never to the TUI screen.
fn init_logging(args: &Args) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    if args.batch() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    } else if let Some(ref path) = args.log_file {
        let file = File::create(path).with_context(|| format!("cannot create log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    }
    Ok(())
}

/// Build the charts once and export or print them.
fn run_batch(args: &Args, path: &Path, settings: &Settings) -> Result<()> {
    let records = FileSource::new(path)
        .read()
        .with_context(|| format!("cannot load {}", path.display()))?;
    let options = ReportOptions {
        max_legends: settings.max_legends,
    };
    let charts: Vec<_> = args
        .report
        .build(&records, &options)
        .iter()
        .map(|c| c.downsample(settings.scale))
        .collect();
    tracing::info!(report = %args.report, records = records.len(), charts = charts.len(), "built charts");

    if let Some(ref export_path) = args.export {
        write_export(export_path, args.report, settings.scale, &charts)?;
        eprintln!("Exported {} charts to: {}", charts.len(), export_path.display());
    }

    if args.print {
        let mut renderer = TextRenderer::new();
        for chart in &charts {
            println!("{}", renderer.render(chart)?);
        }
    }
    Ok(())
}

/// Run with a file-based data source
fn run_with_file(path: &Path, report: Report, settings: &Settings) -> Result<()> {
    let source = Box::new(FileSource::new(path));
    run_tui(source, report, settings, settings.refresh_interval())
}

/// Run with a TCP stream data source
fn run_with_tcp(addr: &str, report: Report, settings: &Settings) -> Result<()> {
    // Build a tokio runtime for the TCP connection
    let rt = tokio::runtime::Runtime::new()?;

    let source = rt.block_on(async {
        use tokio::net::TcpStream;

        println!("Connecting to {}...", addr);
        match TcpStream::connect(addr).await {
            Ok(stream) => {
                println!("Connected!");
                let source = StreamSource::spawn(stream, addr).with_max_records(settings.max_records);
                Ok(Box::new(source) as Box<dyn DataSource>)
            }
            Err(e) => Err(anyhow::anyhow!("Failed to connect to {}: {}", addr, e)),
        }
    })?;

    // For TCP, we poll continuously (no refresh interval needed)
    run_tui(source, report, settings, Duration::from_millis(100))
}

/// Run the TUI with the given data source
fn run_tui(
    source: Box<dyn DataSource>,
    report: Report,
    settings: &Settings,
    refresh_interval: Duration,
) -> Result<()> {
    // Detect the theme before raw mode takes over the terminal
    let mut app = App::new(source, report, settings);
    app.reload_data();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic);
    }));

    let result = run_app(&mut terminal, &mut app, refresh_interval);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    refresh_interval: Duration,
) -> Result<()> {
    let mut last_refresh = Instant::now();

    while app.running {
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(Event::Key(key)) = events::poll_event(Duration::from_millis(100))? {
            events::handle_key_event(app, key);
        }

        // Auto-refresh data periodically
        if last_refresh.elapsed() >= refresh_interval {
            app.reload_data();
            last_refresh = Instant::now();
        }
    }

    Ok(())
}
