use std::io::{self, stdout};
use std::path::PathBuf;
use std::task::Poll;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use futures::future::BoxFuture;

use hwdelta::app::{App, Monitor, ResolvedKeybinds};
use hwdelta::config::{self, load_config, load_config_from_path};
use hwdelta::event::{Event, EventSource};
use hwdelta::logging;
use hwdelta::render::text::Highlight;
use hwdelta::render::{RenderStyle, Renderer, TextRenderer};
use hwdelta::system::collector::Sampler;
use hwdelta::ui::TableRenderer;
use hwdelta::ui::theme::Theme;

#[derive(Parser)]
#[command(
    name = "hwdelta",
    about = "Terminal hardware monitor that highlights what changed since the last sample"
)]
struct Cli {
    /// Path to config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sampling interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Output style
    #[arg(long, value_parser = ["plain", "ansi", "table"])]
    style: Option<String>,

    /// GPU backend
    #[arg(long, value_parser = ["auto", "none", "nvml", "nvidia-smi"])]
    gpu: Option<String>,

    /// nvidia-smi executable used by the nvidia-smi backend
    #[arg(long)]
    smi_command: Option<String>,

    /// Stop after this many samples (0 runs until interrupted)
    #[arg(long, default_value_t = 0)]
    iterations: u64,

    /// Append frames instead of clearing the screen (text styles)
    #[arg(long, default_value_t = false)]
    no_clear: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    let config = load_config_for_cli(&cli);
    logging::init(config.general.log_file.as_deref())?;

    let style = RenderStyle::from_config_str(&config.general.style);
    tracing::info!(
        style = style.label(),
        interval_ms = config.general.interval_ms,
        backend = %config.gpu.backend,
        "starting"
    );

    // Must be live before GPU backend startup and the first sample, both of which
    // can block for as long as the backend takes to answer.
    let interrupt = install_interrupt().await?;

    // GPU init failures surface here, before anything is drawn.
    let sampler = Sampler::from_config(&config).wrap_err("GPU backend failed to initialize")?;

    let iterations = cli.iterations;
    match style {
        RenderStyle::Plain => {
            run_text(sampler, Highlight::Marker, &config, iterations, interrupt).await
        }
        RenderStyle::Ansi => {
            run_text(sampler, Highlight::Ansi, &config, iterations, interrupt).await
        }
        RenderStyle::Table => run_table(sampler, &config, iterations, interrupt).await,
    }
}

type Interrupt = BoxFuture<'static, io::Result<()>>;

/// `tokio::signal::ctrl_c` only registers its handler when first polled, so
/// poll it once here. Until then SIGINT still terminates the process.
async fn install_interrupt() -> Result<Interrupt> {
    let mut signal: Interrupt = Box::pin(tokio::signal::ctrl_c());
    match futures::poll!(&mut signal) {
        Poll::Pending => Ok(signal),
        Poll::Ready(Ok(())) => Ok(Box::pin(std::future::ready(Ok(())))),
        Poll::Ready(Err(err)) => Err(err).wrap_err("failed to install the SIGINT handler"),
    }
}

async fn run_text(
    sampler: Sampler,
    highlight: Highlight,
    config: &config::Config,
    iterations: u64,
    interrupt: Interrupt,
) -> Result<()> {
    let renderer = TextRenderer::new(stdout(), highlight, config.general.clear_screen);
    let mut monitor = Monitor::new(sampler, renderer);

    let result = text_loop(&mut monitor, interval(config), iterations, interrupt).await;
    let shutdown = monitor.finish();
    result?;
    shutdown?;
    Ok(())
}

async fn text_loop<R: Renderer>(
    monitor: &mut Monitor<R>,
    interval: Duration,
    iterations: u64,
    mut interrupt: Interrupt,
) -> Result<()> {
    loop {
        monitor.tick()?;
        if iterations != 0 && monitor.ticks() >= iterations {
            return Ok(());
        }
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = &mut interrupt => {
                tracing::info!("interrupted");
                return Ok(());
            }
        }
    }
}

async fn run_table(
    sampler: Sampler,
    config: &config::Config,
    iterations: u64,
    interrupt: Interrupt,
) -> Result<()> {
    let keybinds = ResolvedKeybinds::from_config(&config.keybinds);
    let theme = Theme::from_config(&config.general.theme);
    let gpu_backend = sampler.gpu_backend();

    // ratatui::init installs a panic hook that restores the terminal.
    let terminal = ratatui::init();
    let renderer = TableRenderer::new(
        terminal,
        theme.clone(),
        keybinds.hints(),
        config.general.interval_ms,
        gpu_backend,
    );
    let mut app = App::new(Monitor::new(sampler, renderer), keybinds, theme);

    let result = table_loop(&mut app, interval(config), iterations, interrupt).await;
    ratatui::restore();

    let shutdown = app.into_monitor().finish();
    result?;
    shutdown?;
    Ok(())
}

async fn table_loop<R: Renderer>(
    app: &mut App<R>,
    tick_rate: Duration,
    iterations: u64,
    mut interrupt: Interrupt,
) -> Result<()> {
    let mut events = EventSource::new(tick_rate);

    while app.running {
        // Raw mode turns Ctrl+C into a key; this only sees an external SIGINT.
        let event = tokio::select! {
            event = events.next() => event,
            _ = &mut interrupt => {
                tracing::info!("interrupted");
                break;
            }
        };
        let Some(event) = event else {
            break;
        };
        match event {
            Event::Key(key) => {
                let action = app.map_key(key);
                app.dispatch(action)?;
            }
            Event::Tick => {
                app.on_tick()?;
                if iterations != 0 && app.monitor().ticks() >= iterations {
                    app.running = false;
                }
            }
            Event::Resize => app.redraw()?,
        }
    }

    Ok(())
}

fn interval(config: &config::Config) -> Duration {
    // tokio intervals reject a zero period.
    Duration::from_millis(config.general.interval_ms.max(1))
}

fn load_config_for_cli(cli: &Cli) -> config::Config {
    let mut config = match &cli.config {
        Some(path) => load_config_from_path(path),
        None => load_config(),
    };

    if let Some(ms) = cli.interval_ms {
        config.general.interval_ms = ms;
    }
    if let Some(ref style) = cli.style {
        config.general.style = style.clone();
    }
    if let Some(ref backend) = cli.gpu {
        config.gpu.backend = backend.clone();
    }
    if let Some(ref command) = cli.smi_command {
        config.gpu.smi_command = command.clone();
    }
    if cli.no_clear {
        config.general.clear_screen = false;
    }
    if let Some(ref path) = cli.log_file {
        config.general.log_file = Some(path.clone());
    }

    config
}
