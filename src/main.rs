use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use diyasky::SkyConfig;
use diyasky::effects::{self, Effect};
use std::fs::File;
use std::io::{BufWriter, Stdout, stdout};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const FIXED_DT: Duration = Duration::from_nanos(16_666_667);

#[derive(Parser)]
#[command(name = "diyasky")]
#[command(
    about = "Festival sky for the terminal: fireworks, sparkles and wish lanterns",
    long_about = None
)]
#[command(version)]
#[command(after_help = "Press 'q', ESC, or Ctrl+C to exit. Click a lantern to make a wish.")]
struct Cli {
    /// Scene to run
    #[arg(value_enum, default_value_t = EffectKind::Festival)]
    effect: EffectKind,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Background color as hex (e.g. 1a1b26)
    #[arg(long, value_name = "RRGGBB")]
    bg_color: Option<String>,

    /// Milliseconds between firework launches; lower is denser
    #[arg(long, value_name = "MS")]
    launch_period: Option<u64>,

    /// Seed for a repeatable show
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs here (RUST_LOG filters, default info)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum EffectKind {
    /// Fireworks and lanterns
    Festival,
    /// Fireworks over the sparkle field only
    Fireworks,
}

fn init_logging(path: Option<&Path>) -> Result<()> {
    // stdout is the picture; without a file there is nowhere to log to
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn frame_loop<E: Effect>(effect: &mut E, stdout: &mut BufWriter<Stdout>) -> std::io::Result<()> {
    let mut last_frame = Instant::now();
    let mut accumulator = Duration::ZERO;

    loop {
        if event::poll(Duration::from_millis(1))? {
            let event = event::read()?;
            match &event {
                Event::Key(key_event) => {
                    if key_event.code == KeyCode::Char('q')
                        || key_event.code == KeyCode::Esc
                        || (key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(event::KeyModifiers::CONTROL))
                    {
                        return Ok(());
                    }
                    effect.handle_event(&event);
                }
                Event::Resize(cols, rows) => {
                    effect.resize(*cols as usize, *rows as usize * 2);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => {
                    effect.handle_event(&event);
                }
            }
        }

        let now = Instant::now();
        accumulator += now.duration_since(last_frame);
        last_frame = now;

        // Never run more than three steps to catch up after a stall
        if accumulator > FIXED_DT * 3 {
            accumulator = FIXED_DT * 3;
        }

        while accumulator >= FIXED_DT {
            effect.update(FIXED_DT);
            accumulator -= FIXED_DT;
        }

        effect.render(stdout)?;
    }
}

fn run_in_screen<E: Effect>(
    config: &SkyConfig,
    stdout: &mut BufWriter<Stdout>,
) -> std::io::Result<()> {
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All), EnableMouseCapture)?;

    let (cols, rows) = terminal::size()?;
    log::info!("starting on a {}x{} terminal", cols, rows);
    let mut effect = E::new(cols as usize, rows as usize * 2, config);

    frame_loop(&mut effect, stdout)
}

fn run_effect<E: Effect>(config: &SkyConfig) -> std::io::Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    // Everything after raw mode goes through the teardown below
    terminal::enable_raw_mode()?;
    let result = run_in_screen::<E>(config, &mut stdout);

    let restored = execute!(stdout, Show, LeaveAlternateScreen, DisableMouseCapture);
    terminal::disable_raw_mode()?;

    result.and(restored)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let mut config = SkyConfig::load(cli.config.as_deref()).with_context(|| match &cli.config {
        Some(path) => format!("failed to load config from {}", path.display()),
        None => "failed to build default config".to_string(),
    })?;
    config.apply_overrides(cli.bg_color.as_deref(), cli.launch_period, cli.seed)?;
    config.validate().context("invalid configuration")?;

    if cli.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    log::info!(
        "launch period {} ms, {} sparkles, {} lanterns",
        config.fireworks.launch_period_ms,
        config.ambient.count,
        config.lanterns.count
    );

    match cli.effect {
        EffectKind::Festival => run_effect::<effects::festival::FestivalEffect>(&config),
        EffectKind::Fireworks => run_effect::<effects::fireworks::FireworksEffect>(&config),
    }
    .context("terminal error")?;

    Ok(())
}
