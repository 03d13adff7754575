mod app;
mod config;
mod currency;
mod logging;
mod tip;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

use app::App;
use config::Config;
use tip::TipTier;

#[derive(Parser, Debug)]
#[command(name = "tiptime")]
#[command(about = "Tip calculator: bill amount, tip percentage, optional round-up")]
#[command(version)]
struct Cli {
    /// Config file path (default: ~/.config/tiptime/config.toml)
    #[arg(long)]
    config: Option<String>,

    /// Currency locale, e.g. en-US or pt_BR.UTF-8 (overrides config)
    #[arg(long)]
    locale: Option<String>,

    /// Theme preset (overrides config)
    #[arg(long)]
    theme: Option<String>,

    /// Compute once for this cost and print the result instead of starting the TUI
    #[arg(long, allow_hyphen_values = true)]
    cost: Option<String>,

    /// Tip percentage: 20, 18 or 15 (anything else means 15)
    #[arg(long, short, requires = "cost")]
    tip: Option<String>,

    /// Round the tip up to a whole currency unit
    #[arg(long, short, requires = "cost")]
    round_up: bool,

    /// Print the result as JSON
    #[arg(long, requires = "cost")]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.cost {
        Some(_) => logging::init_stderr(),
        None => logging::init_file()?,
    }

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| Config::default_path().to_string_lossy().into_owned());
    let mut config = Config::load(&config_path)?;
    if let Some(ref locale) = cli.locale {
        config.currency.locale = Some(locale.clone());
    }
    if let Some(ref theme) = cli.theme {
        config.appearance.theme = theme.clone();
    }

    match cli.cost {
        Some(ref cost) => run_once(&cli, cost, &config),
        None => run_tui(config),
    }
}

/// One-shot mode: print the result line (empty for no value) and exit
fn run_once(cli: &Cli, cost: &str, config: &Config) -> Result<()> {
    let tier = match cli.tip.as_deref() {
        Some(tip) => TipTier::resolve(Some(tip)),
        None => config.default_tier(),
    };
    let round_up = cli.round_up || config.calculator.round_up;

    let result = config.calculator().compute(cost, tier, round_up);
    if result.is_no_value() {
        tracing::warn!("Cost {:?} is not a number, nothing to print", cost);
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to serialize result")?;
        println!("{}", json);
    } else {
        println!("{}", result.display_text());
    }
    Ok(())
}

fn run_tui(config: Config) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    tracing::info!("Starting with {} tip", app.tier());

    // Run main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        if app.should_quit() {
            return Ok(());
        }
    }
}
