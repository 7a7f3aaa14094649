use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "autopress")]
#[command(about = "Watches a page control and presses it again whenever it goes idle")]
#[command(version)]
struct Cli {
    /// Config file describing what to watch
    config: PathBuf,

    /// Play a chime when the control leaves its busy state
    #[arg(long)]
    sound: bool,

    /// Run in headless mode (overrides config)
    #[arg(long)]
    headless: bool,

    /// Set a parameter (can be used multiple times)
    #[arg(short = 'P', long = "param", value_name = "KEY=VALUE")]
    params: Vec<String>,

    /// Verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate config without running
    #[arg(long)]
    check: bool,

    /// Quiet mode (only errors)
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> autopress::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else {
        match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    // Parse parameters
    let params = autopress::Params::from_args(&cli.params)?;

    // Load and validate config with parameters
    let mut config = autopress::Config::load_with_params(&cli.config, &params)?;

    if cli.check {
        println!("Config valid: {}", config.name);
        println!("  Target: {}", config.target.url);
        println!("  Control: {}", config.watch.button_selector);
        println!("  Input: {}", config.watch.textarea_selector);
        println!("  Fill text: {:?}", config.watch.fill_text);
        println!(
            "  Interval: {}-{}ms",
            config.watch.min_interval_ms, config.watch.max_interval_ms
        );
        if !config.params.is_empty() {
            println!("  Parameters: {}", config.params.len());
            for (name, def) in &config.params {
                let req = if def.required { " (required)" } else { "" };
                let desc = def.description.as_deref().unwrap_or("");
                println!("    - {}{}: {}", name, req, desc);
            }
        }
        return Ok(());
    }

    // Override headless if specified
    if cli.headless {
        config.browser.headless = true;
    }

    println!("Watching: {}", config.name);
    if cli.sound {
        println!("  Chime on busy -> ready");
    }

    let mut runner = autopress::Runner::new(&config).await?;
    runner.start(cli.sound).await;

    println!("  Press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;
    println!();

    runner.stop().await;
    runner.close().await?;

    Ok(())
}
