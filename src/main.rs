use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use jokexp::config::Config;
use jokexp::layout::wrap;
use jokexp::{
    DiskStore, DisplayState, ExportAttempt, ExportPipeline, FontBook, HttpJokeSource, JokeScreen,
    Logo, NullShare, Px, ResvgSurface, ShareOutcome, ShareSheet, SystemShare,
};

#[derive(Parser, Debug)]
#[command(name = "jokexp", version, about = "Blague de Papa.exe: jokes on a retro desktop, shared as PNG")]
struct Cli {
    /// Configuration file (defaults to <config dir>/jokexp/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log progress
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log everything
    #[arg(long, global = true)]
    debug: bool,

    /// Never open the share sheet
    #[arg(long, global = true)]
    no_share: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive joke window (default)
    Run,
    /// Print one joke and exit
    Fetch,
    /// Export a joke image once and share it
    Export {
        /// Use this text instead of fetching a joke
        #[arg(long)]
        text: Option<String>,
    },
    /// Show how a text would be wrapped on the canvas
    Wrap {
        text: String,
        #[arg(long)]
        width: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(log_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Wrap { text, width } => {
            for line in wrap(&text, width.unwrap_or(config.canvas.max_line_length)) {
                println!("{line}");
            }
            Ok(())
        }
        Command::Fetch => {
            let mut screen = build_screen(&config, cli.no_share)?;
            screen.next_joke().await;
            println!("{}", screen.joke());
            Ok(())
        }
        Command::Export { text } => {
            let mut screen = build_screen(&config, cli.no_share)?;
            match text {
                Some(text) => screen.set_joke(text),
                None => screen.next_joke().await,
            }
            match screen.share_image().await {
                ExportAttempt::Completed(outcome) => {
                    draw(&screen, config.viewport_width);
                    tracing::info!(?outcome, "export finished");
                    Ok(())
                }
                ExportAttempt::Failed | ExportAttempt::Ignored => bail!("the joke image could not be exported"),
            }
        }
        Command::Run => {
            let screen = build_screen(&config, cli.no_share)?;
            run_interactive(screen, config.viewport_width).await
        }
    }
}

fn build_screen(config: &Config, no_share: bool) -> anyhow::Result<JokeScreen> {
    let mut fonts = FontBook::system();
    for font in &config.fonts {
        fonts
            .load_file(font)
            .with_context(|| format!("failed to load font {}", font.display()))?;
    }

    if !config
        .canvas
        .font_families()
        .any(|family| fonts.has_family(family))
    {
        tracing::warn!(
            families = %config.canvas.font_family,
            "none of the canvas fonts are installed, jokes will use a fallback face"
        );
    }

    let logo = match &config.logo {
        Some(path) => Logo::new_from_disk(path)
            .with_context(|| format!("failed to load logo {}", path.display()))?,
        None => Logo::bundled(),
    };

    let share: Arc<dyn ShareSheet> = if no_share {
        Arc::new(NullShare)
    } else {
        Arc::new(SystemShare)
    };

    let pipeline = ExportPipeline::new(
        Arc::new(ResvgSurface::new(fonts)),
        Arc::new(DiskStore),
        share,
        config.export_path()?,
    )
    .with_share_settings(config.share.clone());

    let source = HttpJokeSource::new(config.api_url.as_str(), config.request_timeout())
        .context("failed to create the HTTP client")?;

    Ok(JokeScreen::new(
        Arc::new(source),
        Arc::new(pipeline),
        config.canvas.clone(),
        Some(logo),
    )
    .with_fallback(config.fallback_joke.as_str()))
}

fn draw(screen: &JokeScreen, viewport_width: Px) {
    println!();
    println!("== Blague de Papa.exe ==");
    match screen.display() {
        DisplayState::ShowingCanvas => {
            for line in screen.canvas().lines {
                println!("  {}", line.text);
            }
            println!();
            println!("[n] Obtenir une autre blague  [s] Partager l'image  [q] Quitter");
        }
        DisplayState::ShowingImage(image) => {
            let (width, height) = image.display_size(viewport_width);
            println!(
                "  {} ({}x{}, shown at {width}x{height})",
                image.path.display(),
                image.width,
                image.height
            );
            println!();
            println!("[n] Obtenir une autre blague  [e] Modifier l'image  [q] Quitter");
        }
    }
}

async fn run_interactive(mut screen: JokeScreen, viewport_width: Px) -> anyhow::Result<()> {
    screen.next_joke().await;
    draw(&screen, viewport_width);

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = input.next_line().await? {
        match line.trim() {
            "n" | "next" => screen.next_joke().await,
            "s" | "share" => {
                if !screen.can_export() {
                    continue;
                }
                if let ExportAttempt::Completed(ShareOutcome::Unavailable) = screen.share_image().await {
                    println!("(le partage n'est pas disponible, image enregistrée)");
                }
            }
            "e" | "edit" => screen.edit(),
            "q" | "quit" => break,
            "" => continue,
            other => {
                println!("commande inconnue: {other}");
                continue;
            }
        }
        draw(&screen, viewport_width);
    }

    Ok(())
}
