//! stylemate - face-shape / personal-tone analysis and style recommendations

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use style_mate::render::{JsonLinesSink, RenderEvent, RenderSink};
use style_mate::{
    format_percent, Catalog, Category, ConfiguredLoader, RecommendationEntry, StyleMate,
    StyleMateConfig,
};

#[path = "../ui.rs"]
mod ui;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Output format for render events.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// UI mode: auto, plain, or pretty.
    #[arg(long, value_enum, default_value_t = ui::UiMode::Auto)]
    ui: ui::UiMode,
    /// Use stub models, detector and camera (no model files needed).
    #[arg(long, env = "STYLEMATE_STUB")]
    stub: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyse one uploaded image.
    Analyze {
        image: PathBuf,
        /// Classifier slot: 1 = face type, 2 = personal tone.
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
        model: u8,
    },
    /// Run the live capture loop until Ctrl-C or --frames ticks.
    Live {
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
        model: u8,
        /// Stop after this many ticks.
        #[arg(long)]
        frames: Option<u64>,
    },
    /// Show the recommendation for a label directly.
    Recommend {
        /// "Face Type" or "Personal Tone".
        #[arg(long)]
        category: Category,
        #[arg(long)]
        label: String,
    },
    /// Print the recommendation catalog as JSON.
    Catalog,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Human-readable render output on stdout.
struct TextSink;

impl RenderSink for TextSink {
    fn render(&mut self, event: RenderEvent) {
        match event {
            RenderEvent::ShowAdvisory { kind, detail } => {
                let tag = if kind.is_warning() { "!" } else { "-" };
                println!("{} {}", tag, detail);
            }
            RenderEvent::ShowRankedResults { model, predictions } => {
                println!("{}", model);
                for (rank, prediction) in predictions.iter().enumerate() {
                    println!(
                        "  {}. {:<10} {:>6}",
                        rank + 1,
                        prediction.label,
                        format_percent(prediction.probability)
                    );
                }
            }
            RenderEvent::ShowRecommendation(rec) => {
                println!("{} recommendation: {}", rec.category, rec.resolved_label);
                match rec.entry {
                    RecommendationEntry::HairStyle(entry) => {
                        println!("  {}", entry.summary);
                        println!("  short: {} [{}]", entry.short, entry.short_image);
                        println!("  long:  {} [{}]", entry.long, entry.long_image);
                    }
                    RecommendationEntry::ColorPalette(entry) => {
                        println!("  {}", entry.summary);
                        println!("  hair:     {}", entry.hair);
                        println!("  clothing: {}", entry.clothing);
                        println!("  makeup:   {}", entry.makeup);
                        println!("  palette:  {}", entry.image);
                    }
                }
            }
            RenderEvent::ShowFace { bbox } => {
                println!(
                    "- face detected at ({:.0}, {:.0}) {:.0}x{:.0}",
                    bbox.x, bbox.y, bbox.width, bbox.height
                );
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let ui = ui::Ui::new(args.ui, std::io::stderr().is_terminal());

    let config = if args.stub {
        StyleMateConfig::stub()
    } else {
        StyleMateConfig::load()?
    };
    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };

    if let Command::Catalog = args.command {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    let sink: Box<dyn RenderSink> = match args.format {
        OutputFormat::Text => Box::new(TextSink),
        OutputFormat::Json => Box::new(JsonLinesSink::new(std::io::stdout())),
    };
    let loader = Box::new(ConfiguredLoader::from_config(&config));
    let mut app = StyleMate::new(loader, catalog, sink);

    match args.command {
        Command::Analyze { image, model } => {
            app.load_upload_path(&image)?;
            app.switch_model_index(model)?;
            let stage = ui.stage("Loading models");
            if let Err(e) = app.initialize() {
                stage.fail("initialization failed");
                return Err(e);
            }
            drop(stage);
            let outcome = app.process_upload()?;
            log::info!("analysis finished: {:?}", outcome);
        }
        Command::Live { model, frames } => {
            app.switch_model_index(model)?;
            run_live(&mut app, &ui, frames, config.frame_interval())?;
        }
        Command::Recommend { category, label } => {
            app.manual_select(category, &label)?;
        }
        Command::Catalog => {}
    }
    Ok(())
}

fn run_live<S: RenderSink>(
    app: &mut StyleMate<S>,
    ui: &ui::Ui,
    frames: Option<u64>,
    interval: std::time::Duration,
) -> Result<()> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = interrupted.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("error setting Ctrl-C handler")?;

    let stage = ui.stage("Starting live analysis");
    if let Err(e) = app.toggle_running() {
        stage.fail("initialization failed");
        return Err(e);
    }
    drop(stage);
    if app.is_degraded() {
        log::warn!("running without a face detector");
    }

    let mut ticks = 0u64;
    while !interrupted.load(Ordering::SeqCst) {
        if frames.is_some_and(|limit| ticks >= limit) {
            break;
        }
        let outcome = app.tick()?;
        ticks += 1;
        log::debug!("tick {} -> {:?}", ticks, outcome);
        std::thread::sleep(interval);
    }

    app.stop();
    if interrupted.load(Ordering::SeqCst) {
        log::info!("interrupted after {} ticks", ticks);
    }
    Ok(())
}
