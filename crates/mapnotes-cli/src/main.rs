//! mapnotes: command-line client for the map notes layer.
//!
//! Fetches notes for a region, shows how a viewport would lay them out,
//! and resolves a tap position to the notes under it.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tokio::runtime::Handle;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mapnotes_core::{LatLonBounds, LayerConfig, LayerSettings, MercatorViewport, NoteRecord, PixelPoint};
use mapnotes_feed::{FeedConfig, NoteFetcher, ViewportCache};
use mapnotes_layer::{draws_at, layout_frame, pick_notes, Placement};

#[derive(Parser)]
#[command(name = "mapnotes")]
#[command(author, version, about = "Browse community map notes")]
#[command(propagate_version = true)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

/// Viewport arguments shared by `render` and `pick`.
#[derive(clap::Args)]
struct ViewportArgs {
    /// Center latitude
    #[arg(long, allow_hyphen_values = true)]
    lat: f64,

    /// Center longitude
    #[arg(long, allow_hyphen_values = true)]
    lon: f64,

    /// Zoom level
    #[arg(long)]
    zoom: i32,

    /// Viewport width in pixels
    #[arg(long, default_value_t = 1080)]
    width: u32,

    /// Viewport height in pixels
    #[arg(long, default_value_t = 1920)]
    height: u32,

    /// Display density (pixels per dp)
    #[arg(long, default_value_t = 1.0)]
    density: f32,
}

impl ViewportArgs {
    fn viewport(&self) -> MercatorViewport {
        MercatorViewport::new(self.lat, self.lon, self.zoom, self.width, self.height)
            .with_density(self.density)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the notes in a bounding box
    Fetch {
        /// Bounding box as left,bottom,right,top
        #[arg(long, allow_hyphen_values = true)]
        bbox: String,

        /// Print the notes as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the render tier of every note in a viewport
    Render {
        #[command(flatten)]
        viewport: ViewportArgs,
    },

    /// List the notes under a screen position
    Pick {
        #[command(flatten)]
        viewport: ViewportArgs,

        /// Tap x in pixels
        #[arg(long)]
        x: f32,

        /// Tap y in pixels
        #[arg(long)]
        y: f32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let feed_config = FeedConfig::from_env();
    let layer_config = LayerConfig::from_env();
    let fetcher = NoteFetcher::new(&feed_config).context("Failed to create notes fetcher")?;

    match cli.command {
        Commands::Fetch { bbox, json } => cmd_fetch(&fetcher, &bbox, json).await,
        Commands::Render { viewport } => {
            let cache = viewport_cache(fetcher, &feed_config);
            cmd_render(&cache, &layer_config, &viewport.viewport()).await
        }
        Commands::Pick { viewport, x, y } => {
            let cache = viewport_cache(fetcher, &feed_config);
            cmd_pick(&cache, &layer_config, &viewport.viewport(), PixelPoint::new(x, y)).await
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable.
///
/// `RUST_LOG` overrides the default filter.
fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "mapnotes=info".into());
    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

fn viewport_cache(fetcher: NoteFetcher, config: &FeedConfig) -> ViewportCache {
    ViewportCache::new(Arc::new(fetcher), Handle::current())
        .with_zoom_threshold(config.zoom_threshold)
}

async fn cmd_fetch(fetcher: &NoteFetcher, bbox: &str, json: bool) -> anyhow::Result<()> {
    let bounds = LatLonBounds::from_bbox_str(bbox)?;
    let notes = fetcher
        .try_fetch(bounds.top, bounds.left, bounds.bottom, bounds.right)
        .await
        .context("Failed to fetch notes")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&notes)?);
        return Ok(());
    }

    for note in &notes {
        print_note(note);
    }
    info!(result_count = notes.len(), "Fetched notes");
    Ok(())
}

async fn cmd_render(
    cache: &ViewportCache,
    config: &LayerConfig,
    viewport: &MercatorViewport,
) -> anyhow::Result<()> {
    if !draws_at(config, viewport.zoom) {
        println!(
            "Zoom {} is below the minimum zoom {}, no notes are drawn",
            viewport.zoom,
            config.min_zoom()
        );
        return Ok(());
    }

    let notes = cache.refresh(viewport).await;
    let Some(frame) = layout_frame(config, notes, viewport) else {
        return Ok(());
    };

    let print_tier = |tier: &str, placements: &[Placement]| {
        for placement in placements {
            if let Some(note) = frame.note(placement) {
                println!(
                    "{}\t{}\t{:.0},{:.0}\t{}",
                    tier,
                    note.id,
                    placement.point.x,
                    placement.point.y,
                    placement.state.icon_name()
                );
            }
        }
    };
    print_tier("full", &frame.layout.full);
    print_tier("compact", &frame.layout.compact);

    println!(
        "{} notes fetched, {} full, {} compact",
        frame.notes.len(),
        frame.layout.full.len(),
        frame.layout.compact.len()
    );
    Ok(())
}

async fn cmd_pick(
    cache: &ViewportCache,
    config: &LayerConfig,
    viewport: &MercatorViewport,
    point: PixelPoint,
) -> anyhow::Result<()> {
    let notes = cache.refresh(viewport).await;
    let hits = pick_notes(config, &notes, viewport, point);

    if hits.is_empty() {
        println!("No notes at {:.0},{:.0}", point.x, point.y);
    }
    for note in hits {
        print_note(note);
    }
    Ok(())
}

fn print_note(note: &NoteRecord) {
    let pd = note.point_description();
    println!(
        "#{} [{}] {:.6},{:.6} {}: {}",
        note.id,
        if note.opened { "open" } else { "closed" },
        note.latitude,
        note.longitude,
        pd.type_name,
        pd.name
    );
    for line in note.comment_description_list() {
        for (i, part) in line.lines().enumerate() {
            if i == 0 {
                println!("  - {}", part);
            } else {
                println!("    {}", part);
            }
        }
    }
}
