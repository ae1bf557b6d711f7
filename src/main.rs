use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use photo_flow::catalog::{AlbumFilter, Catalog};
use photo_flow::config::Configuration;
use photo_flow::events::{Key, KeyEvent, SlideshowEvent, SlideshowInput};
use photo_flow::gallery::GalleryView;
use photo_flow::slideshow::input::KeyboardBus;
use photo_flow::tasks;
use photo_flow::upload::AlbumChoice;

#[derive(Debug, Parser)]
#[command(
    name = "photo-flow",
    version,
    about = "photo gallery with a keyboard-driven slideshow"
)]
struct Args {
    /// Path to YAML config
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Photo catalog (YAML list); overrides `catalog-path`
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,
    /// Album to show ("All" for every photo)
    #[arg(long, value_name = "NAME", default_value = "All")]
    album: String,
    /// Grid tile the slideshow starts from
    #[arg(long, value_name = "INDEX")]
    start: Option<usize>,
    /// Override the autoplay interval (e.g. "2s", "1500ms")
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    autoplay_interval: Option<Duration>,
    /// Add a photo before starting: an image file to embed, or a URL
    #[arg(long, value_name = "FILE_OR_URL")]
    add: Option<String>,
    /// Title for --add (defaults to the file name)
    #[arg(long, value_name = "TITLE", requires = "add")]
    add_title: Option<String>,
    /// Album for --add; created when it does not exist yet
    #[arg(long, value_name = "NAME", requires = "add")]
    add_album: Option<String>,
    /// Print the albums and the filtered grid, then exit
    #[arg(long)]
    list: bool,
    /// With --list, print the filtered photos as JSON
    #[arg(long, requires = "list")]
    json: bool,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    let result = runtime.block_on(run(args));
    // A blocking stdin read may still be pending; don't wait for the next line.
    runtime.shutdown_timeout(Duration::from_millis(200));
    result
}

async fn run(args: Args) -> Result<()> {
    let cfg = Configuration::load_or_default(args.config.as_deref())?;
    tracing::debug!("configuration: {cfg:#?}");

    let catalog = match args.catalog.as_ref().or(cfg.catalog_path.as_ref()) {
        Some(path) => Catalog::from_yaml_file(path)
            .with_context(|| format!("failed to load catalog {}", path.display()))?,
        None => Catalog::sample(),
    };
    tracing::info!(
        photos = catalog.len(),
        albums = catalog.albums().len(),
        "catalog ready"
    );

    let mut gallery = GalleryView::new(catalog);
    if let Some(source) = &args.add {
        add_photo(&mut gallery, &args, source, &cfg.upload.default_album)?;
    }
    gallery.select_album(AlbumFilter::from_label(&args.album));
    if let Some(start) = args.start {
        gallery.select_photo(start);
    }

    if args.list {
        return print_listing(&gallery, args.json);
    }

    let interval = args
        .autoplay_interval
        .unwrap_or(cfg.slideshow.autoplay_interval);
    let controller = gallery
        .launch_slideshow()
        .with_context(|| format!("cannot start slideshow for album {}", args.album))?;
    println!("{}", gallery.summary());
    println!(
        "keys: left, right, space, enter, esc | \
         buttons: prev, next, play, reset, close | loaded, failed"
    );

    let bus = KeyboardBus::new(cfg.slideshow.key_buffer);
    let (input_tx, input_rx) = mpsc::unbounded_channel::<SlideshowInput>(); // Console -> Session
    let (event_tx, event_rx) = mpsc::channel::<SlideshowEvent>(16); // Session -> Console
    let cancel = CancellationToken::new();

    {
        let bus = bus.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; closing slideshow");
            if bus.publish(KeyEvent::from(Key::Escape)) == 0 {
                cancel.cancel();
            }
        });
    }

    let session = tokio::spawn(tasks::session::run(
        controller,
        bus.subscribe(),
        input_rx,
        event_tx,
        cancel.clone(),
        interval,
    ));

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    if let Err(e) = tasks::console::run(stdin, &mut stdout, input_tx, event_rx, cancel.clone())
        .await
        .context("console failed")
    {
        tracing::error!("{e:?}");
    }
    cancel.cancel();

    match session.await {
        Ok(Ok(last)) => {
            tracing::info!(position = last.position, title = %last.photo.title, "last photo")
        }
        Ok(Err(e)) => tracing::error!("session error: {e:?}"),
        Err(e) => tracing::error!("join error: {e}"),
    }
    gallery.slideshow_closed();
    tracing::debug!(subscribers = bus.subscriber_count(), "keyboard bus after close");
    Ok(())
}

/// Fills the upload form from the command line and submits it.
fn add_photo(
    gallery: &mut GalleryView,
    args: &Args,
    source: &str,
    default_album: &str,
) -> Result<()> {
    gallery.open_upload();
    let mut form = gallery.upload_form(default_album);
    if let Some(title) = &args.add_title {
        form.set_title(title);
    }
    if let Some(album) = &args.add_album {
        let choice = if form.albums().contains(album) {
            AlbumChoice::Existing(album.clone())
        } else {
            AlbumChoice::New(album.clone())
        };
        form.set_album(choice);
    }
    if std::path::Path::new(source).is_file() {
        form
            .load_file(source)
            .with_context(|| format!("failed to read {source}"))?;
    } else {
        form.set_url(source);
    }
    let photo = form
        .submit(gallery.catalog_mut())
        .context("failed to add photo")?;
    gallery.close_upload();
    println!("added {} to {} ({})", photo.title, photo.album, photo.id);
    Ok(())
}

fn print_listing(gallery: &GalleryView, json: bool) -> Result<()> {
    let photos = gallery.filtered();
    if json {
        println!("{}", serde_json::to_string_pretty(&photos)?);
        return Ok(());
    }
    println!("# albums: {}", gallery.album_choices().join(", "));
    println!("# {}", gallery.summary());
    for (idx, photo) in photos.iter().enumerate() {
        let marker = if gallery.selected_photo() == Some(idx) { '*' } else { ' ' };
        println!("{marker}{:>3}: [{}] {} ({})", idx, photo.album, photo.title, photo.id);
        if let Some(description) = &photo.description {
            println!("       {description}");
        }
    }
    Ok(())
}
