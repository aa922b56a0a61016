mod media;
mod render;
mod source;

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use marquee_core::admin::{build_entry, AdminEditor, EntryForm};
use marquee_core::catalog::Catalog;
use marquee_core::config::{AppConfig, SourceKind};
use marquee_core::models::{MovieId, GENRES};
use marquee_core::playback::MediaSignal;
use marquee_core::repository::CatalogRepository;
use marquee_core::resolver::{LinkResolver, Provider};

use media::SystemOpener;
use source::CatalogSource;

#[derive(Parser, Debug)]
#[command(name = "marquee", version, about = "Browse a shared-link movie catalog")]
struct Args {
    /// Config file to use instead of the per-user one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog source: static, hosted-static, remote or sqlite
    #[arg(long, global = true)]
    source: Option<SourceKind>,

    /// Link provider: direct-download or share-link
    #[arg(long, global = true)]
    provider: Option<Provider>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the catalog, optionally filtered
    List {
        /// Case-insensitive text matched against titles and descriptions
        #[arg(short, long, default_value = "")]
        search: String,
        /// Exact genre (case-insensitive)
        #[arg(short, long, default_value = "")]
        genre: String,
        /// Also print thumbnails and resolved links
        #[arg(long)]
        links: bool,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List the genres present in the catalog
    Genres,
    /// Show the URL a pasted link resolves to
    Resolve { raw: String },
    /// Add an entry (admin)
    Add {
        #[arg(long)]
        title: String,
        /// Share link or file id as pasted
        #[arg(long)]
        link: String,
        #[arg(long, default_value = "")]
        year: String,
        /// One of the listed genres, or "Other" together with --other-genre
        #[arg(long, default_value = "")]
        genre: String,
        #[arg(long, default_value = "")]
        other_genre: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        thumbnail: String,
        /// Print the entry as snapshot JSON instead of saving it
        #[arg(long)]
        export: bool,
    },
    /// Delete an entry (admin)
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Open an entry's video link
    Play { id: String },
    /// Print the effective configuration
    Config {
        /// Print only the config file path
        #[arg(long)]
        path: bool,
        /// Write the effective configuration to the config file
        #[arg(long, conflicts_with = "path")]
        init: bool,
    },
}

fn init_logging(verbose: u8) -> Option<WorkerGuard> {
    let default = match verbose {
        0 => "marquee=warn",
        1 => "marquee=info",
        _ => "marquee=debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let stderr = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let log_dir = AppConfig::log_dir();
    if std::fs::create_dir_all(&log_dir).is_err() {
        tracing_subscriber::registry().with(filter).with(stderr).init();
        return None;
    }
    let appender = tracing_appender::rolling::daily(&log_dir, "marquee.log");
    let (file_writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .init();
    Some(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _guard = init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => AppConfig::load().context("failed to load config")?,
    };
    if let Some(provider) = args.provider {
        config.catalog.provider = provider;
    }
    let kind = args.source.unwrap_or(config.catalog.source);

    match args.command {
        Command::Resolve { raw } => {
            println!("{}", config.resolver().resolve(&raw));
            Ok(())
        }
        Command::Config { path, init } => {
            if path {
                println!("{}", AppConfig::config_path().display());
            } else if init {
                config.catalog.source = kind;
                config.save().context("failed to write config")?;
                println!("Wrote {}", AppConfig::config_path().display());
            } else {
                config.catalog.source = kind;
                print!("{}", toml_string(&config)?);
            }
            Ok(())
        }
        Command::Add {
            title,
            link,
            year,
            genre,
            other_genre,
            description,
            thumbnail,
            export,
        } => {
            let form = EntryForm {
                title,
                year,
                genre,
                custom_genre: other_genre,
                description,
                thumbnail,
                link,
            };
            if export {
                let movie = build_entry(&form)?;
                println!("{}", AdminEditor::export_json(&movie)?);
                return Ok(());
            }
            let mut catalog = open_catalog(&config, kind)?;
            add_entry(&mut catalog, form, &config.resolver()).await
        }
        command => {
            let mut catalog = open_catalog(&config, kind)?;
            catalog.reload().await?;
            run_browse(&mut catalog, command, &config).await
        }
    }
}

type CliCatalog = Catalog<CatalogSource, SystemOpener>;

fn open_catalog(config: &AppConfig, kind: SourceKind) -> Result<CliCatalog> {
    let source = CatalogSource::open(config, kind)?;
    tracing::info!(source = source.name(), provider = %config.catalog.provider, "Catalog opened");
    Ok(Catalog::from_config(source, config, SystemOpener::default()))
}

async fn add_entry(catalog: &mut CliCatalog, form: EntryForm, resolver: &LinkResolver) -> Result<()> {
    if !catalog.repository().is_writable() {
        bail!(
            "the {} source is read-only; use --export to print snapshot JSON instead",
            catalog.repository().name()
        );
    }
    if let Err(e) = catalog.reload().await {
        tracing::warn!(error = %e, "Continuing without a loaded catalog");
    }
    catalog.editor_mut().form = form;
    let preview = catalog.editor().resolved_preview(resolver);
    let entry = catalog.submit_new_entry().await?;
    println!("Added {} ({})", entry.title, entry.id);
    println!("Resolved link: {preview}");
    Ok(())
}

async fn run_browse(catalog: &mut CliCatalog, command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::List {
            search,
            genre,
            links,
            json,
        } => {
            catalog.set_filter(search, genre);
            if json {
                let value = render::catalog_json(catalog.store());
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                render::print_catalog(
                    catalog.store(),
                    links,
                    &config.playback.placeholder_thumbnail,
                );
            }
        }
        Command::Genres => {
            let present = catalog.store().genres();
            if present.is_empty() {
                println!("No genres in the catalog. Form options: {}", GENRES.join(", "));
            } else {
                for genre in present {
                    println!("{genre}");
                }
            }
        }
        Command::Delete { id, yes } => {
            let id = MovieId::new(id);
            let pending = catalog.request_delete(&id)?;
            if !yes && !confirm(&pending.prompt())? {
                catalog.cancel_delete();
                println!("Cancelled.");
                return Ok(());
            }
            catalog.confirm_delete(&id).await?;
            println!("Deleted {}.", pending.title);
        }
        Command::Play { id } => {
            let id = MovieId::new(id);
            let token = catalog
                .select_entry(&id)
                .with_context(|| format!("no movie with id {id}"))?;
            if let Some(detail) = catalog.session_mut().media_mut().take_failure() {
                catalog.media_signal(token, MediaSignal::Failed(detail));
            }
            if let Some(message) = catalog.session().error_message() {
                catalog.close_player();
                bail!(message);
            }
            let session = catalog.session();
            let item = session.active().context("no active session")?;
            if config.playback.autoplay {
                println!("Opened {}", item.title);
            } else {
                println!("{}", item.title);
            }
            println!("{}", session.media().source());
        }
        Command::Resolve { .. } | Command::Config { .. } | Command::Add { .. } => {
            unreachable!("handled before the catalog is loaded")
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

fn toml_string(config: &AppConfig) -> Result<String> {
    let mut shown = config.clone();
    if shown.remote.api_key.is_some() {
        shown.remote.api_key = Some("********".into());
    }
    Ok(toml::to_string_pretty(&shown)?)
}
