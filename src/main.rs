//! Mushaf - command line for ingestion and store maintenance

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mushaf_lib::config::CONFIG_FILE_NAME;
use mushaf_lib::{db, reader, AppState, Config, Ingester};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "mushaf",
    about = "Ingest and maintain the Quran text store"
)]
struct Cli {
    /// Path to a JSON config file
    #[arg(long, global = true, env = "MUSHAF_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory holding the database
    #[arg(long, global = true, env = "MUSHAF_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Clear the store and ingest everything
    Ingest {
        /// Only fetch verses and words for these chapters
        #[arg(long = "chapter")]
        chapters: Vec<u32>,
    },
    /// Fetch word annotations, falling back to heuristics
    Words {
        #[arg(long = "chapter")]
        chapters: Vec<u32>,
    },
    /// Regenerate all words from stored verse text
    RebuildWords {},
    /// Refresh Bengali chapter names and verse translations
    TranslationsBn {
        #[arg(long = "chapter")]
        chapters: Vec<u32>,
    },
    /// Print record counts
    Stats {},
    /// Print the audio URL of a verse
    Audio {
        chapter: u32,
        verse: u32,
        #[arg(long)]
        reciter: Option<u32>,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("Failed to load {:?}", path))?,
        None => Config::load(&PathBuf::from(CONFIG_FILE_NAME))?,
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    Ok(config)
}

fn ingester<'a>(
    source: &'a mushaf_lib::HttpSource,
    config: &Config,
    chapters: &[u32],
) -> Ingester<'a, mushaf_lib::HttpSource> {
    let ingester = Ingester::new(source, config);
    if chapters.is_empty() {
        ingester
    } else {
        ingester.with_chapters(chapters.iter().copied())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    mushaf_lib::init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let state = AppState::new(config).context("Failed to initialize store")?;

    match &cli.command {
        Commands::Ingest { chapters } => {
            let source = state.http_source()?;
            let mut conn = state.get_db_connection()?;
            ingester(&source, &state.config, chapters)
                .run_full(&mut conn)
                .await
                .context("Ingestion failed")?;
        }
        Commands::Words { chapters } => {
            let source = state.http_source()?;
            let mut conn = state.get_db_connection()?;
            ingester(&source, &state.config, chapters)
                .words(&mut conn)
                .await
                .context("Word ingestion failed")?;
        }
        Commands::RebuildWords {} => {
            let mut conn = state.get_db_connection()?;
            mushaf_lib::rebuild_words(&mut conn).context("Word rebuild failed")?;
        }
        Commands::TranslationsBn { chapters } => {
            let source = state.http_source()?;
            let mut conn = state.get_db_connection()?;
            ingester(&source, &state.config, chapters)
                .translations_bn(&mut conn)
                .await
                .context("Bengali translation refresh failed")?;
        }
        Commands::Stats {} => {
            let conn = state.get_db_connection()?;
            let stats = reader::stats(&conn)?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Audio {
            chapter,
            verse,
            reciter,
        } => {
            let conn = state.get_db_connection()?;
            let Some(stored) = db::find_verse(&conn, *chapter, *verse)? else {
                bail!("Verse {}:{} not found", chapter, verse);
            };
            let audio = reader::resolve_audio(&conn, stored.id, *reciter)?;
            println!("{}", serde_json::to_string_pretty(&audio)?);
        }
    }

    Ok(())
}
