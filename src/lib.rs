//! Mushaf - Quran text ingestion, word enrichment and read store
//!
//! Backend library that pulls chapter, verse and word data from public
//! sources into SQLite, fills gaps with heuristics, and serves read views,
//! notes and bookmarks.

// Text heuristics, leaf modules first
pub mod text;
pub mod transliterate;
pub mod lexicon;
pub mod roots;
pub mod pos;

pub mod error;
pub mod models;
pub mod reference;
pub mod db;
pub mod bismillah;
pub mod enrich;
pub mod sources;
pub mod ingest;
pub mod reader;
pub mod notes;
pub mod config;
pub mod state;

pub use error::{MushafError, Result};
pub use state::AppState;
pub use config::{get_data_dir, Config};
pub use db::{CorpusStats, VerseFilter};
pub use ingest::{rebuild_words, ChapterState, IngestReport, Ingester};
pub use models::{
    Bookmark, BookmarkType, Chapter, OpeningFormula, Paged, Recitation, RecitationStyle,
    RevelationType, Tafsir, TafsirSource, UserNote, Verse, Word,
};
pub use pos::PartOfSpeech;
pub use reader::{AudioInfo, ChapterWithVerses, VerseView, WordDetail};
pub use sources::{ApiEndpoints, HttpSource, JsonSource};

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber; `RUST_LOG` overrides the `info` default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
