pub mod analysis;
pub mod args;
pub mod checker;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod filter;
pub mod record;
pub mod server;
pub mod stats;
pub mod utils;

pub use analysis::{analyze, analyze_page};
pub use args::Args;
pub use client::{BacklinkSource, FileSource, SeRankingClient};
pub use error::{Error, Result};
pub use record::{BacklinkRecord, BacklinksPage};
pub use stats::{BacklinkEntry, DomainSummary, RankStats};
