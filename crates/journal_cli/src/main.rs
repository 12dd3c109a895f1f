//! CLI probe for the journal core.
//!
//! # Responsibility
//! - Open (and on first use seed) the configured journal database.
//! - Print recent entries, or entries matching a search argument, so core
//!   wiring can be checked without a UI.

use journal_core::query::body_preview;
use journal_core::{
    open_seeded_db, EntryFilter, EntryService, JournalConfig, RepoError, SortOrder,
    SqliteEntryRepository, SqliteTagRepository, TagService,
};
use log::error;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let config = JournalConfig::from_env();

    if let Err(err) = config.init_logging() {
        eprintln!("logging disabled: {err}");
    }

    match run(&config, std::env::args().skip(1).collect::<Vec<_>>().join(" ")) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &JournalConfig, search_text: String) -> Result<(), Box<dyn Error>> {
    println!("journal_core version={}", journal_core::core_version());
    println!("database={}", config.db_path.display());

    let conn = match open_seeded_db(&config.db_path) {
        Ok(conn) => conn,
        Err(RepoError::Db(err)) if err.is_busy() => {
            return Err(format!(
                "journal database `{}` is locked by another process",
                config.db_path.display()
            )
            .into());
        }
        Err(err) => return Err(err.into()),
    };
    let entries = EntryService::new(SqliteEntryRepository::new(&conn));
    let tags = TagService::new(
        SqliteTagRepository::new(&conn),
        SqliteEntryRepository::new(&conn),
    );

    let listed = if search_text.trim().is_empty() {
        entries.get_recent_entries(None)?
    } else {
        let filter = EntryFilter::default().with_search_text(search_text);
        entries.browse_entries(&filter, SortOrder::DateNewest)?
    };

    for entry in &listed {
        let tag_names: Vec<String> = tags
            .get_tags_by_ids(&entry.tag_ids)?
            .into_iter()
            .map(|tag| tag.name)
            .collect();
        println!(
            "#{} {} [{}] {} tags=[{}]",
            entry.id,
            entry.date_created.format("%b %-d, %Y"),
            entry.kind,
            entry.title,
            tag_names.join(", ")
        );
        println!("    {}", body_preview(&entry.body));
    }
    println!("{} entries", listed.len());

    Ok(())
}
