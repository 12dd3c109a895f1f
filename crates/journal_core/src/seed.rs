//! First-run starter dataset.
//!
//! # Responsibility
//! - Insert the fixed tag and entry set exactly once, when the journal is
//!   empty.
//!
//! # Invariants
//! - Seeding runs only when BOTH collections are empty.
//! - Tags and entries are written in one transaction; a failure leaves both
//!   collections as they were.
//! - Seed entries reference tags by position: tag ids must come out as
//!   `1..=SEED_TAGS.len()` in declaration order, so id sequences are reset
//!   before inserting and verified afterwards.

use crate::db::{open_db, with_transaction};
use crate::model::entry::DEFAULT_ENTRY_TYPE;
use crate::model::tag::{NewTag, TagCategory, TagId};
use crate::repo::entry_repo::{EntryRepository, EntryRow, SqliteEntryRepository};
use crate::repo::tag_repo::{SqliteTagRepository, TagRepository};
use crate::repo::{RepoError, RepoResult};
use chrono::{DateTime, TimeZone, Utc};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;

/// Seed tags, in insertion (= id) order.
pub const SEED_TAGS: &[(&str, TagCategory)] = &[
    ("Lakers", TagCategory::Team),
    ("Celtics", TagCategory::Team),
    ("Warriors", TagCategory::Team),
    ("Bucks", TagCategory::Team),
    ("Nuggets", TagCategory::Team),
    ("Suns", TagCategory::Team),
    ("Knicks", TagCategory::Team),
    ("Bulls", TagCategory::Team),
    ("Durant", TagCategory::Player),
    ("James", TagCategory::Player),
    ("Curry", TagCategory::Player),
    ("Antetokounmpo", TagCategory::Player),
    ("Jokic", TagCategory::Player),
    ("Stats", TagCategory::Custom),
    ("Games", TagCategory::Custom),
    ("Players", TagCategory::Custom),
    ("Rookies", TagCategory::Custom),
    ("Playoffs", TagCategory::Custom),
    ("Free Agency", TagCategory::Custom),
    ("Awards", TagCategory::Custom),
    ("Defense", TagCategory::Custom),
];

struct SeedEntry {
    title: &'static str,
    body: &'static str,
    /// Positions in `SEED_TAGS`, 1-based.
    tag_ids: &'static [TagId],
    /// (month, day, hour, minute) in 2025, UTC.
    created: (u32, u32, u32, u32),
}

const SEED_ENTRIES: &[SeedEntry] = &[
    SeedEntry {
        title: "Durant's Scoring Milestone",
        body: "<p>Kevin Durant reached 30,000 career points tonight, becoming only the 7th player in NBA history to reach this milestone. It was a special moment in an otherwise routine regular season game against the Rockets.</p><p>Durant needed 18 points coming into tonight's game to reach the mark. He hit the milestone on a smooth mid-range jumper from his favorite spot on the right elbow with 4:32 remaining in the second quarter.</p><p>The 30K club is extremely exclusive, with Durant joining LeBron James, Kareem Abdul-Jabbar, Karl Malone, Kobe Bryant, Michael Jordan, and Dirk Nowitzki. What makes Durant's achievement especially impressive is his efficiency - he has the highest career field goal percentage and three-point percentage of anyone in this elite group.</p><p>At 36 years old, Durant shows no signs of slowing down. He's averaging 26.3 PPG this season on 52% shooting. If he maintains this level of play for another 2-3 seasons, he could potentially climb as high as 4th on the all-time scoring list.</p>",
        tag_ids: &[9, 14],
        created: (4, 18, 10, 32),
    },
    SeedEntry {
        title: "Lakers vs Celtics Game Analysis",
        body: "<p>The Lakers showed impressive defensive coordination in tonight's game against the Celtics. LeBron's leadership was on full display as they contained Tatum for most of the night. Their help defense rotation was the best I've seen all season.</p><p>Davis anchored the paint with 4 blocks, but it was the perimeter defense from Reaves and Russell that really made the difference. They forced the Celtics into tough shots all night.</p><p>On offense, the Lakers' ball movement created open looks consistently. They finished with 28 assists on 42 made field goals. LeBron's vision in transition led to several highlight plays.</p><p>This was a statement win against the defending champions and shows the Lakers might have the defensive identity needed for a deep playoff run.</p>",
        tag_ids: &[1, 2, 16],
        created: (4, 23, 9, 15),
    },
    SeedEntry {
        title: "Top 5 MVP Candidates",
        body: "<p>My updated MVP rankings after this week's games. Jokić continues to dominate with his all-around play, averaging a near triple-double while leading the Nuggets to the West's top seed.</p><p>1. Nikola Jokić - Still the front-runner with his consistent excellence</p><p>2. Luka Dončić - Carrying the Mavs with historic offensive numbers</p><p>3. Giannis Antetokounmpo - The Bucks have surged with his return to form</p><p>4. Shai Gilgeous-Alexander - Leading the Thunder's surprising rise</p><p>5. Joel Embiid - Missing games hurts his case, but dominant when on the floor</p><p>I'm particularly impressed with SGA's defensive improvement this season. He's gone from being just an offensive star to a complete two-way player.</p>",
        tag_ids: &[13, 21],
        created: (4, 21, 14, 45),
    },
    SeedEntry {
        title: "Conference Finals Prediction",
        body: "<p>I'm predicting the Nuggets will defeat the Timberwolves in 6 games. Denver's experience and home court advantage will be the deciding factors.</p><p>The Nuggets' championship experience from last year gives them a mental edge in close games. Jokić continues to be unstoppable, and Murray has elevated his game in the playoffs once again.</p><p>Minnesota's defense has been spectacular, but they struggle with consistent half-court offense in crunch time. Edwards needs more help when teams lock in on him.</p><p>Denver in 6 is my official prediction, with Jokić averaging close to a triple-double for the series.</p>",
        tag_ids: &[5, 19],
        created: (4, 20, 8, 30),
    },
    SeedEntry {
        title: "Rookie Performance Review",
        body: "<p>The 2024 rookie class has been impressive so far. Thompson is averaging 16.8 PPG and 7.2 RPG while showing great defensive instincts.</p><p>Miller has been the most NBA-ready, contributing immediately to a playoff team. His shooting has translated perfectly to the pro level.</p><p>Wagner shows flashes of brilliance but struggles with consistency. His ceiling might be the highest of the group.</p><p>The biggest surprise has been Johnson, a second-round pick who's already carved out a rotation role with his energy and defensive versatility.</p><p>Overall, this looks like one of the deeper rookie classes in recent memory, with 7-8 players who could be long-term starters or better.</p>",
        tag_ids: &[17, 18],
        created: (4, 15, 16, 20),
    },
];

/// What [`ensure_seeded`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded { tags: usize, entries: usize },
    /// At least one collection had data; nothing was written.
    AlreadyPopulated,
}

/// Seed tags as insert inputs, in id order.
pub fn seed_tags() -> Vec<NewTag> {
    SEED_TAGS
        .iter()
        .map(|(name, category)| NewTag::new(*name, *category))
        .collect()
}

/// Seed entries as insert rows; `date_modified` equals `date_created`.
pub fn seed_entries() -> RepoResult<Vec<EntryRow>> {
    SEED_ENTRIES
        .iter()
        .map(|seed| {
            let created = seed_instant(seed.created)?;
            Ok(EntryRow {
                title: seed.title.to_string(),
                body: seed.body.to_string(),
                kind: DEFAULT_ENTRY_TYPE.to_string(),
                tag_ids: seed.tag_ids.to_vec(),
                date_created: created,
                date_modified: created,
            })
        })
        .collect()
}

/// Seeds the journal when both collections are empty.
///
/// The emptiness check, the clear and both bulk inserts share one immediate
/// transaction.
pub fn ensure_seeded(conn: &mut Connection) -> RepoResult<SeedOutcome> {
    let result = with_transaction(conn, |tx| -> RepoResult<SeedOutcome> {
        let tags = SqliteTagRepository::new(tx);
        let entries = SqliteEntryRepository::new(tx);

        if tags.count_tags()? > 0 || entries.count_entries()? > 0 {
            return Ok(SeedOutcome::AlreadyPopulated);
        }

        tags.clear_tags()?;
        entries.clear_entries()?;
        tx.execute(
            "DELETE FROM sqlite_sequence WHERE name IN ('tags', 'entries');",
            [],
        )?;

        let tag_ids = tags.bulk_insert_tags(&seed_tags())?;
        let expected: Vec<TagId> = (1..).take(SEED_TAGS.len()).collect();
        if tag_ids != expected {
            return Err(RepoError::InvalidData(format!(
                "seed tag ids {tag_ids:?} do not match positional ids {expected:?}"
            )));
        }

        let entry_ids = entries.bulk_insert_entries(&seed_entries()?)?;
        Ok(SeedOutcome::Seeded {
            tags: tag_ids.len(),
            entries: entry_ids.len(),
        })
    });

    match &result {
        Ok(SeedOutcome::Seeded { tags, entries }) => {
            info!("event=seed module=seed status=ok tags={tags} entries={entries}");
        }
        Ok(SeedOutcome::AlreadyPopulated) => {
            info!("event=seed module=seed status=skipped reason=not_empty");
        }
        Err(err) => {
            error!("event=seed module=seed status=error error={err}");
        }
    }

    result
}

/// Opens a journal database file and seeds it on first use.
pub fn open_seeded_db(path: impl AsRef<Path>) -> RepoResult<Connection> {
    let mut conn = open_db(path)?;
    ensure_seeded(&mut conn)?;
    Ok(conn)
}

fn seed_instant((month, day, hour, minute): (u32, u32, u32, u32)) -> RepoResult<DateTime<Utc>> {
    Utc.with_ymd_and_hms(2025, month, day, hour, minute, 0)
        .single()
        .ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid seed date 2025-{month:02}-{day:02} {hour:02}:{minute:02}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::{seed_entries, SEED_ENTRIES, SEED_TAGS};

    #[test]
    fn seed_entries_reference_existing_tag_positions() {
        for seed in SEED_ENTRIES {
            for tag_id in seed.tag_ids {
                let position = usize::try_from(*tag_id).unwrap();
                assert!(
                    (1..=SEED_TAGS.len()).contains(&position),
                    "seed entry `{}` references tag {tag_id}",
                    seed.title
                );
            }
        }
    }

    #[test]
    fn seed_entry_dates_are_valid() {
        let entries = seed_entries().unwrap();
        assert_eq!(entries.len(), SEED_ENTRIES.len());
        assert!(entries
            .iter()
            .all(|entry| entry.date_created == entry.date_modified));
    }
}
