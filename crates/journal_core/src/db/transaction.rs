//! All-or-nothing write scope spanning the `entries` and `tags` collections.

use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Runs `work` inside one immediate SQLite transaction.
///
/// Commits when `work` returns `Ok`; otherwise the transaction is dropped and
/// rolled back, so none of the writes made through it become visible.
///
/// The error type only needs a conversion from `rusqlite::Error` so callers
/// can keep their own layer error (`RepoError`, service errors).
pub fn with_transaction<T, E, F>(conn: &mut Connection, work: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<rusqlite::Error>,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let value = work(&tx)?;
    tx.commit()?;
    Ok(value)
}
