//! Card/meta repository contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Persist authored card fields keyed by stable card id, with
//!   upsert-on-save semantics.
//! - Persist the singleton newsletter intro row.
//!
//! # Invariants
//! - `upsert_cards` replaces all given rows in one transaction.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::{migrations, DbError};
use crate::model::card::{CardContent, CardId, CardValidationError};
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for repository APIs.
pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for card persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(CardValidationError),
    Db(DbError),
    NotFound(CardId),
    InvalidData(String),
    /// Connection has not been migrated to the version this binary needs.
    UninitializedStore {
        expected_version: u32,
        actual_version: u32,
    },
    MissingTable(&'static str),
    MissingColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "card not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted card data: {message}"),
            Self::UninitializedStore {
                expected_version,
                actual_version,
            } => write!(
                f,
                "store not ready: schema version {actual_version}, expected {expected_version}"
            ),
            Self::MissingTable(table) => write!(f, "store is missing required table `{table}`"),
            Self::MissingColumn { table, column } => {
                write!(f, "store table `{table}` is missing column `{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CardValidationError> for RepoError {
    fn from(value: CardValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Stored row shape for one card.
///
/// Presentation-only fields (`lab`, art assets) stay in the seed table and
/// are never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRow {
    pub card_id: CardId,
    pub title: String,
    pub content: String,
    pub main_image: String,
}

impl CardRow {
    /// Projects the authored fields of a card into its stored shape.
    pub fn from_card(card: &CardContent) -> Self {
        Self {
            card_id: card.id,
            title: card.title.clone(),
            content: card.description.clone(),
            main_image: card.main_image.clone(),
        }
    }
}

/// Repository interface for card content persistence.
pub trait CardRepository {
    /// Upserts all given rows, keyed by card id, in one transaction.
    fn upsert_cards(&mut self, rows: &[CardRow]) -> RepoResult<()>;
    /// Gets one stored row by card id.
    fn get_card(&self, id: CardId) -> RepoResult<Option<CardRow>>;
    /// Lists all stored rows ordered by card id.
    fn list_cards(&self) -> RepoResult<Vec<CardRow>>;
}

/// Repository interface for the singleton newsletter meta row.
pub trait MetaRepository {
    /// Loads the intro text, `None` when never saved.
    fn load_intro(&self) -> RepoResult<Option<String>>;
    /// Upserts the intro text.
    fn save_intro(&mut self, intro_text: &str) -> RepoResult<()>;
}

// Tables and columns the repository relies on.
const REQUIRED_TABLES: &[(&str, &[&str])] = &[
    (
        "card_content",
        &["card_id", "title", "content", "main_image", "updated_at"],
    ),
    ("newsletter_meta", &["id", "intro_text", "updated_at"]),
];

/// SQLite-backed card/meta repository.
pub struct SqliteCardRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteCardRepository<'conn> {
    /// Constructs a repository from a migrated, ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_store_ready(conn)?;
        Ok(Self { conn })
    }
}

impl CardRepository for SqliteCardRepository<'_> {
    fn upsert_cards(&mut self, rows: &[CardRow]) -> RepoResult<()> {
        for row in rows {
            if row.card_id <= 0 {
                return Err(CardValidationError::NonPositiveId(row.card_id).into());
            }
        }

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO card_content (card_id, title, content, main_image, updated_at)
                 VALUES (?1, ?2, ?3, ?4, strftime('%s', 'now') * 1000)
                 ON CONFLICT(card_id) DO UPDATE SET
                    title = excluded.title,
                    content = excluded.content,
                    main_image = excluded.main_image,
                    updated_at = excluded.updated_at;",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.card_id,
                    row.title.as_str(),
                    row.content.as_str(),
                    row.main_image.as_str(),
                ])?;
            }
        }
        tx.commit()?;

        Ok(())
    }

    fn get_card(&self, id: CardId) -> RepoResult<Option<CardRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT card_id, title, content, main_image
             FROM card_content
             WHERE card_id = ?1;",
        )?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_card_row(row)?));
        }
        Ok(None)
    }

    fn list_cards(&self) -> RepoResult<Vec<CardRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT card_id, title, content, main_image
             FROM card_content
             ORDER BY card_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut cards = Vec::new();
        while let Some(row) = rows.next()? {
            cards.push(parse_card_row(row)?);
        }
        Ok(cards)
    }
}

impl MetaRepository for SqliteCardRepository<'_> {
    fn load_intro(&self) -> RepoResult<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT intro_text FROM newsletter_meta WHERE id = 1;")?;
        let mut rows = stmt.query([])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get("intro_text")?));
        }
        Ok(None)
    }

    fn save_intro(&mut self, intro_text: &str) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO newsletter_meta (id, intro_text, updated_at)
             VALUES (1, ?1, strftime('%s', 'now') * 1000)
             ON CONFLICT(id) DO UPDATE SET
                intro_text = excluded.intro_text,
                updated_at = excluded.updated_at;",
            [intro_text],
        )?;
        Ok(())
    }
}

fn parse_card_row(row: &Row<'_>) -> RepoResult<CardRow> {
    let card_id: CardId = row.get("card_id")?;
    if card_id <= 0 {
        return Err(RepoError::InvalidData(format!(
            "invalid card_id value `{card_id}` in card_content.card_id"
        )));
    }
    Ok(CardRow {
        card_id,
        title: row.get("title")?,
        content: row.get("content")?,
        main_image: row.get("main_image")?,
    })
}

fn ensure_store_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let expected_version = migrations::latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedStore {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_TABLES {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingTable(table));
        }
        for &column in columns {
            if !column_exists(conn, table, column)? {
                return Err(RepoError::MissingColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1;",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2;",
        [table, column],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
