use chrono::Utc;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::note::{Note, NotePage},
};

const NOTE_COLUMNS: &str = "id, user_id, title, content, created_at, updated_at";
// rowid breaks ties between notes created within the same instant
const NEWEST_FIRST: &str = "ORDER BY created_at DESC, rowid DESC";

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Parses a page or page-size query value; absent, junk, or non-positive input gets `default`.
pub fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[derive(Clone)]
pub struct NoteStore {
    db: SqlitePool,
}

impl NoteStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn create(&self, owner_id: &str, title: &str, content: &str) -> Result<Note, AppError> {
        let now = Utc::now();
        let note = sqlx::query_as::<_, Note>(&format!(
            "INSERT INTO notes (id, user_id, title, content, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING {NOTE_COLUMNS}"
        ))
        .bind(Uuid::new_v4().to_string())
        .bind(owner_id)
        .bind(title)
        .bind(content)
        .bind(now)
        .bind(now)
        .fetch_one(&self.db)
        .await?;
        Ok(note)
    }

    /// Unscoped lookup. Callers must pass the result through `ownership::ensure_owner`.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Note>, AppError> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(note)
    }

    pub async fn delete_by_id(&self, id: &str) -> Result<Option<Note>, AppError> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "DELETE FROM notes WHERE id = ? RETURNING {NOTE_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(note)
    }

    pub async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<Note>, AppError> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ? {NEWEST_FIRST}"
        ))
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;
        Ok(notes)
    }

    /// Case-insensitive literal substring match on the title, Unicode-aware.
    pub async fn search_by_title(&self, owner_id: &str, term: &str) -> Result<Vec<Note>, AppError> {
        let needle = term.to_lowercase();
        let notes = self
            .find_by_owner(owner_id)
            .await?
            .into_iter()
            .filter(|note| note.title.to_lowercase().contains(&needle))
            .collect();
        Ok(notes)
    }

    pub async fn count_by_owner(&self, owner_id: &str) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notes WHERE user_id = ?")
            .bind(owner_id)
            .fetch_one(&self.db)
            .await?;
        Ok(total)
    }

    pub async fn paginate(&self, owner_id: &str, page: i64, page_size: i64) -> Result<NotePage, AppError> {
        let page = page.max(1);
        let page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        let skip = (page - 1).saturating_mul(page_size);

        let notes = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE user_id = ? {NEWEST_FIRST} LIMIT ? OFFSET ?"
        ))
        .bind(owner_id)
        .bind(page_size)
        .bind(skip)
        .fetch_all(&self.db)
        .await?;
        let total = self.count_by_owner(owner_id).await?;

        Ok(NotePage {
            notes,
            total,
            page,
            total_pages: (total + page_size - 1) / page_size,
        })
    }
}
