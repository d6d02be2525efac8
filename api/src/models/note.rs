use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    #[serde(skip_serializing, default)]
    pub user_id: String,
    pub title: String,
    /// Ciphertext from the client, stored verbatim.
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateNote {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// Query string accepted by `GET /notes`. Page values stay raw so junk falls back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct NotesQuery {
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NoteList {
    pub notes: Vec<Note>,
    pub total: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePage {
    pub notes: Vec<Note>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedNote {
    pub id: String,
}
