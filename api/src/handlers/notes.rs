use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::Response,
    Json,
};

use crate::{
    auth::{ownership, CurrentUser},
    error::AppError,
    models::{
        note::{CreateNote, DeletedNote, Note, NoteList, NotesQuery},
        user::User,
    },
    response::ApiResponse,
    store::notes::{positive_or, DEFAULT_PAGE, DEFAULT_PAGE_SIZE},
    validation, AppState,
};

pub const MSG_NOTES_FETCHED: &str = "Notes fetched successfully";
pub const MSG_NOTE_CREATED: &str = "Note created successfully";
pub const MSG_NOTE_DELETED: &str = "Note deleted successfully";

/// Removes a note after the existence and ownership checks.
pub async fn delete_owned_note(state: &AppState, caller: &User, note_id: &str) -> Result<Note, AppError> {
    let existing = state.notes.find_by_id(note_id).await?;
    let note = ownership::ensure_owner(&caller.id, existing)?;

    // Gone between the check and the delete means someone else removed it first.
    let deleted = state
        .notes
        .delete_by_id(&note.id)
        .await?
        .ok_or(AppError::ResourceNotFound)?;
    tracing::info!(user_id = %caller.id, note_id = %deleted.id, "note deleted");
    Ok(deleted)
}

/// `search` wins over pagination; pagination needs both `page` and `limit`.
pub async fn list(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    query: Result<Query<NotesQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query?;
    let search = query.search.as_deref().filter(|s| !s.is_empty());

    let notes = match (search, query.page.as_deref(), query.limit.as_deref()) {
        (Some(term), _, _) => state.notes.search_by_title(&user.id, term).await?,
        (None, Some(page), Some(limit)) => {
            let page = positive_or(Some(page), DEFAULT_PAGE);
            let limit = positive_or(Some(limit), DEFAULT_PAGE_SIZE);
            let result = state.notes.paginate(&user.id, page, limit).await?;
            return Ok(ApiResponse::ok(MSG_NOTES_FETCHED, result).with_status(StatusCode::OK));
        }
        _ => state.notes.find_by_owner(&user.id).await?,
    };

    tracing::debug!(user_id = %user.id, "fetched {} notes", notes.len());
    let total = notes.len();
    Ok(ApiResponse::ok(MSG_NOTES_FETCHED, NoteList { notes, total }).with_status(StatusCode::OK))
}

pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<CreateNote>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let input = validation::new_note(&payload)?;
    let note = state
        .notes
        .create(&user.id, &input.title, &input.content)
        .await?;
    tracing::info!(user_id = %user.id, note_id = %note.id, "note created");
    Ok(ApiResponse::ok(MSG_NOTE_CREATED, note).with_status(StatusCode::CREATED))
}

pub async fn delete(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    note_id: Result<Path<String>, PathRejection>,
) -> Result<Response, AppError> {
    let Path(note_id) = note_id?;
    let deleted = delete_owned_note(&state, &user, &note_id).await?;
    Ok(ApiResponse::ok(MSG_NOTE_DELETED, DeletedNote { id: deleted.id }).with_status(StatusCode::OK))
}
