use crate::{error::AppError, models::note::Note};

/// Opaque identifier equality: no case folding, no numeric coercion.
pub fn authorize(identity_id: &str, resource_owner_id: &str) -> bool {
    identity_id == resource_owner_id
}

/// Existence is checked before ownership, so a missing note never reports `Forbidden`.
pub fn ensure_owner(caller_id: &str, note: Option<Note>) -> Result<Note, AppError> {
    let note = note.ok_or(AppError::ResourceNotFound)?;
    if !authorize(caller_id, &note.user_id) {
        return Err(AppError::Forbidden);
    }
    Ok(note)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn note_owned_by(owner: &str) -> Note {
        Note {
            id: "note-1".into(),
            user_id: owner.into(),
            title: "t".into(),
            content: "c".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn authorize_is_exact() {
        assert!(authorize("abc-123", "abc-123"));
        assert!(!authorize("ABC-123", "abc-123"));
        assert!(!authorize("007", "7"));
        assert!(!authorize("", "abc"));
    }

    #[test]
    fn missing_note_is_not_found() {
        assert!(matches!(
            ensure_owner("anyone", None),
            Err(AppError::ResourceNotFound)
        ));
    }

    #[test]
    fn foreign_note_is_forbidden() {
        assert!(matches!(
            ensure_owner("mallory", Some(note_owned_by("alice"))),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn owner_gets_the_note_back() {
        let note = ensure_owner("alice", Some(note_owned_by("alice"))).unwrap();
        assert_eq!(note.id, "note-1");
    }
}
