//! Per-user notes and bookmarks on verses.
//!
//! At most one note and one bookmark exist per (user, verse). The caller is
//! trusted to pass the authenticated user's id.

use crate::db;
use crate::error::{MushafError, Result};
use crate::models::{Bookmark, BookmarkType, UserNote};
use rusqlite::{params, Connection, OptionalExtension, Row};

fn require_user(conn: &Connection, user_id: i64) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        [user_id],
        |row| row.get(0),
    )?;
    if !exists {
        return Err(MushafError::NotFound(format!("user {}", user_id)));
    }
    Ok(())
}

fn require_verse(conn: &Connection, verse_id: i64) -> Result<()> {
    if db::get_verse(conn, verse_id)?.is_none() {
        return Err(MushafError::NotFound(format!("verse {}", verse_id)));
    }
    Ok(())
}

// ============ Notes ============

const NOTE_COLUMNS: &str = "id, user_id, verse_id, note, created_at, updated_at";

fn row_to_note(row: &Row) -> rusqlite::Result<UserNote> {
    Ok(UserNote {
        id: row.get(0)?,
        user_id: row.get(1)?,
        verse_id: row.get(2)?,
        note: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

/// Create the user's note on a verse, or overwrite its text. The original
/// `created_at` is kept; `updated_at` moves forward.
pub fn upsert_note(conn: &Connection, user_id: i64, verse_id: i64, note: &str) -> Result<UserNote> {
    if note.trim().is_empty() {
        return Err(MushafError::InvalidInput("note text is empty".to_string()));
    }
    require_user(conn, user_id)?;
    require_verse(conn, verse_id)?;

    let now = chrono::Utc::now().to_rfc3339();
    let saved = conn.query_row(
        &format!(
            "INSERT INTO user_notes (user_id, verse_id, note, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(user_id, verse_id) DO UPDATE SET
                note = excluded.note,
                updated_at = excluded.updated_at
             RETURNING {}",
            NOTE_COLUMNS
        ),
        params![user_id, verse_id, note, now],
        row_to_note,
    )?;

    tracing::debug!("Saved note {} for user {} on verse {}", saved.id, user_id, verse_id);
    Ok(saved)
}

pub fn get_note(conn: &Connection, user_id: i64, verse_id: i64) -> Result<UserNote> {
    conn.query_row(
        &format!(
            "SELECT {} FROM user_notes WHERE user_id = ?1 AND verse_id = ?2",
            NOTE_COLUMNS
        ),
        params![user_id, verse_id],
        row_to_note,
    )
    .optional()?
    .ok_or_else(|| MushafError::NotFound(format!("note on verse {}", verse_id)))
}

/// The user's notes, most recently edited first.
pub fn list_notes(conn: &Connection, user_id: i64) -> Result<Vec<UserNote>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM user_notes WHERE user_id = ?1 ORDER BY updated_at DESC, id DESC",
        NOTE_COLUMNS
    ))?;
    let notes = stmt
        .query_map([user_id], row_to_note)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(notes)
}

pub fn delete_note(conn: &Connection, user_id: i64, verse_id: i64) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM user_notes WHERE user_id = ?1 AND verse_id = ?2",
        params![user_id, verse_id],
    )?;
    if deleted == 0 {
        return Err(MushafError::NotFound(format!("note on verse {}", verse_id)));
    }
    Ok(())
}

// ============ Bookmarks ============

const BOOKMARK_COLUMNS: &str = "id, user_id, verse_id, bookmark_type, created_at";

fn row_to_bookmark(row: &Row) -> rusqlite::Result<Bookmark> {
    let kind: String = row.get(3)?;
    Ok(Bookmark {
        id: row.get(0)?,
        user_id: row.get(1)?,
        verse_id: row.get(2)?,
        bookmark_type: kind.parse().map_err(|e: MushafError| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?,
        created_at: row.get(4)?,
    })
}

/// Bookmark a verse, or change the type of an existing bookmark.
pub fn upsert_bookmark(
    conn: &Connection,
    user_id: i64,
    verse_id: i64,
    bookmark_type: BookmarkType,
) -> Result<Bookmark> {
    require_user(conn, user_id)?;
    require_verse(conn, verse_id)?;

    let now = chrono::Utc::now().to_rfc3339();
    let saved = conn.query_row(
        &format!(
            "INSERT INTO bookmarks (user_id, verse_id, bookmark_type, created_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id, verse_id) DO UPDATE SET bookmark_type = excluded.bookmark_type
             RETURNING {}",
            BOOKMARK_COLUMNS
        ),
        params![user_id, verse_id, bookmark_type.as_str(), now],
        row_to_bookmark,
    )?;
    Ok(saved)
}

pub fn get_bookmark(conn: &Connection, user_id: i64, verse_id: i64) -> Result<Bookmark> {
    conn.query_row(
        &format!(
            "SELECT {} FROM bookmarks WHERE user_id = ?1 AND verse_id = ?2",
            BOOKMARK_COLUMNS
        ),
        params![user_id, verse_id],
        row_to_bookmark,
    )
    .optional()?
    .ok_or_else(|| MushafError::NotFound(format!("bookmark on verse {}", verse_id)))
}

/// The user's bookmarks, optionally of one type, newest first.
pub fn list_bookmarks(
    conn: &Connection,
    user_id: i64,
    bookmark_type: Option<BookmarkType>,
) -> Result<Vec<Bookmark>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM bookmarks
         WHERE user_id = ?1 AND (?2 IS NULL OR bookmark_type = ?2)
         ORDER BY created_at DESC, id DESC",
        BOOKMARK_COLUMNS
    ))?;
    let bookmarks = stmt
        .query_map(
            params![user_id, bookmark_type.map(|t| t.as_str())],
            row_to_bookmark,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(bookmarks)
}

pub fn delete_bookmark(conn: &Connection, user_id: i64, verse_id: i64) -> Result<()> {
    let deleted = conn.execute(
        "DELETE FROM bookmarks WHERE user_id = ?1 AND verse_id = ?2",
        params![user_id, verse_id],
    )?;
    if deleted == 0 {
        return Err(MushafError::NotFound(format!("bookmark on verse {}", verse_id)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::{memory_db, sample_verse};
    use crate::reference;

    const ALICE: i64 = 1;
    const BOB: i64 = 2;

    fn seeded() -> (Connection, i64, i64) {
        let conn = memory_db();
        db::upsert_chapter(&conn, &reference::placeholder_chapter(2)).unwrap();
        let first = db::upsert_verse(&conn, &sample_verse(2, 1, "الٓمٓ")).unwrap();
        let second = db::upsert_verse(&conn, &sample_verse(2, 2, "ذَٰلِكَ")).unwrap();
        db::ensure_user(&conn, ALICE, "alice").unwrap();
        db::ensure_user(&conn, BOB, "bob").unwrap();
        (conn, first, second)
    }

    #[test]
    fn test_note_upsert_never_duplicates() {
        let (conn, verse, _) = seeded();

        let first = upsert_note(&conn, ALICE, verse, "first thought").unwrap();
        let second = upsert_note(&conn, ALICE, verse, "second thought").unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.note, "second thought");
        assert_eq!(second.created_at, first.created_at);
        assert!(second.updated_at >= first.updated_at);
        assert_eq!(list_notes(&conn, ALICE).unwrap().len(), 1);
    }

    #[test]
    fn test_notes_are_per_user() {
        let (conn, verse, other) = seeded();
        upsert_note(&conn, ALICE, verse, "a").unwrap();
        upsert_note(&conn, ALICE, other, "b").unwrap();
        upsert_note(&conn, BOB, verse, "c").unwrap();

        assert_eq!(list_notes(&conn, ALICE).unwrap().len(), 2);
        assert_eq!(get_note(&conn, BOB, verse).unwrap().note, "c");
        assert!(matches!(get_note(&conn, BOB, other), Err(MushafError::NotFound(_))));
    }

    #[test]
    fn test_note_validation() {
        let (conn, verse, _) = seeded();
        assert!(matches!(
            upsert_note(&conn, ALICE, verse, "   "),
            Err(MushafError::InvalidInput(_))
        ));
        assert!(matches!(
            upsert_note(&conn, ALICE, 9999, "x"),
            Err(MushafError::NotFound(_))
        ));
        assert!(matches!(
            upsert_note(&conn, 77, verse, "x"),
            Err(MushafError::NotFound(_))
        ));
    }

    #[test]
    fn test_note_text_stored_as_given() {
        let (conn, verse, _) = seeded();
        let saved = upsert_note(&conn, ALICE, verse, "  indented\nsecond line\n").unwrap();
        assert_eq!(saved.note, "  indented\nsecond line\n");
        assert_eq!(get_note(&conn, ALICE, verse).unwrap().note, saved.note);
    }

    #[test]
    fn test_unknown_bookmark_type_is_an_error() {
        let (conn, verse, _) = seeded();
        upsert_bookmark(&conn, ALICE, verse, BookmarkType::Study).unwrap();
        conn.execute("UPDATE bookmarks SET bookmark_type = 'pinned'", []).unwrap();
        assert!(matches!(get_bookmark(&conn, ALICE, verse), Err(MushafError::Database(_))));
        assert!(list_bookmarks(&conn, ALICE, None).is_err());
    }

    #[test]
    fn test_delete_note() {
        let (conn, verse, _) = seeded();
        upsert_note(&conn, ALICE, verse, "x").unwrap();
        delete_note(&conn, ALICE, verse).unwrap();
        assert!(matches!(delete_note(&conn, ALICE, verse), Err(MushafError::NotFound(_))));
    }

    #[test]
    fn test_bookmark_type_changes_in_place() {
        let (conn, verse, _) = seeded();
        let first = upsert_bookmark(&conn, ALICE, verse, BookmarkType::Default).unwrap();
        let second = upsert_bookmark(&conn, ALICE, verse, BookmarkType::Memorized).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(get_bookmark(&conn, ALICE, verse).unwrap().bookmark_type, BookmarkType::Memorized);
        assert_eq!(list_bookmarks(&conn, ALICE, None).unwrap().len(), 1);
    }

    #[test]
    fn test_list_bookmarks_by_type() {
        let (conn, verse, other) = seeded();
        upsert_bookmark(&conn, ALICE, verse, BookmarkType::Study).unwrap();
        upsert_bookmark(&conn, ALICE, other, BookmarkType::Favorite).unwrap();

        let study = list_bookmarks(&conn, ALICE, Some(BookmarkType::Study)).unwrap();
        assert_eq!(study.len(), 1);
        assert_eq!(study[0].verse_id, verse);
        assert!(list_bookmarks(&conn, BOB, None).unwrap().is_empty());

        delete_bookmark(&conn, ALICE, other).unwrap();
        assert!(matches!(get_bookmark(&conn, ALICE, other), Err(MushafError::NotFound(_))));
    }

    #[test]
    fn test_user_and_verse_deletion_cascade() {
        let (conn, verse, other) = seeded();
        upsert_note(&conn, ALICE, verse, "x").unwrap();
        upsert_bookmark(&conn, ALICE, verse, BookmarkType::Favorite).unwrap();
        upsert_note(&conn, BOB, other, "y").unwrap();

        db::delete_user(&conn, ALICE).unwrap();
        assert!(list_notes(&conn, ALICE).unwrap().is_empty());
        assert!(list_bookmarks(&conn, ALICE, None).unwrap().is_empty());

        db::delete_verse(&conn, other).unwrap();
        assert!(list_notes(&conn, BOB).unwrap().is_empty());
    }
}
