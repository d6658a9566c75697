// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation CRUD, listing, statistics, and retention purge.

use chrono::{DateTime, Utc};
use riley_core::{
    Channel, Conversation, ConversationFilter, ConversationId, ConversationStats,
    ConversationStatus, Metadata, NewConversation, RileyError,
};
use rusqlite::{params, OptionalExtension};

use super::messages::load_for;
use super::{decode_enum, decode_json, decode_time, encode_json, encode_time};
use crate::database::Database;

const SELECT_COLUMNS: &str =
    "SELECT id, participant_id, channel, status, metadata, created_at, updated_at FROM conversations";

/// Map a row (without messages) from [`SELECT_COLUMNS`].
fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Conversation> {
    Ok(Conversation {
        id: ConversationId(row.get(0)?),
        participant_id: row.get(1)?,
        channel: decode_enum(row, 2)?,
        status: decode_enum(row, 3)?,
        metadata: decode_json(row, 4)?,
        created_at: decode_time(row, 5)?,
        updated_at: decode_time(row, 6)?,
        messages: Vec::new(),
    })
}

fn with_messages(
    conn: &rusqlite::Connection,
    mut conversation: Conversation,
) -> rusqlite::Result<Conversation> {
    conversation.messages = load_for(conn, conversation.id.as_str())?;
    Ok(conversation)
}

/// Insert a new active conversation.
pub async fn create(db: &Database, new: NewConversation) -> Result<Conversation, RileyError> {
    let now = Utc::now();
    let conversation = Conversation {
        id: ConversationId::generate(),
        participant_id: new.participant_id,
        channel: new.channel,
        status: ConversationStatus::Active,
        messages: Vec::new(),
        metadata: new.metadata,
        created_at: now,
        updated_at: now,
    };

    let row = conversation.clone();
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO conversations (id, participant_id, channel, status, metadata, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    row.id.0,
                    row.participant_id,
                    row.channel.to_string(),
                    row.status.to_string(),
                    encode_json(&row.metadata)?,
                    encode_time(&row.created_at),
                    encode_time(&row.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    Ok(conversation)
}

/// Fetch one conversation with its messages.
pub async fn find_by_id(
    db: &Database,
    id: &ConversationId,
) -> Result<Option<Conversation>, RileyError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| -> Result<Option<Conversation>, rusqlite::Error> {
            let found = conn
                .query_row(
                    &format!("{SELECT_COLUMNS} WHERE id = ?1"),
                    params![id],
                    from_row,
                )
                .optional()?;
            found.map(|c| with_messages(conn, c)).transpose()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// The most recently started conversation for a participant.
pub async fn find_by_participant(
    db: &Database,
    participant_id: &str,
    channel: Option<Channel>,
) -> Result<Option<Conversation>, RileyError> {
    let participant_id = participant_id.to_string();
    let channel = channel.map(|c| c.to_string());
    db.connection()
        .call(move |conn| -> Result<Option<Conversation>, rusqlite::Error> {
            let found = conn
                .query_row(
                    &format!(
                        "{SELECT_COLUMNS} WHERE participant_id = ?1 AND (?2 IS NULL OR channel = ?2)
                         ORDER BY created_at DESC, rowid DESC LIMIT 1"
                    ),
                    params![participant_id, channel],
                    from_row,
                )
                .optional()?;
            found.map(|c| with_messages(conn, c)).transpose()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Set the status. Fails with `NotFound` for an unknown id.
pub async fn update_status(
    db: &Database,
    id: &ConversationId,
    status: ConversationStatus,
) -> Result<(), RileyError> {
    let key = id.0.clone();
    let changed = db
        .connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            conn.execute(
                "UPDATE conversations SET status = ?1, updated_at = ?2 WHERE id = ?3",
                params![status.to_string(), encode_time(&Utc::now()), key],
            )
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if changed == 0 {
        return Err(RileyError::not_found(id.as_str()));
    }
    Ok(())
}

/// Add or overwrite metadata keys. Existing keys not in `patch` are kept.
pub async fn merge_metadata(
    db: &Database,
    id: &ConversationId,
    patch: Metadata,
) -> Result<(), RileyError> {
    let key = id.0.clone();
    let found = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let current: Option<Metadata> = tx
                .query_row(
                    "SELECT metadata FROM conversations WHERE id = ?1",
                    params![key],
                    |row| decode_json(row, 0),
                )
                .optional()?;
            let Some(mut metadata) = current else {
                return Ok(false);
            };
            metadata.extend(patch);
            tx.execute(
                "UPDATE conversations SET metadata = ?1, updated_at = ?2 WHERE id = ?3",
                params![encode_json(&metadata)?, encode_time(&Utc::now()), key],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if found {
        Ok(())
    } else {
        Err(RileyError::not_found(id.as_str()))
    }
}

/// Conversations matching the filter, most recently updated first.
pub async fn list(
    db: &Database,
    filter: &ConversationFilter,
) -> Result<Vec<Conversation>, RileyError> {
    let status = filter.status.map(|s| s.to_string());
    let participant_id = filter.participant_id.clone();
    let limit = i64::try_from(filter.limit).unwrap_or(i64::MAX);
    db.connection()
        .call(move |conn| -> Result<Vec<Conversation>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "{SELECT_COLUMNS}
                 WHERE (?1 IS NULL OR status = ?1) AND (?2 IS NULL OR participant_id = ?2)
                 ORDER BY updated_at DESC, rowid DESC LIMIT ?3"
            ))?;
            let rows = stmt
                .query_map(params![status, participant_id, limit], from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows.into_iter().map(|c| with_messages(conn, c)).collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Counts per status and the mean number of messages per conversation.
pub async fn stats(db: &Database) -> Result<ConversationStats, RileyError> {
    db.connection()
        .call(|conn| -> Result<ConversationStats, rusqlite::Error> {
            let (total, active, pending, resolved): (i64, i64, i64, i64) = conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(status = 'active'), 0),
                        COALESCE(SUM(status = 'pending'), 0),
                        COALESCE(SUM(status = 'resolved'), 0)
                 FROM conversations",
                [],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
            )?;
            let messages: i64 =
                conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
            let average_messages = if total == 0 {
                0.0
            } else {
                messages as f64 / total as f64
            };
            Ok(ConversationStats {
                total: total as u64,
                active: active as u64,
                pending: pending as u64,
                resolved: resolved as u64,
                average_messages,
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete conversations (and their messages) last updated before `cutoff`.
/// Returns the number of conversations removed.
pub async fn purge_updated_before(
    db: &Database,
    cutoff: DateTime<Utc>,
) -> Result<usize, RileyError> {
    let cutoff = encode_time(&cutoff);
    db.connection()
        .call(move |conn| -> Result<usize, rusqlite::Error> {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM messages WHERE conversation_id IN
                    (SELECT id FROM conversations WHERE updated_at < ?1)",
                params![cutoff],
            )?;
            let removed = tx.execute(
                "DELETE FROM conversations WHERE updated_at < ?1",
                params![cutoff],
            )?;
            tx.commit()?;
            Ok(removed)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
