// SPDX-FileCopyrightText: 2026 Riley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message append and retrieval.

use chrono::Utc;
use riley_core::{ConversationId, Message, MessageId, RileyError};
use rusqlite::{params, OptionalExtension};

use super::{decode_enum, decode_time, encode_json, encode_time};
use crate::database::Database;

/// Messages of one conversation in append order.
pub(crate) fn load_for(
    conn: &rusqlite::Connection,
    conversation_id: &str,
) -> rusqlite::Result<Vec<Message>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, role, content, analysis, timestamp
         FROM messages WHERE conversation_id = ?1 ORDER BY seq ASC",
    )?;
    let rows = stmt.query_map(params![conversation_id], |row| {
        let analysis: Option<String> = row.get(3)?;
        let analysis = analysis
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        3,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })
            })
            .transpose()?;
        Ok(Message {
            id: MessageId(row.get(0)?),
            role: decode_enum(row, 1)?,
            content: row.get(2)?,
            timestamp: decode_time(row, 4)?,
            analysis,
        })
    })?;
    rows.collect()
}

/// Append a message after the current last one and bump the conversation's
/// `updated_at`. Fails with `NotFound` if the conversation does not exist.
pub async fn append_message(
    db: &Database,
    conversation_id: &ConversationId,
    message: Message,
) -> Result<(), RileyError> {
    let id = conversation_id.0.clone();
    let found = db
        .connection()
        .call(move |conn| -> Result<bool, rusqlite::Error> {
            let tx = conn.transaction()?;
            let exists = tx
                .query_row(
                    "SELECT 1 FROM conversations WHERE id = ?1",
                    params![id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !exists {
                return Ok(false);
            }

            let next_seq: i64 = tx.query_row(
                "SELECT COALESCE(MAX(seq), 0) + 1 FROM messages WHERE conversation_id = ?1",
                params![id],
                |row| row.get(0),
            )?;
            let analysis = message.analysis.as_ref().map(encode_json).transpose()?;
            tx.execute(
                "INSERT INTO messages (id, conversation_id, seq, role, content, analysis, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    message.id.0,
                    id,
                    next_seq,
                    message.role.to_string(),
                    message.content,
                    analysis,
                    encode_time(&message.timestamp),
                ],
            )?;
            tx.execute(
                "UPDATE conversations SET updated_at = ?1 WHERE id = ?2",
                params![encode_time(&Utc::now()), id],
            )?;
            tx.commit()?;
            Ok(true)
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    if found {
        Ok(())
    } else {
        Err(RileyError::not_found(conversation_id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::conversations;
    use riley_core::{
        Analysis, Channel, Intent, Metadata, NewConversation, Role, Sentiment, Urgency,
    };

    async fn setup() -> (Database, ConversationId) {
        let db = Database::open_in_memory().await.unwrap();
        let conv = conversations::create(
            &db,
            NewConversation {
                participant_id: "+15550001111".into(),
                channel: Channel::Sms,
                metadata: Metadata::new(),
            },
        )
        .await
        .unwrap();
        (db, conv.id)
    }

    fn sample_analysis() -> Analysis {
        Analysis {
            intent: Intent::Emergency,
            sentiment: Sentiment::Neutral,
            urgency: Urgency::High,
            service: None,
            keywords: vec!["leak".into()],
            has_question: false,
        }
    }

    #[tokio::test]
    async fn messages_come_back_in_append_order() {
        let (db, id) = setup().await;
        let user = Message::user("leak!", sample_analysis());
        let reply = Message::assistant("on our way");
        append_message(&db, &id, user.clone()).await.unwrap();
        append_message(&db, &id, reply.clone()).await.unwrap();

        let conv = conversations::find_by_id(&db, &id).await.unwrap().unwrap();
        assert_eq!(conv.messages.len(), 2);
        assert_eq!(conv.messages[0], user);
        assert_eq!(conv.messages[1].role, Role::Assistant);
        assert_eq!(conv.messages[1].content, "on our way");
        assert!(conv.messages[1].analysis.is_none());
    }

    #[tokio::test]
    async fn order_follows_append_not_timestamp() {
        let (db, id) = setup().await;
        let mut later = Message::assistant("second in time");
        later.timestamp += chrono::Duration::seconds(60);
        let earlier = Message::assistant("first in time");
        append_message(&db, &id, later).await.unwrap();
        append_message(&db, &id, earlier).await.unwrap();

        let conv = conversations::find_by_id(&db, &id).await.unwrap().unwrap();
        assert_eq!(conv.messages[0].content, "second in time");
        assert_eq!(conv.messages[1].content, "first in time");
    }

    #[tokio::test]
    async fn append_to_unknown_conversation_is_not_found() {
        let db = Database::open_in_memory().await.unwrap();
        let err = append_message(&db, &ConversationId::from("conv_missing"), Message::assistant("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, RileyError::NotFound { id } if id == "conv_missing"));
    }
}
