//! Integration tests for whole ingestion runs over in-memory exports.

use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use inboxpack::prelude::*;
use serde_json::json;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

// =============================================================================
// Fixtures
// =============================================================================

fn page(participants: &[&str], messages: usize, tag: &str) -> Vec<u8> {
    let participants: Vec<_> = participants.iter().map(|n| json!({ "name": n })).collect();
    let messages: Vec<_> = (0..messages)
        .map(|i| {
            json!({
                "sender_name": "Friend",
                "timestamp_ms": 1_705_314_600_000_i64 - (i as i64) * 60_000,
                "content": format!("{tag} {i}")
            })
        })
        .collect();
    serde_json::to_vec(&json!({ "participants": participants, "messages": messages })).unwrap()
}

fn export(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer.start_file(*name, SimpleFileOptions::default()).unwrap();
        writer.write_all(content).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn inbox(folder: &str, file: &str) -> String {
    format!("your_instagram_activity/messages/inbox/{folder}/{file}")
}

async fn run(bytes: Vec<u8>) -> IngestOutcome {
    Ingestor::default()
        .ingest_detailed(IngestInput::Archive(bytes))
        .await
        .unwrap()
}

// =============================================================================
// Conversation outcomes
// =============================================================================

mod conversation_tests {
    use super::*;

    #[tokio::test]
    async fn test_two_valid_folders() {
        let a = inbox("alice_1", "message_1.json");
        let b = inbox("bob_2", "message_1.json");
        let bytes = export(&[
            (a.as_str(), page(&["Me", "Alice"], 5, "a")),
            (b.as_str(), page(&["Me", "Bob"], 5, "b")),
        ]);

        let result = run(bytes).await.result;
        let ids: Vec<_> = result.conversations.iter().map(|c| c.id).collect();
        assert_eq!(ids, [0, 1]);
        assert!(result.conversations.iter().all(|c| c.total_message_count == 5));
        assert!(result.conversations.iter().all(|c| !c.analyzed));
    }


    #[tokio::test]
    async fn test_single_participant_folder_is_skipped() {
        let path = inbox("lonely", "message_1.json");
        let outcome = run(export(&[(path.as_str(), page(&["Me"], 3, "x"))])).await;

        assert!(outcome.result.conversations.is_empty());
        assert_eq!(outcome.skipped.len(), 1);
        assert!(outcome.result.owner_name.is_none());
    }


    #[tokio::test]
    async fn test_corrupt_second_page_keeps_the_rest() {
        let first = inbox("carol_3", "message_1.json");
        let second = inbox("carol_3", "message_2.json");
        let outcome = run(export(&[
            (first.as_str(), page(&["Me", "Carol"], 4, "p1")),
            (second.as_str(), b"{\"messages\": [ {\"sender_name\": ".to_vec()),
        ]))
        .await;

        let summary = &outcome.result.conversations[0];
        assert_eq!(summary.file_count, 2);
        assert_eq!(summary.total_message_count, 4);
        assert_eq!(outcome.file_failures.len(), 1);
        assert_eq!(outcome.file_failures[0].path, second);
    }


    #[tokio::test]
    async fn test_standalone_page() {
        let file = LooseFile::new("message_1.json", page(&["Me", "Dana"], 3, "d"));
        let result = ingest(IngestInput::LooseFiles(vec![file])).await.unwrap();

        assert_eq!(result.conversations.len(), 1);
        assert_eq!(result.conversations[0].correspondent_name, "Dana");
        assert_eq!(result.conversations[0].total_message_count, 3);
    }

    #[tokio::test]
    async fn test_skipped_folders_account_for_missing_summaries() {
        let entries = vec![
            (inbox("a", "message_1.json"), page(&["Me", "A"], 1, "a")),
            (inbox("b", "message_2.json"), page(&["Me", "B"], 1, "b")),
            (inbox("c", "message_1.json"), page(&["Me", "C", "D"], 1, "c")),
            (inbox("d", "message_1.json"), page(&["Me", "D"], 1, "d")),
            (inbox("e", "photos/1.jpg"), vec![0xFF]),
        ];
        let borrowed: Vec<_> = entries.iter().map(|(p, c)| (p.as_str(), c.clone())).collect();
        let outcome = run(export(&borrowed)).await;

        // Folder "e" holds no message file, so only four folders are seen.
        let folders = 4;
        assert_eq!(outcome.result.conversations.len(), folders - outcome.skipped.len());
        assert_eq!(outcome.skipped.len(), 2);
        let names: Vec<_> = outcome
            .result
            .conversations
            .iter()
            .map(|c| (c.id, c.correspondent_name.as_str()))
            .collect();
        assert_eq!(names, [(0, "A"), (1, "D")]);
    }


    #[tokio::test]
    async fn test_correspondent_names_are_never_empty() {
        let a = inbox("a", "message_1.json");
        let b = inbox("b", "message_1.json");
        let blank = serde_json::to_vec(&json!({
            "participants": [{ "name": "Me" }, { "name": "   " }],
            "messages": []
        }))
        .unwrap();
        let unnamed = serde_json::to_vec(&json!({
            "participants": [{ "name": "Me" }, { "id": 7 }],
            "messages": []
        }))
        .unwrap();
        let c = inbox("c", "message_1.json");

        let result = run(export(&[
            (a.as_str(), blank),
            (b.as_str(), unnamed),
            (c.as_str(), page(&["Me", "Named"], 1, "c")),
        ]))
        .await
        .result;

        assert_eq!(result.conversations.len(), 1);
        assert!(result
            .conversations
            .iter()
            .all(|c| !c.correspondent_name.trim().is_empty()));
    }

}

// =============================================================================
// Run guarantees
// =============================================================================

mod run_tests {
    use super::*;

    #[tokio::test]
    async fn test_reprocessing_is_deterministic() {
        let mut entries = Vec::new();
        for (i, name) in ["zed", "amy", "kim", "bo"].iter().enumerate() {
            entries.push((inbox(&format!("{name}_{i}"), "message_1.json"), page(&["Me", name], i + 2, name)));
            entries.push((inbox(&format!("{name}_{i}"), "message_2.json"), page(&[], i, name)));
        }
        let borrowed: Vec<_> = entries.iter().map(|(p, c)| (p.as_str(), c.clone())).collect();
        let bytes = export(&borrowed);

        let first = run(bytes.clone()).await.result;
        let second = run(bytes).await.result;

        assert_eq!(first.conversations, second.conversations);
        assert_eq!(first.owner_name, second.owner_name);
        assert_ne!(first.session_token, second.session_token);
        // Discovery order, not alphabetical.
        let keys: Vec<_> = first
            .conversations
            .iter()
            .map(|c| c.source_folder_key.as_str())
            .collect();
        assert_eq!(keys, ["zed_0", "amy_1", "kim_2", "bo_3"]);
    }


    #[tokio::test]
    async fn test_long_conversations_keep_the_last_thousand() {
        let first = inbox("long", "message_1.json");
        let second = inbox("long", "message_2.json");
        let bytes = export(&[
            (first.as_str(), page(&["Me", "Lee"], 700, "first")),
            (second.as_str(), page(&[], 800, "second")),
        ]);

        let summary = run(bytes).await.result.conversations.remove(0);
        assert_eq!(summary.total_message_count, 1500);
        assert_eq!(summary.messages.len(), 1000);
        assert_eq!(summary.messages[0].content(), Some("first 500"));
        assert_eq!(summary.messages[999].content(), Some("second 799"));
    }


    #[tokio::test]
    async fn test_progress_never_decreases_and_ends_at_100() {
        let entries: Vec<_> = (0..5)
            .map(|i| (inbox(&format!("f{i}"), "message_1.json"), page(&["Me", "F"], 1, "f")))
            .collect();
        let borrowed: Vec<_> = entries.iter().map(|(p, c)| (p.as_str(), c.clone())).collect();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress: ProgressCallback =
            Arc::new(move |event: ProgressEvent| sink.lock().unwrap().push(event.percentage));

        Ingestor::default()
            .with_progress(progress)
            .ingest(IngestInput::Archive(export(&borrowed)))
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        assert!(seen.len() >= 5 + 2);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 100.0);
    }

}

// =============================================================================
// Input sources
// =============================================================================

mod source_tests {
    use super::*;

    #[tokio::test]
    async fn test_extracted_directory_matches_archive() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("messages/inbox/erin_5");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("message_1.json"), page(&["Me", "Erin"], 3, "e")).unwrap();
        std::fs::write(folder.join("message_2.json"), page(&[], 2, "e")).unwrap();

        let input = IngestInput::from_path(dir.path()).await.unwrap();
        let result = ingest(input).await.unwrap();

        assert_eq!(result.conversations.len(), 1);
        assert_eq!(result.conversations[0].file_count, 2);
        assert_eq!(result.conversations[0].total_message_count, 5);
        assert_eq!(result.owner_name.as_deref(), Some("Me"));
    }


    #[tokio::test]
    async fn test_archive_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("instagram-export.zip");
        let first = inbox("finn_6", "message_1.json");
        let second = inbox("finn_6", "message_2.json");
        std::fs::write(
            &path,
            export(&[
                (first.as_str(), page(&["Me", "Finn"], 2, "new")),
                (second.as_str(), page(&[], 3, "old")),
            ]),
        )
        .unwrap();

        let input = IngestInput::from_path(&path).await.unwrap();
        assert!(matches!(input, IngestInput::ArchiveFile(_)));
        let result = ingest(input).await.unwrap();

        assert_eq!(result.conversations.len(), 1);
        assert_eq!(result.conversations[0].correspondent_name, "Finn");
        assert_eq!(result.conversations[0].total_message_count, 5);
    }

    #[tokio::test]
    async fn test_directory_pages_past_nine_stay_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("messages/inbox/gus_7");
        std::fs::create_dir_all(&folder).unwrap();
        std::fs::write(folder.join("message_1.json"), page(&["Me", "Gus"], 1, "p1")).unwrap();
        for n in 2..=11 {
            std::fs::write(
                folder.join(format!("message_{n}.json")),
                page(&[], 1, &format!("p{n}")),
            )
            .unwrap();
        }

        let result = ingest(IngestInput::Directory(dir.path().to_path_buf()))
            .await
            .unwrap();

        let contents: Vec<_> = result.conversations[0]
            .messages
            .iter()
            .filter_map(|m| m.content())
            .collect();
        let expected: Vec<_> = (1..=11).map(|n| format!("p{n} 0")).collect();
        assert_eq!(contents, expected);
    }
}

// =============================================================================
// Text and handoff
// =============================================================================

mod handoff_tests {
    use super::*;

    #[tokio::test]
    async fn test_mojibake_is_repaired_in_names_and_text() {
        let broken = |s: &str| -> String { s.bytes().map(char::from).collect() };
        let doc = json!({
            "participants": [{ "name": "Me" }, { "name": broken("Zoë") }],
            "messages": [{ "sender_name": broken("Zoë"), "content": broken("ça va 😀") }]
        });
        let path = inbox("zoe", "message_1.json");
        let result = run(export(&[(path.as_str(), serde_json::to_vec(&doc).unwrap())])).await.result;

        let summary = &result.conversations[0];
        assert_eq!(summary.correspondent_name, "Zoë");
        assert_eq!(summary.messages[0].sender(), "Zoë");
        assert_eq!(summary.messages[0].content(), Some("ça va 😀"));
    }


    #[tokio::test]
    async fn test_result_serializes_for_the_host() {
        let path = inbox("hal", "message_1.json");
        let result = run(export(&[(path.as_str(), page(&["Me", "Hal"], 1, "h"))])).await.result;

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["ownerName"], "Me");
        assert_eq!(value["conversations"][0]["correspondentName"], "Hal");
        assert_eq!(value["conversations"][0]["sourceFolderKey"], "hal");
        assert_eq!(value["conversations"][0]["analyzed"], false);
        assert!(value["sessionToken"].is_string());
    }
}
