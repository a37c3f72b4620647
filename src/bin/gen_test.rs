//! Synthetic export generator for stress testing inboxpack.
//!
//! Usage: cargo run --features gen-test --bin gen_test -- [conversations] [messages] [output]
//! Example: cargo run --features gen-test --bin gen_test -- 500 5000 heavy_export.zip
//!
//! The archive mixes valid one-to-one conversations with the things real
//! exports contain: group chats, folders without a first page, truncated
//! pages, media files and Latin-1 mojibake in names and text.

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::time::Instant;

use rand::Rng;
use rand::seq::SliceRandom;
use serde_json::{Value, json};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const OWNER: &str = "Archive Owner";
const PAGE_SIZE: usize = 10_000;

const NAMES: &[&str] = &[
    "Alice",
    "Bob",
    "Иван",
    "Мария",
    "村上",
    "محمد",
    "Zoë",
    "José",
    "User;With;Semicolons",
    "User\"With\"Quotes",
    "🔥FireUser🔥",
];

const TEXTS: &[&str] = &[
    "hey",
    "are you coming tonight?",
    "😂😂😂",
    "Привет, как дела?",
    "ça va très bien",
    "line one\nline two",
    "",
    "https://example.com/some/very/long/path?with=query&and=more",
];

/// Encodes text the way the export does: UTF-8 bytes read back as Latin-1.
fn mojibake(text: &str) -> String {
    text.bytes().map(char::from).collect()
}

fn message(rng: &mut impl Rng, sender: &str, index: usize) -> Value {
    let mut msg = json!({
        "sender_name": mojibake(sender),
        "timestamp_ms": 1_600_000_000_000_i64 + (index as i64) * 60_000,
    });
    match rng.gen_range(0..10) {
        0 => msg["photos"] = json!([{ "uri": "photos/1.jpg" }]),
        1 => msg["share"] = json!({ "link": "https://instagram.com/p/abc" }),
        2 => msg["sticker"] = json!({ "uri": "stickers/1.png" }),
        _ => {
            let text = TEXTS.choose(rng).copied().unwrap_or_default();
            msg["content"] = Value::String(mojibake(text));
        }
    }
    if rng.gen_bool(0.05) {
        msg["reactions"] = json!([{ "reaction": "❤", "actor": OWNER }]);
    }
    msg
}

fn page(participants: &[&str], messages: Vec<Value>) -> Vec<u8> {
    let participants: Vec<Value> = participants
        .iter()
        .map(|name| json!({ "name": mojibake(name) }))
        .collect();
    let doc = json!({ "participants": participants, "messages": messages });
    doc.to_string().into_bytes()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    let conversations: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(200);
    let messages_per: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(2_500);
    let output = args.get(3).map_or("heavy_export.zip", String::as_str);

    println!("🧪 Export Generator");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   Conversations: {conversations}");
    println!("   Messages each: {messages_per}");
    println!("   Output:        {output}");
    println!();

    let start = Instant::now();
    let mut rng = rand::thread_rng();
    let file = BufWriter::with_capacity(1024 * 1024, File::create(output)?);
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut broken = 0usize;
    for c in 0..conversations {
        let friend = NAMES.choose(&mut rng).copied().unwrap_or("Friend");
        let folder = format!("messages/inbox/{}_{c}", friend.to_lowercase().replace(' ', ""));
        let roll = rng.gen_range(0..20);

        let participants: Vec<&str> = match roll {
            0 => vec![OWNER, friend, "Third Wheel"],
            _ => vec![OWNER, friend],
        };

        let mut all: Vec<Value> = (0..messages_per)
            .map(|i| {
                let sender = if rng.gen_bool(0.5) { OWNER } else { friend };
                message(&mut rng, sender, i)
            })
            .collect();
        // Exports list newest first within the whole conversation.
        all.reverse();

        for (p, chunk) in all.chunks(PAGE_SIZE.max(1)).enumerate() {
            let number = p + 1;
            if roll == 1 && number == 1 {
                // Folder without a first page.
                continue;
            }
            let mut bytes = page(&participants, chunk.to_vec());
            if roll == 2 && number > 1 {
                bytes.truncate(bytes.len() / 2);
                broken += 1;
            }
            zip.start_file(format!("{folder}/message_{number}.json"), options)?;
            zip.write_all(&bytes)?;
        }

        if rng.gen_bool(0.3) {
            zip.start_file(format!("{folder}/photos/{c}.jpg"), options)?;
            zip.write_all(&[0xFF, 0xD8, 0xFF, 0xE0])?;
        }

        if (c + 1) % 50 == 0 {
            eprint!("\r   Generated {}/{conversations} conversations", c + 1);
        }
    }

    zip.start_file("personal_information/personal_information.json", options)?;
    zip.write_all(br#"{"profile_user": []}"#)?;
    zip.finish()?.flush()?;

    println!("\n\n✅ Done!");
    println!("   Truncated pages: {broken}");
    println!("   Time: {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}
