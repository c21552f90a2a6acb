use anyhow::{Context, Result};
use log::{error, info, warn};
use serde::Deserialize;
use showdown_protocol::{Chips, HandSnapshot, TableEvent};
use showdown_server::{EngineConfig, RoomRegistry};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::broadcast::error::RecvError;

/// One recorded hand to replay.
#[derive(Debug, Deserialize)]
struct HandRecord {
    room_id: String,
    /// Starting stacks for players not yet seated in the room.
    #[serde(default)]
    stacks: BTreeMap<String, Chips>,
    snapshot: HandSnapshot,
}

fn usage() -> ! {
    eprintln!("usage: showdown_server <hands.json> [variants.json]");
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let hands_path = match args.next() {
        Some(path) => PathBuf::from(path),
        None => usage(),
    };

    let mut config = EngineConfig::from_env();
    if let Some(path) = args.next() {
        config.variants_path = Some(PathBuf::from(path));
    }
    let engine = config
        .build_engine()
        .context("Failed to build the variant table")?;

    let json = std::fs::read_to_string(&hands_path)
        .with_context(|| format!("Failed to read {}", hands_path.display()))?;
    let records: Vec<HandRecord> = serde_json::from_str(&json)
        .with_context(|| format!("Invalid hand records in {}", hands_path.display()))?;
    info!("Replaying {} hands from {}", records.len(), hands_path.display());

    let mut registry = RoomRegistry::new(config.channel_capacity);

    let listener = {
        let mut rx = registry.subscribe();
        tokio::spawn(async move {
            loop {
                let event = match rx.recv().await {
                    Ok(event) => event,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Event listener fell behind, skipped {} events", skipped);
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                };
                match &event {
                    TableEvent::Showdown(update) => info!(
                        "[{}] hand {}: {} chips awarded",
                        update.room_id,
                        update.hand_id,
                        update.result.total_awarded()
                    ),
                    TableEvent::StacksUpdated(_) => info!("{}", event),
                }
            }
        })
    };

    let mut settled = 0usize;
    for record in &records {
        let room = registry.create_room(&record.room_id);
        {
            let mut room = room.lock();
            for (player_id, chips) in &record.stacks {
                if room.stack(player_id).is_none() {
                    room.seat_player(player_id, *chips);
                }
            }
            for contribution in &record.snapshot.contributors {
                if room.stack(&contribution.id).is_none() {
                    room.seat_player(&contribution.id, config.starting_stack);
                }
            }
        }

        match registry.play_hand(&record.room_id, &engine, &record.snapshot) {
            Ok(outcome) => {
                settled += 1;
                println!("{}", serde_json::to_string_pretty(&outcome.result)?);
            }
            Err(e) => error!(
                "Room {}: hand {} failed: {}",
                record.room_id, record.snapshot.hand_id, e
            ),
        }
    }

    let mut final_stacks: BTreeMap<String, Vec<(String, Chips)>> = BTreeMap::new();
    for room_id in registry.room_ids() {
        let room = registry.get(&room_id)?;
        let stacks = room.lock().stacks();
        final_stacks.insert(room_id, stacks);
    }
    println!("{}", serde_json::to_string_pretty(&final_stacks)?);

    // Dropping every sender ends the listener.
    drop(registry);
    listener.await.context("Event listener panicked")?;

    info!("Settled {} of {} hands", settled, records.len());
    Ok(())
}
