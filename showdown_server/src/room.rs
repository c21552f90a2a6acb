use crate::showdown::ShowdownEngine;
use log::{debug, error, info, warn};
use parking_lot::Mutex;
use showdown_protocol::{
    Chips, EngineResult, HandSnapshot, Settlement, ShowdownError, ShowdownOutcome, ShowdownUpdate,
    TableEvent,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::broadcast;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Chip state of one table: player stacks and the chips committed to the
/// current hand.
#[derive(Debug)]
pub struct Room {
    pub room_id: String,
    stacks: HashMap<String, Chips>,
    pot: Chips,
    hands_settled: u64,
    pub tx: broadcast::Sender<TableEvent>,
}

impl Room {
    pub fn new(room_id: String, tx: broadcast::Sender<TableEvent>) -> Self {
        Self {
            room_id,
            stacks: HashMap::new(),
            pot: 0,
            hands_settled: 0,
            tx,
        }
    }

    fn publish(&self, event: TableEvent) {
        if let Err(e) = self.tx.send(event) {
            debug!("No listeners on room {}, dropped {}", self.room_id, e.0);
        }
    }

    /// Seats a player, or tops up an existing stack.
    pub fn seat_player(&mut self, player_id: &str, chips: Chips) {
        *self.stacks.entry(player_id.to_string()).or_insert(0) += chips.max(0);
    }

    pub fn stack(&self, player_id: &str) -> Option<Chips> {
        self.stacks.get(player_id).copied()
    }

    pub fn pot(&self) -> Chips {
        self.pot
    }

    pub fn hands_settled(&self) -> u64 {
        self.hands_settled
    }

    /// Stacks sorted by player id.
    pub fn stacks(&self) -> Vec<(String, Chips)> {
        let mut stacks: Vec<(String, Chips)> = self
            .stacks
            .iter()
            .map(|(id, chips)| (id.clone(), *chips))
            .collect();
        stacks.sort();
        stacks
    }

    /// Moves chips from a player's stack into the pot.
    pub fn commit(&mut self, player_id: &str, amount: Chips) -> EngineResult<()> {
        if amount < 0 {
            return Err(ShowdownError::NegativeContribution(player_id.to_string()));
        }
        let stack = self
            .stacks
            .get_mut(player_id)
            .ok_or_else(|| ShowdownError::PlayerNotFound(player_id.to_string()))?;
        if *stack < amount {
            return Err(ShowdownError::InsufficientChips(
                player_id.to_string(),
                amount,
                *stack,
            ));
        }
        *stack -= amount;
        self.pot += amount;
        Ok(())
    }

    /// Commits every contribution in the snapshot, or none of them.
    pub fn commit_hand(&mut self, snapshot: &HandSnapshot) -> EngineResult<()> {
        let mut seen = HashSet::new();
        for contribution in &snapshot.contributors {
            if !seen.insert(contribution.id.as_str()) {
                return Err(ShowdownError::DuplicatePlayer(contribution.id.clone()));
            }
            if contribution.total_committed < 0 {
                return Err(ShowdownError::NegativeContribution(contribution.id.clone()));
            }
            let stack = self
                .stack(&contribution.id)
                .ok_or_else(|| ShowdownError::PlayerNotFound(contribution.id.clone()))?;
            if stack < contribution.total_committed {
                return Err(ShowdownError::InsufficientChips(
                    contribution.id.clone(),
                    contribution.total_committed,
                    stack,
                ));
            }
        }
        for contribution in &snapshot.contributors {
            self.commit(&contribution.id, contribution.total_committed)?;
        }
        Ok(())
    }

    /// Hands a committed snapshot's chips back to the players who put them in.
    fn refund_hand(&mut self, snapshot: &HandSnapshot) {
        for contribution in &snapshot.contributors {
            if let Some(stack) = self.stacks.get_mut(&contribution.id) {
                *stack += contribution.total_committed;
                self.pot -= contribution.total_committed;
            }
        }
    }

    /// Credits every winner and empties the pot. Nothing changes if a
    /// credited player is not seated here.
    pub fn apply_settlement(&mut self, settlement: &Settlement) -> EngineResult<()> {
        if let Some(missing) = settlement
            .stack_deltas
            .keys()
            .find(|id| !self.stacks.contains_key(id.as_str()))
        {
            return Err(ShowdownError::PlayerNotFound(missing.clone()));
        }

        let paid: Chips = settlement.stack_deltas.values().sum();
        for (player_id, delta) in &settlement.stack_deltas {
            if let Some(stack) = self.stacks.get_mut(player_id) {
                *stack += delta;
            }
        }

        if settlement.cleared_pot {
            if paid != self.pot {
                error!(
                    "Room {}: settlement paid {} from a pot of {}",
                    self.room_id, paid, self.pot
                );
            }
            self.pot = 0;
        } else {
            self.pot -= paid;
        }
        Ok(())
    }

    /// Resolves the hand whose chips are in the pot, pays the winners and
    /// publishes the result.
    pub fn settle_hand(
        &mut self,
        engine: &ShowdownEngine,
        snapshot: &HandSnapshot,
    ) -> EngineResult<ShowdownOutcome> {
        let committed = snapshot.total_pot();
        if committed != self.pot {
            return Err(ShowdownError::PotMismatch(self.pot, committed));
        }

        let outcome = engine.resolve_hand(snapshot)?;
        if outcome.settlement.stack_deltas.is_empty() && self.pot > 0 {
            warn!(
                "Room {}: hand {} paid nobody, refunding {} chips",
                self.room_id, snapshot.hand_id, self.pot
            );
            self.refund_hand(snapshot);
            return Ok(outcome);
        }
        self.apply_settlement(&outcome.settlement)?;
        self.hands_settled += 1;

        info!(
            "Room {}: settled hand {} ({} hands so far)",
            self.room_id, snapshot.hand_id, self.hands_settled
        );

        self.publish(TableEvent::Showdown(ShowdownUpdate {
            room_id: self.room_id.clone(),
            hand_id: snapshot.hand_id.clone(),
            community_cards: snapshot.board.clone(),
            result: outcome.result.clone(),
        }));
        self.publish(TableEvent::StacksUpdated(self.stacks()));

        Ok(outcome)
    }

    /// Commits the snapshot's contributions and settles them. A hand that
    /// fails to settle leaves stacks and pot as they were.
    pub fn play_hand(
        &mut self,
        engine: &ShowdownEngine,
        snapshot: &HandSnapshot,
    ) -> EngineResult<ShowdownOutcome> {
        self.commit_hand(snapshot)?;
        self.settle_hand(engine, snapshot).map_err(|e| {
            warn!(
                "Room {}: hand {} failed to settle, refunding: {}",
                self.room_id, snapshot.hand_id, e
            );
            self.refund_hand(snapshot);
            e
        })
    }
}

fn lock_room(room: &Arc<Mutex<Room>>) -> parking_lot::MutexGuard<'_, Room> {
    room.lock()
}

/// Independent rooms sharing one event channel. Each room sits behind its
/// own lock, so different rooms settle in parallel.
pub struct RoomRegistry {
    rooms: HashMap<String, Arc<Mutex<Room>>>,
    tx: broadcast::Sender<TableEvent>,
}

impl RoomRegistry {
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            tx: broadcast::channel(channel_capacity).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TableEvent> {
        self.tx.subscribe()
    }

    /// Returns the room, creating it first if needed.
    pub fn create_room(&mut self, room_id: &str) -> Arc<Mutex<Room>> {
        let tx = self.tx.clone();
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(|| {
                debug!("Creating room {}", room_id);
                Arc::new(Mutex::new(Room::new(room_id.to_string(), tx)))
            })
            .clone()
    }

    pub fn get(&self, room_id: &str) -> EngineResult<Arc<Mutex<Room>>> {
        self.rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| ShowdownError::RoomNotFound(room_id.to_string()))
    }

    pub fn room_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.rooms.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Commits the snapshot's contributions and settles it in one step.
    pub fn play_hand(
        &self,
        room_id: &str,
        engine: &ShowdownEngine,
        snapshot: &HandSnapshot,
    ) -> EngineResult<ShowdownOutcome> {
        let room = self.get(room_id)?;
        let mut room = lock_room(&room);
        room.play_hand(engine, snapshot)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{UnknownVariantPolicy, VariantRegistry};
    use showdown_protocol::{parse_cards, Contribution};

    fn contributor(id: &str, seat: usize, hole: &str, committed: Chips, in_hand: bool) -> Contribution {
        Contribution {
            id: id.to_string(),
            seat,
            hole_cards: parse_cards(hole).unwrap(),
            total_committed: committed,
            still_in_hand: in_hand,
        }
    }

    fn heads_up(hand_id: &str) -> HandSnapshot {
        HandSnapshot {
            hand_id: hand_id.to_string(),
            variant: "nlh".to_string(),
            board: parse_cards("2c 7d 9h Qs Kh").unwrap(),
            contributors: vec![
                contributor("alice", 1, "Kd Kc", 100, true),
                contributor("bob", 2, "3d 4c", 100, true),
            ],
            dealer_seat: 0,
            last_aggressor_seat: None,
            any_all_in: false,
            pot_tiers: None,
        }
    }

    fn room_with_players() -> Room {
        let mut room = Room::new("t1".to_string(), broadcast::channel(16).0);
        room.seat_player("alice", 1000);
        room.seat_player("bob", 1000);
        room
    }

    #[test]
    fn test_commit_moves_chips_into_pot() {
        let mut room = room_with_players();
        room.commit("alice", 150).unwrap();
        assert_eq!(room.stack("alice"), Some(850));
        assert_eq!(room.pot(), 150);
    }

    #[test]
    fn test_commit_errors() {
        let mut room = room_with_players();
        assert!(matches!(
            room.commit("carol", 10),
            Err(ShowdownError::PlayerNotFound(_))
        ));
        assert!(matches!(
            room.commit("alice", 5000),
            Err(ShowdownError::InsufficientChips(_, 5000, 1000))
        ));
        assert!(matches!(
            room.commit("alice", -1),
            Err(ShowdownError::NegativeContribution(_))
        ));
        assert_eq!(room.pot(), 0);
    }

    #[test]
    fn test_commit_hand_is_all_or_nothing() {
        let mut room = room_with_players();
        let mut snapshot = heads_up("h1");
        snapshot.contributors[1].total_committed = 2000;
        assert!(room.commit_hand(&snapshot).is_err());
        assert_eq!(room.stack("alice"), Some(1000));
        assert_eq!(room.pot(), 0);
    }

    #[test]
    fn test_commit_hand_rejects_duplicate_player() {
        let mut room = room_with_players();
        let mut snapshot = heads_up("h1");
        snapshot.contributors = vec![
            contributor("alice", 1, "Kd Kc", 600, true),
            contributor("alice", 1, "Kd Kc", 600, true),
        ];
        assert!(matches!(
            room.commit_hand(&snapshot),
            Err(ShowdownError::DuplicatePlayer(_))
        ));
        assert_eq!(room.stack("alice"), Some(1000));
        assert_eq!(room.pot(), 0);
    }

    #[test]
    fn test_play_hand_refunds_rejected_hand() {
        let mut registry = VariantRegistry::default();
        registry.set_unknown_policy(UnknownVariantPolicy::Reject);
        let engine = ShowdownEngine::new(registry);
        let mut room = room_with_players();

        let mut rejected = heads_up("h1");
        rejected.variant = "mystery".to_string();
        assert!(matches!(
            room.play_hand(&engine, &rejected),
            Err(ShowdownError::UnknownVariant(_))
        ));
        assert_eq!(room.pot(), 0);
        assert_eq!(room.stack("alice"), Some(1000));
        assert_eq!(room.stack("bob"), Some(1000));
        assert_eq!(room.hands_settled(), 0);

        room.play_hand(&engine, &heads_up("h2")).unwrap();
        assert_eq!(room.stack("alice"), Some(1100));
        assert_eq!(room.stack("bob"), Some(900));
        assert_eq!(room.pot(), 0);
    }

    #[test]
    fn test_hand_paying_nobody_is_refunded() {
        let mut room = room_with_players();
        let mut snapshot = heads_up("h1");
        for contribution in &mut snapshot.contributors {
            contribution.still_in_hand = false;
        }
        room.play_hand(&ShowdownEngine::default(), &snapshot).unwrap();
        assert_eq!(room.pot(), 0);
        assert_eq!(room.stack("alice"), Some(1000));
        assert_eq!(room.stack("bob"), Some(1000));
    }

    #[test]
    fn test_settle_hand_pays_winner_and_clears_pot() {
        let mut room = room_with_players();
        let engine = ShowdownEngine::default();
        let snapshot = heads_up("h1");
        room.commit_hand(&snapshot).unwrap();

        let outcome = room.settle_hand(&engine, &snapshot).unwrap();
        assert_eq!(outcome.result.winners[0].player_id, "alice");
        assert_eq!(room.stack("alice"), Some(1100));
        assert_eq!(room.stack("bob"), Some(900));
        assert_eq!(room.pot(), 0);
        assert_eq!(room.hands_settled(), 1);
    }

    #[test]
    fn test_settle_hand_rejects_pot_mismatch() {
        let mut room = room_with_players();
        room.commit("alice", 100).unwrap();
        let result = room.settle_hand(&ShowdownEngine::default(), &heads_up("h1"));
        assert!(matches!(result, Err(ShowdownError::PotMismatch(100, 200))));
        assert_eq!(room.pot(), 100);
    }

    #[test]
    fn test_apply_settlement_unknown_player_changes_nothing() {
        let mut room = room_with_players();
        room.commit("alice", 50).unwrap();
        let mut settlement = Settlement {
            cleared_pot: true,
            ..Default::default()
        };
        settlement.stack_deltas.insert("alice".to_string(), 25);
        settlement.stack_deltas.insert("ghost".to_string(), 25);
        assert!(room.apply_settlement(&settlement).is_err());
        assert_eq!(room.stack("alice"), Some(950));
        assert_eq!(room.pot(), 50);
    }

    #[test]
    fn test_settle_publishes_events() {
        let mut room = room_with_players();
        let mut rx = room.tx.subscribe();
        let snapshot = heads_up("h7");
        room.commit_hand(&snapshot).unwrap();
        room.settle_hand(&ShowdownEngine::default(), &snapshot).unwrap();

        match rx.try_recv().unwrap() {
            TableEvent::Showdown(update) => {
                assert_eq!(update.room_id, "t1");
                assert_eq!(update.hand_id, "h7");
                assert_eq!(update.community_cards.len(), 5);
                assert_eq!(update.result.total_awarded(), 200);
            }
            other => panic!("unexpected event {}", other),
        }
        match rx.try_recv().unwrap() {
            TableEvent::StacksUpdated(stacks) => {
                assert_eq!(
                    stacks,
                    vec![("alice".to_string(), 1100), ("bob".to_string(), 900)]
                );
            }
            other => panic!("unexpected event {}", other),
        }
    }

    #[test]
    fn test_uncontested_hand_through_room() {
        let mut room = room_with_players();
        let mut snapshot = heads_up("h2");
        snapshot.contributors[1].still_in_hand = false;
        snapshot.contributors[1].total_committed = 20;
        room.commit_hand(&snapshot).unwrap();
        room.settle_hand(&ShowdownEngine::default(), &snapshot)
            .unwrap();
        assert_eq!(room.stack("alice"), Some(1020));
        assert_eq!(room.stack("bob"), Some(980));
    }

    #[test]
    fn test_registry_rooms_are_independent() {
        let mut registry = RoomRegistry::default();
        for id in ["east", "west"] {
            let room = registry.create_room(id);
            let mut room = room.lock();
            room.seat_player("alice", 500);
            room.seat_player("bob", 500);
        }
        assert!(matches!(
            registry.get("north"),
            Err(ShowdownError::RoomNotFound(_))
        ));
        assert_eq!(registry.room_ids(), vec!["east", "west"]);

        let registry = Arc::new(registry);
        let engine = Arc::new(ShowdownEngine::default());
        let handles: Vec<_> = ["east", "west"]
            .into_iter()
            .map(|id| {
                let registry = Arc::clone(&registry);
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || {
                    for n in 0..5 {
                        registry
                            .play_hand(id, &engine, &heads_up(&format!("{}-{}", id, n)))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for id in ["east", "west"] {
            let room = registry.get(id).unwrap();
            let room = room.lock();
            assert_eq!(room.hands_settled(), 5);
            assert_eq!(room.stack("alice"), Some(1000));
            assert_eq!(room.stack("bob"), Some(0));
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_events_from_every_room() {
        let mut registry = RoomRegistry::new(8);
        let mut rx = registry.subscribe();
        for id in ["a", "b"] {
            let room = registry.create_room(id);
            let mut room = room.lock();
            room.seat_player("alice", 100);
            room.seat_player("bob", 100);
        }
        let engine = ShowdownEngine::default();
        registry.play_hand("a", &engine, &heads_up("1")).unwrap();
        registry.play_hand("b", &engine, &heads_up("2")).unwrap();

        let mut showdown_rooms = Vec::new();
        for _ in 0..4 {
            if let TableEvent::Showdown(update) = rx.recv().await.unwrap() {
                showdown_rooms.push(update.room_id);
            }
        }
        assert_eq!(showdown_rooms, vec!["a", "b"]);
    }
}
