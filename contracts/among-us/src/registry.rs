use soroban_sdk::{Address, BytesN, Map};

use crate::types::Player;
use crate::GameError;

/// Add `player` to the registry.
///
/// Checks run in a fixed order: address, identity hashes, capacity.
pub fn join(
    players: &mut Map<Address, Player>,
    max_players: u32,
    player: Player,
) -> Result<(), GameError> {
    if players.contains_key(player.address.clone()) {
        return Err(GameError::DuplicateJoin);
    }

    // Neither hash may collide with either hash of an existing player.
    for existing in players.values().iter() {
        let taken = [&existing.player_hash, &existing.role_commitment];
        if taken.contains(&&player.player_hash) || taken.contains(&&player.role_commitment) {
            return Err(GameError::DuplicateIdentityHash);
        }
    }

    if players.len() >= max_players {
        return Err(GameError::RegistryFull);
    }

    players.set(player.address.clone(), player);
    Ok(())
}

pub fn require_alive(
    players: &Map<Address, Player>,
    address: &Address,
) -> Result<Player, GameError> {
    match players.get(address.clone()) {
        Some(player) if player.alive => Ok(player),
        _ => Err(GameError::NotRegisteredOrNotAlive),
    }
}

pub fn require_registered(
    players: &Map<Address, Player>,
    address: &Address,
) -> Result<Player, GameError> {
    players
        .get(address.clone())
        .ok_or(GameError::NotRegisteredOrNotAlive)
}

/// Living player whose public `player_hash` equals `commitment`.
pub fn find_alive_by_hash(
    players: &Map<Address, Player>,
    commitment: &BytesN<32>,
) -> Option<Player> {
    players
        .values()
        .iter()
        .find(|p| p.alive && p.player_hash == *commitment)
}

pub fn mark_dead(players: &mut Map<Address, Player>, mut player: Player) {
    player.alive = false;
    players.set(player.address.clone(), player);
}

pub fn total_tasks(players: &Map<Address, Player>) -> u32 {
    players
        .values()
        .iter()
        .fold(0u32, |sum, p| sum.saturating_add(p.task_count))
}

pub fn alive_count(players: &Map<Address, Player>) -> u32 {
    players.values().iter().filter(|p| p.alive).count() as u32
}
