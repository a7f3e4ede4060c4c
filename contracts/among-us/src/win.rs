use soroban_sdk::{Address, Map};

use crate::registry;
use crate::types::{GameConfig, ImpostorWinRule, Player, Winner};

/// Decide whether the match is over. Reads only the task total and the
/// alive count; crew completion is checked first.
pub fn evaluate(config: &GameConfig, players: &Map<Address, Player>) -> Winner {
    if registry::total_tasks(players) >= config.tasks_to_win {
        return Winner::Crew;
    }

    match config.impostor_rule {
        ImpostorWinRule::ProofOnly => Winner::None,
        ImpostorWinRule::AssumedParity => {
            let crew_alive = registry::alive_count(players).saturating_sub(config.impostor_count);
            if crew_alive <= config.impostor_count {
                Winner::Impostors
            } else {
                Winner::None
            }
        }
    }
}
