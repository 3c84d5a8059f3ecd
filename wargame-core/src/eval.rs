//! Position evaluation
//!
//! Every heuristic scores from the Defender's point of view (Defender
//! maximizes, Attacker minimizes), whoever is to move.

use serde::{Deserialize, Serialize};

use crate::game::GameState;
use crate::units::{Team, UnitType};

/// Heuristic score
pub type Score = i64;

/// Score of a won position for the Defender
pub const MAX_HEURISTIC_SCORE: Score = 2_000_000_000;

/// Score of a lost position for the Defender
pub const MIN_HEURISTIC_SCORE: Score = -2_000_000_000;

/// Material value of an AI
const AI_MATERIAL: Score = 9999;

/// Material value of any other unit
const UNIT_MATERIAL: Score = 3;

/// Weight of the Defender AI's health
const DEFENDER_AI_WEIGHT: Score = 10;

/// Virus proximity scale: health * (VIRUS_REACH - distance to the Defender AI)
const VIRUS_REACH: Score = 10;

const ATTACKER_AI_WEIGHT: Score = 5;
const ATTACKER_UNIT_WEIGHT: Score = 2;

/// Weight of the move-count difference in the mobility heuristic
const MOBILITY_WEIGHT: Score = 5;

/// Available evaluation functions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Heuristic {
    /// Material count
    #[serde(rename = "e0")]
    Material,
    /// Weighted health and Virus threat
    #[default]
    #[serde(rename = "e1")]
    WeightedHealth,
    /// Weighted health plus mobility difference
    #[serde(rename = "e2")]
    Mobility,
}

impl Heuristic {
    pub fn name(self) -> &'static str {
        match self {
            Heuristic::Material => "e0",
            Heuristic::WeightedHealth => "e1",
            Heuristic::Mobility => "e2",
        }
    }

    /// Share of the search budget after which no new depth is started.
    /// Costlier evaluations leave a wider margin.
    pub fn time_cutoff_fraction(self) -> f64 {
        match self {
            Heuristic::Material => 0.9,
            Heuristic::WeightedHealth => 0.85,
            Heuristic::Mobility => 0.7,
        }
    }

    pub fn evaluate(self, state: &GameState) -> Score {
        match self {
            Heuristic::Material => material(state),
            Heuristic::WeightedHealth => weighted_health(state),
            Heuristic::Mobility => mobility(state),
        }
    }
}

/// Evaluate a state with the given heuristic
pub fn evaluate(state: &GameState, heuristic: Heuristic) -> Score {
    heuristic.evaluate(state)
}

/// Defender material minus Attacker material
pub fn material(state: &GameState) -> Score {
    state
        .board()
        .units()
        .map(|(_, unit)| {
            let value = if unit.kind == UnitType::AI {
                AI_MATERIAL
            } else {
                UNIT_MATERIAL
            };
            match unit.team {
                Team::Defender => value,
                Team::Attacker => -value,
            }
        })
        .sum()
}

/// Weighted Defender health minus Attacker threat, with terminal sentinels
pub fn weighted_health(state: &GameState) -> Score {
    if !state.has_ai(Team::Defender) {
        return MIN_HEURISTIC_SCORE;
    }
    if !state.has_ai(Team::Attacker) {
        return MAX_HEURISTIC_SCORE;
    }

    let defender_ai = state.ai_position(Team::Defender);
    let mut score: Score = 0;

    for (coord, unit) in state.board().units() {
        let health = unit.health as Score;
        match (unit.team, unit.kind) {
            (Team::Defender, UnitType::AI) => score += health * DEFENDER_AI_WEIGHT,
            (Team::Defender, _) => score += health,
            (Team::Attacker, UnitType::Virus) => {
                let threat = match defender_ai {
                    Some(ai) => VIRUS_REACH - coord.manhattan_distance(ai) as Score,
                    None => ATTACKER_UNIT_WEIGHT,
                };
                score -= health * threat;
            }
            (Team::Attacker, UnitType::AI) => score -= health * ATTACKER_AI_WEIGHT,
            (Team::Attacker, _) => score -= health * ATTACKER_UNIT_WEIGHT,
        }
    }

    score
}

/// Weighted health plus the Defender's surplus of available actions
pub fn mobility(state: &GameState) -> Score {
    let base = weighted_health(state);
    if base == MIN_HEURISTIC_SCORE || base == MAX_HEURISTIC_SCORE {
        return base;
    }
    let defender_moves = state.mobility(Team::Defender) as Score;
    let attacker_moves = state.mobility(Team::Attacker) as Score;
    base + MOBILITY_WEIGHT * (defender_moves - attacker_moves)
}
