//! Unit definitions: teams, unit types, combat and repair tables

use std::fmt;

use serde::{Deserialize, Serialize};

/// Health ceiling for every unit
pub const MAX_HEALTH: u8 = 9;

/// Team
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Attacker = 0,
    Defender = 1,
}

impl Team {
    pub fn opponent(self) -> Self {
        match self {
            Team::Attacker => Team::Defender,
            Team::Defender => Team::Attacker,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Team::Attacker => "Attacker",
            Team::Defender => "Defender",
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit type (discriminant indexes the combat tables)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    AI = 0,
    Tech = 1,
    Virus = 2,
    Program = 3,
    Firewall = 4,
}

impl UnitType {
    pub const ALL: [UnitType; 5] = [
        UnitType::AI,
        UnitType::Tech,
        UnitType::Virus,
        UnitType::Program,
        UnitType::Firewall,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UnitType::AI => "AI",
            UnitType::Tech => "Tech",
            UnitType::Virus => "Virus",
            UnitType::Program => "Program",
            UnitType::Firewall => "Firewall",
        }
    }

    /// May disengage from combat and move towards its own base
    pub fn moves_freely(self) -> bool {
        matches!(self, UnitType::Tech | UnitType::Virus)
    }
}

/// Damage dealt, row = actor, column = target (AI, Tech, Virus, Program, Firewall)
pub static DAMAGE_TABLE: [[u8; 5]; 5] = [
    [3, 3, 3, 3, 1], // AI
    [1, 1, 6, 1, 1], // Tech
    [9, 6, 1, 6, 1], // Virus
    [3, 3, 3, 3, 1], // Program
    [1, 1, 1, 1, 1], // Firewall
];

/// Health restored, row = actor, column = target
pub static REPAIR_TABLE: [[u8; 5]; 5] = [
    [0, 1, 1, 0, 0], // AI
    [3, 0, 0, 3, 3], // Tech
    [0, 0, 0, 0, 0], // Virus
    [0, 0, 0, 0, 0], // Program
    [0, 0, 0, 0, 0], // Firewall
];

/// A unit on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub team: Team,
    pub kind: UnitType,
    pub health: u8,
}

impl Unit {
    /// Full-health unit
    pub const fn new(team: Team, kind: UnitType) -> Self {
        Self {
            team,
            kind,
            health: MAX_HEALTH,
        }
    }

    pub const fn with_health(team: Team, kind: UnitType, health: u8) -> Self {
        Self { team, kind, health }
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply a health delta, clamped to [0, MAX_HEALTH]
    pub fn mod_health(&mut self, delta: i32) {
        let health = (self.health as i32 + delta).clamp(0, MAX_HEALTH as i32);
        self.health = health as u8;
    }

    /// Damage this unit deals to `target`, capped at the target's remaining health
    pub fn damage_amount(&self, target: &Unit) -> u8 {
        let amount = DAMAGE_TABLE[self.kind as usize][target.kind as usize];
        amount.min(target.health)
    }

    /// Health this unit restores on `target`, capped at the target's missing health
    pub fn repair_amount(&self, target: &Unit) -> u8 {
        let amount = REPAIR_TABLE[self.kind as usize][target.kind as usize];
        amount.min(MAX_HEALTH.saturating_sub(target.health))
    }
}

impl fmt::Display for Unit {
    /// Team initial, type initial, health: `dA9`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let team = self.team.name().chars().next().unwrap_or('?').to_ascii_lowercase();
        let kind = self.kind.name().chars().next().unwrap_or('?').to_ascii_uppercase();
        write!(f, "{}{}{}", team, kind, self.health)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_clamp() {
        let mut unit = Unit::new(Team::Attacker, UnitType::Program);
        unit.mod_health(5);
        assert_eq!(unit.health, MAX_HEALTH);
        unit.mod_health(-20);
        assert_eq!(unit.health, 0);
        assert!(!unit.is_alive());
    }

    #[test]
    fn test_damage_capped_by_health() {
        let virus = Unit::new(Team::Attacker, UnitType::Virus);
        let ai = Unit::with_health(Team::Defender, UnitType::AI, 4);
        assert_eq!(virus.damage_amount(&ai), 4);
        let full_ai = Unit::new(Team::Defender, UnitType::AI);
        assert_eq!(virus.damage_amount(&full_ai), 9);
        assert_eq!(full_ai.damage_amount(&virus), 3);
    }

    #[test]
    fn test_repair_capped_by_missing_health() {
        let tech = Unit::new(Team::Defender, UnitType::Tech);
        let hurt_ai = Unit::with_health(Team::Defender, UnitType::AI, 8);
        assert_eq!(tech.repair_amount(&hurt_ai), 1);
        let hurt_program = Unit::with_health(Team::Defender, UnitType::Program, 2);
        assert_eq!(tech.repair_amount(&hurt_program), 3);
        let program = Unit::new(Team::Defender, UnitType::Program);
        assert_eq!(program.repair_amount(&hurt_ai), 0);
    }

    #[test]
    fn test_free_movers() {
        for kind in UnitType::ALL {
            let expected = matches!(kind, UnitType::Tech | UnitType::Virus);
            assert_eq!(kind.moves_freely(), expected, "{} free movement", kind.name());
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Unit::new(Team::Defender, UnitType::AI).to_string(), "dA9");
        assert_eq!(Unit::with_health(Team::Attacker, UnitType::Firewall, 3).to_string(), "aF3");
    }
}
