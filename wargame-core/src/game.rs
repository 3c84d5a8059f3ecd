//! Game state, action legality and action resolution

use std::iter;
use std::sync::Arc;

use crate::board::Board;
use crate::coord::{Coord, CoordPair};
use crate::error::{GameError, IllegalReason};
use crate::options::Options;
use crate::units::{Team, Unit, UnitType};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Health lost by every unit caught in a self-destruct blast
pub const BLAST_DAMAGE: i32 = 2;

/// Blast radius (Chebyshev) around the exploding unit
const BLAST_RADIUS: i8 = 1;

// ============================================================================
// CORE TYPES
// ============================================================================

/// What a coordinate pair means on the current board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitAction {
    Move,
    Attack,
    Repair,
    SelfDestruct,
    Invalid(IllegalReason),
}

impl UnitAction {
    pub fn is_valid(&self) -> bool {
        !matches!(self, UnitAction::Invalid(_))
    }

    /// Short human-readable reason for this classification
    pub fn describe(&self) -> String {
        match self {
            UnitAction::Move => "Move".to_string(),
            UnitAction::Attack => "Attack".to_string(),
            UnitAction::Repair => "Repair".to_string(),
            UnitAction::SelfDestruct => "Detonate".to_string(),
            UnitAction::Invalid(reason) => reason.to_string(),
        }
    }
}

/// A coordinate pair together with its resolved kind
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Action {
    pub pair: CoordPair,
    pub kind: UnitAction,
}

impl Action {
    pub fn new(pair: CoordPair, kind: UnitAction) -> Self {
        Self { pair, kind }
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state (clone to explore; the board is deep-copied, options are shared)
#[derive(Clone, Debug)]
pub struct GameState {
    board: Board,

    /// Team to move
    next_player: Team,

    /// Turns completed so far
    turns_played: u32,

    /// Cleared for good once that team's AI dies
    attacker_has_ai: bool,
    defender_has_ai: bool,

    options: Arc<Options>,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// New game with the standard opening layout
    pub fn new(options: Options) -> Self {
        let mut state = Self::empty(options);
        let md = state.board.dim().saturating_sub(1) as i8;
        let layout = [
            (Coord::new(0, 0), Team::Defender, UnitType::AI),
            (Coord::new(1, 0), Team::Defender, UnitType::Tech),
            (Coord::new(0, 1), Team::Defender, UnitType::Tech),
            (Coord::new(2, 0), Team::Defender, UnitType::Firewall),
            (Coord::new(0, 2), Team::Defender, UnitType::Firewall),
            (Coord::new(1, 1), Team::Defender, UnitType::Program),
            (Coord::new(md, md), Team::Attacker, UnitType::AI),
            (Coord::new(md - 1, md), Team::Attacker, UnitType::Virus),
            (Coord::new(md, md - 1), Team::Attacker, UnitType::Virus),
            (Coord::new(md - 2, md), Team::Attacker, UnitType::Program),
            (Coord::new(md, md - 2), Team::Attacker, UnitType::Program),
            (Coord::new(md - 1, md - 1), Team::Attacker, UnitType::Firewall),
        ];
        for (coord, team, kind) in layout {
            state.set(coord, Some(Unit::new(team, kind)));
        }
        state
    }

    /// Board without any unit, Attacker to move
    pub fn empty(options: Options) -> Self {
        Self::with_shared_options(Arc::new(options))
    }

    pub fn with_shared_options(options: Arc<Options>) -> Self {
        Self {
            board: Board::new(options.dim),
            next_player: Team::Attacker,
            turns_played: 0,
            attacker_has_ai: true,
            defender_has_ai: true,
            options,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn next_player(&self) -> Team {
        self.next_player
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    /// False once the team's AI has been destroyed
    pub fn has_ai(&self, team: Team) -> bool {
        match team {
            Team::Attacker => self.attacker_has_ai,
            Team::Defender => self.defender_has_ai,
        }
    }

    pub fn is_valid_coord(&self, coord: Coord) -> bool {
        self.board.is_valid(coord)
    }

    pub fn get(&self, coord: Coord) -> Option<&Unit> {
        self.board.get(coord)
    }

    /// Overwrite a cell; out-of-bounds coordinates are ignored
    pub fn set(&mut self, coord: Coord, unit: Option<Unit>) {
        self.board.set(coord, unit);
    }

    pub fn remove(&mut self, coord: Coord) -> Option<Unit> {
        self.board.remove(coord)
    }

    /// Units of one team in board scan order
    pub fn player_units(&self, team: Team) -> impl Iterator<Item = (Coord, Unit)> + '_ {
        self.board.team_units(team)
    }

    /// Location of a team's AI, if still on the board
    pub fn ai_position(&self, team: Team) -> Option<Coord> {
        self.player_units(team)
            .find(|(_, unit)| unit.kind == UnitType::AI)
            .map(|(coord, _)| coord)
    }

    // ========================================================================
    // HEALTH
    // ========================================================================

    /// Apply a health delta to the unit at coord (if any), removing it if it dies
    pub fn mod_health(&mut self, coord: Coord, delta: i32) {
        if let Some(unit) = self.board.get_mut(coord) {
            unit.mod_health(delta);
            self.remove_dead(coord);
        }
    }

    fn remove_dead(&mut self, coord: Coord) {
        let dead = matches!(self.board.get(coord), Some(unit) if !unit.is_alive());
        if !dead {
            return;
        }
        if let Some(unit) = self.board.remove(coord) {
            if unit.kind == UnitType::AI {
                match unit.team {
                    Team::Attacker => self.attacker_has_ai = false,
                    Team::Defender => self.defender_has_ai = false,
                }
            }
        }
    }

    /// Kill the unit at coord outright
    fn destroy(&mut self, coord: Coord) {
        if let Some(unit) = self.board.get_mut(coord) {
            unit.health = 0;
            self.remove_dead(coord);
        }
    }

    /// Blast damage to every cell around (and including) the blast point
    fn explode(&mut self, blast_point: Coord) {
        for cell in blast_point.iter_range(BLAST_RADIUS) {
            self.mod_health(cell, -BLAST_DAMAGE);
        }
    }

    // ========================================================================
    // ACTION LEGALITY
    // ========================================================================

    /// Classify a pair for the team to move
    pub fn determine_action(&self, pair: CoordPair) -> UnitAction {
        self.determine_action_for(self.next_player, pair)
    }

    /// Classify a pair as if `mover` were to move; the first failing rule decides
    pub fn determine_action_for(&self, mover: Team, pair: CoordPair) -> UnitAction {
        if !self.is_valid_coord(pair.src) || !self.is_valid_coord(pair.dst) {
            return UnitAction::Invalid(IllegalReason::NoSuchCoordinate);
        }

        let actor = match self.get(pair.src) {
            Some(unit) => *unit,
            None => return UnitAction::Invalid(IllegalReason::NoUnit),
        };
        if actor.team != mover {
            return UnitAction::Invalid(IllegalReason::NotOwned);
        }
        if pair.is_same_cell() {
            return UnitAction::SelfDestruct;
        }
        if !pair.is_adjacent_cross() {
            return UnitAction::Invalid(IllegalReason::NotCardinal);
        }

        match self.get(pair.dst) {
            None => self.movement_rule(&actor, pair),
            Some(other) if other.team != mover => UnitAction::Attack,
            Some(other) if actor.repair_amount(other) > 0 => UnitAction::Repair,
            Some(_) => UnitAction::Invalid(IllegalReason::NotRecognized),
        }
    }

    /// Move to an empty cell: only Tech and Virus may retreat or disengage
    fn movement_rule(&self, actor: &Unit, pair: CoordPair) -> UnitAction {
        if actor.kind.moves_freely() {
            return UnitAction::Move;
        }

        let (drow, dcol) = pair.delta();
        match actor.team {
            Team::Defender if drow < 0 || dcol < 0 => {
                return UnitAction::Invalid(IllegalReason::DefenderRetreat);
            }
            Team::Attacker if drow > 0 || dcol > 0 => {
                return UnitAction::Invalid(IllegalReason::AttackerRetreat);
            }
            _ => {}
        }

        if self.is_engaged(pair.src, actor.team) {
            return UnitAction::Invalid(IllegalReason::Engaged);
        }

        UnitAction::Move
    }

    /// Any enemy orthogonally adjacent to coord
    fn is_engaged(&self, coord: Coord, team: Team) -> bool {
        coord
            .iter_adjacent()
            .any(|cell| matches!(self.get(cell), Some(unit) if unit.team != team))
    }

    // ========================================================================
    // ACTION RESOLUTION
    // ========================================================================

    /// Classify then perform a pair for the team to move
    pub fn attempt_move(&mut self, pair: CoordPair) -> Result<String, GameError> {
        let action = self.determine_action(pair);
        tracing::debug!("{}: {}", pair, action.describe());
        self.perform_move(pair, action)
    }

    /// Execute an already classified action, returning a description of what happened
    pub fn perform_move(&mut self, pair: CoordPair, action: UnitAction) -> Result<String, GameError> {
        if let UnitAction::Invalid(reason) = action {
            return Err(GameError::IllegalAction(reason));
        }

        let actor = *self
            .get(pair.src)
            .ok_or(GameError::IllegalAction(IllegalReason::NoUnit))?;
        let team = actor.team.name();
        let name = actor.kind.name();

        match action {
            UnitAction::Move => {
                let unit = self.remove(pair.src);
                self.set(pair.dst, unit);
                Ok(format!("{}'s {} moves from {} to {}.", team, name, pair.src, pair.dst))
            }
            UnitAction::SelfDestruct => {
                self.destroy(pair.dst);
                self.explode(pair.dst);
                Ok(format!(
                    "{}'s {} at {} explodes in a fiery blast!! ({} damage to all nearby units)",
                    team, name, pair.dst, BLAST_DAMAGE
                ))
            }
            UnitAction::Attack => {
                let target = *self
                    .get(pair.dst)
                    .ok_or(GameError::IllegalAction(IllegalReason::NotRecognized))?;
                let dealt = actor.damage_amount(&target);
                let taken = target.damage_amount(&actor);
                self.mod_health(pair.dst, -(dealt as i32));
                self.mod_health(pair.src, -(taken as i32));
                Ok(format!(
                    "{}'s {} at {} attacks the {} at {}! ({} damage dealt, {} damage taken as retaliation)",
                    team, name, pair.src, target.kind.name(), pair.dst, dealt, taken
                ))
            }
            UnitAction::Repair => {
                let target = *self
                    .get(pair.dst)
                    .ok_or(GameError::IllegalAction(IllegalReason::NotRecognized))?;
                let amount = actor.repair_amount(&target);
                self.mod_health(pair.dst, amount as i32);
                Ok(format!(
                    "{}'s {} at {} repairs their {} ally at {}! ({} damage repaired)",
                    team, name, pair.src, target.kind.name(), pair.dst, amount
                ))
            }
            UnitAction::Invalid(reason) => Err(GameError::IllegalAction(reason)),
        }
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Every legal action of `team`: per unit in scan order, the four
    /// neighbors (Up, Left, Down, Right) then self-destruct
    pub fn move_candidates(&self, team: Team) -> impl Iterator<Item = Action> + '_ {
        self.player_units(team).flat_map(move |(src, _)| {
            src.iter_adjacent()
                .chain(iter::once(src))
                .filter_map(move |dst| {
                    let pair = CoordPair::new(src, dst);
                    let kind = self.determine_action_for(team, pair);
                    kind.is_valid().then_some(Action::new(pair, kind))
                })
        })
    }

    /// Successor states of the team to move, each an independent clone
    pub fn next_state_candidates(&self) -> impl Iterator<Item = (GameState, Action)> + '_ {
        self.move_candidates(self.next_player).filter_map(move |action| {
            let mut state = self.clone();
            state.perform_move(action.pair, action.kind).ok()?;
            state.advance_turn();
            Some((state, action))
        })
    }

    /// Number of legal actions available to `team`
    pub fn mobility(&self, team: Team) -> usize {
        self.move_candidates(team).count()
    }

    // ========================================================================
    // TURN LIFECYCLE
    // ========================================================================

    /// Hand the move to the other team
    pub fn advance_turn(&mut self) {
        self.next_player = self.next_player.opponent();
        self.turns_played += 1;
    }

    /// Winner, if the game is over.
    ///
    /// Reaching the turn limit always awards the Defender. Both AIs destroyed
    /// before the limit has no defined winner and is reported as an error.
    pub fn winner(&self) -> Result<Option<Team>, GameError> {
        if let Some(max_turns) = self.options.max_turns {
            if self.turns_played >= max_turns {
                return Ok(Some(Team::Defender));
            }
        }
        match (self.attacker_has_ai, self.defender_has_ai) {
            (true, true) => Ok(None),
            (true, false) => Ok(Some(Team::Attacker)),
            (false, true) => Ok(Some(Team::Defender)),
            (false, false) => Err(GameError::BothAiDestroyed),
        }
    }

    /// Game over, including the undefined both-AIs-destroyed state
    pub fn is_finished(&self) -> bool {
        !matches!(self.winner(), Ok(None))
    }
}

// ============================================================================
// TESTS
// ============================================================================
