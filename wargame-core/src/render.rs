//! Fixed-width text rendering of a game state

use std::fmt::{self, Write};

use crate::coord::Coord;
use crate::game::GameState;

/// Render the header lines and the board grid
pub fn render(state: &GameState) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = write_state(&mut out, state);
    out
}

fn write_state(out: &mut impl Write, state: &GameState) -> fmt::Result {
    let dim = state.board().dim();
    let max_turns = state
        .options()
        .max_turns
        .map_or_else(|| "-".to_string(), |turns| turns.to_string());

    writeln!(out, "Next player: {}", state.next_player())?;
    writeln!(out, "Turns played: {}/{}", state.turns_played(), max_turns)?;
    writeln!(out)?;

    write!(out, "   ")?;
    for col in 0..dim {
        write!(out, "{:^3} ", Coord::new(0, col as i8).col_label())?;
    }
    writeln!(out)?;

    for row in 0..dim {
        write!(out, "{}: ", Coord::new(row as i8, 0).row_label())?;
        for col in 0..dim {
            match state.get(Coord::new(row as i8, col as i8)) {
                Some(unit) => write!(out, "{:^3} ", unit.to_string())?,
                None => write!(out, " .  ")?,
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_state(f, self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Options;

    #[test]
    fn test_render_opening() {
        let game = GameState::new(Options::default());
        let text = render(&game);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "Next player: Attacker");
        assert_eq!(lines[1], "Turns played: 0/100");
        assert_eq!(lines[3], "    0   1   2   3   4  ");
        assert_eq!(lines[4], "A: dA9 dT9 dF9  .   .  ");
        assert_eq!(lines[8], "E:  .   .  aP9 aV9 aA9 ");
        assert_eq!(text, game.to_string());
    }
}
