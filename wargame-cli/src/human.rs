//! Console move source for human players
//!
//! Prompts until a well-formed coordinate pair is typed. Legality is checked
//! by the runner, which reports illegal moves back through `reject`.

use std::io::{self, BufRead, Write};

use wargame_core::{CoordPair, GameState};
use wargame_search::{MoveSource, RunnerError};

pub struct PromptSource<R, W> {
    input: R,
    output: W,
}

impl PromptSource<io::StdinLock<'static>, io::Stdout> {
    pub fn stdin() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> PromptSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn prompt(&mut self, state: &GameState) -> io::Result<Option<String>> {
        write!(self.output, "Player {}, enter your move: ", state.next_player())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

impl<R: BufRead, W: Write> MoveSource for PromptSource<R, W> {
    fn next_move(&mut self, state: &GameState) -> Result<CoordPair, RunnerError> {
        loop {
            let line = self
                .prompt(state)
                .map_err(|err| RunnerError::Source(err.to_string()))?
                .ok_or_else(|| RunnerError::Source("input closed".to_string()))?;

            match line.parse::<CoordPair>() {
                Ok(pair) => return Ok(pair),
                Err(err) => {
                    // Console write failures only lose the hint
                    let _ = writeln!(self.output, "Invalid coordinates ({err})! Try again.");
                }
            }
        }
    }

    fn reject(&mut self, _pair: CoordPair, reason: &str) {
        let _ = writeln!(self.output, "The move is not valid! {reason}");
    }
}
