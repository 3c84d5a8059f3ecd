//! Game narration sink
//!
//! Everything the game prints goes through a `GameTrace`: always to stdout,
//! and unless disabled to a trace file named after the search options.
//! The trace is opened once per game and closed explicitly at the end.

use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use wargame_core::Options;

pub struct GameTrace {
    file: Option<BufWriter<File>>,
    path: Option<PathBuf>,
}

impl GameTrace {
    /// Console only
    pub fn console() -> Self {
        Self {
            file: None,
            path: None,
        }
    }

    /// Console plus a fresh trace file in `dir`
    pub fn open(options: &Options, dir: &Path) -> io::Result<Self> {
        let path = unique_trace_path(dir, options);
        let mut file = BufWriter::new(File::create(&path)?);
        write_header(&mut file, options)?;
        tracing::info!(path = %path.display(), "writing game trace");

        Ok(Self {
            file: Some(file),
            path: Some(path),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Print one line (or block) of narration
    pub fn line(&mut self, text: impl Display) {
        let text = text.to_string();
        println!("{text}");

        if let Some(file) = self.file.as_mut() {
            if let Err(err) = writeln!(file, "{text}") {
                tracing::warn!(error = %err, "trace file write failed, continuing on stdout only");
                self.file = None;
            }
        }
    }

    /// Flush and close the trace file
    pub fn close(mut self) -> io::Result<Option<PathBuf>> {
        if let Some(mut file) = self.file.take() {
            file.flush()?;
        }
        Ok(self.path.take())
    }
}

/// `game_trace_[{alpha_beta}]_[{max_time}]_[{max_turns}].txt`, with a
/// `(n)` suffix when that name is taken
pub fn unique_trace_path(dir: &Path, options: &Options) -> PathBuf {
    let max_turns = options
        .max_turns
        .map_or_else(|| "none".to_string(), |turns| turns.to_string());
    let stem = format!(
        "game_trace_[{}]_[{:?}]_[{}]",
        options.alpha_beta, options.max_time, max_turns
    );

    let mut path = dir.join(format!("{stem}.txt"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{stem}({n}).txt"));
        n += 1;
    }
    path
}

fn write_header(out: &mut impl Write, options: &Options) -> io::Result<()> {
    writeln!(out, "Game trace - {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(out, "Game type: {}", options.game_type.name())?;
    writeln!(out, "Board: {0}x{0}", options.dim)?;
    writeln!(
        out,
        "Search: {} depth {}..{}, {}s per move, heuristic {}",
        if options.alpha_beta { "alpha-beta" } else { "minimax" },
        options.min_depth,
        options.max_depth,
        options.max_time,
        options.heuristic.name()
    )?;
    match options.max_turns {
        Some(turns) => writeln!(out, "Max turns: {turns}")?,
        None => writeln!(out, "Max turns: unlimited")?,
    }
    writeln!(out)
}
