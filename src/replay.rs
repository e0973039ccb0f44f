//! Scripted allocator sessions
//!
//! A script is one command per line:
//!
//! ```text
//! # comments and blank lines are skipped
//! alloc 16
//! free 16 0
//! status
//! ```

use crate::allocator::{AllocatorStatus, BlockId, QuickFitAllocator};
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// One scripted allocator call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Alloc { size: usize },
    Free { size: usize, id: BlockId },
    Status,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().ok_or_else(|| "empty command".to_string())?;
        let args: Vec<&str> = words.collect();


        match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("alloc", [size]) => Ok(Command::Alloc {
                size: number(size)?,
            }),
            ("free", [size, id]) => Ok(Command::Free {
                size: number(size)?,
                id: BlockId::new(number(id)?),
            }),
            ("status", []) => Ok(Command::Status),
            ("alloc", _) => Err("usage: alloc <size>".to_string()),
            ("free", _) => Err("usage: free <size> <id>".to_string()),
            ("status", _) => Err("usage: status".to_string()),
            (other, _) => Err(format!("unknown command {:?}", other)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Alloc { size } => write!(f, "alloc {}", size),
            Command::Free { size, id } => write!(f, "free {} {}", size, id),
            Command::Status => write!(f, "status"),
        }
    }
}

fn number<T>(s: &str) -> std::result::Result<T, String>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| format!("invalid number {:?}: {}", s, e))
}

/// Parse a whole script, reporting the first bad line
pub fn parse_script(script: &str) -> Result<Vec<Command>> {
    script
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.split('#').next().unwrap_or("").trim()))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line_no, line)| {
            line.parse().map_err(|message| Error::Parse {
                line: line_no,
                message,
            })
        })
        .collect()
}

/// Result of running one command
#[derive(Debug)]
pub enum Outcome {
    Allocated { size: usize, id: BlockId },
    Freed { size: usize, id: BlockId },
    Status(AllocatorStatus),
    Failed { command: Command, error: Error },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Allocated { size, id } => write!(f, "Allocated block of size {}: {}", size, id),
            Outcome::Freed { size, id } => write!(f, "Deallocated block of size {}: {}", size, id),
            Outcome::Status(status) => write!(f, "{}", status),
            Outcome::Failed { command, error } => write!(f, "Error: {} ({})", error, command),
        }
    }
}

/// Runs commands against an allocator it borrows
pub struct Replay<'a> {
    allocator: &'a mut QuickFitAllocator,
}

impl<'a> Replay<'a> {
    pub fn new(allocator: &'a mut QuickFitAllocator) -> Self {
        Self { allocator }
    }

    /// Execute one command; allocator errors become `Outcome::Failed`
    pub fn step(&mut self, command: Command) -> Outcome {
        let result = match command {
            Command::Alloc { size } => self
                .allocator
                .allocate(size)
                .map(|id| Outcome::Allocated { size, id }),
            Command::Free { size, id } => self
                .allocator
                .deallocate(size, id)
                .map(|()| Outcome::Freed { size, id }),
            Command::Status => Ok(Outcome::Status(self.allocator.status())),
        };

        result.unwrap_or_else(|error| Outcome::Failed { command, error })
    }

    /// Execute every command in order
    pub fn run(&mut self, commands: &[Command]) -> Vec<Outcome> {
        commands.iter().map(|&c| self.step(c)).collect()
    }
}
