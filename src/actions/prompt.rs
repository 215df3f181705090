//! Interactive keeper selection on the console.

use std::io::{self, BufRead, Write};

use super::executor::KeeperChooser;
use crate::duplicates::DuplicateSet;

/// Attempts allowed before a set is given up.
const MAX_ATTEMPTS: usize = 3;

/// Lists each set and reads the number of the member to keep.
///
/// An empty answer keeps member 1. End of input is an error for the set.
#[derive(Debug)]
pub struct StdinPrompt<R, W> {
    reader: R,
    writer: W,
}

impl StdinPrompt<io::StdinLock<'static>, io::Stdout> {
    /// Prompt on the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> StdinPrompt<R, W> {
    /// Prompt using the given reader and writer.
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Consume the prompt, returning the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> KeeperChooser for StdinPrompt<R, W> {
    fn choose_keeper(&mut self, set_number: usize, set: &DuplicateSet) -> io::Result<usize> {
        writeln!(self.writer, "Set {}", set_number)?;
        for (idx, member) in set.members().iter().enumerate() {
            writeln!(self.writer, " [{}] {}", idx + 1, member.path.display())?;
        }

        for _ in 0..MAX_ATTEMPTS {
            write!(
                self.writer,
                "Enter the number of the file to keep [1-{}] (default 1): ",
                set.len()
            )?;
            self.writer.flush()?;

            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "no answer given",
                ));
            }

            let answer = line.trim();
            if answer.is_empty() {
                return Ok(0);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=set.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(self.writer, "Invalid selection: {}", answer)?,
            }
        }

        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "too many invalid selections",
        ))
    }
}
