//! Interactive questions asked when a value was not given on the command line.

use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use crate::export::{max_exportable, MAX_RESULTS_CAP};
use crate::query::SearchMode;
use crate::render::Format;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn say(&mut self, message: impl Display) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    /// Ask once and return the trimmed answer. End of input is an error so
    /// that retry loops cannot spin forever.
    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before an answer was given",
            ));
        }
        Ok(line.trim().to_string())
    }

    pub fn search_mode(&mut self) -> io::Result<SearchMode> {
        loop {
            match self
                .ask("Search URL type (1: simple search, 2: advanced search): ")?
                .as_str()
            {
                "1" => return Ok(SearchMode::Simple),
                "2" => return Ok(SearchMode::Advanced),
                _ => self.say("Please enter 1 or 2.")?,
            }
        }
    }

    pub fn search_url(&mut self) -> io::Result<String> {
        self.ask("Paste the full arXiv search results URL: ")
    }

    pub fn output_dir(&mut self, default: &Path) -> io::Result<PathBuf> {
        let answer = self.ask(&format!(
            "Directory to save the export in (blank for {}): ",
            default.display()
        ))?;
        Ok(if answer.is_empty() {
            default.to_path_buf()
        } else {
            PathBuf::from(answer)
        })
    }

    pub fn format(&mut self) -> io::Result<Format> {
        self.say("\nExport format:")?;
        for (i, format) in Format::ALL.iter().enumerate() {
            self.say(format!(
                "  {}: {} (.{})",
                i + 1,
                format.display_name(),
                format.extension()
            ))?;
        }
        loop {
            let answer = self.ask("Format number (1, 2 or 3): ")?;
            let choice = answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| Format::ALL.get(i).copied());
            match choice {
                Some(format) => return Ok(format),
                None => self.say("Please enter 1, 2 or 3.")?,
            }
        }
    }

    /// Number of entries to export, lowered to what the search can provide.
    pub fn count(&mut self, total: u32) -> io::Result<u32> {
        let limit = max_exportable(total);
        self.say(format!(
            "Note: the arXiv API returns at most {MAX_RESULTS_CAP} records per request."
        ))?;
        loop {
            let answer = self.ask(&format!(
                "How many of the newest papers to export (max {total}, capped at {MAX_RESULTS_CAP}): "
            ))?;
            match answer.parse::<i64>() {
                Ok(n) if n <= 0 => self.say("The number must be greater than 0.")?,
                Ok(n) if n > i64::from(limit) => {
                    self.say(format!("Out of range, using {limit}."))?;
                    return Ok(limit);
                }
                Ok(n) => return Ok(n as u32),
                Err(_) => self.say("Please enter a whole number.")?,
            }
        }
    }
}
