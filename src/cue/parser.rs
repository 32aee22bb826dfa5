use crate::cue::error::{CueError, CueResult, Scope};
use crate::cue::models::{CueFile, CueSheet, Index, Track};
use crate::cue::timecode::Timecode;
use crate::cue::tokenizer::tokenize;
use lazy_static::lazy_static;
use log::{debug, trace};
use std::collections::HashMap;

type Handler = fn(&mut CueParser, &Statement) -> CueResult<()>;

const COMMANDS: [(&str, Handler); 13] = [
    ("REM", CueParser::on_rem),
    ("CATALOG", CueParser::on_catalog),
    ("CDTEXTFILE", CueParser::on_cd_text_file),
    ("TITLE", CueParser::on_title),
    ("PERFORMER", CueParser::on_performer),
    ("SONGWRITER", CueParser::on_songwriter),
    ("FILE", CueParser::on_file),
    ("TRACK", CueParser::on_track),
    ("INDEX", CueParser::on_index),
    ("PREGAP", CueParser::on_pregap),
    ("POSTGAP", CueParser::on_postgap),
    ("FLAGS", CueParser::on_flags),
    ("ISRC", CueParser::on_isrc),
];

lazy_static! {
    static ref HANDLERS: HashMap<&'static str, Handler> = HashMap::from(COMMANDS);
}

/// One tokenized line, handed to the handler of its command.
struct Statement<'a> {
    line: usize,
    command: &'static str,
    args: &'a [String],
}

impl Statement<'_> {
    fn require(&self, count: usize, expected: &'static str) -> CueResult<()> {
        if self.args.len() < count {
            return Err(CueError::MissingArgument {
                line: self.line,
                command: self.command,
                expected,
            });
        }
        Ok(())
    }

    fn first_arg(&self, expected: &'static str) -> CueResult<String> {
        self.require(1, expected)?;
        Ok(self.args[0].clone())
    }

    fn number(&self, position: usize, field: &'static str) -> CueResult<u32> {
        let value = &self.args[position];
        value.parse().map_err(|_| CueError::InvalidNumber {
            line: self.line,
            field,
            value: value.clone(),
        })
    }

    fn timecode(&self, position: usize) -> CueResult<Timecode> {
        self.args[position]
            .parse()
            .map_err(|source| CueError::InvalidTimecode {
                line: self.line,
                command: self.command,
                source,
            })
    }

    fn missing_context(&self, scope: Scope) -> CueError {
        CueError::MissingContext {
            line: self.line,
            command: self.command,
            scope,
        }
    }
}

/// Line driven CUE sheet state machine.
///
/// Feed lines in order with [`CueParser::feed_line`], then call [`CueParser::finish`]
/// to get the linked sheet.
#[derive(Debug, Default)]
pub struct CueParser {
    sheet: CueSheet,
    current_file: Option<usize>,
    current_track: Option<usize>,
    // INDEX lines seen after FILE but before its first TRACK.
    pending_indices: Vec<Index>,
}

impl CueParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed_line(&mut self, line_number: usize, line: &str) -> CueResult<()> {
        let line = if line_number == 1 {
            line.strip_prefix('\u{feff}').unwrap_or(line)
        } else {
            line
        };
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        let tokens = tokenize(line).map_err(|source| CueError::QuotingError {
            line: line_number,
            source,
        })?;

        let Some((command, args)) = tokens.split_first() else {
            return Ok(());
        };

        let command = command.to_uppercase();
        match HANDLERS.get_key_value(command.as_str()) {
            Some((&name, handler)) => handler(
                self,
                &Statement {
                    line: line_number,
                    command: name,
                    args,
                },
            ),
            None => {
                trace!("Ignoring unknown command {command} on line {line_number}");
                Ok(())
            }
        }
    }

    /// Wires the back references and hands out the sheet.
    pub fn finish(mut self) -> CueSheet {
        if !self.pending_indices.is_empty() {
            debug!(
                "Dropping {} INDEX entries that never got a TRACK",
                self.pending_indices.len()
            );
        }

        self.sheet.link();

        debug!(
            "Parsed CUE sheet with {} file(s) and {} track(s)",
            self.sheet.files.len(),
            self.sheet.tracks().count()
        );

        self.sheet
    }

    fn track_mut(&mut self) -> Option<&mut Track> {
        let file = self.current_file?;
        let track = self.current_track?;
        self.sheet.files.get_mut(file)?.tracks.get_mut(track)
    }

    fn on_rem(&mut self, stmt: &Statement) -> CueResult<()> {
        if !stmt.args.is_empty() {
            self.sheet.remarks.push(stmt.args.join(" "));
        }
        Ok(())
    }

    fn on_catalog(&mut self, stmt: &Statement) -> CueResult<()> {
        self.sheet.catalog = Some(stmt.first_arg("an argument")?);
        Ok(())
    }

    fn on_cd_text_file(&mut self, stmt: &Statement) -> CueResult<()> {
        self.sheet.cd_text_file = Some(stmt.first_arg("an argument")?);
        Ok(())
    }

    fn on_title(&mut self, stmt: &Statement) -> CueResult<()> {
        let title = stmt.first_arg("an argument")?;
        match self.track_mut() {
            Some(track) => track.title = Some(title),
            None => self.sheet.title = Some(title),
        }
        Ok(())
    }

    fn on_performer(&mut self, stmt: &Statement) -> CueResult<()> {
        let performer = stmt.first_arg("an argument")?;
        match self.track_mut() {
            Some(track) => track.performer = Some(performer),
            None => self.sheet.performer = Some(performer),
        }
        Ok(())
    }

    fn on_songwriter(&mut self, stmt: &Statement) -> CueResult<()> {
        let songwriter = stmt.first_arg("an argument")?;
        match self.track_mut() {
            Some(track) => track.songwriter = Some(songwriter),
            None => self.sheet.songwriter = Some(songwriter),
        }
        Ok(())
    }

    fn on_file(&mut self, stmt: &Statement) -> CueResult<()> {
        stmt.require(2, "name and type arguments")?;

        let file = CueFile::new(stmt.args[0].clone(), stmt.args[1].to_uppercase());
        debug!("Line {}: opening file {:?}", stmt.line, file.name);

        self.sheet.files.push(file);
        self.current_file = Some(self.sheet.files.len() - 1);
        self.current_track = None;

        if !self.pending_indices.is_empty() {
            debug!(
                "Line {}: discarding {} INDEX entries left over from the previous file",
                stmt.line,
                self.pending_indices.len()
            );
            self.pending_indices.clear();
        }

        Ok(())
    }

    fn on_track(&mut self, stmt: &Statement) -> CueResult<()> {
        let Some(file_slot) = self.current_file else {
            return Err(stmt.missing_context(Scope::File));
        };
        stmt.require(2, "number and type arguments")?;

        let mut track = Track::new(stmt.number(0, "track")?, stmt.args[1].to_uppercase());
        if !self.pending_indices.is_empty() {
            debug!(
                "Line {}: attaching {} buffered INDEX entries to track {}",
                stmt.line,
                self.pending_indices.len(),
                track.number
            );
            track.indices = std::mem::take(&mut self.pending_indices);
        }

        let file = &mut self.sheet.files[file_slot];
        file.tracks.push(track);
        self.current_track = Some(file.tracks.len() - 1);

        Ok(())
    }

    fn on_index(&mut self, stmt: &Statement) -> CueResult<()> {
        stmt.require(2, "number and timecode arguments")?;

        let index = Index {
            number: stmt.number(0, "index")?,
            time: stmt.timecode(1)?,
        };

        if self.current_file.is_none() {
            return Err(stmt.missing_context(Scope::File));
        }

        match self.track_mut() {
            Some(track) => track.indices.push(index),
            None => self.pending_indices.push(index),
        }
        Ok(())
    }

    fn on_pregap(&mut self, stmt: &Statement) -> CueResult<()> {
        let Some(track) = self.track_mut() else {
            return Err(stmt.missing_context(Scope::Track));
        };
        stmt.require(1, "a timecode argument")?;
        track.pregap = stmt.timecode(0)?;
        Ok(())
    }

    fn on_postgap(&mut self, stmt: &Statement) -> CueResult<()> {
        let Some(track) = self.track_mut() else {
            return Err(stmt.missing_context(Scope::Track));
        };
        stmt.require(1, "a timecode argument")?;
        track.postgap = stmt.timecode(0)?;
        Ok(())
    }

    fn on_flags(&mut self, stmt: &Statement) -> CueResult<()> {
        let Some(track) = self.track_mut() else {
            return Err(stmt.missing_context(Scope::Track));
        };
        track.flags.extend(stmt.args.iter().cloned());
        Ok(())
    }

    fn on_isrc(&mut self, stmt: &Statement) -> CueResult<()> {
        let Some(track) = self.track_mut() else {
            return Err(stmt.missing_context(Scope::Track));
        };
        track.isrc = Some(stmt.first_arg("an argument")?);
        Ok(())
    }
}
