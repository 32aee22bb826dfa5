use crate::cue::{CueSheet, Timecode, TrackRef};
use serde::Serialize;
use std::fmt::Write;
use std::time::Duration;

#[derive(Debug, Serialize)]
pub struct TrackReport<'a> {
    pub number: u32,
    pub file: Option<&'a str>,
    pub title: Option<&'a str>,
    pub performer: Option<&'a str>,
    pub start: Timecode,
    pub start_seconds: f64,
    /// `None` when the sheet does not pin down where the track ends.
    pub duration_seconds: Option<f64>,
}

impl<'a> From<TrackRef<'a>> for TrackReport<'a> {
    fn from(track: TrackRef<'a>) -> Self {
        let duration = track.duration();
        let inner = track.inner();

        Self {
            number: inner.number,
            file: track.file().map(|file| file.inner().name.as_str()),
            title: inner.title.as_deref(),
            performer: inner.performer.as_deref(),
            start: inner.start_time(),
            start_seconds: inner.start_time().to_duration().as_secs_f64(),
            duration_seconds: (!duration.is_zero()).then(|| duration.as_secs_f64()),
        }
    }
}

/// Sheet plus the derived per-track timing, as printed by `info --json`.
#[derive(Debug, Serialize)]
pub struct SheetReport<'a> {
    pub sheet: &'a CueSheet,
    pub tracks: Vec<TrackReport<'a>>,
}

impl<'a> SheetReport<'a> {
    pub fn new(sheet: &'a CueSheet) -> Self {
        Self {
            sheet,
            tracks: sheet.iter_tracks().map(TrackReport::from).collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "?".to_string();
    }
    let millis = duration.as_millis();
    format!(
        "{:02}:{:02}.{:03}",
        millis / 60_000,
        millis / 1000 % 60,
        millis % 1000
    )
}

/// Human readable summary of a sheet, one row per track.
pub fn render_table(sheet: &CueSheet) -> String {
    let mut out = String::new();

    for (label, value) in [
        ("Performer", &sheet.performer),
        ("Title", &sheet.title),
        ("Songwriter", &sheet.songwriter),
        ("Catalog", &sheet.catalog),
        ("CD-Text", &sheet.cd_text_file),
    ] {
        if let Some(value) = value {
            let _ = writeln!(out, "{label}: {value}");
        }
    }

    for file in sheet.iter_files() {
        let _ = writeln!(out, "\nFILE {} ({})", file.name, file.file_type);
        for track in file.tracks() {
            let performer = track
                .performer
                .as_deref()
                .or(sheet.performer.as_deref())
                .unwrap_or("");
            let _ = writeln!(
                out,
                "  {:02}  {}  {:>9}  {}  [{}]",
                track.number,
                track.start_time(),
                format_duration(track.duration()),
                track.title.as_deref().unwrap_or(""),
                performer
            );
        }
    }

    out
}
