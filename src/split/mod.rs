use crate::cue::{CueSheet, TrackRef};
use crate::split::error::{SplitError, SplitResult};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod error;

/// Lossless containers tried, in order, when the file named by the sheet is missing.
pub const ALTERNATE_EXTENSIONS: [&str; 4] = ["flac", "ape", "wv", "tak"];

lazy_static! {
    static ref FORBIDDEN_FILENAME_CHARS: Regex = Regex::new(r#"[<>:"/\\|?*]"#).unwrap();
}

/// Replaces characters that are not allowed in Windows or Linux file names.
pub fn sanitize_filename(name: &str) -> String {
    FORBIDDEN_FILENAME_CHARS
        .replace_all(name, "_")
        .trim()
        .to_string()
}

/// Finds the audio file for a `FILE` entry, relative to the cue sheet's directory.
pub async fn resolve_audio_file(cue_path: &Path, file_name: &str) -> SplitResult<PathBuf> {
    let cue_dir = cue_path.parent().unwrap_or(Path::new("."));
    let base_path = cue_dir.join(file_name);

    if tokio::fs::try_exists(&base_path).await? {
        return Ok(base_path);
    }

    for extension in ALTERNATE_EXTENSIONS {
        let candidate = base_path.with_extension(extension);
        if tokio::fs::try_exists(&candidate).await? {
            info!("Audio file '{file_name}' not found, using {candidate:?} instead.");
            return Ok(candidate);
        }
    }

    Err(SplitError::AudioFileNotFound(file_name.to_string()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    pub codec: String,
    pub quality: String,
    pub extension: String,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            codec: "libvorbis".to_string(),
            quality: "5".to_string(),
            extension: "ogg".to_string(),
        }
    }
}

/// One ffmpeg invocation extracting a single track.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegCommand {
    pub source: PathBuf,
    pub start: Duration,
    /// `None` reads to the end of the source file.
    pub duration: Option<Duration>,
    pub codec: String,
    pub quality: String,
    pub output: String,
    pub metadata: Vec<(&'static str, String)>,
}

impl FfmpegCommand {
    pub fn for_track(
        sheet: &CueSheet,
        track: &TrackRef<'_>,
        source: impl Into<PathBuf>,
        options: &SplitOptions,
    ) -> Self {
        let title = track
            .title
            .clone()
            .unwrap_or_else(|| format!("Track {:02}", track.number));
        let output = sanitize_filename(&format!(
            "{:02} - {}.{}",
            track.number, title, options.extension
        ));

        let duration = Some(track.duration()).filter(|duration| !duration.is_zero());

        let mut metadata = Vec::new();
        if let Some(artist) = track.performer.as_ref().or(sheet.performer.as_ref()) {
            metadata.push(("artist", artist.clone()));
        }
        if let Some(album_artist) = &sheet.performer {
            metadata.push(("album_artist", album_artist.clone()));
        }
        if let Some(album) = &sheet.title {
            metadata.push(("album", album.clone()));
        }
        metadata.push(("title", title));
        metadata.push(("track", track.number.to_string()));

        Self {
            source: source.into(),
            start: track.start_time().to_duration(),
            duration,
            codec: options.codec.clone(),
            quality: options.quality.clone(),
            output,
            metadata,
        }
    }
}

/// Quotes `value` for a POSIX shell. Nothing inside single quotes is expanded.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

impl fmt::Display for FfmpegCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ffmpeg -i {} -ss {:.6} -vn -map_metadata -1",
            quote(&self.source.to_string_lossy()),
            self.start.as_secs_f64()
        )?;

        if let Some(duration) = self.duration {
            write!(f, " -t {:.6}", duration.as_secs_f64())?;
        }

        write!(
            f,
            " -c:a {} -q:a {} {}",
            self.codec,
            self.quality,
            quote(&self.output)
        )?;

        for (key, value) in &self.metadata {
            write!(f, " -metadata {key}={}", quote(value))?;
        }

        Ok(())
    }
}

/// Builds one command per track, skipping file blocks whose audio cannot be found.
pub async fn build_commands(
    sheet: &CueSheet,
    cue_path: &Path,
    options: &SplitOptions,
) -> SplitResult<Vec<FfmpegCommand>> {
    let mut commands = Vec::new();

    for file in sheet.iter_files() {
        let source = match resolve_audio_file(cue_path, &file.name).await {
            Ok(source) => source,
            Err(SplitError::AudioFileNotFound(name)) => {
                warn!("Skipping file block for '{name}' because the audio file could not be found");
                continue;
            }
            Err(err) => return Err(err),
        };

        debug!("Using {source:?} for {} track(s)", file.tracks.len());

        for track in file.tracks() {
            commands.push(FfmpegCommand::for_track(sheet, &track, source.clone(), options));
        }
    }

    Ok(commands)
}
