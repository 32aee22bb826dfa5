use crate::cue::error::CueResult;
use log::{debug, warn};
use std::io::BufRead;
use std::path::Path;

pub mod error;
pub mod models;
pub mod parser;
pub mod timecode;
pub mod tokenizer;

pub use error::{CueError, Scope};
pub use models::{CueFile, CueSheet, FileRef, Index, Track, TrackRef};
pub use parser::CueParser;
pub use timecode::{FRAMES_PER_SECOND, Timecode, TimecodeError, timecode_from_frame_count};

/// Parses a CUE sheet from already materialised lines.
pub fn parse<I, S>(lines: I) -> CueResult<CueSheet>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parser = CueParser::new();
    for (i, line) in lines.into_iter().enumerate() {
        parser.feed_line(i + 1, line.as_ref())?;
    }
    Ok(parser.finish())
}

/// Parses a CUE sheet pulled line by line from `reader`.
pub fn parse_reader(reader: impl BufRead) -> CueResult<CueSheet> {
    let mut parser = CueParser::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        parser.feed_line(i + 1, &line)?;
    }
    Ok(parser.finish())
}

/// Reads and parses the CUE sheet at `path`.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, since many
/// ripping tools still write legacy code pages.
pub async fn parse_file(path: impl AsRef<Path>) -> CueResult<CueSheet> {
    let path = path.as_ref();
    debug!("Parsing CUE file: {path:?}");

    let data = tokio::fs::read(path).await?;
    let text = match String::from_utf8(data) {
        Ok(text) => text,
        Err(err) => {
            warn!("CUE file {path:?} is not valid UTF-8, replacing invalid sequences");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    };

    parse(text.lines())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read};
    use std::time::Duration;

    const FULL_SHEET: &str = r#"
REM This is a comment.
REM Another comment line.
CATALOG 1234567890123
PERFORMER "Various Artists"
TITLE "Ultimate Soundtrack"
SONGWRITER "Main Composer"

FILE "cd1.wav" WAVE
  TRACK 01 AUDIO
    TITLE "First Track"
    PERFORMER "Artist One"
    ISRC US-S1Z-99-00001
    FLAGS DCP PRE
    INDEX 00 00:00:00
    INDEX 01 00:02:30
  TRACK 02 AUDIO
    TITLE "Second Track (with quotes)"
    PERFORMER "Artist Two"
    SONGWRITER "Another Writer"
    PREGAP 00:02:00
    INDEX 01 04:30:15

FILE "cd2.flac" WAVE
  TRACK 03 AUDIO
    TITLE "Third Track"
    PERFORMER "Artist Three"
    INDEX 01 00:00:00
"#;

    fn parse_str(input: &str) -> CueResult<CueSheet> {
        parse(input.lines())
    }

    fn error_message(input: &str) -> String {
        parse_str(input).unwrap_err().to_string()
    }

    #[test]
    fn parses_global_headers() {
        let sheet = parse_str(FULL_SHEET).unwrap();

        assert_eq!(sheet.catalog.as_deref(), Some("1234567890123"));
        assert_eq!(sheet.title.as_deref(), Some("Ultimate Soundtrack"));
        assert_eq!(sheet.performer.as_deref(), Some("Various Artists"));
        assert_eq!(sheet.songwriter.as_deref(), Some("Main Composer"));
        assert_eq!(
            sheet.remarks,
            vec!["This is a comment.", "Another comment line."]
        );
        assert_eq!(sheet.cd_text_file, None);
    }

    #[test]
    fn parses_files_and_tracks() {
        let sheet = parse_str(FULL_SHEET).unwrap();

        assert_eq!(sheet.files.len(), 2);
        assert_eq!(sheet.files[0].name, "cd1.wav");
        assert_eq!(sheet.files[0].file_type, "WAVE");
        assert_eq!(sheet.files[1].name, "cd2.flac");
        assert_eq!(sheet.files[0].tracks.len(), 2);

        let track1 = &sheet.files[0].tracks[0];
        assert_eq!(track1.number, 1);
        assert_eq!(track1.track_type, "AUDIO");
        assert_eq!(track1.title.as_deref(), Some("First Track"));
        assert_eq!(track1.performer.as_deref(), Some("Artist One"));
        assert_eq!(track1.isrc.as_deref(), Some("US-S1Z-99-00001"));
        assert_eq!(track1.flags, vec!["DCP", "PRE"]);
        assert_eq!(track1.indices.len(), 2);
        assert_eq!(track1.indices[1].time.to_string(), "00:02:30");

        let track2 = &sheet.files[0].tracks[1];
        assert_eq!(track2.title.as_deref(), Some("Second Track (with quotes)"));
        assert_eq!(track2.songwriter.as_deref(), Some("Another Writer"));
        assert_eq!(track2.pregap.to_string(), "00:02:00");
        assert_eq!(track2.postgap, Timecode::ZERO);
    }

    #[test]
    fn computes_durations_across_files() {
        let sheet = parse_str(FULL_SHEET).unwrap();

        let track1 = sheet.track(1).unwrap();
        let track2 = sheet.track(2).unwrap();
        let track3 = sheet.track(3).unwrap();

        let expected = track2.start_time().to_duration() - track1.start_time().to_duration();
        assert_eq!(track1.duration(), expected);
        assert_eq!(track2.duration(), Duration::ZERO);
        assert_eq!(track3.duration(), Duration::ZERO);
        assert_eq!(track3.file().unwrap().name, "cd2.flac");
    }

    #[test]
    fn two_track_example_durations() {
        let sheet = parse_str(
            "FILE \"a.wav\" WAVE\nTRACK 01 AUDIO\nINDEX 01 00:00:00\nTRACK 02 AUDIO\nINDEX 01 03:00:00",
        )
        .unwrap();

        assert_eq!(sheet.track(1).unwrap().duration(), Duration::from_secs(180));
        assert_eq!(sheet.track(2).unwrap().duration(), Duration::ZERO);
    }

    #[test]
    fn index_before_track_attaches_to_next_track() {
        let sheet = parse_str(
            "FILE \"a.wav\" WAVE\nINDEX 00 00:00:00\nINDEX 01 00:01:00\nTRACK 01 AUDIO\nINDEX 02 00:05:00\nTRACK 02 AUDIO\nINDEX 01 00:09:00",
        )
        .unwrap();

        let tracks = &sheet.files[0].tracks;
        let numbers: Vec<u32> = tracks[0].indices.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
        assert_eq!(tracks[0].start_time(), Timecode::new(0, 1, 0));
        assert_eq!(tracks[1].indices.len(), 1);
    }

    #[test]
    fn pending_indices_do_not_leak_across_files() {
        let sheet = parse_str(
            "FILE \"a.wav\" WAVE\nINDEX 01 00:01:00\nFILE \"b.wav\" WAVE\nTRACK 01 AUDIO\nINDEX 01 00:00:00",
        )
        .unwrap();

        assert!(sheet.files[0].tracks.is_empty());
        let track = &sheet.files[1].tracks[0];
        assert_eq!(track.indices.len(), 1);
        assert_eq!(track.start_time(), Timecode::ZERO);
    }

    #[test]
    fn pending_indices_without_any_track_are_dropped() {
        let sheet = parse_str("FILE \"a.wav\" WAVE\nINDEX 01 00:01:00").unwrap();
        assert_eq!(sheet.files.len(), 1);
        assert!(sheet.files[0].tracks.is_empty());
    }

    #[test]
    fn metadata_targets_open_track_or_sheet() {
        let sheet = parse_str(
            "TITLE Album\nFILE \"a.wav\" WAVE\nPERFORMER Band\nTRACK 01 AUDIO\nTITLE Song\nSONGWRITER Writer",
        )
        .unwrap();

        assert_eq!(sheet.title.as_deref(), Some("Album"));
        assert_eq!(sheet.performer.as_deref(), Some("Band"));
        assert_eq!(sheet.songwriter, None);

        let track = &sheet.files[0].tracks[0];
        assert_eq!(track.title.as_deref(), Some("Song"));
        assert_eq!(track.songwriter.as_deref(), Some("Writer"));
        assert_eq!(track.performer, None);
    }

    #[test]
    fn new_file_closes_track_scope() {
        let sheet = parse_str(
            "FILE \"a.wav\" WAVE\nTRACK 01 AUDIO\nFILE \"b.wav\" WAVE\nTITLE \"Back to sheet\"",
        )
        .unwrap();

        assert_eq!(sheet.title.as_deref(), Some("Back to sheet"));
        assert_eq!(sheet.files[0].tracks[0].title, None);
    }

    #[test]
    fn single_valued_fields_take_first_argument() {
        let sheet = parse_str("TITLE one two three\nREM GENRE   \"Classic Rock\" 1999").unwrap();
        assert_eq!(sheet.title.as_deref(), Some("one"));
        assert_eq!(sheet.remarks, vec!["GENRE Classic Rock 1999"]);
    }

    #[test]
    fn commands_are_case_insensitive_arguments_are_not() {
        let sheet = parse_str(
            "title \"Mixed Case\"\nfile \"Song.WAV\" wave\ntrack 01 audio\nflags dcp\nindex 01 00:00:00\ncdtextfile \"Text.cdt\"",
        )
        .unwrap();

        assert_eq!(sheet.title.as_deref(), Some("Mixed Case"));
        assert_eq!(sheet.cd_text_file.as_deref(), Some("Text.cdt"));
        assert_eq!(sheet.files[0].name, "Song.WAV");
        assert_eq!(sheet.files[0].file_type, "WAVE");

        let track = &sheet.files[0].tracks[0];
        assert_eq!(track.track_type, "AUDIO");
        assert_eq!(track.flags, vec!["dcp"]);
        assert_eq!(track.indices.len(), 1);
    }

    #[test]
    fn unknown_commands_and_blank_lines_are_ignored() {
        let sheet = parse_str(
            "\n   \nARRANGER Someone\nFILE \"a.wav\" WAVE\n\tTRACK 01 AUDIO\nMESSAGE whatever\n  INDEX 01 00:00:00  \n",
        )
        .unwrap();

        assert_eq!(sheet.files[0].tracks[0].indices.len(), 1);
    }

    #[test]
    fn empty_rem_records_nothing() {
        let sheet = parse_str("REM\nREM kept").unwrap();
        assert_eq!(sheet.remarks, vec!["kept"]);
    }

    #[test]
    fn postgap_and_duplicate_indices() {
        let sheet = parse_str(
            "FILE \"a.wav\" WAVE\nTRACK 01 AUDIO\nINDEX 01 00:10:00\nINDEX 01 00:20:00\nPOSTGAP 00:01:00",
        )
        .unwrap();

        let track = &sheet.files[0].tracks[0];
        assert_eq!(track.indices.len(), 2);
        assert_eq!(track.start_time(), Timecode::new(0, 10, 0));
        assert_eq!(track.postgap, Timecode::new(0, 1, 0));
    }

    #[test]
    fn track_before_file_is_rejected() {
        let err = parse_str("TRACK 01 AUDIO").unwrap_err();
        assert!(matches!(
            err,
            CueError::MissingContext {
                line: 1,
                command: "TRACK",
                scope: Scope::File
            }
        ));
        assert_eq!(
            err.to_string(),
            "line 1: TRACK command found outside of a FILE context"
        );
    }

    #[test]
    fn index_without_file_is_rejected() {
        assert_eq!(
            error_message("TITLE x\nINDEX 01 00:00:00"),
            "line 2: INDEX command found outside of a FILE context"
        );
    }

    #[test]
    fn track_commands_without_track_are_rejected() {
        for command in ["PREGAP 00:02:00", "POSTGAP 00:02:00", "FLAGS DCP", "ISRC ABC"] {
            let input = format!("FILE \"a.wav\" WAVE\n{command}");
            let name = command.split(' ').next().unwrap();
            assert_eq!(
                error_message(&input),
                format!("line 2: {name} command found outside of a TRACK context")
            );
        }
    }

    #[test]
    fn missing_arguments_are_rejected() {
        assert_eq!(
            error_message("FILE \"a.wav\""),
            "line 1: FILE command requires name and type arguments"
        );
        assert_eq!(
            error_message("FILE a.wav WAVE\nTRACK 01"),
            "line 2: TRACK command requires number and type arguments"
        );
        assert_eq!(
            error_message("FILE a.wav WAVE\nTRACK 01 AUDIO\nINDEX 01"),
            "line 3: INDEX command requires number and timecode arguments"
        );
        assert_eq!(
            error_message("FILE a.wav WAVE\nTRACK 01 AUDIO\nPREGAP"),
            "line 3: PREGAP command requires a timecode argument"
        );
        assert_eq!(error_message("CATALOG"), "line 1: CATALOG command requires an argument");
        assert_eq!(error_message("TITLE"), "line 1: TITLE command requires an argument");
    }

    #[test]
    fn malformed_timecodes_are_rejected() {
        assert_eq!(
            error_message("FILE \"a.wav\" WAVE\nTRACK 01 AUDIO\nINDEX 01 00:00"),
            "line 3: invalid timecode for INDEX: timecode must be in MM:SS:FF format"
        );
        assert_eq!(
            error_message("FILE \"a.wav\" WAVE\nTRACK 01 AUDIO\nINDEX 01 00:60:00"),
            "line 3: invalid timecode for INDEX: seconds value cannot exceed 59: 60"
        );
        assert_eq!(
            error_message("FILE \"a.wav\" WAVE\nTRACK 01 AUDIO\nINDEX 01 00:00:75"),
            "line 3: invalid timecode for INDEX: frames value must be less than 75: 75"
        );
        assert_eq!(
            error_message("FILE \"a.wav\" WAVE\nTRACK 01 AUDIO\nPOSTGAP aa:00:00"),
            "line 3: invalid timecode for POSTGAP: invalid minutes value: aa"
        );
    }

    #[test]
    fn seconds_out_of_range_reports_line_and_value() {
        let err = parse_str("FILE a.wav WAVE\nINDEX 01 00:60:00").unwrap_err();
        assert_eq!(err.line(), Some(2));
        assert!(matches!(
            err,
            CueError::InvalidTimecode {
                command: "INDEX",
                source: TimecodeError::SecondsOutOfRange(60),
                ..
            }
        ));
    }

    #[test]
    fn quoting_errors_are_rejected() {
        assert_eq!(
            error_message("TITLE \"My Album"),
            "line 1: invalid quoting: mismatched quotes"
        );
        assert_eq!(
            error_message("\"TITLE\" x"),
            "line 1: invalid quoting: command cannot be quoted"
        );
    }

    #[test]
    fn invalid_numbers_name_the_token() {
        assert_eq!(
            error_message("FILE \"a.wav\" WAVE\nTRACK aa AUDIO"),
            "line 2: invalid track number: \"aa\""
        );
        assert_eq!(
            error_message("FILE \"a.wav\" WAVE\nTRACK 01 AUDIO\nINDEX x1 00:00:00"),
            "line 3: invalid index number: \"x1\""
        );
    }

    #[test]
    fn first_error_aborts_parse() {
        let err = parse_str("TRACK 01 AUDIO\nTITLE \"broken").unwrap_err();
        assert_eq!(err.line(), Some(1));
    }

    #[test]
    fn parse_reader_counts_physical_lines() {
        let input = "REM first\r\n\r\nFILE \"a.wav\" WAVE\r\nPREGAP 00:00:01\r\n";
        let err = parse_reader(Cursor::new(input)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 4: PREGAP command found outside of a TRACK context"
        );
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }

    #[test]
    fn read_failures_surface_as_io_errors() {
        let err = parse_reader(io::BufReader::new(FailingReader)).unwrap_err();
        assert!(matches!(err, CueError::IoError(_)));
        assert_eq!(err.line(), None);
        assert_eq!(err.to_string(), "error reading input: disk on fire");
    }

    #[test]
    fn leading_byte_order_mark_is_ignored() {
        let sheet = parse_str("\u{feff}TITLE \"Bom\"").unwrap();
        assert_eq!(sheet.title.as_deref(), Some("Bom"));
    }

    #[test]
    fn byte_order_mark_is_only_stripped_from_the_first_line() {
        let sheet = parse_str("REM first\n\u{feff}TITLE \"Bom\"").unwrap();
        assert_eq!(sheet.title, None);
        assert_eq!(sheet.remarks, vec!["first"]);
    }

    #[test]
    fn incremental_parser_matches_batch_parse() {
        let mut parser = CueParser::new();
        for (i, line) in FULL_SHEET.lines().enumerate() {
            parser.feed_line(i + 1, line).unwrap();
        }
        let sheet = parser.finish();
        assert_eq!(sheet.tracks().count(), 3);
        assert_eq!(sheet.track(1).unwrap().duration(), parse_str(FULL_SHEET).unwrap().track_duration(1));
    }

    #[tokio::test]
    async fn parse_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("album.cue");
        tokio::fs::write(&path, FULL_SHEET).await.unwrap();

        let sheet = parse_file(&path).await.unwrap();
        assert_eq!(sheet.files.len(), 2);
        assert_eq!(sheet.track(3).unwrap().title.as_deref(), Some("Third Track"));
    }

    #[tokio::test]
    async fn parse_file_tolerates_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.cue");
        let mut data = b"TITLE \"Caf".to_vec();
        data.push(0xE9);
        data.extend_from_slice(b"\"\n");
        tokio::fs::write(&path, data).await.unwrap();

        let sheet = parse_file(&path).await.unwrap();
        assert_eq!(sheet.title.as_deref(), Some("Caf\u{fffd}"));
    }

    #[tokio::test]
    async fn parse_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = parse_file(dir.path().join("missing.cue")).await.unwrap_err();
        assert!(matches!(err, CueError::IoError(_)));
    }
}
