// src/cue/models
use crate::cue::timecode::Timecode;
use serde::Serialize;
use std::ops::Deref;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CueSheet {
    pub title: Option<String>,
    pub performer: Option<String>,
    pub songwriter: Option<String>,
    pub catalog: Option<String>,
    pub cd_text_file: Option<String>,
    pub files: Vec<CueFile>,
    pub remarks: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CueFile {
    pub name: String,
    pub file_type: String,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Track {
    pub number: u32,
    pub track_type: String,
    pub title: Option<String>,
    pub performer: Option<String>,
    pub songwriter: Option<String>,
    pub isrc: Option<String>,
    pub flags: Vec<String>,
    pub indices: Vec<Index>,
    pub pregap: Timecode,
    pub postgap: Timecode,

    /// Slot of the owning file in `CueSheet::files`, wired once parsing is done.
    #[serde(skip)]
    file: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Index {
    pub number: u32,
    pub time: Timecode,
}

impl CueSheet {
    /// All tracks across all files, in file-then-track order.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.files.iter().flat_map(|file| file.tracks.iter())
    }

    pub fn track(&self, number: u32) -> Option<TrackRef<'_>> {
        self.iter_tracks().find(|track| track.number == number)
    }

    pub fn iter_files(&self) -> impl Iterator<Item = FileRef<'_>> {
        self.files.iter().map(move |file| FileRef { sheet: self, file })
    }

    pub fn iter_tracks(&self) -> impl Iterator<Item = TrackRef<'_>> {
        self.iter_files().flat_map(|file| file.tracks())
    }

    /// Play duration of the first track numbered `number`.
    ///
    /// Zero when the track or its direct successor (`number + 1`, next in sheet order)
    /// is missing, when the successor starts a different file, or when the successor
    /// starts before the track itself.
    pub fn track_duration(&self, number: u32) -> Duration {
        let mut tracks = self.tracks().skip_while(|track| track.number != number);

        let Some(current) = tracks.next() else {
            return Duration::ZERO;
        };

        let Some(next) = tracks
            .next()
            .filter(|next| Some(next.number) == number.checked_add(1))
        else {
            return Duration::ZERO;
        };

        if current.file.is_none() || current.file != next.file {
            return Duration::ZERO;
        }

        next.start_time()
            .to_duration()
            .checked_sub(current.start_time().to_duration())
            .unwrap_or(Duration::ZERO)
    }

    /// Wires every track to the slot of the file that owns it.
    pub(crate) fn link(&mut self) {
        for (slot, file) in self.files.iter_mut().enumerate() {
            for track in &mut file.tracks {
                track.file = Some(slot);
            }
        }
    }
}

impl CueFile {
    pub fn new(name: impl Into<String>, file_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            file_type: file_type.into(),
            tracks: Vec::new(),
        }
    }
}

impl Track {
    pub fn new(number: u32, track_type: impl Into<String>) -> Self {
        Self {
            number,
            track_type: track_type.into(),
            title: None,
            performer: None,
            songwriter: None,
            isrc: None,
            flags: Vec::new(),
            indices: Vec::new(),
            pregap: Timecode::ZERO,
            postgap: Timecode::ZERO,
            file: None,
        }
    }

    /// First index with the given number; duplicates are kept but never win.
    pub fn index(&self, number: u32) -> Option<&Index> {
        self.indices.iter().find(|index| index.number == number)
    }

    /// Time of `INDEX 01`, or zero when the track has none.
    pub fn start_time(&self) -> Timecode {
        self.index(1).map(|index| index.time).unwrap_or(Timecode::ZERO)
    }

    /// Time of `INDEX 00`, the start of the pre-gap, if declared.
    pub fn pregap_start(&self) -> Option<Timecode> {
        self.index(0).map(|index| index.time)
    }
}

/// A file together with the sheet that owns it.
#[derive(Debug, Clone, Copy)]
pub struct FileRef<'a> {
    sheet: &'a CueSheet,
    file: &'a CueFile,
}

impl<'a> FileRef<'a> {
    pub fn sheet(&self) -> &'a CueSheet {
        self.sheet
    }

    pub fn inner(&self) -> &'a CueFile {
        self.file
    }

    pub fn tracks(&self) -> impl Iterator<Item = TrackRef<'a>> + use<'a> {
        let sheet = self.sheet;
        let file = self.file;
        file.tracks.iter().map(move |track| TrackRef { sheet, track })
    }
}

impl Deref for FileRef<'_> {
    type Target = CueFile;

    fn deref(&self) -> &Self::Target {
        self.file
    }
}

/// A track together with the sheet it was parsed into.
#[derive(Debug, Clone, Copy)]
pub struct TrackRef<'a> {
    sheet: &'a CueSheet,
    track: &'a Track,
}

impl<'a> TrackRef<'a> {
    pub fn inner(&self) -> &'a Track {
        self.track
    }

    pub fn file(&self) -> Option<FileRef<'a>> {
        let slot = self.track.file?;
        self.sheet.files.get(slot).map(|file| FileRef {
            sheet: self.sheet,
            file,
        })
    }

    pub fn duration(&self) -> Duration {
        if self.track.file.is_none() {
            return Duration::ZERO;
        }
        self.sheet.track_duration(self.track.number)
    }
}

impl Deref for TrackRef<'_> {
    type Target = Track;

    fn deref(&self) -> &Self::Target {
        self.track
    }
}
