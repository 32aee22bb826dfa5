use clap::Parser;
use cue_split::split::SplitOptions;
use std::path::PathBuf;

/// Prints the metadata and track layout of a CUE sheet.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
pub struct InfoCommand {
    /// Path to the .cue file
    #[arg(value_name = "INPUT_CUE")]
    pub input_cue: PathBuf,

    /// Print a JSON report instead of a table
    #[arg(long, short = 'j', default_value_t = false)]
    pub json: bool,
}

/// Prints one ffmpeg command per track of a CUE sheet.
#[derive(Parser, Debug, Clone, Eq, PartialEq)]
#[command(
    long_about = "Prints one ffmpeg command per track of a CUE sheet\n\nNote: Nothing is executed, pipe the output into a shell to run it. If an audio file named in the sheet is missing, files with the same name and a .flac, .ape, .wv or .tak extension are tried instead"
)]
pub struct SplitCommand {
    /// Path to the .cue file
    #[arg(value_name = "INPUT_CUE")]
    pub input_cue: PathBuf,

    /// ffmpeg audio codec for the extracted tracks
    #[arg(long, short = 'c', env = "CUE_SPLIT_CODEC", default_value = "libvorbis")]
    pub codec: String,

    /// Codec quality passed as -q:a
    #[arg(long, short = 'q', env = "CUE_SPLIT_QUALITY", default_value = "5")]
    pub quality: String,

    /// File extension of the extracted tracks
    #[arg(long, short = 'e', env = "CUE_SPLIT_EXTENSION", default_value = "ogg")]
    pub extension: String,
}

impl SplitCommand {
    pub fn options(&self) -> SplitOptions {
        SplitOptions {
            codec: self.codec.clone(),
            quality: self.quality.clone(),
            extension: self.extension.trim_start_matches('.').to_string(),
        }
    }
}
