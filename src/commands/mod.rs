use crate::commands::cue::{InfoCommand, SplitCommand};
use clap::{Parser, Subcommand};

pub mod cue;

/// CLI for inspecting CUE sheets and splitting their audio into tracks.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Info(InfoCommand),
    Split(SplitCommand),
}
