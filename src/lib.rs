pub mod cue;
pub mod report;
pub mod split;
