use crate::commands::{Cli, Commands};
use anyhow::Result;
use clap::Parser;
use cue_split::cue::parse_file;
use cue_split::report::{SheetReport, render_table};
use cue_split::split::build_commands;
use log::{info, warn};

mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .try_init()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Info(cmd) => {
            let sheet = parse_file(&cmd.input_cue).await?;
            if cmd.json {
                println!("{}", SheetReport::new(&sheet).to_json()?);
            } else {
                print!("{}", render_table(&sheet));
            }
        }
        Commands::Split(cmd) => {
            let sheet = parse_file(&cmd.input_cue).await?;
            let commands = build_commands(&sheet, &cmd.input_cue, &cmd.options()).await?;
            if commands.is_empty() {
                warn!("No tracks could be matched to an audio file");
            }

            println!(
                "# CUE sheet: {} - {}",
                sheet.performer.as_deref().unwrap_or("Unknown"),
                sheet.title.as_deref().unwrap_or("Unknown")
            );
            for command in &commands {
                println!("{command}");
            }
            info!("Generated {} ffmpeg command(s)", commands.len());
        }
    }

    Ok(())
}
