use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use pantry_backup::cli::restore_file;
use pantry_backup::config::{paths::PantryPaths, settings::Settings};
use pantry_backup::PantryError;

#[derive(Parser)]
#[command(
    name = "pantry-restore",
    author = "Scott Hoelsema",
    version,
    about = "Decrypt a pantry backup dump file"
)]
struct Cli {
    /// Encrypted dump file to restore
    input: PathBuf,

    /// Where to write the restored statements (asked for when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = PantryPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match restore_file(&paths, &settings, &cli.input, cli.output) {
        Ok(outcome) => {
            println!(
                "Restored {} records to {}",
                outcome.lines,
                outcome.output_path.display()
            );
            Ok(())
        }
        Err(PantryError::PasswordCancelled) => {
            println!("Restore cancelled.");
            std::process::exit(2);
        }
        Err(err) => Err(err.into()),
    }
}
