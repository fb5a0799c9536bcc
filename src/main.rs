use anyhow::Result;
use clap::{Parser, Subcommand};

use pantry_backup::cli::{print_report, run_backup, show_errors};
use pantry_backup::config::{paths::PantryPaths, settings::Settings};
use pantry_backup::storage::init::initialize_storage;

#[derive(Parser)]
#[command(
    name = "pantry-backup",
    author = "Scott Hoelsema",
    version,
    about = "Encrypted backups of the food pantry dataset",
    long_about = "pantry-backup snapshots clients, appointments and household \
                  members into password-encrypted dump files, written to a \
                  local directory, uploaded to remote storage, or both. Use \
                  pantry-restore to decrypt a dump."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one backup
    Run,

    /// Create default settings and empty record files
    Init,

    /// Show current configuration and paths
    Config,

    /// Show recent diagnostic log entries
    Errors {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = PantryPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Run) => {
            let report = run_backup(&paths, &settings)?;
            print_report(&report);
            std::process::exit(report.exit_code());
        }
        Some(Commands::Init) => {
            println!("Initializing pantry-backup at: {}", paths.base_dir().display());
            let created = initialize_storage(&paths)?;
            if !paths.is_initialized() {
                settings.save(&paths)?;
            }
            println!("Initialization complete!");
            println!();
            for collection in created {
                println!(
                    "  Created empty {} record file: {}",
                    collection.noun(),
                    paths.records_file(collection).display()
                );
            }
            println!();
            println!("Run 'pantry-backup config' to review the backup destinations.");
        }
        Some(Commands::Config) => print_config(&paths, &settings),
        Some(Commands::Errors { limit }) => show_errors(&paths, &settings, limit)?,
        None => {
            println!("pantry-backup - Encrypted backups of the food pantry dataset");
            println!();
            println!("Run 'pantry-backup --help' for usage information.");
            println!("Run 'pantry-backup run' to take a backup.");
        }
    }

    Ok(())
}

fn print_config(paths: &PantryPaths, settings: &Settings) {
    println!("pantry-backup Configuration");
    println!("===========================");
    println!("Base directory:    {}", paths.base_dir().display());
    println!("Settings file:     {}", paths.settings_file().display());
    println!("Data directory:    {}", paths.data_dir().display());
    println!("Staging directory: {}", paths.staging_dir().display());
    println!();
    println!("Local backup:");
    println!("  Enabled:   {}", settings.local_backup.enabled);
    match &settings.local_backup.directory {
        Some(dir) => println!("  Directory: {}", dir.display()),
        None => println!("  Directory: (not set)"),
    }
    println!("Remote backup:");
    println!("  Enabled:   {}", settings.remote_backup.enabled);
    if settings.remote_backup.endpoint.is_empty() {
        println!("  Endpoint:  (not set)");
    } else {
        println!("  Endpoint:  {}", settings.remote_backup.endpoint);
    }
    let token = if settings.remote_backup.resolved_token().is_some() {
        "configured"
    } else {
        "none"
    };
    println!("  Token:     {}", token);
    println!("  Timeout:   {}s", settings.remote_backup.timeout_secs);
    println!();
    match &settings.error_log_directory {
        Some(dir) => println!("Error log directory: {}", dir.display()),
        None => println!(
            "Error log directory: {} (default)",
            paths.fallback_error_dir().display()
        ),
    }
    let kdf = &settings.key_derivation;
    println!(
        "Key derivation: Argon2id m={} t={} p={}",
        kdf.memory_cost, kdf.time_cost, kdf.parallelism
    );
}
