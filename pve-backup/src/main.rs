//! pve-backup - command line entry point
//!
//! Runs the operator actions against the configured JSON stores.

use anyhow::Result;
use clap::{Parser, Subcommand};
use pve_backup::models::FtpTarget;
use pve_backup::{utils, BackupService, Config};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the FTP target, catalog and history
    Status,

    /// Check that an FTP server accepts a login (stored target by default)
    TestConnection {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        user: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },

    /// Store the FTP target
    SetFtp {
        #[arg(long)]
        host: String,
        #[arg(long, default_value = "")]
        user: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value_t = 21)]
        port: u16,
    },

    /// Select or deselect a catalog item by its position
    Toggle { index: usize },

    /// Archive the selected items and upload them now
    Run,

    /// Delete a history record
    Delete { id: String },

    /// Enable or disable automatic backups (stored only)
    AutoToggle,

    /// Set the automatic backup frequency: weekly or monthly (stored only)
    Frequency { frequency: String },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let log_level = args.log_level.as_deref().unwrap_or(&config.log.level);
    utils::logger::init(log_level)?;

    let service = BackupService::from_config(&config);

    match args.command {
        Command::Status => print_status(&service)?,
        Command::TestConnection {
            host,
            user,
            password,
            port,
        } => {
            let stored = service.settings()?.ftp_config;
            let target = FtpTarget {
                host: host.unwrap_or(stored.host),
                username: user.unwrap_or(stored.username),
                password: password.unwrap_or(stored.password),
                port: port.unwrap_or(stored.port),
            };
            let outcome = service.test_connection(&target);
            println!("{}", outcome.message);
            if !outcome.ok {
                std::process::exit(1);
            }
        }
        Command::SetFtp {
            host,
            user,
            password,
            port,
        } => {
            service.save_ftp_target(FtpTarget::new(&host, &user, &password, port))?;
            println!("FTP configuration saved");
        }
        Command::Toggle { index } => match service.toggle_item(index)? {
            Some(selected) => println!("Item {} selected: {}", index, selected),
            None => println!("No item at position {}", index),
        },
        Command::Run => match service.run_backup_now() {
            Ok(record) => println!(
                "Backup {} ({}) created and uploaded to the FTP server",
                record.filename, record.size
            ),
            Err(e) => {
                eprintln!("Backup failed: {}", e);
                std::process::exit(1);
            }
        },
        Command::Delete { id } => {
            if service.delete_record(&id)? {
                println!("Backup {} removed from history", id);
            } else {
                println!("No backup with id {}", id);
            }
        }
        Command::AutoToggle => {
            let enabled = service.toggle_auto_backup()?;
            println!("Automatic backup enabled: {}", enabled);
        }
        Command::Frequency { frequency } => {
            let frequency = service.set_frequency(&frequency)?;
            println!("Automatic backup frequency: {}", frequency);
        }
    }

    Ok(())
}

fn print_status(service: &BackupService) -> Result<()> {
    let overview = service.overview()?;
    let settings = &overview.settings;

    if settings.ftp_config.is_configured() {
        println!(
            "FTP target: {}@{}:{}",
            settings.ftp_config.username, settings.ftp_config.host, settings.ftp_config.port
        );
    } else {
        println!("FTP target: not configured");
    }
    println!(
        "Automatic backup: {} ({})",
        if settings.auto_backup_enabled { "on" } else { "off" },
        settings.auto_backup_frequency
    );
    println!(
        "Selected: {} of {} (critical {} of {})",
        overview.selected_count,
        settings.backup_files.len(),
        overview.critical_selected,
        overview.critical_total
    );
    println!();

    for (index, item) in settings.backup_files.iter().enumerate() {
        println!(
            "{:>3} [{}] {}{} - {}",
            index,
            if item.selected { "x" } else { " " },
            item.path,
            if item.critical { " (critical)" } else { "" },
            item.name
        );
    }

    if !overview.history.is_empty() {
        println!();
        for record in &overview.history {
            println!(
                "{}  {}  {}  {}  {:?}",
                record.id, record.date, record.filename, record.size, record.status
            );
        }
    }

    Ok(())
}
