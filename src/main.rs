//! VaultCopy CLI - Credential-Mediated Secure File Transfer
//!
//! Retrieves a credential from the OS secret store, uploads a file or
//! directory tree over SFTP, and appends redacted entries to a rotating
//! audit log.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use vaultcopy::audit::AuditLogger;
use vaultcopy::config::{CliArgs, OutputFormat, TransferConfig};
use vaultcopy::error::Result;
use vaultcopy::network::SftpTransport;
use vaultcopy::secrets::KeyringStore;
use vaultcopy::transfer::{TransferOrchestrator, TransferRequest};

fn main() {
    let args = CliArgs::parse();

    // Diagnostics go to stderr via tracing; the audit log is separate.
    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        // One redacted human-readable line; the audit log already has
        // the corresponding entry.
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(args: CliArgs) -> Result<()> {
    let config = TransferConfig::from_cli(&args)?;

    let logger = AuditLogger::new(
        &config.log_file,
        config.log_max_size,
        config.log_retention_days,
    )?;

    let store = KeyringStore::new(&config.service);
    let transport = SftpTransport::new(config.timeout);

    if !config.silent {
        println!(
            "Transferring {} -> {}:{}",
            config.source.display(),
            config.endpoint,
            config.dest_dir.display()
        );
    }

    let orchestrator = TransferOrchestrator::new(&store, &transport, &logger, &config);
    let result = orchestrator.run(&TransferRequest::from_config(&config))?;

    if !config.silent {
        match config.output_format {
            OutputFormat::Text => result.print_summary(),
            OutputFormat::Json => println!("{}", result.to_json()),
        }
    }

    Ok(())
}
