//! Main entry point for the romforge CLI application.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{Level, warn};
use tracing_subscriber::EnvFilter;

use romforge::cli::{Cli, Command};
use romforge::update::{self, DownloadOutcome, DownloadProgress};
use romforge::{FreeSpaceScanner, RomImage, ScannerConfig, UpdateClient, UpdateConfig, ZipExtractor};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    promote_staged_update();

    match cli.command {
        Command::Unzip {
            archive,
            dir,
            overwrite,
        } => unzip(&archive, &dir, overwrite).await,
        Command::FreeSpace {
            file,
            length,
            start,
            sentinel,
            chunk_size,
        } => {
            let config = ScannerConfig::new()
                .sentinel(sentinel)
                .chunk_size(chunk_size);
            free_space(&file, length, start, config)
        }
        Command::Header { rom, title } => header(&rom, title.as_deref()),
        Command::Update {
            manifest_url,
            current_version,
            install_dir,
            check_only,
        } => {
            let install_dir = match install_dir {
                Some(dir) => dir,
                None => executable_dir()?,
            };
            let config = UpdateConfig::new(manifest_url, current_version);
            run_update(config, &install_dir, check_only).await
        }
    }
}

async fn unzip(archive: &Path, dir: &Path, overwrite: bool) -> Result<()> {
    let data = tokio::fs::read(archive)
        .await
        .with_context(|| format!("failed to read {}", archive.display()))?;

    if !ZipExtractor::extract(&data, dir, overwrite) {
        bail!("{} was rejected", archive.display());
    }

    println!("Extracted {} into {}", archive.display(), dir.display());
    Ok(())
}

fn free_space(file: &Path, length: usize, start: u64, config: ScannerConfig) -> Result<()> {
    let sentinel = config.sentinel;
    let scanner = FreeSpaceScanner::with_config(config);

    match scanner.find_in_file(file, length, start)? {
        Some(offset) => println!("{:#x}", offset),
        None => println!(
            "No run of {} bytes of {:#04x} at or after {:#x}",
            length, sentinel, start
        ),
    }
    Ok(())
}

fn header(rom: &Path, title: Option<&str>) -> Result<()> {
    let image = RomImage::open(rom)?;
    let mut header = image.read_header()?;

    println!("Platform:  {}", image.kind().name());
    println!("Title:     {}", header.title());
    println!("Version:   {}", header.software_version());
    println!("Checksum:  {:#04x}", header.header_checksum());

    if let Some(title) = title {
        header.set_title(title)?;
        image.write_header(&header)?;
        println!("Title set to {}", header.title());
    }
    Ok(())
}

async fn run_update(config: UpdateConfig, install_dir: &Path, check_only: bool) -> Result<()> {
    let current = config.current_version.clone();
    let client = UpdateClient::new(config)?;

    // check() already warned about the cause
    let Some(info) = client.check().await else {
        println!("No update available");
        return Ok(());
    };
    if !info.available {
        println!("romforge {} is up to date (latest {})", current, info.version);
        return Ok(());
    }

    println!("Update available: {} -> {}", current, info.version);
    if check_only {
        return Ok(());
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let mut task = client.spawn_download(info.url.as_str(), cancel);
    while let Some(progress) = task.progress.recv().await {
        print_progress(&progress);
    }
    eprintln!();

    match task.join().await? {
        DownloadOutcome::Completed(payload) => {
            let installed = update::install_update(&payload, install_dir)?;
            for path in &installed {
                println!("  installed: {}", path.display());
            }
            println!("Updated to {}", info.version);
        }
        DownloadOutcome::Canceled => println!("Download canceled"),
    }
    Ok(())
}

fn print_progress(progress: &DownloadProgress) {
    match progress.percent {
        Some(percent) => eprint!("\rDownloading... {:>3}%", percent),
        None => eprint!("\rDownloading... {} bytes", progress.received),
    }
    let _ = std::io::stderr().flush();
}

/// Swap in an executable staged by a previous `update` run.
fn promote_staged_update() {
    let exe = match std::env::current_exe() {
        Ok(exe) => exe,
        Err(e) => {
            warn!("Cannot locate the running executable: {}", e);
            return;
        }
    };
    if let Err(e) = update::promote_for_executable(&exe) {
        warn!("Could not promote staged update: {}", e);
    }
}

fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("cannot locate the running executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .context("executable has no parent directory")
}
