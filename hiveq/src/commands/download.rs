// hiveq/src/commands/download.rs
//
// USE CASE: interactive helper fetching the Hive JDBC driver jar.

use anyhow::{Context, Result, bail};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use hiveq_core::infrastructure::download::{
    DEFAULT_DRIVER_VERSION, download_or_cancel, driver_destination, driver_url, percent,
};

static TRANSFER_RUNNING: AtomicBool = AtomicBool::new(false);

/// True while a jar transfer owns Ctrl-C handling.
pub fn transfer_running() -> bool {
    TRANSFER_RUNNING.load(Ordering::SeqCst)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Download,
    Manual,
    Exit,
}

/// Empty input picks the default (download).
pub fn parse_choice(input: &str) -> Option<MenuChoice> {
    match input.trim() {
        "" | "1" => Some(MenuChoice::Download),
        "2" => Some(MenuChoice::Manual),
        "3" => Some(MenuChoice::Exit),
        _ => None,
    }
}

/// Prints `label`, then reads one line. `None` on end of input.
fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, label: &str) -> Result<Option<String>> {
    write!(out, "{}", label)?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub fn manual_instructions(version: &str) -> String {
    format!(
        "Manual download:\n  1. Open {url}\n  2. Save the file into the 'drivers/' directory\n  \
         3. Reference it in your config:\n       hive_driver_jar: drivers/hive-jdbc-{v}-standalone.jar\n     \
         together with hive_jdbc_url and hive_driver_class: org.apache.hive.jdbc.HiveDriver",
        url = driver_url(version),
        v = version
    )
}

/// Drives the menu. `base` is the directory `drivers/` is created in.
pub async fn run<R: BufRead, W: Write>(input: &mut R, out: &mut W, base: &Path) -> Result<()> {
    writeln!(out, "Hive JDBC driver download")?;
    writeln!(out, "  1. Download the standalone driver jar (default)")?;
    writeln!(out, "  2. Show manual download instructions")?;
    writeln!(out, "  3. Exit")?;

    let Some(answer) = ask(input, out, "Select an option [1]: ")? else {
        writeln!(out, "\nCancelled.")?;
        return Ok(());
    };
    let choice = match parse_choice(&answer) {
        Some(c) => c,
        None => bail!("Invalid choice '{}'. Expected 1, 2 or 3.", answer),
    };

    match choice {
        MenuChoice::Exit => Ok(()),
        MenuChoice::Manual => {
            writeln!(out, "{}", manual_instructions(DEFAULT_DRIVER_VERSION))?;
            Ok(())
        }
        MenuChoice::Download => {
            let prompt = format!("Driver version [{}]: ", DEFAULT_DRIVER_VERSION);
            let version = match ask(input, out, &prompt)? {
                Some(v) if !v.is_empty() => v,
                _ => DEFAULT_DRIVER_VERSION.to_string(),
            };
            download(input, out, base, &version).await
        }
    }
}

async fn download<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    base: &Path,
    version: &str,
) -> Result<()> {
    let dest = driver_destination(base, version);
    if dest.exists() {
        let question = format!("{} already exists. Overwrite? [y/N]: ", dest.display());
        let confirmed = ask(input, out, &question)?
            .is_some_and(|a| a.eq_ignore_ascii_case("y"));
        if !confirmed {
            writeln!(out, "Download cancelled.")?;
            return Ok(());
        }
    }

    let url = driver_url(version);
    writeln!(out, "Downloading {}", url)?;

    let mut last_shown = None;
    TRANSFER_RUNNING.store(true, Ordering::SeqCst);
    let result = download_or_cancel(
        &url,
        &dest,
        |done, total| {
            let shown = percent(done, total);
            if shown != last_shown {
                if let Some(p) = shown {
                    let _ = write!(out, "\r  {:>3}%", p);
                    let _ = out.flush();
                }
                last_shown = shown;
            }
        },
        async {
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        },
    )
    .await;
    TRANSFER_RUNNING.store(false, Ordering::SeqCst);
    writeln!(out)?;

    let Some(bytes) = result
        .context("Download failed. Choose option 2 for manual download instructions")?
    else {
        writeln!(out, "Cancelled.")?;
        return Ok(());
    };

    let absolute = std::fs::canonicalize(&dest).unwrap_or(dest);
    writeln!(out, "Saved {} bytes to {}", bytes, absolute.display())?;
    writeln!(out, "Add this to your config profile:")?;
    writeln!(out, "  hive_driver_jar: {}", absolute.display())?;
    Ok(())
}
