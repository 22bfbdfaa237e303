use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::{process::Command, task::JoinHandle};
use tracing::{debug, warn};

#[cfg(target_os = "macos")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("open");
    cmd.arg(url);
    cmd
}

// rundll32 receives the url as one argument, `&` included
#[cfg(target_os = "windows")]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("rundll32");
    cmd.args(["url.dll,FileProtocolHandler", url]);
    cmd
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener(url: &str) -> Command {
    let mut cmd = Command::new("xdg-open");
    cmd.arg(url);
    cmd
}

/// Spawn `cmd` detached from the terminal and reap it in the background
fn launch(mut cmd: Command) -> std::io::Result<JoinHandle<()>> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    Ok(tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if status.success() => debug!("Browser opener exited"),
            Ok(status) => warn!("Browser opener exited with {status}"),
            Err(e) => warn!("Couldn't wait for browser opener: {e}"),
        }
    }))
}

/// Hand `url` to the desktop's default browser without waiting for it
pub fn open(url: &str) -> Result<()> {
    launch(opener(url)).with_context(|| format!("Couldn't open {url} in a browser"))?;
    Ok(())
}
