//! Opening the trade page in the user's browser

use std::{io, process::Stdio};

use tokio::{process::Command, task::JoinHandle};
use tracing::{info, warn};

/// Platform opener invocation for `url`
fn opener(url: &str) -> Command {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    } else {
        Command::new("xdg-open")
    };
    command.arg(url);
    command
}

/// Run a detached command and reap it in the background.
///
/// The returned task resolves once the child has exited.
pub fn launch(mut command: Command) -> io::Result<JoinHandle<()>> {
    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    Ok(tokio::spawn(async move {
        match child.wait().await {
            Ok(status) if status.success() => {}
            Ok(status) => warn!(%status, "Browser opener exited with failure"),
            Err(e) => warn!(error = %e, "Failed to wait for browser opener"),
        }
    }))
}

/// Hand the URL to the platform opener; failures are logged only
pub fn open_in_browser(url: &str) {
    match launch(opener(url)) {
        Ok(_) => info!(url, "Opened trade page"),
        Err(e) => warn!(url, error = %e, "Failed to open trade page"),
    }
}
