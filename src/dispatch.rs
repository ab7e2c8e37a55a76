use crate::terminal::TerminalManager;
use anyhow::Result;
use std::env;

/// Name of the terminal session created for each sync run.
pub const SESSION_LABEL: &str = "Sync only (no build)";

const SCRIPTS_DIR: &str = "scripts";

/// The two platforms the dispatcher distinguishes. Script selection and
/// command syntax only ever branch two ways; everything that is not Windows
/// gets the POSIX treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Other,
}

impl Platform {
    pub fn host() -> Self {
        if env::consts::OS == "windows" {
            Platform::Windows
        } else {
            Platform::Other
        }
    }

    fn separator(self) -> char {
        match self {
            Platform::Windows => '\\',
            Platform::Other => '/',
        }
    }

    fn script_file(self) -> &'static str {
        match self {
            Platform::Windows => "sync-no-ci.ps1",
            Platform::Other => "sync-no-ci.sh",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DispatchResult {
    pub root: String,
    pub script_path: String,
    pub command: String,
    pub label: String,
}

/// Path of the sync script under `root`, joined with the target platform's
/// separator. Purely textual: whether the script exists is the interpreter's
/// problem, not ours.
pub fn script_path(root: &str, platform: Platform) -> String {
    let root = root.trim_end_matches(['/', '\\']);
    let sep = platform.separator();
    format!(
        "{root}{sep}{SCRIPTS_DIR}{sep}{file}",
        file = platform.script_file()
    )
}

/// Interpreter invocation for `script_path`. The path is double-quoted so
/// roots containing spaces survive; backslashes need no further escaping in
/// either interpreter's file-argument position.
pub fn invocation_command(script_path: &str, platform: Platform) -> String {
    match platform {
        Platform::Windows => format!(
            "powershell -NoProfile -ExecutionPolicy Bypass -File \"{script_path}\""
        ),
        Platform::Other => format!("bash \"{script_path}\""),
    }
}

/// Run the sync script for `root` in a fresh terminal session.
///
/// Fire and forget: returns as soon as the command has been submitted to the
/// new session. The script's exit status is never observed; anything that
/// goes wrong past this point (missing script, interpreter errors) surfaces
/// only as terminal output.
pub fn dispatch(
    root: &str,
    platform: Platform,
    terminal: &TerminalManager,
) -> Result<DispatchResult> {
    let script_path = script_path(root, platform);
    let command = invocation_command(&script_path, platform);
    terminal.open_session(SESSION_LABEL, &command)?;
    Ok(DispatchResult {
        root: root.to_string(),
        script_path,
        command,
        label: SESSION_LABEL.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_path_posix() {
        assert_eq!(
            script_path("/home/u/proj", Platform::Other),
            "/home/u/proj/scripts/sync-no-ci.sh"
        );
    }

    #[test]
    fn script_path_windows() {
        assert_eq!(
            script_path("C:\\Users\\u\\proj", Platform::Windows),
            "C:\\Users\\u\\proj\\scripts\\sync-no-ci.ps1"
        );
    }

    #[test]
    fn script_path_trims_trailing_separator() {
        assert_eq!(
            script_path("/home/u/proj/", Platform::Other),
            "/home/u/proj/scripts/sync-no-ci.sh"
        );
        assert_eq!(
            script_path("C:\\Users\\u\\proj\\", Platform::Windows),
            "C:\\Users\\u\\proj\\scripts\\sync-no-ci.ps1"
        );
    }

    #[test]
    fn invocation_command_posix() {
        let path = script_path("/home/u/proj", Platform::Other);
        assert_eq!(
            invocation_command(&path, Platform::Other),
            "bash \"/home/u/proj/scripts/sync-no-ci.sh\""
        );
    }

    #[test]
    fn invocation_command_windows() {
        let path = script_path("C:\\Users\\u\\proj", Platform::Windows);
        assert_eq!(
            invocation_command(&path, Platform::Windows),
            "powershell -NoProfile -ExecutionPolicy Bypass -File \"C:\\Users\\u\\proj\\scripts\\sync-no-ci.ps1\""
        );
    }

    #[test]
    fn invocation_command_quotes_roots_with_spaces() {
        let path = script_path("/home/u/my proj", Platform::Other);
        assert_eq!(
            invocation_command(&path, Platform::Other),
            "bash \"/home/u/my proj/scripts/sync-no-ci.sh\""
        );
    }
}
