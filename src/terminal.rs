use crate::config::appsettings::TerminalType;
use anyhow::{anyhow, Context, Result};
use std::cell::Cell;
use std::env;
use std::process::{Command, Stdio};

/// When set, sessions are counted but no process is spawned. Used by the
/// integration tests to exercise the full dispatch flow headlessly.
pub const TEST_MODE_ENV: &str = "SYNC_NO_CI_TEST_MODE";

pub struct TerminalManager {
    terminal_type: TerminalType,
    opened: Cell<usize>,
}

impl TerminalManager {
    pub fn new(terminal_type: TerminalType) -> Self {
        TerminalManager {
            terminal_type,
            opened: Cell::new(0),
        }
    }

    /// Number of sessions this manager has created.
    pub fn sessions_opened(&self) -> usize {
        self.opened.get()
    }

    /// Create one new visible terminal session named `label` and submit
    /// `command` as a line of input, executed as if the user typed it and
    /// pressed enter. The submitted line is exactly `command`; the label is
    /// set through the emulator's own title mechanism.
    ///
    /// Does not wait for `command` to finish. The session outlives this call
    /// and is owned by the user from here on.
    pub fn open_session(&self, label: &str, command: &str) -> Result<()> {
        if env::var(TEST_MODE_ENV).is_err() {
            match env::consts::OS {
                "macos" => self.open_macos(label, command)?,
                "windows" => open_windows(label, command)?,
                _ => open_unix(label, command)?,
            }
        }
        self.opened.set(self.opened.get() + 1);
        Ok(())
    }

    fn open_macos(&self, label: &str, command: &str) -> Result<()> {
        let script = match self.terminal_type {
            TerminalType::ITerm2 => build_iterm_script(label, command),
            TerminalType::Terminal => build_terminal_app_script(label, command),
        };
        run_osascript(&script)
    }
}

fn osascript_escape(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

fn build_iterm_script(label: &str, command: &str) -> String {
    let lines = [
        "tell application \"iTerm2\"".to_string(),
        "set newWindow to (create window with default profile)".to_string(),
        "tell current session of newWindow".to_string(),
        format!("set name to \"{}\"", osascript_escape(label)),
        format!("write text \"{}\"", osascript_escape(command)),
        "end tell".to_string(),
        "end tell".to_string(),
    ];
    lines.join("\n")
}

fn build_terminal_app_script(label: &str, command: &str) -> String {
    let lines = [
        "tell application \"Terminal\"".to_string(),
        "activate".to_string(),
        format!("do script \"{}\"", osascript_escape(command)),
        format!(
            "set custom title of front window to \"{}\"",
            osascript_escape(label)
        ),
        "end tell".to_string(),
    ];
    lines.join("\n")
}

fn run_osascript(script: &str) -> Result<()> {
    let output = Command::new("osascript")
        .arg("-e")
        .arg(script)
        .output()
        .context("failed to run osascript")?;

    if !output.status.success() {
        return Err(anyhow!(
            "osascript failed: {}",
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    Ok(())
}

/// Candidate emulator invocations, tried in order. `$TERMINAL` wins when set;
/// the generic `-e` form works for most emulators honoring that convention.
fn unix_candidates(label: &str, shell_line: &str) -> Vec<(String, Vec<String>)> {
    let mut candidates: Vec<(String, Vec<String>)> = Vec::new();

    if let Ok(term) = env::var("TERMINAL") {
        if !term.is_empty() {
            candidates.push((
                term,
                vec![
                    "-e".to_string(),
                    "bash".to_string(),
                    "-c".to_string(),
                    shell_line.to_string(),
                ],
            ));
        }
    }

    candidates.push((
        "x-terminal-emulator".to_string(),
        vec![
            "-e".to_string(),
            "bash".to_string(),
            "-c".to_string(),
            shell_line.to_string(),
        ],
    ));
    candidates.push((
        "gnome-terminal".to_string(),
        vec![
            format!("--title={label}"),
            "--".to_string(),
            "bash".to_string(),
            "-c".to_string(),
            shell_line.to_string(),
        ],
    ));
    candidates.push((
        "konsole".to_string(),
        vec![
            "-p".to_string(),
            format!("tabtitle={label}"),
            "-e".to_string(),
            "bash".to_string(),
            "-c".to_string(),
            shell_line.to_string(),
        ],
    ));
    candidates.push((
        "xterm".to_string(),
        vec![
            "-T".to_string(),
            label.to_string(),
            "-e".to_string(),
            "bash".to_string(),
            "-c".to_string(),
            shell_line.to_string(),
        ],
    ));

    candidates
}

fn open_unix(label: &str, command: &str) -> Result<()> {
    // Keep the window interactive after the script finishes.
    let shell_line = format!("{command}; exec bash");

    for (program, args) in unix_candidates(label, &shell_line) {
        let spawned = Command::new(&program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        if spawned.is_ok() {
            return Ok(());
        }
    }

    Err(anyhow!(
        "no terminal emulator found (tried $TERMINAL, x-terminal-emulator, gnome-terminal, konsole, xterm)"
    ))
}

fn open_windows(label: &str, command: &str) -> Result<()> {
    // `start` treats its first quoted argument as the window title; `/K`
    // keeps the console open after the command finishes.
    Command::new("cmd")
        .args(["/C", "start", label, "cmd", "/K", command])
        .spawn()
        .context("failed to open console via cmd start")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn osascript_escape_handles_quotes_and_backslashes() {
        assert_eq!(osascript_escape("a\"b"), "a\\\"b");
        assert_eq!(osascript_escape("a\\b"), "a\\\\b");
        assert_eq!(osascript_escape("a\nb"), "a\\nb");
    }

    #[test]
    fn iterm_script_submits_command_verbatim() {
        let script = build_iterm_script("Sync only (no build)", "bash \"/r/scripts/sync-no-ci.sh\"");
        assert!(script.contains("write text \"bash \\\"/r/scripts/sync-no-ci.sh\\\"\""));
        assert!(script.contains("set name to \"Sync only (no build)\""));
    }

    #[test]
    fn terminal_app_script_sets_title_and_runs() {
        let script = build_terminal_app_script("Sync only (no build)", "bash \"/r/s.sh\"");
        assert!(script.contains("do script \"bash \\\"/r/s.sh\\\"\""));
        assert!(script.contains("set custom title of front window to \"Sync only (no build)\""));
    }

    #[test]
    fn unix_candidates_keeps_fixed_fallback_order() {
        let candidates = unix_candidates("t", "cmd; exec bash");
        // $TERMINAL may or may not be set in the test environment; the fixed
        // fallbacks must always be present and ordered.
        let programs: Vec<&str> = candidates.iter().map(|(p, _)| p.as_str()).collect();
        let fixed_start = programs
            .iter()
            .position(|p| *p == "x-terminal-emulator")
            .unwrap();
        assert_eq!(
            &programs[fixed_start..],
            &["x-terminal-emulator", "gnome-terminal", "konsole", "xterm"]
        );
    }

    #[test]
    fn test_mode_counts_sessions_without_spawning() {
        std::env::set_var(TEST_MODE_ENV, "1");
        let mgr = TerminalManager::new(TerminalType::ITerm2);
        assert_eq!(mgr.sessions_opened(), 0);
        mgr.open_session("t", "echo hi").unwrap();
        mgr.open_session("t", "echo hi").unwrap();
        assert_eq!(mgr.sessions_opened(), 2);
    }
}
