use std::io::Write;

use anyhow::Result;
use clap::Args;
use clap_complete::{Shell, generate};

/// Arguments for `bv completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script generation.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Generate shell completion script to stdout.
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn run_completions(shell: Shell, command: &mut clap::Command) -> Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_completions(shell, command, &mut out);
    out.flush()?;
    Ok(())
}

fn write_completions(shell: Shell, command: &mut clap::Command, out: &mut dyn Write) {
    let bin_name = command
        .get_bin_name()
        .unwrap_or_else(|| command.get_name())
        .to_string();
    generate(shell, command, bin_name, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bash_script_names_binary_and_subcommands() {
        let mut command = clap::Command::new("bv")
            .subcommand(clap::Command::new("cycles"))
            .subcommand(clap::Command::new("check-dep"));
        let mut out = Vec::new();
        write_completions(Shell::Bash, &mut command, &mut out);

        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("bv"));
        assert!(script.contains("check-dep"));
    }
}
