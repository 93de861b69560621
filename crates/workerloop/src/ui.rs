use colored::Colorize;
use std::io::Write;

use workerloop_core::Output;

/// Console output: progress on stdout, errors on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleOutput;

impl Output for ConsoleOutput {
    fn write_line(&self, line: &str) {
        let _ = writeln!(std::io::stdout().lock(), "{}", line);
    }

    fn comment(&self, line: &str) {
        let _ = writeln!(
            std::io::stdout().lock(),
            "{} {}",
            "//".dimmed(),
            line.dimmed()
        );
    }

    fn error(&self, line: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr);
        let _ = writeln!(stderr, "{} {}", "[ERROR]".bright_red().bold(), line.bright_red());
        let _ = writeln!(stderr);
    }
}

pub fn print_worker_list(names: &[&str]) {
    if names.is_empty() {
        eprintln!("{}", "No workers registered.".dimmed());
        return;
    }

    eprintln!("{}", "Available workers:".bold());
    for name in names {
        println!("  {}", name.bright_cyan());
    }
}
