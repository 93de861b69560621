use std::sync::Mutex;

/// Write-only sink for human readable progress and notice lines.
pub trait Output: Send + Sync {
    fn write_line(&self, line: &str);

    /// A side remark, e.g. which stop conditions are active.
    fn comment(&self, line: &str) {
        self.write_line(&format!("// {}", line));
    }

    fn error(&self, line: &str) {
        self.write_line(&format!("[ERROR] {}", line));
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutput;

impl Output for NullOutput {
    fn write_line(&self, _line: &str) {}
}

/// Keeps every line in memory.
#[derive(Debug, Default)]
pub struct BufferedOutput {
    lines: Mutex<Vec<String>>,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }
}

impl Output for BufferedOutput {
    fn write_line(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}
