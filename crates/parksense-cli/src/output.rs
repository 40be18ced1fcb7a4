// Terminal styling

use colored::Colorize;

/// Output styling configuration
#[derive(Debug, Clone, Copy)]
pub struct OutputStyle {
    pub use_colors: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self::for_stream(atty::Stream::Stdout)
    }
}

impl OutputStyle {
    /// Colour only when `stream` is a terminal
    pub fn for_stream(stream: atty::Stream) -> Self {
        Self {
            use_colors: atty::is(stream),
        }
    }

    /// Style for messages written to stderr
    pub fn stderr() -> Self {
        Self::for_stream(atty::Stream::Stderr)
    }

    /// Style without ANSI escapes
    pub fn plain() -> Self {
        Self { use_colors: false }
    }

    /// Format success message
    pub fn success(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✓".green().bold(), msg.green().bold())
        } else {
            format!("✓ {}", msg)
        }
    }

    /// Format error message
    pub fn error(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "✗".red().bold(), msg.red().bold())
        } else {
            format!("✗ {}", msg)
        }
    }

    /// Format warning message
    pub fn warning(&self, msg: &str) -> String {
        if self.use_colors {
            format!("{} {}", "⚠".yellow(), msg.yellow())
        } else {
            format!("⚠ {}", msg)
        }
    }

    /// Format header
    pub fn header(&self, title: &str) -> String {
        if self.use_colors {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }

    /// Format a "label: value" detail line
    pub fn detail(&self, label: &str, value: &str) -> String {
        if self.use_colors {
            format!("  {} {}", format!("{}:", label).bold(), value)
        } else {
            format!("  {}: {}", label, value)
        }
    }

    /// Format secondary text
    pub fn dim(&self, msg: &str) -> String {
        if self.use_colors {
            msg.dimmed().to_string()
        } else {
            msg.to_string()
        }
    }
}
