use is_terminal::IsTerminal;
use roundtrace_engine::CorrelationWindow;

use crate::config::{ColorMode, Config, OutputFormat};

/// Effective settings for one invocation: flags win over the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionContext {
    pub format: OutputFormat,
    pub window: CorrelationWindow,
    pub preview_chars: usize,
    pub color: bool,
}

impl ExecutionContext {
    pub fn new(
        config: &Config,
        format: Option<OutputFormat>,
        window: Option<CorrelationWindow>,
        preview_chars: Option<usize>,
        color: Option<ColorMode>,
    ) -> Self {
        let color = match color.unwrap_or(config.color) {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => {
                std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
            }
        };

        Self {
            format: format.unwrap_or(config.format),
            window: window.unwrap_or(config.window),
            preview_chars: preview_chars.unwrap_or(config.preview_chars),
            color,
        }
    }
}
