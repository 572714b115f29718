use clap::Args;

/// Output flags accepted by every subcommand.
#[derive(Args, Debug, Clone, Copy)]
pub struct Output {
    /// Print nothing, neither the editor listing nor log lines.
    #[arg(global = true, long, short, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log more: `-v` for debug, `-vv` for trace.
    #[arg(global = true, action = clap::ArgAction::Count, long, short, conflicts_with = "quiet")]
    pub verbose: u8,
}

impl Output {
    /// The default log filter. `debug = true` in the settings counts as one
    /// `-v`.
    pub fn log_level(self, debug: bool) -> &'static str {
        match self.verbose {
            0 if !debug => "info",
            0 | 1 => "debug",
            _ => "trace",
        }
    }

    pub fn prints(self) -> bool {
        !self.quiet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level() {
        let output = |verbose| Output {
            quiet: false,
            verbose,
        };
        assert_eq!(output(0).log_level(false), "info");
        assert_eq!(output(0).log_level(true), "debug");
        assert_eq!(output(1).log_level(false), "debug");
        assert_eq!(output(2).log_level(true), "trace");
    }
}
