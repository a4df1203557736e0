use clap::Parser;
use std::path::PathBuf;

use crate::config::Settings;
use crate::tax::{LossRecording, SellAccounting};

pub mod formatters;
pub mod runner;

#[derive(Parser, Debug)]
#[command(name = "capital-gains")]
#[command(version, about = "Capital-gains tax calculator for stock operations")]
#[command(
    long_about = "Reads one JSON array of buy/sell operations per line from stdin and writes the tax owed for each operation. Each line is an independent batch; a blank line or end of input stops processing."
)]
pub struct Cli {
    /// Path to a TOML settings file (defaults to <config dir>/capital-gains/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// How sells reduce the held share count: all-sells or taxable-sells-only
    #[arg(long, value_name = "MODE")]
    pub sell_accounting: Option<SellAccounting>,

    /// When a losing taxable sell is carried forward: while-carrying or always
    #[arg(long, value_name = "WHEN")]
    pub non_exempt_losses: Option<LossRecording>,

    /// Reject negative values and sells larger than the held position
    #[arg(long)]
    pub strict: bool,

    /// Print a per-operation breakdown table instead of JSON
    #[arg(long)]
    pub explain: bool,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Log calculator steps to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of file settings
    pub fn apply_overrides(&self, mut settings: Settings) -> Settings {
        if let Some(mode) = self.sell_accounting {
            settings.sell_accounting = mode;
        }
        if let Some(recording) = self.non_exempt_losses {
            settings.non_exempt_losses = recording;
        }
        if self.strict {
            settings.strict = true;
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_defaults() {
        let cli = Cli::try_parse_from(["capital-gains"]).unwrap();
        assert!(cli.config.is_none());
        assert!(cli.sell_accounting.is_none());
        assert!(cli.non_exempt_losses.is_none());
        assert!(!cli.strict);
        assert!(!cli.explain);
    }

    #[test]
    fn overrides_replace_file_settings() {
        let cli = Cli::try_parse_from([
            "capital-gains",
            "--sell-accounting",
            "taxable-sells-only",
            "--non-exempt-losses",
            "always",
            "--strict",
        ])
        .unwrap();

        let settings = cli.apply_overrides(Settings::default());
        assert_eq!(settings.sell_accounting, SellAccounting::TaxableSellsOnly);
        assert_eq!(settings.non_exempt_losses, LossRecording::Always);
        assert!(settings.strict);
    }

    #[test]
    fn file_settings_survive_without_flags() {
        let cli = Cli::try_parse_from(["capital-gains"]).unwrap();
        let file = Settings {
            sell_accounting: SellAccounting::TaxableSellsOnly,
            non_exempt_losses: LossRecording::Always,
            strict: true,
        };
        assert_eq!(cli.apply_overrides(file.clone()), file);
    }

    #[test]
    fn rejects_unknown_accounting_mode() {
        assert!(Cli::try_parse_from(["capital-gains", "--sell-accounting", "sometimes"]).is_err());
    }
}
