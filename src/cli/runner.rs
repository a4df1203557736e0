use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use tracing::{info, warn};

use crate::cli::formatters::format_batch_explain;
use crate::codec::{format_tax_results, parse_operations};
use crate::config::Settings;
use crate::error::CapitalGainsError;
use crate::tax::TaxCalculator;

/// How each processed batch is written to the output stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Json,
    Explain,
}

/// Counters reported once input is exhausted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub skipped: usize,
}

/// Read batches line by line until a blank line or end of input.
///
/// Each line is decoded, calculated from a freshly reset position, and written
/// to `output`. Lines that fail to decode, validate or encode are reported to
/// `errors` and skipped. A failure reading `input` or writing either stream is
/// returned as an error.
pub fn run<R, W, E>(
    input: R,
    output: &mut W,
    errors: &mut E,
    settings: &Settings,
    mode: OutputMode,
) -> Result<RunSummary>
where
    R: BufRead,
    W: Write,
    E: Write,
{
    let mut calculator = settings.calculator();
    let mut summary = RunSummary::default();

    for (index, line) in input.lines().enumerate() {
        let line_number = index + 1;
        let line = line.context("failed to read input")?;
        if line.trim().is_empty() {
            break;
        }

        match process_line(&mut calculator, &line, line_number, mode) {
            Ok(rendered) => {
                writeln!(output, "{}", rendered).context("failed to write output")?;
                summary.processed += 1;
            }
            Err(e) if e.is_recoverable() => {
                warn!("Skipping line {}: {}", line_number, e);
                writeln!(errors, "Error on line {}: {}", line_number, e)
                    .context("failed to write error report")?;
                summary.skipped += 1;
            }
            Err(e) => return Err(e.into()),
        }
    }

    output.flush().context("failed to flush output")?;

    info!(
        "Processed {} batch(es), skipped {}",
        summary.processed, summary.skipped
    );

    Ok(summary)
}

/// Calculate one batch and render it in the requested output mode
pub fn process_line(
    calculator: &mut TaxCalculator,
    line: &str,
    line_number: usize,
    mode: OutputMode,
) -> Result<String, CapitalGainsError> {
    let operations = parse_operations(line)?;
    info!(
        "Line {}: calculating {} operation(s)",
        line_number,
        operations.len()
    );

    match mode {
        OutputMode::Json => {
            let results = calculator.calculate_batch(&operations)?;
            format_tax_results(&results)
        }
        OutputMode::Explain => {
            let outcomes = calculator.calculate_batch_detailed(&operations)?;
            Ok(format_batch_explain(line_number, &outcomes))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::SellAccounting;
    use std::io::Cursor;

    fn run_json(input: &str, settings: &Settings) -> (String, String, RunSummary) {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let summary = run(Cursor::new(input), &mut out, &mut err, settings, OutputMode::Json)
            .expect("run failed");
        (
            String::from_utf8(out).unwrap(),
            String::from_utf8(err).unwrap(),
            summary,
        )
    }

    #[test]
    fn processes_each_line_independently() {
        let input = concat!(
            r#"[{"operation":"buy", "unit-cost":10.00, "quantity": 100},{"operation":"sell", "unit-cost":15.00, "quantity": 50},{"operation":"sell", "unit-cost":15.00, "quantity": 50}]"#,
            "\n",
            r#"[{"operation":"buy", "unit-cost":10.00, "quantity": 10000},{"operation":"sell", "unit-cost":20.00, "quantity": 5000},{"operation":"sell", "unit-cost":5.00, "quantity": 5000}]"#,
            "\n",
        );

        let (out, err, summary) = run_json(input, &Settings::default());
        assert_eq!(
            out,
            "[{\"tax\":0.00},{\"tax\":0.00},{\"tax\":0.00}]\n[{\"tax\":0.00},{\"tax\":10000.00},{\"tax\":0.00}]\n"
        );
        assert!(err.is_empty());
        assert_eq!(
            summary,
            RunSummary {
                processed: 2,
                skipped: 0
            }
        );
    }

    #[test]
    fn stops_at_blank_line() {
        let input = "[]\n\n[{\"operation\":\"buy\",\"unit-cost\":1,\"quantity\":1}]\n";
        let (out, _, summary) = run_json(input, &Settings::default());
        assert_eq!(out, "[]\n");
        assert_eq!(summary.processed, 1);
    }

    #[test]
    fn skips_malformed_line_and_continues() {
        let input = "not json\n[{\"operation\":\"buy\",\"unit-cost\":10,\"quantity\":1}]\n";
        let (out, err, summary) = run_json(input, &Settings::default());

        assert_eq!(out, "[{\"tax\":0.00}]\n");
        assert!(err.starts_with("Error on line 1: parse error"));
        assert_eq!(
            summary,
            RunSummary {
                processed: 1,
                skipped: 1
            }
        );
    }

    #[test]
    fn strict_mode_skips_invalid_batch() {
        let settings = Settings {
            sell_accounting: SellAccounting::AllSells,
            strict: true,
            ..Settings::default()
        };
        let input = "[{\"operation\":\"sell\",\"unit-cost\":10,\"quantity\":5}]\n";
        let (out, err, summary) = run_json(input, &settings);

        assert!(out.is_empty());
        assert!(err.contains("insufficient shares"));
        assert_eq!(summary.skipped, 1);
    }

    #[test]
    fn overflowing_batch_is_skipped() {
        let input = concat!(
            r#"[{"operation":"sell","unit-cost":79228162514264337593543950335,"quantity":2}]"#,
            "\n",
            r#"[{"operation":"buy","unit-cost":1,"quantity":9223372036854775807},{"operation":"buy","unit-cost":1,"quantity":1}]"#,
            "\n",
            r#"[{"operation":"buy","unit-cost":10.00,"quantity":100}]"#,
            "\n",
        );
        let (out, err, summary) = run_json(input, &Settings::default());

        assert_eq!(out, "[{\"tax\":0.00}]\n");
        let reports: Vec<&str> = err.lines().collect();
        assert_eq!(reports.len(), 2);
        assert!(reports[0].starts_with("Error on line 1: invalid operation #0"));
        assert!(reports[0].contains("overflow"));
        assert!(reports[1].starts_with("Error on line 2: invalid operation #1"));
        assert!(reports[1].contains("overflow"));
        assert_eq!(
            summary,
            RunSummary {
                processed: 1,
                skipped: 2
            }
        );
    }

    #[test]
    fn handles_crlf_line_endings() {
        let input = "[{\"operation\":\"buy\",\"unit-cost\":10,\"quantity\":1}]\r\n";
        let (out, err, _) = run_json(input, &Settings::default());
        assert_eq!(out, "[{\"tax\":0.00}]\n");
        assert!(err.is_empty());
    }

    #[test]
    fn explain_mode_writes_table() {
        let mut out = Vec::new();
        let mut err = Vec::new();
        let input = "[{\"operation\":\"buy\",\"unit-cost\":10,\"quantity\":100}]\n";
        run(
            Cursor::new(input),
            &mut out,
            &mut err,
            &Settings::default(),
            OutputMode::Explain,
        )
        .unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Batch 1"));
        assert!(text.contains("Avg Price"));
    }

    #[test]
    fn read_failure_is_fatal() {
        struct FailingReader;
        impl std::io::Read for FailingReader {
            fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("device unplugged"))
            }
        }

        let mut out = Vec::new();
        let mut err = Vec::new();
        let result = run(
            std::io::BufReader::new(FailingReader),
            &mut out,
            &mut err,
            &Settings::default(),
            OutputMode::Json,
        );

        let e = result.unwrap_err();
        assert!(e.to_string().contains("failed to read input"));
    }
}
