//! This module is in charge of outputting the job results to the standard
//! output and various files

use crate::{
    config::Configuration,
    cutflow::Cutflow,
    job::{EventOutcome, JobResults},
    Result,
};

use eyre::WrapErr;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
    time::Duration,
};

/// Number of significant digits of efficiencies and timings
const SIG_DIGITS: usize = 6;

/// Output the cutflow to the console and to a report file
pub fn dump_cutflow(
    cfg: &Configuration,
    results: &JobResults,
    elapsed_time: Duration,
    report_path: impl AsRef<Path>,
) -> Result<()> {
    let report_path = report_path.as_ref();

    // Print out the cutflow table on stdout
    let stdout = io::stdout();
    let mut stdout = stdout.lock();
    writeln!(stdout, "{} cutflow:", cfg.selector)?;
    write_cutflow_table(&mut stdout, &results.cutflow)?;
    if !results.skipped.is_empty() {
        writeln!(stdout, "{} events skipped", results.skipped.len())?;
    }

    // Compute a timestamp of when the job ended
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .wrap_err("Failed to format the job end time")?;

    // Write the report file
    let mut report = File::create(report_path)
        .wrap_err_with(|| format!("Failed to create {}", report_path.display()))?;
    let report = &mut report;
    writeln_report(report, timestamp.as_str())?;
    writeln_report(report, "---------------------------------------------")?;
    writeln_report(report, ("Selector", cfg.selector.as_str()))?;
    let calculators = cfg.calculators.join(" ");
    writeln_report(report, ("Calculators", calculators.as_str()))?;
    writeln_report(report, ("Simulation", cfg.selector_config.is_mc))?;
    writeln_report(report, ("Processed events", results.cutflow.num_events()))?;
    writeln_report(report, ("Skipped events", results.skipped.len() as u64))?;
    let elapsed_secs = elapsed_time.as_secs_f64();
    writeln_report(report, ("Elapsed time (s)", elapsed_secs))?;
    let num_events = results.cutflow.num_events() + results.skipped.len() as u64;
    if num_events > 0 {
        #[allow(clippy::cast_precision_loss)]
        let secs_per_ev = elapsed_secs / num_events as f64;
        writeln_report(report, ("Time per event (s)", secs_per_ev))?;
    }
    writeln_report(report, "---------------------------------------------")?;
    write_cutflow_table(report, &results.cutflow)?;
    for id in &results.skipped {
        writeln!(report, " skipped {}", id)?;
    }
    Ok(())
}

/// Write down a cutflow table, one line per cut in evaluation order
pub fn write_cutflow_table(writer: &mut impl Write, cutflow: &Cutflow) -> Result<()> {
    writeln!(
        writer,
        " {:<31}{:>8}{:>12}{:>12}{:>12}",
        "Cut", "Applied", "Events", "Relative", "Cumulative"
    )?;
    for row in cutflow.rows() {
        write!(
            writer,
            " {:<31}{:>8}{:>12}",
            row.name,
            if row.enabled { "yes" } else { "no" },
            row.count
        )?;
        for efficiency in [row.relative, row.cumulative] {
            let mut formatted = Vec::new();
            write_engineering(&mut formatted, efficiency, SIG_DIGITS)?;
            write!(writer, "{:>12}", String::from_utf8_lossy(&formatted))?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write event outcomes as JSON lines, one object per event
pub fn write_outcomes(writer: impl Write, outcomes: &[EventOutcome]) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    for outcome in outcomes {
        serde_json::to_writer(&mut writer, outcome)
            .wrap_err_with(|| format!("Failed to serialize event {}", outcome.id))?;
        writeln!(writer)?;
    }
    writer.flush()?;
    Ok(())
}

/// Text output facility for the report file
fn writeln_report(file: &mut File, data: impl WriteReport) -> io::Result<()> {
    write!(file, " ")?;
    data.write(file)?;
    writeln!(file)
}

/// Trait implemented by things which can be printed in the report
trait WriteReport: Sized {
    /// Write down `self` to the report file
    fn write(self, file: &mut File) -> io::Result<()>;
}

impl WriteReport for &str {
    // Strings work in the usual way
    fn write(self, file: &mut File) -> io::Result<()> {
        write!(file, "{}", self)
    }
}

impl WriteReport for u64 {
    // Integers work in the usual way too
    fn write(self, file: &mut File) -> io::Result<()> {
        write!(file, "{}", self)
    }
}

impl WriteReport for bool {
    fn write(self, file: &mut File) -> io::Result<()> {
        write!(file, "{}", self)
    }
}

impl WriteReport for f64 {
    // Reals are printed in the manner of %g
    fn write(self, file: &mut File) -> io::Result<()> {
        write_engineering(file, self, SIG_DIGITS)
    }
}

impl<T: WriteReport> WriteReport for (&str, T) {
    // Key-value output that uses fixed-size columns for better readability
    fn write(self, file: &mut File) -> io::Result<()> {
        write!(*file, "{:<31}: ", self.0)?;
        self.1.write(file)
    }
}

/// Write a floating-point number using "engineering" notation
///
/// Analogous to the %g format of the C printf function, this method switches
/// between naive and scientific notation for floating-point numbers when the
/// number being printed becomes so small that printing leading zeroes could end
/// up larger than the scientific notation, or so large that we would be forced
/// to print more significant digits than requested.
///
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn write_engineering(writer: &mut impl Write, x: f64, sig_digits: usize) -> io::Result<()> {
    let mut precision = sig_digits - 1;
    if x == 0. {
        // Zero is special because you can't take its log
        write!(writer, "0")
    } else {
        // Otherwise, use log to evaluate order of magnitude
        let log_x = x.abs().log10();
        if log_x >= -3. && log_x <= (sig_digits as f64) {
            // Print using naive notation
            //
            // Since Rust's precision controls number of digits after the
            // decimal point, we must adjust it depending on magnitude in order
            // to operate at a constant number of significant digits.
            precision = (precision as isize - log_x.trunc() as isize).max(0) as usize;

            // Numbers smaller than 1 must get one extra digit since the leading
            // zero does not count as a significant digit.
            if log_x < 0. {
                precision += 1;
            }

            // Trailing zeros and decimal point are dropped, but be careful
            // with integer numbers...
            let str_with_zeros = format!("{:.1$}", x, precision);
            if str_with_zeros.contains('.') {
                write!(
                    writer,
                    "{}",
                    str_with_zeros.trim_end_matches('0').trim_end_matches('.')
                )
            } else {
                write!(writer, "{}", str_with_zeros)
            }
        } else {
            // Print using scientific notation
            write!(writer, "{:.1$e}", x, precision)
        }
    }
}
