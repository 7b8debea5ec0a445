use crate::cli::Command;
use crate::error::Error;
use crate::summary::Summary;
use config::Config;
use monotime::{Clock, Duration};
use std::io::Write;
use std::process;
use tracing::{debug, info};

/// Execute `command`, writing its report to `out`.
pub fn run<C, W>(command: &Command, config: &Config, clock: &C, out: &mut W) -> Result<(), Error>
where
    C: Clock + ?Sized,
    W: Write + ?Sized,
{
    let precision_or_default = |flag: &Option<usize>| flag.unwrap_or(config.format.precision);

    match command {
        Command::Measure {
            runs,
            precision: flag,
            command,
        } => {
            let runs = runs.unwrap_or(config.measure.runs);
            let precision = precision_or_default(flag);
            measure(command, runs, config.measure.pause, precision, clock, out)
        }
        Command::Sleep {
            duration,
            precision: flag,
        } => sleep(*duration, precision_or_default(flag), clock, out),
        Command::Format {
            duration,
            precision: flag,
        } => {
            let precision = precision_or_default(flag);
            writeln!(out, "{duration:.precision$}")?;
            Ok(())
        }
        Command::Config => {
            out.write_all(config.to_toml()?.as_bytes())?;
            Ok(())
        }
    }
}

fn measure<C, W>(
    command: &[String],
    runs: u32,
    pause: Duration,
    precision: usize,
    clock: &C,
    out: &mut W,
) -> Result<(), Error>
where
    C: Clock + ?Sized,
    W: Write + ?Sized,
{
    let Some((program, args)) = command.split_first() else {
        return Ok(());
    };

    let mut samples = Vec::with_capacity(runs as usize);
    for run in 1..=runs {
        if run > 1 {
            pause.sleep_with(clock)?;
        }
        let (status, elapsed) = Duration::with_measure_with(clock, || {
            process::Command::new(program).args(args).status()
        })?;
        let status = status.map_err(|source| Error::Spawn {
            program: program.clone(),
            source,
        })?;
        if !status.success() {
            return Err(Error::Failed {
                program: program.clone(),
                status,
            });
        }
        debug!(run, %elapsed, "run finished");
        writeln!(out, "run {run}: {elapsed:.precision$}")?;
        samples.push(elapsed);
    }

    if let Some(summary) = Summary::of(&samples).filter(|_| samples.len() > 1) {
        writeln!(
            out,
            "min {:.p$}  mean {:.p$}  max {:.p$}",
            summary.min,
            summary.mean,
            summary.max,
            p = precision
        )?;
    }
    Ok(())
}

fn sleep<C, W>(duration: Duration, precision: usize, clock: &C, out: &mut W) -> Result<(), Error>
where
    C: Clock + ?Sized,
    W: Write + ?Sized,
{
    let start = clock.now()?;
    let remaining = start.sleep_with(clock, duration)?;
    let slept = clock.now()? - start;
    info!(%duration, %remaining, "sleep finished");

    let drift = if remaining.is_negative() {
        "overshot by"
    } else {
        "woke early by"
    };
    writeln!(
        out,
        "slept {slept:.precision$}, {drift} {:.precision$}",
        remaining.abs()
    )?;
    Ok(())
}
