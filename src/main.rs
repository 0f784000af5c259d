use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{bail, Result};

use lab_graph::config::Settings;
use lab_graph::data::filter::Predicate;
use lab_graph::selection::{
    list_csv_files, parse_choice, parse_column, parse_columns, parse_literal,
    parse_stat_requests,
};
use lab_graph::session::Session;
use lab_graph::stats::{ColumnStats, FitKind, RegressionOutcome, StatRequest};

fn main() -> Result<()> {
    env_logger::init();
    let settings = Settings::load()?;

    println!("=== Lab Data Graph Builder ===");

    let folder = match std::env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => {
            let default = match &settings.data_dir {
                Some(dir) => dir.clone(),
                None => std::env::current_dir()?,
            };
            let input = prompt(&format!(
                "\nFolder containing your CSV files\n(leave empty for {}): ",
                default.display()
            ))?;
            if input.is_empty() {
                default
            } else {
                PathBuf::from(input)
            }
        }
    };

    let files = list_csv_files(&folder)?;
    println!("\nCSV files found:");
    for (i, f) in files.iter().enumerate() {
        let name = f.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
        println!("{i}: {name}");
    }
    let idx = retry(|| {
        let input = prompt("\nEnter the number of the CSV you want to use: ")?;
        Ok(parse_choice(&input, files.len())?)
    })?;

    let mut session = Session::open(&files[idx], settings)?;
    print_overview(&session);

    loop {
        let cmd = prompt("\n[stats | regress | filter | clear | plot | hist | quit] > ")?;
        let result = match cmd.as_str() {
            "stats" => cmd_stats(&session),
            "regress" => cmd_regress(&session),
            "filter" => cmd_filter(&mut session),
            "clear" => {
                session.clear_filter();
                println!("Filter cleared ({} rows).", session.active().n_rows());
                Ok(())
            }
            "plot" => cmd_plot(&session),
            "hist" => cmd_hist(&session),
            "quit" | "exit" | "q" => return Ok(()),
            "" => continue,
            other => {
                println!("Unknown command '{other}'.");
                continue;
            }
        };
        if let Err(e) = result {
            log::error!("{e:#}");
            println!("Error: {e:#}");
        }
    }
}

fn print_overview(session: &Session) {
    if let Some(sig) = session.repair() {
        println!(
            "\nFile looked malformed ({sig}); using repaired copy {}",
            session.ingested.loaded_from.display()
        );
    }
    println!("\nUsing file: {}", session.ingested.source.display());
    println!("First rows of your data:");
    print!("{}", session.table().head(session.settings.preview_rows));

    println!("\nColumns detected:");
    for (i, name) in session.table().column_names().iter().enumerate() {
        println!("{i}: {name}");
    }
    println!("\nShape: {:?}", session.table().shape());
}

fn cmd_stats(session: &Session) -> Result<()> {
    let table = session.active();
    let requests = parse_stat_requests(&prompt(
        "Statistics (min, max, mean, median, std, all, regression): ",
    )?)?;
    if requests.contains(&StatRequest::Regression) {
        cmd_regress(session)?;
        if requests.iter().all(|r| *r == StatRequest::Regression) {
            return Ok(());
        }
    }
    let columns = parse_columns(&prompt("Columns (indices or names): ")?, table)?;
    for summary in session.describe(&columns, &requests)? {
        match summary.stats {
            ColumnStats::NoNumericData => println!("{}: no numeric data", summary.column),
            ColumnStats::Values(values) => {
                let parts: Vec<String> =
                    values.iter().map(|(k, v)| format!("{k} = {v:.4}")).collect();
                println!("{}: {}", summary.column, parts.join(", "));
            }
        }
    }
    Ok(())
}

fn cmd_regress(session: &Session) -> Result<()> {
    let table = session.active();
    let x = parse_column(&prompt("Independent (x) column: ")?, table)?;
    let ys = parse_columns(&prompt("Dependent (y) columns: ")?, table)?;
    for (name, outcome) in session.regress(&x, &ys)? {
        match outcome {
            RegressionOutcome::Fit(r) => {
                let r2 = r
                    .r_squared
                    .map_or_else(|| "n/a".to_string(), |v| format!("{v:.4}"));
                println!(
                    "{name}: slope = {:.4}, intercept = {:.4}, R² = {r2}",
                    r.slope, r.intercept
                );
            }
            RegressionOutcome::Unavailable(why) => println!("{name}: unavailable ({why})"),
        }
    }
    Ok(())
}

fn cmd_filter(session: &mut Session) -> Result<()> {
    let table = session.table();
    let column = parse_column(&prompt("Filter column: ")?, table)?;
    let op = prompt("Operator (>, <, >=, <=, ==, !=): ")?.parse()?;
    let literal = parse_literal(&prompt("Value: ")?)?;
    let kept = session
        .apply_filter(Predicate { column, op, literal })?
        .n_rows();
    println!("{kept} rows match.");
    Ok(())
}

fn cmd_plot(session: &Session) -> Result<()> {
    let table = session.active();
    let x = parse_column(&prompt("x column: ")?, table)?;
    let ys = parse_columns(&prompt("y columns: ")?, table)?;
    let trend = parse_trend(&prompt("Trend (none, linear, quadratic): ")?)?;
    let data = session.scatter(&x, &ys, trend)?;
    println!("{}", serde_json::to_string_pretty(&data)?);
    Ok(())
}

fn cmd_hist(session: &Session) -> Result<()> {
    let column = parse_column(&prompt("Column: ")?, session.active())?;
    let hist = session.histogram(&column, Some(FitKind::Quadratic))?;
    println!("Total values: {}", hist.total);
    println!("{}", serde_json::to_string_pretty(&hist)?);
    Ok(())
}

fn parse_trend(input: &str) -> Result<Option<FitKind>> {
    match input.trim().to_ascii_lowercase().as_str() {
        "" | "none" => Ok(None),
        "linear" => Ok(Some(FitKind::Linear)),
        "quadratic" => Ok(Some(FitKind::Quadratic)),
        other => bail!("unknown trend '{other}'"),
    }
}

/// Re-ask until `f` succeeds; I/O failures and end of input still abort.
fn retry<T>(mut f: impl FnMut() -> Result<T>) -> Result<T> {
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) if e.is::<lab_graph::DataError>() => println!("{e}"),
            Err(e) => return Err(e),
        }
    }
}

fn prompt(message: &str) -> Result<String> {
    print!("{message}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("end of input");
    }
    Ok(line.trim().to_string())
}
