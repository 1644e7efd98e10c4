use std::path::Path;
use std::process;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use csv::{ReaderBuilder, Writer};
use log::LevelFilter;

use roundrobin::constants::{ExitStatus, NamePolicy};
use roundrobin::core::{simulation, TimelineLog};
use roundrobin::models::stats::time_usage;
use roundrobin::scheduler::{RoundRobin, Scheduler};

/// Raw process columns, before validation.
#[derive(Debug, Default, PartialEq)]
pub struct ProcessInput {
    names: Vec<String>,
    arrivals: Vec<i64>,
    bursts: Vec<i64>,
}

/// Reads a headerless `name, arrival, burst` file.
pub fn read_process_file(file_path: &str) -> Result<ProcessInput> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| format!("cannot open {}", file_path))?;
    let mut input = ProcessInput::default();

    for (line, result) in rdr.records().enumerate() {
        let record = result?;
        if record.len() != 3 {
            bail!("line {}: expected name, arrival, burst", line + 1);
        }

        let arrival: i64 = record[1]
            .parse()
            .with_context(|| format!("line {}: bad arrival time '{}'", line + 1, &record[1]))?;
        let burst: i64 = record[2]
            .parse()
            .with_context(|| format!("line {}: bad burst time '{}'", line + 1, &record[2]))?;

        input.names.push(record[0].to_string());
        input.arrivals.push(arrival);
        input.bursts.push(burst);
    }

    Ok(input)
}

/// Splits a comma separated entry like "A, B, C".
pub fn parse_list<T: std::str::FromStr>(entry: &str) -> Result<Vec<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    entry
        .split(',')
        .map(|item| {
            let item = item.trim();
            item.parse::<T>().with_context(|| format!("invalid value '{}'", item))
        })
        .collect()
}

fn entry<'a>(matches: &'a ArgMatches, id: &str) -> Result<&'a String> {
    matches
        .get_one::<String>(id)
        .with_context(|| format!("--{} is required without an input file", id))
}

/// Builds the input from the `--names`, `--arrivals` and `--bursts` lists.
pub fn read_inline(matches: &ArgMatches) -> Result<ProcessInput> {
    Ok(ProcessInput {
        names: parse_list(entry(matches, "names")?)?,
        arrivals: parse_list(entry(matches, "arrivals")?)?,
        bursts: parse_list(entry(matches, "bursts")?)?,
    })
}

pub fn build_cli_command() -> Command {
    Command::new("Round Robin Scheduler")
    .version("1.0")
    .about("Simulates preemptive round-robin CPU scheduling")

    .arg(Arg::new("process_file")
        .help("Headerless CSV file of `name, arrival, burst` rows")
        .conflicts_with_all(["names", "arrivals", "bursts"]))

    .arg(Arg::new("quantum")
        .short('q')
        .long("quantum")
        .required(true)
        .allow_negative_numbers(true)
        .value_parser(clap::value_parser!(i64))
        .help("Time quantum"))

    .arg(Arg::new("names")
        .long("names")
        .help("Process names (comma separated)"))

    .arg(Arg::new("arrivals")
        .long("arrivals")
        .allow_hyphen_values(true)
        .help("Arrival times (comma separated)"))

    .arg(Arg::new("bursts")
        .long("bursts")
        .allow_hyphen_values(true)
        .help("Burst times (comma separated)"))

    .arg(Arg::new("delay")
        .long("delay-ms")
        .value_parser(clap::value_parser!(u64))
        .default_value("0")
        .help("Pause between two scheduling decisions, in milliseconds"))

    .arg(Arg::new("allow_duplicates")
        .long("allow-duplicate-names")
        .action(ArgAction::SetTrue)
        .help("Accept several processes with the same name"))

    .arg(Arg::new("stats_out")
        .long("stats-out")
        .help("Write per-process statistics to this CSV file"))

    .arg(Arg::new("gantt_out")
        .long("gantt-out")
        .help("Write the execution slices to this CSV file"))

    .arg(Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::Count)
        .help("Log the timeline (-v) or every decision (-vv)"))
}

fn init_logger(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn write_reports(scheduler: &RoundRobin, matches: &ArgMatches) -> Result<()> {
    if let Some(path) = matches.get_one::<String>("gantt_out") {
        let mut wtr = Writer::from_path(Path::new(path)).with_context(|| format!("cannot create {}", path))?;
        for slice in scheduler.gantt() {
            wtr.serialize(slice)?;
        }
        wtr.flush()?;
    }

    if let (Some(path), Some(stats)) = (matches.get_one::<String>("stats_out"), scheduler.stats()) {
        let mut wtr = Writer::from_path(Path::new(path)).with_context(|| format!("cannot create {}", path))?;
        for process in stats.processes() {
            wtr.serialize(process)?;
        }
        wtr.flush()?;
    }
    Ok(())
}

fn main() {
    // cargo run -- <process_file> -q <quantum> [--delay-ms <ms>] [-v]
    // example : cargo run -- --names A,B,C --arrivals 0,0,0 --bursts 5,3,1 -q 2
    let matches: ArgMatches = build_cli_command().get_matches();
    init_logger(matches.get_count("verbose"));

    let input = match matches.get_one::<String>("process_file") {
        Some(path) => read_process_file(path),
        None => read_inline(&matches),
    };
    let input = match input {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error reading processes: {:#}", e);
            process::exit(ExitStatus::UnreadableInput as i32);
        }
    };

    let quantum = *matches.get_one::<i64>("quantum").unwrap_or(&0);
    let policy = if matches.get_flag("allow_duplicates") {
        NamePolicy::Allow
    } else {
        NamePolicy::Reject
    };

    let mut scheduler = match RoundRobin::with_policy(&input.names, &input.arrivals, &input.bursts, quantum, policy) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            eprintln!("Invalid input: {}", e);
            process::exit(ExitStatus::InvalidInput as i32);
        }
    };

    let delay = match matches.get_one::<u64>("delay").copied().unwrap_or(0) {
        0 => None,
        ms => Some(Duration::from_millis(ms)),
    };

    let mut timeline = TimelineLog::echoing();
    let stats = simulation(&mut scheduler, &mut timeline, delay);

    println!();
    for slice in scheduler.gantt() {
        print!("({},{},{}) ", slice.name, slice.start, slice.end);
    }
    println!();
    println!("{}", stats);

    println!("\nTime Usage by Process:");
    for (id, slices) in time_usage(scheduler.process_set(), scheduler.gantt()) {
        let spans: Vec<String> = slices.iter().map(|s| format!("{}-{}", s.start, s.end)).collect();
        println!("{:<10}{}", stats.processes()[id].name, spans.join(" "));
    }

    if let Err(e) = write_reports(&scheduler, &matches) {
        eprintln!("Error writing reports: {:#}", e);
        process::exit(ExitStatus::ReportFailure as i32);
    }

    process::exit(ExitStatus::Completed as i32);
}
