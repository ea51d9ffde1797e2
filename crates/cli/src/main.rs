#![warn(clippy::pedantic)]

mod store;

use std::{fs::File, io::Write, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use reminders_core::{
	reminder::{self, Reminder, ReminderId, ReminderState},
	schedule,
	time::{ResolvedEvent, Resolver},
};
use serde::Serialize;
use store::JsonFileStore;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schedule-reminders", version, about = "Calendar reminders for schedule tables")]
struct Args {
	/// JSON file holding reminder states.
	#[arg(
		long,
		global = true,
		env = "SCHEDULE_REMINDERS_STORE",
		default_value = "reminders.json",
		value_hint = clap::ValueHint::FilePath
	)]
	store: PathBuf,
	/// Year the schedule's dates belong to. Defaults to the current one.
	#[arg(long, global = true, env = "SCHEDULE_REMINDERS_YEAR")]
	year: Option<i32>,
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Print every event with its reminder state and calendar link.
	List {
		#[clap(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
		path: Option<PathBuf>,
		#[arg(long, value_enum, default_value_t = Format::Text)]
		format: Format,
	},
	/// Flip the reminder with the given identity.
	Toggle { id: String },
	/// Write the schedule as an iCalendar file.
	Export {
		#[clap(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
		path: Option<PathBuf>,
		#[clap(short, long, value_hint = clap::ValueHint::FilePath)]
		output: Option<PathBuf>,
		/// Only include events whose reminder is on.
		#[arg(long)]
		only_reminded: bool,
	},
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
	Text,
	Json,
}

#[derive(Serialize)]
struct Listing<'a> {
	id: &'a str,
	title: &'a str,
	details: &'a str,
	start: String,
	end: String,
	reminded: bool,
	url: &'a str,
}

fn load_events(path: Option<PathBuf>, resolver: &Resolver) -> anyhow::Result<Vec<ResolvedEvent>> {
	let source = path
		.as_ref()
		.map_or_else(|| "stdin".to_string(), |p| p.display().to_string());
	let rows = schedule::parse_from_file(path).with_context(|| format!("reading {source}"))?;

	tracing::info!(rows = rows.len(), year = resolver.year(), %source, "parsed schedule");

	reminders_core::resolve_rows(&rows, resolver).with_context(|| format!("resolving events in {source}"))
}

fn list(events: &[ResolvedEvent], store: &JsonFileStore, format: Format) -> anyhow::Result<()> {
	let mut out = std::io::stdout().lock();
	let reminders = events.iter().map(Reminder::from_event).collect::<Vec<_>>();
	let states = reminders
		.iter()
		.map(|r| r.state(store))
		.collect::<Result<Vec<_>, _>>()?;

	match format {
		Format::Text => {
			for ((event, reminder), state) in events.iter().zip(&reminders).zip(&states) {
				let mark = if *state == ReminderState::On { 'x' } else { ' ' };
				let start = event.start.with_timezone(&reminders_core::TZ);
				let end = event.end.with_timezone(&reminders_core::TZ);

				writeln!(
					out,
					"[{mark}] {} {}-{} {}  {}",
					start.format("%d/%m"),
					start.format("%H:%M"),
					end.format("%H:%M"),
					event.title,
					reminder.id
				)?;
				writeln!(out, "    {}", reminder.url)?;
			}
		}
		Format::Json => {
			let listings = events
				.iter()
				.zip(&reminders)
				.zip(&states)
				.map(|((event, reminder), state)| Listing {
					id: reminder.id.as_str(),
					title: &event.title,
					details: &event.details,
					start: event.start.to_rfc3339(),
					end: event.end.to_rfc3339(),
					reminded: *state == ReminderState::On,
					url: &reminder.url,
				})
				.collect::<Vec<_>>();

			serde_json::to_writer_pretty(&mut out, &listings)?;
			writeln!(out)?;
		}
	}

	Ok(())
}

fn run(args: Args) -> anyhow::Result<()> {
	let resolver = args.year.map_or_else(Resolver::current, Resolver::new);
	let mut store = JsonFileStore::open(&args.store)?;

	match args.command {
		Command::List { path, format } => list(&load_events(path, &resolver)?, &store, format),
		Command::Toggle { id } => {
			let id = id.parse::<ReminderId>()?;
			let state = reminder::toggle(&mut store, &id)?;

			println!("{id} {state}");
			Ok(())
		}
		Command::Export {
			path,
			output,
			only_reminded,
		} => {
			let mut events = load_events(path, &resolver)?;

			if only_reminded {
				let mut kept = Vec::with_capacity(events.len());

				for event in events {
					if Reminder::from_event(&event).state(&store)? == ReminderState::On {
						kept.push(event);
					}
				}

				events = kept;
			}

			let calendar = reminders_core::create_calendar(&events);

			if let Some(output) = output {
				let mut file =
					File::create(&output).with_context(|| format!("creating {}", output.display()))?;
				write!(&mut file, "{calendar}")?;
			} else {
				write!(&mut std::io::stdout(), "{calendar}")?;
			}

			Ok(())
		}
	}
}

fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(std::io::stderr)
		.init();

	if let Err(err) = run(Args::parse()) {
		eprintln!("error: {err:#}");
		std::process::exit(1);
	}
}
