#![warn(clippy::pedantic)]

use std::{fs::File, io::Write, path::PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use chrono_tz::Tz;
use clap::{Parser, Subcommand};
use syl2ics_core::{
	create_calendar,
	deadline::Deadline,
	extract,
	provider::{GeminiClient, GenerationParams, OpenAiClient, Provider},
	store::{self, FileStore, Store},
	syllabus, Error, ExportOptions, ExtractOptions, Normalized, CALENDAR_NAME,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
	name = "syl2ics",
	version,
	about = "Extract deadlines from a syllabus with an LLM and export them to iCalendar"
)]
struct Args {
	/// Where saved deadlines and API keys live
	#[clap(long, global = true, env = "SYL2ICS_DATA_DIR", value_hint = clap::ValueHint::DirPath)]
	data_dir: Option<PathBuf>,
	/// Log more (-v info, -vv debug)
	#[clap(short, long, global = true, action = clap::ArgAction::Count)]
	verbose: u8,
	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Extract deadlines from a syllabus file (or stdin) and save them
	Extract {
		#[clap(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
		path: Option<PathBuf>,
		#[clap(long, default_value_t = Provider::Gemini)]
		provider: Provider,
		/// Model id (default depends on the provider)
		#[clap(long)]
		model: Option<String>,
		#[clap(long, default_value_t = 0.2)]
		temperature: f64,
		#[clap(long, default_value_t = 2000)]
		max_output_tokens: u32,
		/// Year assumed for dates written without one (default: this year)
		#[clap(long)]
		year: Option<i32>,
		/// API key; falls back to the saved key for the provider
		#[clap(long, env = "SYL2ICS_API_KEY", hide_env_values = true)]
		api_key: Option<String>,
		/// Override the provider's API base URL
		#[clap(long, value_hint = clap::ValueHint::Url)]
		base_url: Option<String>,
	},
	/// Show saved deadlines
	List,
	/// Delete one saved deadline by its number in `list`
	Remove { number: usize },
	/// Delete all saved deadlines
	Clear,
	/// Write saved deadlines as an iCalendar file
	Export {
		#[clap(short, long, value_hint = clap::ValueHint::FilePath)]
		output: Option<PathBuf>,
		#[clap(long, default_value = CALENDAR_NAME)]
		name: String,
		/// Time of day deadlines are due, e.g. 23:59 (default: all-day events)
		#[clap(long, value_parser = parse_time)]
		due_time: Option<NaiveTime>,
		/// Time zone for --due-time, e.g. America/Toronto
		#[clap(long, default_value = "UTC", value_parser = parse_tz)]
		tz: Tz,
	},
	/// Manage saved API keys
	Key {
		#[command(subcommand)]
		action: KeyAction,
	},
}

#[derive(Subcommand)]
enum KeyAction {
	/// Save an API key
	Set {
		key: String,
		#[clap(long, default_value_t = Provider::Gemini)]
		provider: Provider,
	},
	/// Forget a saved API key
	Clear {
		#[clap(long, default_value_t = Provider::Gemini)]
		provider: Provider,
	},
}

fn parse_time(s: &str) -> Result<NaiveTime, String> {
	NaiveTime::parse_from_str(s, "%H:%M")
		.or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
		.map_err(|_| format!("expected HH:MM, got {s:?}"))
}

fn parse_tz(s: &str) -> Result<Tz, String> {
	s.parse::<Tz>().map_err(|err| err.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
	let args = Args::parse();

	let default_filter = match args.verbose {
		0 => "warn",
		1 => "info",
		_ => "debug",
	};
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
		.with_writer(std::io::stderr)
		.init();

	let dir = match args.data_dir {
		Some(dir) => dir,
		None => dirs::data_dir()
			.context("could not determine a data directory, pass --data-dir")?
			.join("syl2ics"),
	};
	let store = FileStore::new(dir);
	info!(data_dir = %store.dir().display(), "using store");

	match args.command {
		Command::Extract {
			path,
			provider,
			model,
			temperature,
			max_output_tokens,
			year,
			api_key,
			base_url,
		} => {
			let syllabus = syllabus::read_from_file(path.as_ref()).context("failed to read syllabus")?;
			let credential = match api_key {
				Some(key) => key,
				None => store::load_credential(&store, provider.credential_key())?.unwrap_or_default(),
			};
			let options = ExtractOptions {
				default_year: year.unwrap_or_else(|| Local::now().year()),
				params: GenerationParams {
					model: model.unwrap_or_else(|| provider.default_model().to_string()),
					temperature,
					max_output_tokens,
				},
			};

			let result = match provider {
				Provider::Gemini => {
					let client = base_url.map_or_else(GeminiClient::new, GeminiClient::with_base_url);
					extract(&client, &syllabus, &credential, &options).await
				}
				Provider::OpenAi => {
					let client = base_url.map_or_else(OpenAiClient::new, OpenAiClient::with_base_url);
					extract(&client, &syllabus, &credential, &options).await
				}
			};

			let Normalized { deadlines, dropped } = match result {
				Err(Error::Credential) => bail!(
					"no API key for {provider}: save one with `syl2ics key set <KEY> --provider {provider}` or pass --api-key"
				),
				other => other?,
			};

			store::save_deadlines(&store, &deadlines)?;

			println!("Found {} deadlines", deadlines.len());
			print_deadlines(&deadlines, Local::now().date_naive());

			if !dropped.is_empty() {
				println!(
					"\n{} extracted items had no usable title or date and were skipped (-v for details).",
					dropped.len()
				);
			}
		}
		Command::List => {
			let deadlines = store::load_deadlines(&store)?;

			if deadlines.is_empty() {
				println!("No saved deadlines. Run 'syl2ics extract' first.");
				return Ok(());
			}

			print_deadlines(&deadlines, Local::now().date_naive());
		}
		Command::Remove { number } => {
			let Some(index) = number.checked_sub(1) else {
				bail!("deadline numbers start at 1");
			};
			let removed = store::remove_deadline(&store, index)?;

			println!("Removed \"{}\" ({})", removed.title, removed.date);
		}
		Command::Clear => {
			store::clear_deadlines(&store)?;
			println!("Cleared saved deadlines.");
		}
		Command::Export {
			output,
			name,
			due_time,
			tz,
		} => {
			let deadlines = store::load_deadlines(&store)?;

			if deadlines.is_empty() {
				bail!("no saved deadlines to export, run 'syl2ics extract' first");
			}

			let options = ExportOptions {
				name,
				due_time,
				timezone: tz,
			};
			let calendar = create_calendar(&deadlines, &options);

			if let Some(output) = output {
				let mut file = File::create(&output)
					.with_context(|| format!("failed to create {}", output.display()))?;
				write!(&mut file, "{calendar}")?;
				info!(path = %output.display(), events = deadlines.len(), "exported calendar");
			} else {
				write!(&mut std::io::stdout(), "{calendar}")?;
			}
		}
		Command::Key { action } => match action {
			KeyAction::Set { key, provider } => {
				let key = key.trim();

				if key.is_empty() {
					bail!("refusing to save an empty API key");
				}

				store.save(provider.credential_key(), key)?;
				println!("Saved {provider} API key.");
			}
			KeyAction::Clear { provider } => {
				store.delete(provider.credential_key())?;
				println!("Forgot {provider} API key.");
			}
		},
	}

	Ok(())
}

fn print_deadlines(deadlines: &[Deadline], today: NaiveDate) {
	let width = deadlines
		.iter()
		.map(|deadline| deadline.title.chars().count())
		.max()
		.unwrap_or(0);

	for (i, deadline) in deadlines.iter().enumerate() {
		println!(
			"{:>3}. {:<14} {:<width$}  {}  {}",
			i + 1,
			format!("[{}]", deadline.kind.as_str().to_uppercase()),
			deadline.title,
			deadline.date.format("%a, %b %-d, %Y"),
			deadline.urgency(today),
		);

		if let Some(description) = deadline.description.as_deref().filter(|d| !d.is_empty()) {
			println!("     {description}");
		}
	}
}
