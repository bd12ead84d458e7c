use std::{
	env,
	io::{self, Write},
	process::ExitCode,
};

use ariadne::{Color, Label, Report, ReportKind, Source};
use dado::{dice::Bias, engine::Error as RollError, parse, RollEngine, RollType};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::from_default_env())
		.with_writer(io::stderr)
		.init();

	let mut roll_type = RollType::Normal;
	let mut lucky = false;
	let mut unlucky = false;
	let mut notation = Vec::new();

	// Flags can appear anywhere; everything else is combined into the notation so that it can be left unquoted
	// even with spaces. The first argument is ignored since it is typically the name of the executable itself.
	for arg in env::args().skip(1) {
		match arg.as_str() {
			"-a" | "--advantage" => roll_type = RollType::Advantage,
			"-d" | "--disadvantage" => roll_type = RollType::Disadvantage,
			"-l" | "--lucky" => lucky = true,
			"-u" | "--unlucky" => unlucky = true,
			"-f" | "--formats" => {
				println!("{}", RollEngine::supported_formats().join(", "));
				return ExitCode::SUCCESS;
			}
			_ => notation.push(arg),
		}
	}

	let input = if notation.is_empty() {
		match read_notation() {
			Ok(input) => input,
			Err(err) => {
				eprintln!("Unable to read dice notation: {err}");
				return ExitCode::FAILURE;
			}
		}
	} else {
		notation.join(" ")
	};

	let mut engine = RollEngine::new();
	match engine.roll(&input, roll_type, Bias::from_flags(lucky, unlucky)) {
		Ok(outcome) => {
			println!("{}", outcome.chat_summary());
			if !outcome.is_secure {
				eprintln!("{}", engine.security_status());
			}
			ExitCode::SUCCESS
		}
		Err(RollError::InvalidFormat(parse::Error::Syntax { input, errors })) => {
			for err in errors {
				let report = Report::build(ReportKind::Error, err.span.clone())
					.with_message("Invalid dice notation")
					.with_label(
						Label::new(err.span)
							.with_message(err.message)
							.with_color(Color::Red),
					)
					.with_help("Use [count]d[sides], e.g. 2d6 or 1d20+5")
					.finish();
				if let Err(print_err) = report.eprint(Source::from(&input)) {
					eprintln!("Unable to print error report: {print_err}");
				}
			}
			ExitCode::FAILURE
		}
		Err(err) => {
			eprintln!("{err}");
			ExitCode::FAILURE
		}
	}
}

/// Reads a single line of notation from stdin, prompting for it if stdin is interactive.
fn read_notation() -> io::Result<String> {
	let mut lines = io::stdin().lines();

	// If there isn't already input available in stdin, display a prompt for it
	if lines.size_hint().1.is_none() {
		print!("Enter dice notation: ");
		io::stdout().flush()?;
	}

	lines.next().unwrap_or_else(|| Ok(String::new()))
}
