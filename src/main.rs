use std::{
	path::PathBuf,
	sync::{Arc, Mutex, PoisonError},
};

use clap::{Parser, Subcommand};
use eyre::WrapErr;
use strip_lights::{config::TransportKind, http, Config, Controller};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Strip Lights - animated patterns on an addressable LED strip
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
	/// Path of the TOML config file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,
	/// Reduce log verbosity
	#[arg(short, long, default_value_t = false)]
	quiet: bool,
	/// Use the in-memory transport instead of the strip
	#[arg(long, default_value_t = false)]
	dry_run: bool,
	/// Print the config and exit without running
	#[arg(short, long, default_value_t = false)]
	print: bool,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Run one pattern in the foreground until it finishes
	Run {
		name: String,
		#[arg(long, default_value_t = 0.1)]
		delay: f64,
		#[arg(long, default_value_t = 0.5)]
		pause: f64,
		/// Zero runs until interrupted
		#[arg(long, default_value_t = 1)]
		rounds: u32,
	},
	/// List the available patterns
	Patterns,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
	color_eyre::install()?;
	let args = Args::parse();

	let mut config = Config::load(&args.config).wrap_err_with(|| format!("loading {}", args.config.display()))?;
	if args.dry_run {
		config.hardware.transport = TransportKind::Memory;
	}

	let level = config.logging.filter(args.quiet);
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
		.init();

	if args.print {
		info!("Selected configuration: {config:#?}");
		return Ok(());
	}

	if let Some(Command::Patterns) = args.command {
		for (name, display) in Controller::patterns() {
			println!("{name:<18} {display}");
		}
		return Ok(());
	}

	let transport = config.open_transport().wrap_err("opening the strip")?;
	let mut controller =
		Controller::with_transport(config.general.pixel_count, config.channel_order(), transport);
	controller.setup()?;
	info!(pixels = config.general.pixel_count, order = ?config.channel_order(), "strip ready");

	match args.command {
		Some(Command::Run {
			name,
			delay,
			pause,
			rounds,
		}) => {
			tokio::task::spawn_blocking(move || {
				controller.start_pattern(&name, delay, pause, rounds)?;
				controller.wait_for_pattern();
				Ok::<_, strip_lights::Error>(())
			})
			.await??;
		}
		_ => {
			let controller = Arc::new(Mutex::new(controller));
			http::serve(controller.clone(), &config.http).await?;

			tokio::task::spawn_blocking(move || {
				let mut controller = controller.lock().unwrap_or_else(PoisonError::into_inner);
				controller.lights_off(None)
			})
			.await??;
		}
	}

	info!("Shutdown");
	Ok(())
}
