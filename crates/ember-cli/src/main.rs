use clap::{Parser, Subcommand};
use ember_core::Coordinate;
use tracing_subscriber::EnvFilter;

mod geo;
mod news;

#[derive(Debug, Parser)]
#[command(name = "ember")]
#[command(about = "Local news around a map anchor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch stories around a point and print them
    Refresh {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Skip the staleness check
        #[arg(long)]
        force: bool,
        /// Print the full snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Simulate a moving map and show which refreshes the gate lets through
    Watch {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Meters moved north per tick
        #[arg(long, default_value_t = 250.0, allow_hyphen_values = true)]
        step_meters: f64,
        #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
        interval_secs: u64,
        #[arg(long, default_value_t = 6)]
        ticks: u32,
    },
    /// Region span that frames a radius at a latitude
    Span {
        #[arg(long)]
        radius_km: f64,
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Viewport width in points, to report the radius on screen
        #[arg(long, requires = "height")]
        width: Option<f64>,
        #[arg(long, requires = "width")]
        height: Option<f64>,
    },
    /// Great-circle distance between two points
    Distance {
        /// `LAT,LON`
        #[arg(long, allow_hyphen_values = true)]
        from: Coordinate,
        /// `LAT,LON`
        #[arg(long, allow_hyphen_values = true)]
        to: Coordinate,
    },
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn anchor(lat: f64, lon: f64) -> anyhow::Result<Coordinate> {
    let coordinate = Coordinate::new(lat, lon);
    if !coordinate.is_valid() {
        anyhow::bail!("coordinate out of range: {lat},{lon}");
    }
    Ok(coordinate)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Refresh {
            lat,
            lon,
            force,
            json,
        } => {
            let config = ember_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            news::run_refresh(&config, anchor(lat, lon)?, force, json).await?;
        }
        Commands::Watch {
            lat,
            lon,
            step_meters,
            interval_secs,
            ticks,
        } => {
            let config = ember_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            let plan = news::WatchPlan {
                start: anchor(lat, lon)?,
                step_meters,
                interval: std::time::Duration::from_secs(interval_secs),
                ticks,
            };
            news::run_watch(&config, &plan).await?;
        }
        Commands::Span {
            radius_km,
            lat,
            width,
            height,
        } => {
            dotenvy::dotenv().ok();
            init_tracing("warn")?;
            let viewport = width
                .zip(height)
                .map(|(width, height)| ember_core::ViewportSize { width, height });
            geo::run_span(radius_km, lat, viewport)?;
        }
        Commands::Distance { from, to } => {
            dotenvy::dotenv().ok();
            init_tracing("warn")?;
            geo::run_distance(from, to);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
