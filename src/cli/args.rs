use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "mawaqit", version, author, about = "Offline-first prayer times with sync and live countdown")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Save the city prayer times are fetched for
    Setup {
        /// Display name of the city
        #[arg(long)]
        city: String,
        /// ISO country code, e.g. TN
        #[arg(long)]
        country: String,
        /// Name the prayer times API knows the city by (defaults to --city)
        #[arg(long)]
        api_name: Option<String>,
        /// City identifier; may encode coordinates as "{lat}-{lng}"
        #[arg(long)]
        id: Option<String>,
    },
    /// Show today's prayer times and the countdown to the next prayer
    Times {
        /// Refresh the countdown every second until interrupted
        #[arg(long)]
        watch: bool,
        /// Show a specific day instead of today (DD-MM-YYYY)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show a full month of prayer times, fetching it if not cached
    Month {
        /// Gregorian year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
        /// Gregorian month 1-12 (defaults to the current month)
        #[arg(long)]
        month: Option<u32>,
    },
    /// Fetch the current (or given) month from the network
    Sync {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
        /// Clear the entire cache before fetching
        #[arg(long)]
        force: bool,
    },
    /// Show cache and baseline sync state
    Status,
    /// Compute the qibla bearing from coordinates or the configured city
    Qibla {
        #[arg(long, requires = "lng")]
        lat: Option<f64>,
        #[arg(long, requires = "lat")]
        lng: Option<f64>,
    },
}
