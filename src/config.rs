use clap::Parser;
use std::path::PathBuf;

use crate::migration::{ErrorPolicy, MigrationOptions, Variant, DEFAULT_BOOKING_PREFIX};

/// Run without arguments to migrate `test.orders.json` in the working directory.
#[derive(Debug, Clone, Parser)]
#[command(name = "booking-migration")]
#[command(about = "Migrate legacy bookings into customer profiles and new-schema bookings")]
pub struct Config {
    #[arg(long, default_value = "test.orders.json", help = "Legacy export (JSON array)")]
    pub input: PathBuf,

    #[arg(long, default_value = "products.json", help = "Where to write migrated bookings")]
    pub bookings_output: PathBuf,

    #[arg(long, default_value = "profiles.json", help = "Where to write derived profiles")]
    pub profiles_output: PathBuf,

    #[arg(long, value_enum, default_value_t = Variant::Profiles)]
    pub variant: Variant,

    #[arg(long, value_enum, default_value_t = ErrorPolicy::Abort)]
    pub on_error: ErrorPolicy,

    #[arg(long, help = "CSV report of records skipped with --on-error skip")]
    pub failure_report: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_BOOKING_PREFIX, help = "Booking code prefix")]
    pub booking_prefix: String,
}

impl Config {
    pub fn migration_options(&self) -> MigrationOptions {
        MigrationOptions {
            variant: self.variant,
            on_error: self.on_error,
            booking_prefix: self.booking_prefix.clone(),
        }
    }
}
