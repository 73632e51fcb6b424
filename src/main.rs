use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod config;
mod documents;
mod error;
mod ids;
mod migration;
mod normalize;
mod output;
mod records;

use config::Config;
use ids::{Clock, IdGenerator, ObjectIdGenerator, SystemClock};
use migration::{migrate_bookings, MigrationOutput, Variant};
use output::{write_documents, write_failure_report};
use records::read_json;

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "booking_migration=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::parse();
    run(&config, &mut ObjectIdGenerator, &SystemClock)?;

    Ok(())
}

/// Transforms the whole input in memory and only then writes the outputs.
fn run<G: IdGenerator, C: Clock>(
    config: &Config,
    ids: &mut G,
    clock: &C,
) -> Result<MigrationOutput> {
    info!("Migrating {} ({:?})", config.input.display(), config.variant);

    let records = read_json(&config.input)?;
    info!("Loaded {} legacy bookings", records.len());

    let output = migrate_bookings(&records, &config.migration_options(), ids, clock)
        .with_context(|| {
            format!(
                "migration of {} aborted, nothing written",
                config.input.display()
            )
        })?;

    write_documents(&config.bookings_output, &output.bookings)?;
    if config.variant == Variant::Profiles {
        write_documents(&config.profiles_output, &output.profiles)?;
    }
    if let Some(path) = &config.failure_report {
        write_failure_report(path, &output.failures)?;
        info!("Failure report saved to {}", path.display());
    }

    match config.variant {
        Variant::Profiles => info!(
            "Migration completed. Migrated data saved to {} and profiles saved to {}",
            config.bookings_output.display(),
            config.profiles_output.display()
        ),
        Variant::BookingsOnly => info!(
            "Migration completed. Migrated data saved to {}",
            config.bookings_output.display()
        ),
    }

    Ok(output)
}
