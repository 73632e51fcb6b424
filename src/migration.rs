use bson::DateTime;
use chrono::NaiveDateTime;
use clap::ValueEnum;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::documents::{
    booking_code, Address, BookingAmount, NewBooking, ProductLine, Profile, Vendor,
};
use crate::error::{MigrationError, RecordRef};
use crate::ids::{Clock, IdGenerator};
use crate::normalize::{
    normalize_phone, normalize_vendor_phone, parse_naive_timestamp, parse_order_date, split_name,
    DateError, PhonePolicy,
};
use crate::records::{LegacyBooking, WrappedId};

pub const DEFAULT_BOOKING_PREFIX: &str = "WEDIUM";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Variant {
    /// Derive one profile per customer phone number and link bookings to it.
    #[default]
    Profiles,
    /// Give every booking its own fresh `uid`; no profiles are produced.
    BookingsOnly,
}

impl Variant {
    pub fn customer_phone_policy(self) -> PhonePolicy {
        match self {
            Variant::Profiles => PhonePolicy::PrefixTenDigits,
            Variant::BookingsOnly => PhonePolicy::LastTenDigits,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ErrorPolicy {
    /// Stop at the first bad record; nothing is written.
    #[default]
    Abort,
    /// Leave bad records out and report them.
    Skip,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationOptions {
    pub variant: Variant,
    pub on_error: ErrorPolicy,
    pub booking_prefix: String,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            on_error: ErrorPolicy::default(),
            booking_prefix: DEFAULT_BOOKING_PREFIX.to_string(),
        }
    }
}

/// A legacy booking left out under [`ErrorPolicy::Skip`].
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct RecordFailure {
    pub index: usize,
    pub legacy_id: Option<String>,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct MigrationOutput {
    pub bookings: Vec<NewBooking>,
    pub profiles: Vec<Profile>,
    pub failures: Vec<RecordFailure>,
}

/// Reshapes every legacy booking into the new schema, in input order.
pub fn migrate_bookings<G, C>(
    records: &[Value],
    options: &MigrationOptions,
    ids: &mut G,
    clock: &C,
) -> Result<MigrationOutput, MigrationError>
where
    G: IdGenerator,
    C: Clock,
{
    let mut migration = Migration {
        options,
        ids,
        clock,
        profiles: IndexMap::new(),
        bookings: Vec::with_capacity(records.len()),
        failures: Vec::new(),
    };

    for (index, value) in records.iter().enumerate() {
        if let Err(err) = migration.migrate_record(index, value) {
            match options.on_error {
                ErrorPolicy::Abort => {
                    error!("Aborting migration: {}", err);
                    return Err(err);
                }
                ErrorPolicy::Skip => {
                    warn!("Skipping {}", err);
                    migration.failures.push(RecordFailure {
                        index,
                        legacy_id: err.record().and_then(|record| record.legacy_id.clone()),
                        reason: err.to_string(),
                    });
                }
            }
        }
    }

    info!(
        "Migrated {} bookings into {} profiles ({} skipped)",
        migration.bookings.len(),
        migration.profiles.len(),
        migration.failures.len()
    );

    Ok(MigrationOutput {
        bookings: migration.bookings,
        profiles: migration.profiles.into_values().collect(),
        failures: migration.failures,
    })
}

struct Migration<'a, G, C> {
    options: &'a MigrationOptions,
    ids: &'a mut G,
    clock: &'a C,
    /// Normalized customer phone -> profile, in order of first appearance.
    profiles: IndexMap<String, Profile>,
    bookings: Vec<NewBooking>,
    failures: Vec<RecordFailure>,
}

impl<G: IdGenerator, C: Clock> Migration<'_, G, C> {
    fn migrate_record(&mut self, index: usize, value: &Value) -> Result<(), MigrationError> {
        let legacy = LegacyBooking::from_value(index, value)?;
        let record = RecordRef::new(index, legacy.id.as_ref().map(|id| id.oid.clone()));

        let name = split_name(&legacy.name).ok_or_else(|| MigrationError::EmptyName {
            record: record.clone(),
        })?;
        let customer_phone =
            normalize_phone(&legacy.phone, self.options.variant.customer_phone_policy());

        let date = |field: &'static str,
                    value: &str,
                    parsed: Result<NaiveDateTime, DateError>| {
            parsed
                .map(|naive| DateTime::from_chrono(naive.and_utc()))
                .map_err(|source| MigrationError::InvalidDate {
                    record: record.clone(),
                    field,
                    value: value.to_string(),
                    source,
                })
        };
        let booking_date = date(
            "orderDate",
            &legacy.order_date,
            parse_order_date(&legacy.order_date),
        )?;
        let created_at = date(
            "createdAt",
            &legacy.created_at.date,
            parse_naive_timestamp(&legacy.created_at.date),
        )?;
        let updated_at = date(
            "updatedAt",
            &legacy.updated_at.date,
            parse_naive_timestamp(&legacy.updated_at.date),
        )?;

        let object_id = |field: &'static str, wrapped: &WrappedId| {
            wrapped
                .to_object_id()
                .map_err(|source| MigrationError::InvalidObjectId {
                    record: record.clone(),
                    field,
                    value: wrapped.oid.clone(),
                    source,
                })
        };
        let product_id = object_id("ServiceData._id", &legacy.service_data.id)?;
        let vendor_id = object_id("vendorData._id", &legacy.vendor_data.id)?;

        // No id is drawn for a record that fails.
        let mut new_profile = None;
        let uid = match self.options.variant {
            Variant::Profiles => match self.profiles.get(&customer_phone) {
                Some(profile) => profile.uid.clone(),
                None => {
                    let phone_number = customer_phone.parse::<i64>().map_err(|source| {
                        MigrationError::InvalidPhone {
                            record: record.clone(),
                            value: customer_phone.clone(),
                            source,
                        }
                    })?;
                    let profile = Profile::from_booking(
                        self.ids.next_id(),
                        &name,
                        phone_number,
                        &legacy,
                        DateTime::from_chrono(self.clock.now()),
                    );
                    let uid = profile.uid.clone();
                    new_profile = Some(profile);
                    uid
                }
            },
            Variant::BookingsOnly => self.ids.next_id().to_hex(),
        };

        let id = self.ids.next_id();
        let products = vec![ProductLine::single(
            self.ids.next_id(),
            product_id,
            &legacy.service_data.name,
            &legacy.service_data.price,
        )];

        let booking = NewBooking {
            id,
            booking_id: booking_code(&self.options.booking_prefix, index + 1),
            otp: legacy.otp.clone(),
            uid,
            first_name: name.first.clone(),
            last_name: name.last.clone(),
            booking_time: legacy.booking_time.clone(),
            booking_date,
            products,
            address: Address::from_booking(&name, &customer_phone, &legacy),
            status: legacy.order_status.clone(),
            booking_amount: BookingAmount::from_price(&legacy.service_data.price),
            otp_generated_at: created_at,
            created_at,
            updated_at,
            version: 0,
            vendor: Vendor {
                vendor_id,
                full_name: legacy.vendor_data.name.clone(),
                phone_number: normalize_vendor_phone(&legacy.vendor_data.phone),
            },
        };

        if let Some(profile) = new_profile {
            debug!("New profile {} for phone {}", profile.uid, customer_phone);
            self.profiles.insert(customer_phone, profile);
        }
        self.bookings.push(booking);

        Ok(())
    }
}
