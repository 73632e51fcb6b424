use bson::Bson;
use serde::Serialize;
use serde_json::Value;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use crate::error::MigrationError;
use crate::migration::RecordFailure;

const FAILURE_REPORT_HEADER: [&str; 3] = ["index", "legacy_id", "reason"];

/// Renders documents as relaxed extended JSON: object ids as `{"$oid": ..}`,
/// dates as `{"$date": ..}`, numbers as plain JSON numbers.
pub fn to_extended_json<T: Serialize>(documents: &[T]) -> Result<Value, MigrationError> {
    let documents = documents
        .iter()
        .map(|document| -> Result<Value, MigrationError> {
            Ok(Bson::Document(bson::to_document(document)?).into_relaxed_extjson())
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Value::Array(documents))
}

/// Writes one JSON array, indented by two spaces.
pub fn write_documents<P: AsRef<Path>, T: Serialize>(
    path: P,
    documents: &[T],
) -> Result<(), MigrationError> {
    let path = path.as_ref();
    let value = to_extended_json(documents)?;

    let io_error = |source| MigrationError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    serde_json::to_writer_pretty(&mut writer, &value).map_err(|source| {
        MigrationError::OutputJson {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(io_error)
}

pub fn write_failure_report<P: AsRef<Path>>(
    path: P,
    failures: &[RecordFailure],
) -> Result<(), MigrationError> {
    let path = path.as_ref();
    let csv_error = |source| MigrationError::Csv {
        path: path.to_path_buf(),
        source,
    };

    // Header is written by hand so an empty report still has one.
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(csv_error)?;
    wtr.write_record(FAILURE_REPORT_HEADER).map_err(csv_error)?;
    for failure in failures {
        wtr.serialize(failure).map_err(csv_error)?;
    }

    wtr.flush().map_err(|source| MigrationError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{FixedClock, SequenceIdGenerator};
    use crate::migration::{migrate_bookings, MigrationOptions};
    use crate::records::read_json;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn migrated() -> crate::migration::MigrationOutput {
        let records = read_json("test-inputs/test.orders.json").unwrap();
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
        migrate_bookings(
            &records,
            &MigrationOptions::default(),
            &mut SequenceIdGenerator::default(),
            &clock,
        )
        .unwrap()
    }

    #[test]
    fn booking_renders_wrapped_ids_and_dates() {
        let output = migrated();
        let json = to_extended_json(&output.bookings).unwrap();
        let booking = &json[0];

        assert_eq!(booking["_id"], json!({ "$oid": "000000000000000000000002" }));
        assert_eq!(booking["bookingId"], json!("WEDIUM001"));
        assert_eq!(booking["otp"], json!(4821));
        assert_eq!(booking["uid"], json!("000000000000000000000001"));
        assert_eq!(booking["__v"], json!(0));
        assert_eq!(
            booking["products"][0]["productId"],
            json!({ "$oid": "65e0a1b2c3d4e5f6012345a1" })
        );
        assert_eq!(booking["products"][0]["price"], json!(15000));
        assert_eq!(booking["vendor"]["phoneNumber"], json!("919900011122"));

        let created = booking["createdAt"]["$date"].as_str().unwrap();
        assert!(created.starts_with("2024-03-10T08:15:00"), "{created}");
        let booked = booking["bookingDate"]["$date"].as_str().unwrap();
        assert!(booked.starts_with("2024-03-15T00:00:00"), "{booked}");
    }

    #[test]
    fn booking_keys_keep_field_order() {
        let output = migrated();
        let json = to_extended_json(&output.bookings).unwrap();
        let keys: Vec<&str> = json[0]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();

        assert_eq!(
            keys,
            [
                "_id",
                "bookingId",
                "otp",
                "uid",
                "firstName",
                "lastName",
                "bookingTime",
                "bookingDate",
                "products",
                "address",
                "status",
                "bookingAmount",
                "otpGeneratedAt",
                "createdAt",
                "updatedAt",
                "__v",
                "vendor"
            ]
        );
    }

    #[test]
    fn profile_phone_is_a_number() {
        let output = migrated();
        let json = to_extended_json(&output.profiles).unwrap();

        assert_eq!(json.as_array().unwrap().len(), 3);
        assert_eq!(json[0]["phoneNumber"], json!(919876543210_i64));
        assert_eq!(json[0]["status"], json!("active"));
        assert_eq!(json[1]["fullName"], json!("Madonna NA"));
    }

    #[test]
    fn written_file_is_indented_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("products.json");
        let output = migrated();

        write_documents(&path, &output.bookings).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n  {\n    \"_id\""));
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 4);
    }

    #[test]
    fn failure_report_is_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.csv");
        let failures = vec![
            RecordFailure {
                index: 1,
                legacy_id: Some("65f0a1b2c3d4e5f601234502".to_string()),
                reason: "record #1: name is empty".to_string(),
            },
            RecordFailure {
                index: 3,
                legacy_id: None,
                reason: "bad date".to_string(),
            },
        ];

        write_failure_report(&path, &failures).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "index,legacy_id,reason\n\
             1,65f0a1b2c3d4e5f601234502,record #1: name is empty\n\
             3,,bad date\n"
        );
    }

    #[test]
    fn empty_failure_report_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("failures.csv");

        write_failure_report(&path, &[]).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "index,legacy_id,reason\n");
    }

    #[test]
    fn unwritable_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("products.json");

        let err = write_documents(&path, &migrated().bookings).unwrap_err();
        assert!(matches!(err, MigrationError::Io { .. }));
    }
}
