use bson::{oid::ObjectId, Bson};
use serde::Deserialize;
use serde_json::Value;
use std::{fs::File, io::BufReader, path::Path};

use crate::error::{MigrationError, RecordRef};

/// `{"$oid": "..."}` as exported by the legacy database.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct WrappedId {
    #[serde(rename = "$oid")]
    pub oid: String,
}

impl WrappedId {
    pub fn to_object_id(&self) -> Result<ObjectId, bson::oid::Error> {
        ObjectId::parse_str(&self.oid)
    }
}

/// `{"$date": "..."}` as exported by the legacy database.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct WrappedDate {
    #[serde(rename = "$date")]
    pub date: String,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ServiceData {
    #[serde(rename = "_id")]
    pub id: WrappedId,
    pub name: Bson,
    pub price: Bson,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CityData {
    pub city: Bson,
    pub state: Bson,
}

#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct VendorData {
    #[serde(rename = "_id")]
    pub id: WrappedId,
    pub name: Bson,
    pub phone: String,
}

/// A booking document in the old schema.
///
/// Fields copied verbatim into the new documents (`otp`, `bookingTime`,
/// `orderStatus`, `address`, `cityData`, service and vendor names, price)
/// keep whatever BSON type the export gave them, `null` included. They must
/// still be present. The optional profile fields default to `""` only when
/// the key is absent; an explicit `null` is kept.
#[derive(Debug, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LegacyBooking {
    #[serde(rename = "_id", default)]
    pub id: Option<WrappedId>,
    pub name: String,
    pub phone: String,
    pub otp: Bson,
    pub booking_time: Bson,
    pub order_date: String,
    #[serde(rename = "ServiceData")]
    pub service_data: ServiceData,
    pub address: Bson,
    pub city_data: CityData,
    pub order_status: Bson,
    pub created_at: WrappedDate,
    pub updated_at: WrappedDate,
    pub vendor_data: VendorData,
    #[serde(default = "empty_string")]
    pub email: Bson,
    #[serde(default = "empty_string")]
    pub profile_image: Bson,
    #[serde(default = "empty_string")]
    pub cover_image: Bson,
    #[serde(default = "empty_string")]
    pub fcm_token: Bson,
}

fn empty_string() -> Bson {
    Bson::String(String::new())
}

impl LegacyBooking {
    /// Decodes the `index`-th element of the input array.
    pub fn from_value(index: usize, value: &Value) -> Result<Self, MigrationError> {
        LegacyBooking::deserialize(value).map_err(|source| MigrationError::MalformedRecord {
            record: RecordRef::new(index, legacy_id(value)),
            source,
        })
    }
}

/// Best-effort `_id` of a raw legacy document, used to label errors.
pub fn legacy_id(value: &Value) -> Option<String> {
    match value.get("_id")? {
        Value::String(id) => Some(id.clone()),
        wrapped => wrapped.get("$oid")?.as_str().map(str::to_owned),
    }
}

/// Loads the whole legacy export into memory.
pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Vec<Value>, MigrationError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| MigrationError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| MigrationError::InputJson {
        path: path.to_path_buf(),
        source,
    })
}
