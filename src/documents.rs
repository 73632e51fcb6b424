//! Documents of the new schema. Field order matches what downstream
//! consumers of the first migration already read.

use bson::{oid::ObjectId, Bson, DateTime};
use serde::Serialize;

use crate::normalize::PersonName;
use crate::records::LegacyBooking;

#[derive(Debug, Serialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum ProfileStatus {
    Active,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub uid: String,
    pub full_name: String,
    pub email: Bson,
    pub phone_number: i64,
    pub profile_image: Bson,
    pub cover_image: Bson,
    pub fcm_token: Bson,
    pub status: ProfileStatus,
    pub updated_at: DateTime,
}

impl Profile {
    /// Builds the profile for the first booking seen with a given phone number.
    pub fn from_booking(
        id: ObjectId,
        name: &PersonName,
        phone_number: i64,
        booking: &LegacyBooking,
        updated_at: DateTime,
    ) -> Self {
        Self {
            id,
            uid: id.to_hex(),
            full_name: name.full_name(),
            email: booking.email.clone(),
            phone_number,
            profile_image: booking.profile_image.clone(),
            cover_image: booking.cover_image.clone(),
            fcm_token: booking.fcm_token.clone(),
            status: ProfileStatus::Active,
            updated_at,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProductLine {
    pub product_id: ObjectId,
    pub name: Bson,
    pub price: Bson,
    pub quantity: i32,
    pub discount: i32,
    pub discount_percentage: i32,
    #[serde(rename = "_id")]
    pub id: ObjectId,
}

impl ProductLine {
    /// One unit of the booked service, no discount.
    pub fn single(id: ObjectId, product_id: ObjectId, name: &Bson, price: &Bson) -> Self {
        Self {
            product_id,
            name: name.clone(),
            price: price.clone(),
            quantity: 1,
            discount: 0,
            discount_percentage: 0,
            id,
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub street: Bson,
    pub city: Bson,
    pub state: Bson,
    pub district: String,
    pub postal_code: String,
    pub country: String,
    pub phone_number: String,
    pub optional_phone_number: String,
}

impl Address {
    pub fn from_booking(name: &PersonName, phone_number: &str, booking: &LegacyBooking) -> Self {
        Self {
            first_name: name.first.clone(),
            last_name: name.last.clone(),
            street: booking.address.clone(),
            city: booking.city_data.city.clone(),
            state: booking.city_data.state.clone(),
            district: "NA".to_string(),
            postal_code: "0".to_string(),
            country: "IN".to_string(),
            phone_number: phone_number.to_string(),
            optional_phone_number: phone_number.to_string(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct BookingAmount {
    pub total_product_price: Bson,
    pub coupon_discount: i32,
    pub final_amount: Bson,
    pub original_total_price: Bson,
}

impl BookingAmount {
    /// No coupon: every total equals the single product's price.
    pub fn from_price(price: &Bson) -> Self {
        Self {
            total_product_price: price.clone(),
            coupon_discount: 0,
            final_amount: price.clone(),
            original_total_price: price.clone(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub vendor_id: ObjectId,
    pub full_name: Bson,
    pub phone_number: String,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub booking_id: String,
    pub otp: Bson,
    pub uid: String,
    pub first_name: String,
    pub last_name: String,
    pub booking_time: Bson,
    pub booking_date: DateTime,
    pub products: Vec<ProductLine>,
    pub address: Address,
    pub status: Bson,
    pub booking_amount: BookingAmount,
    pub otp_generated_at: DateTime,
    pub created_at: DateTime,
    pub updated_at: DateTime,
    #[serde(rename = "__v")]
    pub version: i32,
    pub vendor: Vendor,
}

/// Human-readable booking code: `prefix` followed by a counter padded to
/// three digits. Larger counters simply grow (`WEDIUM1000`).
pub fn booking_code(prefix: &str, sequence: usize) -> String {
    format!("{prefix}{sequence:03}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequenceIdGenerator;
    use crate::normalize::split_name;
    use crate::records::read_json;

    fn first_booking() -> LegacyBooking {
        let records = read_json("test-inputs/test.orders.json").unwrap();
        LegacyBooking::from_value(0, &records[0]).unwrap()
    }

    #[test]
    fn booking_codes_are_zero_padded() {
        assert_eq!(booking_code("WEDIUM", 1), "WEDIUM001");
        assert_eq!(booking_code("WEDIUM", 42), "WEDIUM042");
        assert_eq!(booking_code("WEDIUM", 999), "WEDIUM999");
        assert_eq!(booking_code("WEDIUM", 1000), "WEDIUM1000");
    }

    #[test]
    fn profile_defaults_missing_optional_fields() {
        let booking = first_booking();
        let name = split_name(&booking.name).unwrap();
        let id = SequenceIdGenerator::nth(7);
        let at = DateTime::from_millis(1_717_243_200_000);

        let profile = Profile::from_booking(id, &name, 919876543210, &booking, at);

        assert_eq!(profile.uid, "000000000000000000000007");
        assert_eq!(profile.full_name, "Jane Doe");
        assert_eq!(profile.email.as_str(), Some("jane@example.com"));
        assert_eq!(profile.profile_image.as_str(), Some(""));
        assert_eq!(profile.cover_image.as_str(), Some(""));
        assert_eq!(profile.fcm_token.as_str(), Some(""));
        assert_eq!(profile.status, ProfileStatus::Active);
        assert_eq!(profile.updated_at, at);
    }

    #[test]
    fn profile_serializes_in_legacy_field_order() {
        let booking = first_booking();
        let name = split_name(&booking.name).unwrap();
        let profile = Profile::from_booking(
            SequenceIdGenerator::nth(1),
            &name,
            919876543210,
            &booking,
            DateTime::from_millis(0),
        );

        let doc = bson::to_document(&profile).unwrap();
        let keys: Vec<&str> = doc.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "_id",
                "uid",
                "fullName",
                "email",
                "phoneNumber",
                "profileImage",
                "coverImage",
                "fcmToken",
                "status",
                "updatedAt"
            ]
        );
        assert_eq!(doc.get_str("status").unwrap(), "active");
        assert_eq!(doc.get_i64("phoneNumber").unwrap(), 919876543210);
        assert_eq!(doc.get_object_id("_id").unwrap(), SequenceIdGenerator::nth(1));
    }

    #[test]
    fn amount_mirrors_price() {
        let amount = BookingAmount::from_price(&Bson::Double(8999.5));
        assert_eq!(amount.total_product_price, Bson::Double(8999.5));
        assert_eq!(amount.final_amount, Bson::Double(8999.5));
        assert_eq!(amount.original_total_price, Bson::Double(8999.5));
        assert_eq!(amount.coupon_discount, 0);
    }

    #[test]
    fn address_uses_fixed_placeholders() {
        let booking = first_booking();
        let name = split_name(&booking.name).unwrap();
        let address = Address::from_booking(&name, "919876543210", &booking);

        assert_eq!(address.street.as_str(), Some("12 MG Road"));
        assert_eq!(address.city.as_str(), Some("Bengaluru"));
        assert_eq!(address.state.as_str(), Some("Karnataka"));
        assert_eq!(address.district, "NA");
        assert_eq!(address.postal_code, "0");
        assert_eq!(address.country, "IN");
        assert_eq!(address.phone_number, "919876543210");
        assert_eq!(address.optional_phone_number, "919876543210");
    }

    #[test]
    fn null_state_and_email_stay_null() {
        let mut booking = first_booking();
        booking.city_data.state = Bson::Null;
        booking.email = Bson::Null;
        let name = split_name(&booking.name).unwrap();

        let address = Address::from_booking(&name, "919876543210", &booking);
        let profile = Profile::from_booking(
            SequenceIdGenerator::nth(1),
            &name,
            919876543210,
            &booking,
            DateTime::from_millis(0),
        );

        let address = bson::to_document(&address).unwrap();
        assert_eq!(address.get("state"), Some(&Bson::Null));
        assert_eq!(address.get_str("city").unwrap(), "Bengaluru");
        let profile = bson::to_document(&profile).unwrap();
        assert_eq!(profile.get("email"), Some(&Bson::Null));
        assert_eq!(profile.get_str("coverImage").unwrap(), "");
    }
}
