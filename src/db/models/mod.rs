use bigdecimal::BigDecimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::str::FromStr;

use crate::error::Error;

/// Stores a closed enum as `TEXT`, with `Display`/`FromStr` and the Postgres
/// encode/decode impls derived from one table of wire values.
///
/// The first literal of each variant is canonical; the rest are accepted
/// aliases on input only.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text $(| $alias)* => Ok($name::$variant),)+
                    other => Err(format!(
                        "unknown value {:?}, expected one of: {}",
                        other,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }

        impl sqlx::Type<sqlx::Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                sqlx::postgres::PgTypeInfo::with_name("text")
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
            }
        }

        impl sqlx::Encode<'_, sqlx::Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> Result<sqlx::encode::IsNull, Box<dyn std::error::Error + Send + Sync + 'static>> {
                <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
            }
        }

        impl<'r> sqlx::Decode<'r, sqlx::Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, Box<dyn std::error::Error + Send + Sync + 'static>> {
                let text = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
                text.parse::<$name>().map_err(Into::into)
            }
        }
    };
}

pub mod account_models;
pub mod alarm_models;
pub mod attendance_models;
pub mod report_models;

/// Parse a raw enum value from client input, naming the field on failure
pub fn parse_choice<T: FromStr<Err = String>>(field: &str, raw: &str) -> Result<T, Error> {
    raw.parse::<T>().map_err(|message| Error::invalid(field, message))
}

/// Accept a coordinate sent either as a JSON string or a JSON number
pub(crate) fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(text) => Ok(text),
        serde_json::Value::Number(number) => Ok(number.to_string()),
        other => Err(D::Error::custom(format!("expected a decimal, got {}", other))),
    }
}

/// Decimal places kept for coordinates (NUMERIC(9,6))
pub const COORDINATE_SCALE: i64 = 6;
const COORDINATE_DIGITS: u64 = 9;

/// Validate a latitude/longitude pair supplied as text
///
/// Rejects more than six fractional digits or nine total digits, and values
/// outside ±90 / ±180. Returned values are normalised to scale 6.
pub fn parse_coordinates(latitude: &str, longitude: &str) -> Result<(BigDecimal, BigDecimal), Error> {
    let latitude = parse_coordinate("latitude", latitude, 90)?;
    let longitude = parse_coordinate("longitude", longitude, 180)?;
    Ok((latitude, longitude))
}

fn parse_coordinate(field: &str, raw: &str, bound: i32) -> Result<BigDecimal, Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::invalid(field, "this field is required"));
    }

    let value = BigDecimal::from_str(raw)
        .map_err(|_| Error::invalid(field, format!("{:?} is not a decimal number", raw)))?;

    let (_, scale) = value.as_bigint_and_exponent();
    if scale > COORDINATE_SCALE {
        return Err(Error::invalid(
            field,
            format!("ensure that there are no more than {} decimal places", COORDINATE_SCALE),
        ));
    }

    let value = value.with_scale(COORDINATE_SCALE);
    if value.digits() > COORDINATE_DIGITS {
        return Err(Error::invalid(
            field,
            format!("ensure that there are no more than {} digits in total", COORDINATE_DIGITS),
        ));
    }

    if value.abs() > BigDecimal::from(bound) {
        return Err(Error::invalid(
            field,
            format!("must be between -{} and {}", bound, bound),
        ));
    }

    Ok(value)
}

/// Trim optional free text, enforcing a character limit
pub fn bounded_text(field: &str, raw: Option<&str>, max_chars: usize) -> Result<String, Error> {
    let text = raw.unwrap_or_default().trim().to_string();
    if text.chars().count() > max_chars {
        return Err(Error::invalid(
            field,
            format!("ensure this field has no more than {} characters", max_chars),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::attendance_models::ValidationStatus;
    use crate::db::models::report_models::ReportStatus;

    #[test]
    fn coordinates_are_normalised_to_six_places() {
        let (lat, lon) = parse_coordinates("-6.2", "106.816666").unwrap();
        assert_eq!(lat.to_string(), "-6.200000");
        assert_eq!(lon.to_string(), "106.816666");
    }

    #[test]
    fn coordinates_out_of_range_name_their_field() {
        let err = parse_coordinates("91", "10").unwrap_err();
        assert_eq!(err.field(), Some("latitude"));

        let err = parse_coordinates("10", "-180.5").unwrap_err();
        assert_eq!(err.field(), Some("longitude"));
    }

    #[test]
    fn coordinates_reject_excess_precision_and_garbage() {
        assert_eq!(
            parse_coordinates("-6.1234567", "106").unwrap_err().field(),
            Some("latitude")
        );
        assert_eq!(
            parse_coordinates("-6.1", "east").unwrap_err().field(),
            Some("longitude")
        );
        assert_eq!(parse_coordinates("", "1").unwrap_err().field(), Some("latitude"));
    }

    #[test]
    fn choices_accept_canonical_values_and_aliases() {
        assert_eq!(
            parse_choice::<ValidationStatus>("status", "out_of_area").unwrap(),
            ValidationStatus::OutOfArea
        );
        assert_eq!(
            parse_choice::<ValidationStatus>("status", "Tidak_Hadir").unwrap(),
            ValidationStatus::Absent
        );
        assert_eq!(
            parse_choice::<ReportStatus>("status", "ditanggapi").unwrap(),
            ReportStatus::InProgress
        );
        let err = parse_choice::<ReportStatus>("status", "closed").unwrap_err();
        assert_eq!(err.field(), Some("status"));
    }

    #[test]
    fn bounded_text_enforces_limit() {
        assert_eq!(bounded_text("note", Some("  gate 3 "), 10).unwrap(), "gate 3");
        assert_eq!(bounded_text("note", None, 10).unwrap(), "");
        assert!(bounded_text("note", Some("abcdefghijk"), 10).is_err());
    }
}
