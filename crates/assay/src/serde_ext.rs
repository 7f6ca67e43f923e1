//! Serde helpers for float fields that may be NaN or infinite.
//!
//! JSON has no encoding for non-finite numbers, so they are written as the
//! strings `"NaN"`, `"inf"` and `"-inf"` and read back from the same strings.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserializer, Serializer};

fn sentinel(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("inf")
    } else if value == f64::NEG_INFINITY {
        Some("-inf")
    } else {
        None
    }
}

fn parse_sentinel(text: &str) -> Option<f64> {
    match text {
        "NaN" | "nan" => Some(f64::NAN),
        "inf" | "Infinity" => Some(f64::INFINITY),
        "-inf" | "-Infinity" => Some(f64::NEG_INFINITY),
        _ => None,
    }
}

struct FloatVisitor;

impl Visitor<'_> for FloatVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number or one of \"NaN\", \"inf\", \"-inf\"")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        parse_sentinel(v).ok_or_else(|| E::invalid_value(de::Unexpected::Str(v), &self))
    }

    fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
        Ok(f64::NAN)
    }
}

/// `#[serde(with = "nan_sentinel")]` for `f64` fields.
pub mod nan_sentinel {
    use super::*;

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        match sentinel(*value) {
            Some(text) => serializer.serialize_str(text),
            None => serializer.serialize_f64(*value),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(FloatVisitor)
    }
}

/// `#[serde(with = "nan_sentinel_map")]` for string-keyed maps of `f64`.
pub mod nan_sentinel_map {
    use indexmap::IndexMap;
    use serde::de::MapAccess;
    use serde::ser::SerializeMap;

    use super::*;

    struct Wrapped(f64);

    impl<'de> serde::Deserialize<'de> for Wrapped {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(FloatVisitor).map(Wrapped)
        }
    }

    pub fn serialize<S: Serializer>(
        map: &IndexMap<String, f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut out = serializer.serialize_map(Some(map.len()))?;
        for (key, value) in map {
            match sentinel(*value) {
                Some(text) => out.serialize_entry(key, text)?,
                None => out.serialize_entry(key, value)?,
            }
        }
        out.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<IndexMap<String, f64>, D::Error> {
        struct MapVisitor;

        impl<'de> Visitor<'de> for MapVisitor {
            type Value = IndexMap<String, f64>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of numbers")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = IndexMap::new();
                while let Some((key, Wrapped(value))) = access.next_entry::<String, Wrapped>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(MapVisitor)
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "super::nan_sentinel")]
        value: f64,
        #[serde(with = "super::nan_sentinel_map")]
        map: IndexMap<String, f64>,
    }

    #[test]
    fn test_non_finite_round_trip() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), f64::INFINITY);
        map.insert("b".to_string(), 0.5);
        let sample = Sample {
            value: f64::NAN,
            map,
        };

        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, r#"{"value":"NaN","map":{"a":"inf","b":0.5}}"#);

        let back: Sample = serde_json::from_str(&json).unwrap();
        assert!(back.value.is_nan());
        assert_eq!(back.map["a"], f64::INFINITY);
        assert_eq!(back.map["b"], 0.5);
    }

    #[test]
    fn test_finite_values_stay_numbers() {
        let sample = Sample {
            value: -2.25,
            map: IndexMap::new(),
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, r#"{"value":-2.25,"map":{}}"#);
    }
}
