//! Serde helpers for numeric fields that language models emit either as
//! integers or as integral floats (`5` or `5.0`).

use serde::de::Error;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberInput {
    Integer(i64),
    Float(f64),
}

fn read_whole<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberInput::deserialize(deserializer)? {
        NumberInput::Integer(value) => Ok(value),
        NumberInput::Float(value) if value.is_finite() && value.fract() == 0.0 => {
            Ok(value as i64)
        }
        NumberInput::Float(value) => Err(D::Error::custom(format!(
            "expected a whole number, found {value}"
        ))),
    }
}

pub mod signed {
    use serde::de::Error;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(value: &i32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_i32(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = super::read_whole(deserializer)?;
        i32::try_from(value).map_err(D::Error::custom)
    }
}

pub mod unsigned {
    use serde::de::Error;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(value: &u32, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = super::read_whole(deserializer)?;
        u32::try_from(value)
            .map_err(|_| D::Error::custom(format!("expected a non-negative number, found {value}")))
    }
}
