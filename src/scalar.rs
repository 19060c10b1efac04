//! Lenient decoding of matrix values.
//!
//! Hand-written configurations sometimes spell device identifiers or build
//! profiles as bare numbers or booleans. Matrix values are plain strings, so
//! any scalar is accepted and stored as its textual form.

use std::fmt;

use serde::{
    Deserializer,
    de::{self, SeqAccess, Visitor},
};

struct ScalarVisitor;

impl<'de,> Visitor<'de,> for ScalarVisitor
{
    type Value = String;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        formatter.write_str("a string, number, or boolean",)
    }

    fn visit_str<E: de::Error,>(self, value: &str,) -> Result<String, E,>
    {
        Ok(value.to_owned(),)
    }

    fn visit_string<E: de::Error,>(self, value: String,) -> Result<String, E,>
    {
        Ok(value,)
    }

    fn visit_bool<E: de::Error,>(self, value: bool,) -> Result<String, E,>
    {
        Ok(value.to_string(),)
    }

    fn visit_i64<E: de::Error,>(self, value: i64,) -> Result<String, E,>
    {
        Ok(value.to_string(),)
    }

    fn visit_u64<E: de::Error,>(self, value: u64,) -> Result<String, E,>
    {
        Ok(value.to_string(),)
    }

    fn visit_f64<E: de::Error,>(self, value: f64,) -> Result<String, E,>
    {
        Ok(serde_json::Number::from_f64(value,)
            .map_or_else(|| value.to_string(), |number| number.to_string(),),)
    }
}

struct ScalarSeqVisitor;

impl<'de,> Visitor<'de,> for ScalarSeqVisitor
{
    type Value = Vec<String,>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        formatter.write_str("a sequence of strings, numbers, or booleans",)
    }

    fn visit_seq<A,>(self, mut seq: A,) -> Result<Vec<String,>, A::Error,>
    where
        A: SeqAccess<'de,>,
    {
        let mut values = Vec::with_capacity(seq.size_hint().unwrap_or(0,),);
        while let Some(Scalar(value,),) = seq.next_element::<Scalar,>()? {
            values.push(value,);
        }
        Ok(values,)
    }
}

struct Scalar(String,);

impl<'de,> serde::Deserialize<'de,> for Scalar
{
    fn deserialize<D,>(deserializer: D,) -> Result<Self, D::Error,>
    where
        D: Deserializer<'de,>,
    {
        deserialize_scalar(deserializer,).map(Scalar,)
    }
}

/// Decodes a single scalar into its textual form.
pub(crate) fn deserialize_scalar<'de, D,>(deserializer: D,) -> Result<String, D::Error,>
where
    D: Deserializer<'de,>,
{
    deserializer.deserialize_any(ScalarVisitor,)
}

/// Decodes a sequence of scalars into their textual forms.
pub(crate) fn deserialize_scalars<'de, D,>(deserializer: D,) -> Result<Vec<String,>, D::Error,>
where
    D: Deserializer<'de,>,
{
    deserializer.deserialize_seq(ScalarSeqVisitor,)
}
