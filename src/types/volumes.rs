//! Wire shape of the Google Books `volumes` search response.
//!
//! Only the fields the book list is built from are modelled; everything else
//! in the payload is ignored. Text fields read with [`scalar_string`] also
//! take numbers and booleans, which are kept as their JSON spelling.

use std::fmt;

use serde::{
    de::{self, Visitor},
    Deserialize, Deserializer,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Volumes {
    pub items: Vec<Volume>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub volume_info: VolumeInfo,
    pub search_info: Option<SearchInfo>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeInfo {
    #[serde(deserialize_with = "scalar_string")]
    pub title:        String,
    #[serde(default, deserialize_with = "scalar_strings")]
    pub authors:      Option<Vec<String>>,
    #[serde(deserialize_with = "scalar_string")]
    pub preview_link: String,
    pub image_links:  Option<ImageLinks>,
    pub description:  Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageLinks {
    pub small_thumbnail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchInfo {
    pub text_snippet: Option<String>,
}

struct ScalarVisitor;

impl<'de> Visitor<'de> for ScalarVisitor {
    type Value = String;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a string, number or boolean")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
        Ok(v.to_owned())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
        Ok(v)
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
        Ok(v.to_string())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
        Ok(v.to_string())
    }
}

/// A JSON scalar as text. `null`, arrays and objects are rejected.
pub fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    deserializer.deserialize_any(ScalarVisitor)
}

#[derive(Deserialize)]
struct Scalar(#[serde(deserialize_with = "scalar_string")] String);

fn scalar_strings<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    let list = Option::<Vec<Scalar>>::deserialize(deserializer)?;
    Ok(list.map(|items| items.into_iter().map(|Scalar(s)| s).collect()))
}
