//! Serialize `Array1<f64>` curves as plain JSON lists.
//!
//! Use with `#[serde(with = "crate::array_serde")]`.

use ndarray::Array1;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(array: &Array1<f64>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_seq(array.iter())
}

pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<Array1<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<f64>::deserialize(deserializer).map(Array1::from_vec)
}
