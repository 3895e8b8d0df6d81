use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Raw value of one entity attribute, as supplied per composition call.
///
/// Writers read the shape they need: a category key, one scalar, or a tuple
/// unpacked into its scalars.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(untagged)]
pub enum AttributeValue {
	Number(f64),
	Tuple(Vec<f64>),
	Text(String),
}

/// Attributes of one entity, keyed by attribute name.
pub type Attributes = BTreeMap<String, AttributeValue>;

impl AttributeValue {
	/// Key used to address an options table.
	///
	/// Numbers use their display form, so `2.0` addresses key `"2"`.
	pub fn as_key(&self) -> Option<String> {
		match self {
			AttributeValue::Text(s) => Some(s.clone()),
			AttributeValue::Number(n) => Some(n.to_string()),
			AttributeValue::Tuple(_) => None,
		}
	}

	/// The value unpacked into scalars.
	pub fn scalars(&self) -> Option<&[f64]> {
		match self {
			AttributeValue::Number(n) => Some(std::slice::from_ref(n)),
			AttributeValue::Tuple(values) => Some(values),
			AttributeValue::Text(_) => None,
		}
	}
}

impl From<f64> for AttributeValue {
	fn from(value: f64) -> Self {
		AttributeValue::Number(value)
	}
}

impl From<i32> for AttributeValue {
	fn from(value: i32) -> Self {
		AttributeValue::Number(value.into())
	}
}

impl From<&str> for AttributeValue {
	fn from(value: &str) -> Self {
		AttributeValue::Text(value.to_owned())
	}
}

impl From<String> for AttributeValue {
	fn from(value: String) -> Self {
		AttributeValue::Text(value)
	}
}

impl From<Vec<f64>> for AttributeValue {
	fn from(values: Vec<f64>) -> Self {
		AttributeValue::Tuple(values)
	}
}

impl<const N: usize> From<[f64; N]> for AttributeValue {
	fn from(values: [f64; N]) -> Self {
		AttributeValue::Tuple(values.to_vec())
	}
}

impl From<(f64, f64)> for AttributeValue {
	fn from((a, b): (f64, f64)) -> Self {
		AttributeValue::Tuple(vec![a, b])
	}
}

impl From<(f64, f64, f64)> for AttributeValue {
	fn from((a, b, c): (f64, f64, f64)) -> Self {
		AttributeValue::Tuple(vec![a, b, c])
	}
}
