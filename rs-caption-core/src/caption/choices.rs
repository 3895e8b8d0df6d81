use std::collections::BTreeMap;

use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Key under which the composer records which writer of an attribute was used.
pub const WRITER_KEY: &str = "_writer";

/// Key under which a writer records which synonym of a label was used.
pub const VALUE_KEY: &str = "val";

/// Sub-decisions of a single writer call, keyed by decision site.
///
/// Holds `_writer`, `val` and one entry per writer variant.
pub type WriterChoices = BTreeMap<String, usize>;

/// Replayable log of every random decision taken by one composition.
///
/// A present entry is reused as is; a missing one is sampled and written back.
/// Once fully populated, composing with the same attributes produces the same
/// sentence byte for byte.
///
/// Serialized layout:
/// `{ "structure": 0, "groups": [1, 0], "writers": { "size": { "_writer": 0, "val": 1 } }, "variants": { "start": 2 } }`
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Choices {
	/// Index of the selected template.
	#[serde(default)]
	pub structure: Option<usize>,

	/// Group order: position `i` receives the content of group `groups[i]`.
	#[serde(default)]
	pub groups: Option<Vec<usize>>,

	/// Per-attribute writer decisions.
	#[serde(default)]
	pub writers: BTreeMap<String, WriterChoices>,

	/// Per-variant pick, shared by every occurrence of the variant.
	#[serde(default)]
	pub variants: BTreeMap<String, usize>,
}

impl Choices {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parses a choice record from its JSON form.
	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Pretty JSON form of the record.
	pub fn to_json(&self) -> Result<String> {
		Ok(serde_json::to_string_pretty(self)?)
	}
}

/// An ordered batch of choice records, one per generated caption.
///
/// Stored compactly with `postcard` so a whole dataset of captions can be
/// regenerated from its attributes.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChoiceLog {
	records: Vec<Choices>,
}

impl ChoiceLog {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, choices: Choices) {
		self.records.push(choices);
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = &Choices> {
		self.records.iter()
	}

	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_stdvec(self)?)
	}

	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		Ok(postcard::from_bytes(bytes)?)
	}
}

impl FromIterator<Choices> for ChoiceLog {
	fn from_iter<I: IntoIterator<Item = Choices>>(iter: I) -> Self {
		Self { records: iter.into_iter().collect() }
	}
}

/// Resolves one decision site.
///
/// Returns the recorded index when there is one, otherwise draws uniformly
/// from `[0, len)`.
///
/// # Errors
/// - `Error::EmptyOptions` if `len == 0`
/// - `Error::InvalidChoice` if the recorded index is `>= len`
pub(crate) fn resolve_index<R: Rng + ?Sized>(
	recorded: Option<usize>,
	len: usize,
	site: &str,
	rng: &mut R,
) -> Result<usize> {
	if len == 0 {
		return Err(Error::EmptyOptions { site: site.to_owned() });
	}
	match recorded {
		Some(index) if index < len => Ok(index),
		Some(index) => Err(Error::InvalidChoice { site: site.to_owned(), index, len }),
		None => {
			let index = rng.random_range(0..len);
			trace!("sampled {index} of {len} at {site}");
			Ok(index)
		}
	}
}

/// Resolves a decision kept under `key` in `choices`, recording the result.
pub(crate) fn choose<R: Rng + ?Sized>(
	choices: &mut BTreeMap<String, usize>,
	key: &str,
	len: usize,
	site: &str,
	rng: &mut R,
) -> Result<usize> {
	let index = resolve_index(choices.get(key).copied(), len, site, rng)?;
	choices.insert(key.to_owned(), index);
	Ok(index)
}
