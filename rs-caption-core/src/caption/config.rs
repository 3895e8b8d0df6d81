use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::caption::composer::Composer;
use crate::caption::writer::Writer;
use crate::error::Result;
use crate::io;

fn default_max_iterations() -> usize {
	64
}

/// Tunables of a [`Composer`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ComposerSettings {
	/// Upper bound on token expansion rounds before failing with
	/// `Error::NonTerminatingTemplate`.
	#[serde(default = "default_max_iterations")]
	pub max_iterations: usize,
}

impl Default for ComposerSettings {
	fn default() -> Self {
		Self { max_iterations: default_max_iterations() }
	}
}

/// Declarative description of a composer, loadable from JSON.
///
/// Only literal variants can be declared here; computed variants and template
/// modifiers are added in code on the built [`Composer`].
///
/// ```json
/// {
///   "templates": ["{start} {size} {shape}."],
///   "writers": { "size": [{ "type": "bins", "bins": [10, 30], "labels": ["small", "medium", "big"] }] },
///   "variants": { "start": ["A", "One"] }
/// }
/// ```
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CaptionConfig {
	pub templates: Vec<String>,
	pub writers: BTreeMap<String, Vec<Writer>>,
	#[serde(default)]
	pub variants: BTreeMap<String, Vec<String>>,
	#[serde(default)]
	pub settings: ComposerSettings,
}

impl CaptionConfig {
	/// Reads a JSON configuration file.
	pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
		let contents = io::read_to_string(path)?;
		Self::from_json(&contents)
	}

	pub fn from_json(json: &str) -> Result<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Builds the composer described by this configuration.
	///
	/// # Errors
	/// Same as [`Composer::new`].
	pub fn build(self) -> Result<Composer> {
		let mut composer = Composer::new(&self.templates, self.writers)?.with_settings(self.settings);
		for (name, options) in self.variants {
			composer = composer.with_variant(name, options);
		}
		Ok(composer)
	}
}

impl Composer {
	/// Same as [`CaptionConfig::build`].
	pub fn from_config(config: CaptionConfig) -> Result<Self> {
		config.build()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::caption::attribute::{AttributeValue, Attributes};
	use crate::caption::choices::Choices;

	const CONFIG: &str = r#"{
		"templates": ["{start} {size} {shape}."],
		"writers": {
			"size": [{ "type": "bins", "bins": [10, 30], "labels": ["small", "medium", "big"] }],
			"shape": [{ "type": "options", "options": { "2": ["triangle"] } }]
		},
		"variants": { "start": ["A", "One"] }
	}"#;

	#[test]
	fn settings_default_when_omitted() {
		let config = CaptionConfig::from_json(CONFIG).unwrap();
		assert_eq!(config.settings, ComposerSettings::default());
		assert_eq!(config.settings.max_iterations, 64);

		let settings: ComposerSettings = serde_json::from_str("{}").unwrap();
		assert_eq!(settings.max_iterations, 64);
	}

	#[test]
	fn config_builds_a_working_composer() {
		let composer = Composer::from_config(CaptionConfig::from_json(CONFIG).unwrap()).unwrap();
		let attributes = Attributes::from([
			("size".to_owned(), AttributeValue::from(40)),
			("shape".to_owned(), AttributeValue::from(2)),
		]);
		let choices = Choices { variants: BTreeMap::from([("start".to_owned(), 1)]), ..Choices::default() };
		let (text, _) = composer.compose(&attributes, Some(choices)).unwrap();
		assert_eq!(text, "One big triangle.");
	}

	#[test]
	fn malformed_template_in_config_fails_to_build() {
		let mut config = CaptionConfig::from_json(CONFIG).unwrap();
		config.templates.push("<{size}".to_owned());
		assert!(config.build().is_err());
	}
}
