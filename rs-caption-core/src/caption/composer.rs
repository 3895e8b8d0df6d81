use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use log::{debug, trace};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::caption::attribute::Attributes;
use crate::caption::choices::{Choices, WRITER_KEY, choose, resolve_index};
use crate::caption::config::ComposerSettings;
use crate::caption::template::{Template, is_permutation, normalize, scan_tokens};
use crate::caption::variant::{Variant, VariantContext};
use crate::caption::writer::Writer;
use crate::error::{Error, Result};

/// Pure rewrite applied to the selected template before anything is resolved.
pub type Modifier = dyn Fn(&str) -> String + Send + Sync;

/// Turns a set of attributes into one sentence.
///
/// # Responsibilities
/// - Select a template (`structure`) and reorder its groups (`groups`)
/// - Write every attribute with one of its writers (`writers`)
/// - Expand the remaining tokens from the phrasing variants (`variants`)
///   until no token is left, then normalize whitespace
///
/// Every random decision goes through a [`Choices`] record: a recorded index
/// is reused, a missing one is sampled from the supplied generator and
/// written back.
///
/// # Invariants
/// - Templates are parsed at construction time
/// - Configuration is immutable; a composer can be reused for any number of calls
/// - Each expansion round must shrink the set of unresolved tokens; variants
///   that keep re-introducing themselves fail with
///   `Error::NonTerminatingTemplate` once `max_iterations` is reached
#[derive(Clone)]
pub struct Composer {
	structures: Vec<Template>,
	writers: BTreeMap<String, Vec<Writer>>,
	variants: BTreeMap<String, Vec<Variant>>,
	modifiers: Vec<Arc<Modifier>>,
	settings: ComposerSettings,
}

impl Composer {
	/// Creates a composer from its templates and per-attribute writers.
	///
	/// # Errors
	/// - `Error::MalformedTemplate` if one template has unbalanced delimiters
	/// - `Error::EmptyOptions` if no template is given
	pub fn new<I, S>(templates: I, writers: BTreeMap<String, Vec<Writer>>) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let structures = templates
			.into_iter()
			.map(|source| Template::parse(source.as_ref()))
			.collect::<Result<Vec<_>>>()?;
		if structures.is_empty() {
			return Err(Error::EmptyOptions { site: "structure".to_owned() });
		}

		Ok(Self {
			structures,
			writers,
			variants: BTreeMap::new(),
			modifiers: Vec::new(),
			settings: ComposerSettings::default(),
		})
	}

	/// Registers the candidates of a `{name}` phrasing variant.
	pub fn with_variant<I, V>(mut self, name: impl Into<String>, options: I) -> Self
	where
		I: IntoIterator<Item = V>,
		V: Into<Variant>,
	{
		self.variants.insert(name.into(), options.into_iter().map(Into::into).collect());
		self
	}

	/// Appends a template rewrite, run in registration order.
	pub fn with_modifier<F>(mut self, modifier: F) -> Self
	where
		F: Fn(&str) -> String + Send + Sync + 'static,
	{
		self.modifiers.push(Arc::new(modifier));
		self
	}

	pub fn with_settings(mut self, settings: ComposerSettings) -> Self {
		self.settings = settings;
		self
	}

	pub fn settings(&self) -> &ComposerSettings {
		&self.settings
	}

	pub fn structures(&self) -> &[Template] {
		&self.structures
	}

	/// Composes a sentence using the thread-local generator for the
	/// decisions `choices` does not hold.
	pub fn compose(&self, attributes: &Attributes, choices: Option<Choices>) -> Result<(String, Choices)> {
		self.compose_with_rng(attributes, choices, &mut rand::rng())
	}

	/// Composes a sentence, drawing missing decisions from `rng`.
	///
	/// Returns the sentence and the completed choice record. Composing again
	/// with that record yields the same sentence and the same record.
	pub fn compose_with_rng<R: Rng + ?Sized>(
		&self,
		attributes: &Attributes,
		choices: Option<Choices>,
		rng: &mut R,
	) -> Result<(String, Choices)> {
		let mut choices = choices.unwrap_or_default();

		let structure = resolve_index(choices.structure, self.structures.len(), "structure", rng)?;
		choices.structure = Some(structure);
		debug!("using structure {structure}");

		let template = self.apply_modifiers(&self.structures[structure])?;

		let order = Self::group_order(&template, choices.groups.take(), rng)?;
		let text = template.permute(&order)?;
		debug!("group order {order:?}");
		choices.groups = Some(order);

		let resolved = self.write_attributes(attributes, &mut choices, rng)?;
		let text = self.resolve_tokens(text, &resolved, &mut choices.variants, rng)?;

		Ok((normalize(&text), choices))
	}

	fn apply_modifiers<'a>(&self, template: &'a Template) -> Result<Cow<'a, Template>> {
		if self.modifiers.is_empty() {
			return Ok(Cow::Borrowed(template));
		}
		let source = self
			.modifiers
			.iter()
			.fold(template.source().to_owned(), |source, modifier| modifier(&source));
		Ok(Cow::Owned(Template::parse(&source)?))
	}

	/// Recorded group order, or a uniform random permutation.
	fn group_order<R: Rng + ?Sized>(template: &Template, recorded: Option<Vec<usize>>, rng: &mut R) -> Result<Vec<usize>> {
		let count = template.groups().len();
		match recorded {
			Some(order) if is_permutation(&order, count) => Ok(order),
			Some(order) => Err(Error::InvalidPermutation { expected: count, found: order }),
			None => {
				let mut order: Vec<usize> = (0..count).collect();
				order.shuffle(rng);
				Ok(order)
			}
		}
	}

	/// Writes every attribute of the input with one of its writers.
	fn write_attributes<R: Rng + ?Sized>(
		&self,
		attributes: &Attributes,
		choices: &mut Choices,
		rng: &mut R,
	) -> Result<BTreeMap<String, String>> {
		let mut resolved = BTreeMap::new();
		for (name, value) in attributes {
			let writers = self.writers.get(name).ok_or_else(|| Error::MissingBinding(name.clone()))?;
			let writer_choices = choices.writers.entry(name.clone()).or_default();
			let site = format!("writers.{name}");
			let index = choose(writer_choices, WRITER_KEY, writers.len(), &site, rng)?;
			let writer = &writers[index];
			let text = writer.write_with_rng(value, writer_choices, rng)?;
			debug!("{name}: {} writer #{index} -> {text:?}", writer.kind());
			resolved.insert(name.clone(), text);
		}
		Ok(resolved)
	}

	/// Expands tokens until a scan finds none.
	///
	/// Each round resolves every token of the current text at once: attribute
	/// tokens take their written text, other tokens a variant candidate.
	/// Computed candidates see the attribute tokens right before and after
	/// them in the current text, after group permutation.
	fn resolve_tokens<R: Rng + ?Sized>(
		&self,
		mut text: String,
		resolved: &BTreeMap<String, String>,
		variant_choices: &mut BTreeMap<String, usize>,
		rng: &mut R,
	) -> Result<String> {
		let attribute = |name: &str| resolved.contains_key(name);

		for iteration in 0..self.settings.max_iterations {
			let tokens = scan_tokens(&text)?;
			if tokens.is_empty() {
				return Ok(text);
			}
			trace!("round {iteration}: {} tokens in {text:?}", tokens.len());

			let mut output = String::with_capacity(text.len());
			let mut cursor = 0;
			for (k, token) in tokens.iter().enumerate() {
				let replacement = match resolved.get(&token.name) {
					Some(written) => written.clone(),
					None => {
						let options = self
							.variants
							.get(&token.name)
							.ok_or_else(|| Error::MissingBinding(token.name.clone()))?;
						let site = format!("variants.{}", token.name);
						let index = choose(variant_choices, &token.name, options.len(), &site, rng)?;

						let prev = k.checked_sub(1).map(|i| tokens[i].name.as_str()).filter(|name| attribute(name));
						let next = tokens.get(k + 1).map(|t| t.name.as_str()).filter(|name| attribute(name));
						options[index].render(&VariantContext::new(resolved, prev, next))
					}
				};
				output.push_str(&text[cursor..token.start]);
				output.push_str(&replacement);
				cursor = token.end;
			}
			output.push_str(&text[cursor..]);
			text = output;
		}

		let remaining: Vec<String> = scan_tokens(&text)?.into_iter().map(|t| t.name).collect();
		if remaining.is_empty() {
			Ok(text)
		} else {
			Err(Error::NonTerminatingTemplate { iterations: self.settings.max_iterations, remaining })
		}
	}
}

impl fmt::Debug for Composer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Composer")
			.field("structures", &self.structures)
			.field("writers", &self.writers)
			.field("variants", &self.variants)
			.field("modifiers", &self.modifiers.len())
			.field("settings", &self.settings)
			.finish()
	}
}
