use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Context handed to a computed variant.
///
/// Gives access to the writer-resolved attribute texts and to the names of the
/// attribute tokens directly around the token being resolved.
#[derive(Clone, Copy, Debug)]
pub struct VariantContext<'a> {
	attributes: &'a BTreeMap<String, String>,
	prev: Option<&'a str>,
	next: Option<&'a str>,
}

impl<'a> VariantContext<'a> {
	pub(crate) fn new(attributes: &'a BTreeMap<String, String>, prev: Option<&'a str>, next: Option<&'a str>) -> Self {
		Self { attributes, prev, next }
	}

	/// Resolved text of an attribute.
	pub fn get(&self, name: &str) -> Option<&'a str> {
		self.attributes.get(name).map(String::as_str)
	}

	/// Name of the preceding token, when it is a resolved attribute.
	pub fn prev(&self) -> Option<&'a str> {
		self.prev
	}

	/// Name of the following token, when it is a resolved attribute.
	pub fn next(&self) -> Option<&'a str> {
		self.next
	}

	/// Resolved text of the preceding attribute token.
	pub fn prev_text(&self) -> Option<&'a str> {
		self.prev.and_then(|name| self.get(name))
	}

	/// Resolved text of the following attribute token.
	pub fn next_text(&self) -> Option<&'a str> {
		self.next.and_then(|name| self.get(name))
	}

	pub fn attributes(&self) -> &'a BTreeMap<String, String> {
		self.attributes
	}
}

/// Phrasing computed from the surrounding attributes.
pub type ComputeFn = dyn Fn(&VariantContext<'_>) -> String + Send + Sync;

/// One candidate replacement for a variant token.
#[derive(Clone)]
pub enum Variant {
	Literal(String),
	Computed(Arc<ComputeFn>),
}

impl Variant {
	pub fn literal(text: impl Into<String>) -> Self {
		Variant::Literal(text.into())
	}

	pub fn computed<F>(f: F) -> Self
	where
		F: Fn(&VariantContext<'_>) -> String + Send + Sync + 'static,
	{
		Variant::Computed(Arc::new(f))
	}

	pub(crate) fn render(&self, context: &VariantContext<'_>) -> String {
		match self {
			Variant::Literal(text) => text.clone(),
			Variant::Computed(f) => f(context),
		}
	}
}

impl fmt::Debug for Variant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Variant::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
			Variant::Computed(_) => f.write_str("Computed(..)"),
		}
	}
}

impl From<&str> for Variant {
	fn from(text: &str) -> Self {
		Variant::literal(text)
	}
}

impl From<String> for Variant {
	fn from(text: String) -> Self {
		Variant::Literal(text)
	}
}

/// Builds the usual `a`/`an` agreement variant.
///
/// `phrase` holds an `{n?}` marker that becomes `n` when the next attribute
/// text starts with a vowel and disappears otherwise.
pub fn article_agreement(phrase: impl Into<String>) -> Variant {
	let phrase = phrase.into();
	Variant::computed(move |context| {
		let vowel = context
			.next_text()
			.and_then(|text| text.chars().next())
			.is_some_and(|c| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u'));
		phrase.replace("{n?}", if vowel { "n" } else { "" })
	})
}
