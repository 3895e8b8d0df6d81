use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{Error, Result};

/// A `{name}` placeholder found in a template.
///
/// Offsets are byte offsets into the scanned text: `start` points at the
/// opening brace, `end` one past the closing brace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
	pub start: usize,
	pub end: usize,
	pub name: String,
}

/// A `<...>` span whose position may be swapped with its sibling groups.
///
/// `content` keeps the delimiters, so `content == source[start..end]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
	pub start: usize,
	pub end: usize,
	pub content: String,
}

impl Group {
	/// Group content without its `<` and `>` delimiters.
	pub fn inner(&self) -> &str {
		&self.content[1..self.content.len() - 1]
	}
}

/// A parsed sentence skeleton.
///
/// # Grammar
/// - literal text
/// - `{name}`: attribute or variant token
/// - `<...>`: reorderable group, may hold literal text and tokens
///
/// Groups do not nest and tokens cannot hold delimiters. There is no escape
/// for literal brackets.
///
/// # Invariants
/// - `groups` and `tokens` are sorted by offset and never overlap
/// - every token inside a group is also listed in `tokens`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
	source: String,
	groups: Vec<Group>,
	tokens: Vec<Token>,
}

impl Template {
	/// Parses a template in one left-to-right pass.
	///
	/// # Errors
	/// `Error::MalformedTemplate` on a closing delimiter without opener, an
	/// opener left unterminated, a nested group, or an empty `{}`.
	pub fn parse(source: &str) -> Result<Self> {
		let malformed = |position: usize, reason: &'static str| Error::MalformedTemplate {
			template: source.to_owned(),
			position,
			reason,
		};

		let mut groups = Vec::new();
		let mut tokens = Vec::new();
		let mut token_start: Option<usize> = None;
		let mut group_start: Option<usize> = None;

		for (i, c) in source.char_indices() {
			match c {
				'{' => {
					if token_start.is_some() {
						return Err(malformed(i, "'{' inside a token"));
					}
					token_start = Some(i);
				}
				'}' => {
					let start = token_start.take().ok_or_else(|| malformed(i, "'}' without matching '{'"))?;
					let name = &source[start + 1..i];
					if name.is_empty() {
						return Err(malformed(start, "empty token"));
					}
					tokens.push(Token { start, end: i + 1, name: name.to_owned() });
				}
				'<' => {
					if token_start.is_some() {
						return Err(malformed(i, "'<' inside a token"));
					}
					if group_start.is_some() {
						return Err(malformed(i, "groups cannot be nested"));
					}
					group_start = Some(i);
				}
				'>' => {
					if token_start.is_some() {
						return Err(malformed(i, "'>' inside a token"));
					}
					let start = group_start.take().ok_or_else(|| malformed(i, "'>' without matching '<'"))?;
					groups.push(Group { start, end: i + 1, content: source[start..=i].to_owned() });
				}
				_ => {}
			}
		}

		if let Some(start) = token_start {
			return Err(malformed(start, "unterminated token"));
		}
		if let Some(start) = group_start {
			return Err(malformed(start, "unterminated group"));
		}

		Ok(Self { source: source.to_owned(), groups, tokens })
	}

	pub fn source(&self) -> &str {
		&self.source
	}

	pub fn groups(&self) -> &[Group] {
		&self.groups
	}

	pub fn tokens(&self) -> &[Token] {
		&self.tokens
	}

	/// Rewrites the template with its groups reordered.
	///
	/// The group at original position `i` is replaced by the de-bracketed
	/// content of group `order[i]`. Text outside groups is kept as is.
	///
	/// # Errors
	/// `Error::InvalidPermutation` if `order` is not a bijection on
	/// `[0, groups.len())`.
	pub fn permute(&self, order: &[usize]) -> Result<String> {
		if !is_permutation(order, self.groups.len()) {
			return Err(Error::InvalidPermutation { expected: self.groups.len(), found: order.to_vec() });
		}

		let mut output = String::with_capacity(self.source.len());
		let mut cursor = 0;
		for (group, &source_index) in self.groups.iter().zip(order) {
			output.push_str(&self.source[cursor..group.start]);
			output.push_str(self.groups[source_index].inner());
			cursor = group.end;
		}
		output.push_str(&self.source[cursor..]);
		Ok(output)
	}
}

/// Returns `true` if `order` holds each index of `[0, len)` exactly once.
pub(crate) fn is_permutation(order: &[usize], len: usize) -> bool {
	if order.len() != len {
		return false;
	}
	let mut seen = vec![false; len];
	for &i in order {
		if i >= len || seen[i] {
			return false;
		}
		seen[i] = true;
	}
	true
}

/// `{name}` placeholder: any run of characters other than braces.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("token pattern is valid"));

/// Lists the `{name}` tokens of already expanded text.
///
/// Only braces are significant here: group brackets have been consumed by the
/// permutation step, so `<` and `>` are plain text.
///
/// # Errors
/// `Error::MalformedTemplate` if a brace is left outside every token
/// (stray `}`, unterminated `{`, nested or empty braces).
pub fn scan_tokens(text: &str) -> Result<Vec<Token>> {
	let stray = |offset: usize, gap: &str| {
		gap.find(['{', '}']).map(|i| Error::MalformedTemplate {
			template: text.to_owned(),
			position: offset + i,
			reason: match &gap[i..] {
				rest if rest.starts_with('}') => "'}' without matching '{'",
				rest if rest.starts_with("{}") => "empty token",
				_ => "unterminated token",
			},
		})
	};

	let mut tokens = Vec::new();
	let mut cursor = 0;
	for captures in TOKEN.captures_iter(text) {
		let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
			continue;
		};
		if let Some(err) = stray(cursor, &text[cursor..whole.start()]) {
			return Err(err);
		}
		tokens.push(Token { start: whole.start(), end: whole.end(), name: name.as_str().to_owned() });
		cursor = whole.end();
	}
	match stray(cursor, &text[cursor..]) {
		Some(err) => Err(err),
		None => Ok(tokens),
	}
}

/// Replaces each `{name}` for which `lookup` has a value.
///
/// Unknown placeholders and stray braces are copied through unchanged.
pub(crate) fn fill_placeholders<'a, F>(text: &str, lookup: F) -> String
where
	F: Fn(&str) -> Option<&'a str>,
{
	TOKEN
		.replace_all(text, |captures: &Captures<'_>| match lookup(&captures[1]) {
			Some(value) => value.to_owned(),
			None => captures[0].to_owned(),
		})
		.into_owned()
}

/// Collapses whitespace runs, trims both ends and drops the space left in
/// front of a period when a token expanded to nothing.
pub fn normalize(text: &str) -> String {
	let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
	collapsed.replace(" .", ".")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_tokens_and_groups_in_order() {
		let template = Template::parse("{start} <{located} {location}>, <{rotation}>.").unwrap();

		let names: Vec<_> = template.tokens().iter().map(|t| t.name.as_str()).collect();
		assert_eq!(names, ["start", "located", "location", "rotation"]);

		let groups: Vec<_> = template.groups().iter().map(|g| g.content.as_str()).collect();
		assert_eq!(groups, ["<{located} {location}>", "<{rotation}>"]);
		assert_eq!(template.groups()[1].inner(), "{rotation}");
		assert_eq!(&template.source()[template.groups()[0].start..template.groups()[0].end], "<{located} {location}>");
	}

	#[test]
	fn plain_text_has_nothing_to_parse() {
		let template = Template::parse("just words.").unwrap();
		assert!(template.tokens().is_empty());
		assert!(template.groups().is_empty());
	}

	#[test]
	fn rejects_unbalanced_delimiters() {
		for source in ["{start", "start}", "<a", "a>", "<{a>}", "{a<b}", "<<a>>", "{{a}}", "{}"] {
			let err = Template::parse(source).unwrap_err();
			assert!(matches!(err, Error::MalformedTemplate { .. }), "{source} should be malformed");
		}
	}

	#[test]
	fn reports_position_of_stray_closer() {
		match Template::parse("ab}") {
			Err(Error::MalformedTemplate { position, .. }) => assert_eq!(position, 2),
			other => panic!("unexpected {other:?}"),
		}
	}

	#[test]
	fn identity_permutation_only_strips_brackets() {
		let template = Template::parse("x <a> y <b> z").unwrap();
		assert_eq!(template.permute(&[0, 1]).unwrap(), "x a y b z");
		assert_eq!(template.permute(&[1, 0]).unwrap(), "x b y a z");
	}

	#[test]
	fn permutation_must_be_a_bijection() {
		let template = Template::parse("<a> <b> <c>").unwrap();
		for order in [vec![0, 1], vec![0, 0, 1], vec![0, 1, 3], vec![]] {
			assert!(matches!(template.permute(&order), Err(Error::InvalidPermutation { .. })));
		}
		assert_eq!(template.permute(&[2, 0, 1]).unwrap(), "c a b");
	}

	#[test]
	fn scanning_ignores_angle_brackets() {
		let tokens = scan_tokens("a < b {x} > {n?}").unwrap();
		let names: Vec<_> = tokens.iter().map(|t| t.name.as_str()).collect();
		assert_eq!(names, ["x", "n?"]);
		assert_eq!((tokens[0].start, tokens[0].end), (6, 9));
	}

	#[test]
	fn fill_replaces_known_placeholders_only() {
		let lookup = |name: &str| match name {
			"val" => Some("blue"),
			"tone" => Some("dark"),
			_ => None,
		};
		assert_eq!(fill_placeholders("{tone} {val} {shape}", lookup), "dark blue {shape}");
		assert_eq!(fill_placeholders("{{val}", lookup), "{blue");
		assert_eq!(fill_placeholders("a } b {", lookup), "a } b {");
		assert_eq!(fill_placeholders("", lookup), "");
	}

	#[test]
	fn scanning_rejects_stray_braces() {
		let cases = [
			("a } {b}", 2, "'}' without matching '{'"),
			("{b} c {", 6, "unterminated token"),
			("x {}", 2, "empty token"),
			("{{x}}", 0, "unterminated token"),
			("{a{b}", 0, "unterminated token"),
		];
		for (text, position, reason) in cases {
			match scan_tokens(text) {
				Err(Error::MalformedTemplate { position: found, reason: why, .. }) => {
					assert_eq!((found, why), (position, reason), "{text}");
				}
				other => panic!("{text}: unexpected {other:?}"),
			}
		}
	}

	#[test]
	fn normalization_cleans_token_gaps() {
		assert_eq!(normalize("  A  small\t triangle ,  located  ."), "A small triangle , located.");
		assert_eq!(normalize("rotated  ."), "rotated.");
		assert_eq!(normalize(""), "");
	}

	#[test]
	fn normalization_is_idempotent() {
		for text in ["a  b .", " . . x", "A small blue triangle.", "x\n\n y ."] {
			let once = normalize(text);
			assert_eq!(normalize(&once), once);
		}
	}
}
