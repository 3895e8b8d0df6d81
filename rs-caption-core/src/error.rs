/// Errors raised while building or running a caption composer.
///
/// Every failure is reported synchronously to the caller. Nothing is retried
/// internally and there is no partial result: a composition either returns a
/// sentence or one of these errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// Unbalanced or overlapping `{}` / `<>` delimiters.
	#[error("malformed template {template:?} at byte {position}: {reason}")]
	MalformedTemplate {
		template: String,
		position: usize,
		reason: &'static str,
	},

	/// A `{token}` is neither a written attribute nor a configured variant.
	#[error("token {{{0}}} has no attribute writer and no variant")]
	MissingBinding(String),

	/// `OptionsWriter` table has no entry for the given key.
	#[error("no options registered for key {key:?}")]
	KeyNotFound { key: String },

	/// A quantization index has no label entry.
	#[error("quantized index {index} has no label (table holds {len})")]
	OutOfRange { index: usize, len: usize },

	/// The fixed-point expansion did not converge within the configured bound.
	#[error("template still has unresolved tokens after {iterations} iterations: {remaining:?}")]
	NonTerminatingTemplate {
		iterations: usize,
		remaining: Vec<String>,
	},

	/// A recorded index does not address the options available at its site.
	#[error("recorded choice {index} at {site} is out of bounds ({len} options)")]
	InvalidChoice {
		site: String,
		index: usize,
		len: usize,
	},

	/// A recorded group order is not a permutation of the template groups.
	#[error("recorded group order {found:?} is not a permutation of {expected} groups")]
	InvalidPermutation { expected: usize, found: Vec<usize> },

	/// A writer variant uses a key reserved for writer decisions.
	#[error("writer variant name {0:?} is reserved")]
	ReservedName(String),

	/// A decision site has nothing to choose from.
	#[error("no options to choose from at {site}")]
	EmptyOptions { site: String },

	/// The attribute value does not have the shape the writer reads.
	#[error("{writer} expects {expected}")]
	ValueMismatch {
		writer: &'static str,
		expected: &'static str,
	},

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Binary(#[from] postcard::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_name_the_failing_site() {
		let err = Error::InvalidChoice { site: "variants.start".to_owned(), index: 4, len: 2 };
		assert_eq!(err.to_string(), "recorded choice 4 at variants.start is out of bounds (2 options)");

		let err = Error::MissingBinding("size".to_owned());
		assert_eq!(err.to_string(), "token {size} has no attribute writer and no variant");
	}

	#[test]
	fn io_errors_convert() {
		let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
		let err: Error = io.into();
		assert!(matches!(err, Error::Io(_)));
	}
}
