//! Attribute-to-caption text generation library.
//!
//! This crate turns structured entity attributes (categories, scalars, 2-D
//! quantities, angles) into natural-language sentences:
//! - Sentence templates with reorderable groups
//! - Writers quantizing raw values into labels
//! - Phrasing variants, including context-dependent ones (`a` / `an`)
//! - Replayable choice records making every random decision reproducible
//!
//! ```
//! use std::collections::BTreeMap;
//! use rs_caption_core::{Attributes, AttributeValue, BinsWriter, Composer, OptionsWriter, Writer};
//!
//! let writers: BTreeMap<String, Vec<Writer>> = BTreeMap::from([
//! 	("shape".to_owned(), vec![OptionsWriter::new().with_option("2", ["triangle"]).into()]),
//! 	("size".to_owned(), vec![BinsWriter::new(vec![10.0, 30.0], ["small", "medium", "big"]).into()]),
//! ]);
//! let composer = Composer::new(["{start} {size} {shape}."], writers)?.with_variant("start", ["A"]);
//!
//! let attributes = Attributes::from([
//! 	("shape".to_owned(), AttributeValue::from(2)),
//! 	("size".to_owned(), AttributeValue::from(20)),
//! ]);
//! let (text, choices) = composer.compose(&attributes, None)?;
//! assert_eq!(text, "A medium triangle.");
//! assert_eq!(composer.compose(&attributes, Some(choices.clone()))?, (text, choices));
//! # Ok::<(), rs_caption_core::Error>(())
//! ```

/// Caption templates, writers, variants, choices and the composer.
pub mod caption;

/// Crate-wide error type.
pub mod error;

/// File helpers (template lists, choice records).
pub mod io;

pub use caption::attribute::{AttributeValue, Attributes};
pub use caption::choices::{ChoiceLog, Choices, WriterChoices};
pub use caption::composer::Composer;
pub use caption::config::{CaptionConfig, ComposerSettings};
pub use caption::template::Template;
pub use caption::variant::{Variant, VariantContext, article_agreement};
pub use caption::writer::{
	Bins2dWriter, BinsWriter, ContinuousAngleWriter, Label, Norm, OptionsWriter, QuantizedWriter, Writer,
};
pub use error::{Error, Result};
