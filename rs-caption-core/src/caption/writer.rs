use std::collections::BTreeMap;
use std::f64::consts::TAU;
use std::num::NonZeroU32;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::caption::attribute::AttributeValue;
use crate::caption::choices::{VALUE_KEY, WRITER_KEY, WriterChoices, choose};
use crate::caption::template::fill_placeholders;
use crate::error::{Error, Result};

const DEFAULT_CAPTION: &str = "{val}";
const DEFAULT_SAMPLING: NonZeroU32 = NonZeroU32::new(5).unwrap();

/// Label text registered for one quantized value: a single string, or
/// synonyms of which one is picked under the `val` key.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(untagged)]
pub enum Label {
	One(String),
	Many(Vec<String>),
}

impl Label {
	fn choose<R: Rng + ?Sized>(&self, choices: &mut WriterChoices, rng: &mut R) -> Result<&str> {
		match self {
			Label::One(text) => {
				choices.insert(VALUE_KEY.to_owned(), 0);
				Ok(text)
			}
			Label::Many(synonyms) => {
				let index = choose(choices, VALUE_KEY, synonyms.len(), VALUE_KEY, rng)?;
				Ok(&synonyms[index])
			}
		}
	}
}

impl From<&str> for Label {
	fn from(text: &str) -> Self {
		Label::One(text.to_owned())
	}
}

impl From<String> for Label {
	fn from(text: String) -> Self {
		Label::One(text)
	}
}

impl From<Vec<&str>> for Label {
	fn from(synonyms: Vec<&str>) -> Self {
		Label::Many(synonyms.into_iter().map(str::to_owned).collect())
	}
}

impl<const N: usize> From<[&str; N]> for Label {
	fn from(synonyms: [&str; N]) -> Self {
		Label::Many(synonyms.iter().map(|s| (*s).to_owned()).collect())
	}
}

/// Caption wrapped around a label, plus the writer's own phrasing variants.
///
/// The caption may reference `{val}` (the resolved label) and any variant key.
/// Placeholders that are neither stay in the text for the composer to resolve.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct Phrasing {
	#[serde(default)]
	caption: Option<String>,
	#[serde(default)]
	variants: BTreeMap<String, Vec<String>>,
}

impl Phrasing {
	/// Picks every writer variant, then formats the label and the caption.
	///
	/// # Errors
	/// `Error::ReservedName` if a variant is named `val` or `_writer`: those
	/// keys already hold the synonym and writer picks in `WriterChoices`.
	fn render<R: Rng + ?Sized>(&self, label: &str, choices: &mut WriterChoices, rng: &mut R) -> Result<String> {
		let mut picked: BTreeMap<&str, &str> = BTreeMap::new();
		for (key, options) in &self.variants {
			if key == VALUE_KEY || key == WRITER_KEY {
				return Err(Error::ReservedName(key.clone()));
			}
			let index = choose(choices, key, options.len(), key, rng)?;
			picked.insert(key, &options[index]);
		}

		let val = fill_placeholders(label, |name| picked.get(name).copied());
		let caption = self.caption.as_deref().unwrap_or(DEFAULT_CAPTION);
		Ok(fill_placeholders(caption, |name| {
			if name == VALUE_KEY { Some(val.as_str()) } else { picked.get(name).copied() }
		}))
	}
}

/// L1 or L2 distance used by [`QuantizedWriter`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
	L1,
	#[default]
	L2,
}

impl Norm {
	/// Distance up to a monotonic transform (L2 skips the square root).
	fn distance(self, a: &[f64], b: &[f64]) -> f64 {
		match self {
			Norm::L1 => a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum(),
			Norm::L2 => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
		}
	}
}

/// Discrete key → list of labels.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct OptionsWriter {
	options: BTreeMap<String, Vec<String>>,
	#[serde(flatten)]
	phrasing: Phrasing,
}

impl OptionsWriter {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers the labels describing `key`.
	pub fn with_option<K, I, S>(mut self, key: K, labels: I) -> Self
	where
		K: Into<String>,
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.options.insert(key.into(), labels.into_iter().map(Into::into).collect());
		self
	}

	fn write_with_rng<R: Rng + ?Sized>(&self, value: &AttributeValue, choices: &mut WriterChoices, rng: &mut R) -> Result<String> {
		let key = value.as_key().ok_or(Error::ValueMismatch { writer: "OptionsWriter", expected: "a category key" })?;
		let labels = self.options.get(&key).ok_or(Error::KeyNotFound { key })?;
		let index = choose(choices, VALUE_KEY, labels.len(), VALUE_KEY, rng)?;
		self.phrasing.render(&labels[index], choices, rng)
	}
}

/// Nearest-codeword quantization of a fixed-length numeric vector.
///
/// Ties go to the first codeword reaching the minimum distance.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct QuantizedWriter {
	codebook: Vec<Vec<f64>>,
	labels: Vec<Label>,
	#[serde(default)]
	norm: Norm,
	#[serde(flatten)]
	phrasing: Phrasing,
}

impl QuantizedWriter {
	/// `labels[i]` describes `codebook[i]`.
	pub fn new<L: Into<Label>>(codebook: Vec<Vec<f64>>, labels: impl IntoIterator<Item = L>) -> Self {
		Self {
			codebook,
			labels: labels.into_iter().map(Into::into).collect(),
			norm: Norm::default(),
			phrasing: Phrasing::default(),
		}
	}

	pub fn with_norm(mut self, norm: Norm) -> Self {
		self.norm = norm;
		self
	}

	/// Index of the closest codeword.
	pub fn nearest(&self, point: &[f64]) -> Result<usize> {
		if point.iter().any(|x| !x.is_finite()) {
			return Err(Error::ValueMismatch { writer: "QuantizedWriter", expected: "finite values" });
		}

		let mut best: Option<(usize, f64)> = None;
		for (index, codeword) in self.codebook.iter().enumerate() {
			if codeword.len() != point.len() {
				return Err(Error::ValueMismatch {
					writer: "QuantizedWriter",
					expected: "a value with the codebook dimension",
				});
			}
			let distance = self.norm.distance(codeword, point);
			match best {
				Some((_, min)) if distance >= min => {}
				_ => best = Some((index, distance)),
			}
		}

		best.map(|(index, _)| index).ok_or_else(|| Error::EmptyOptions { site: "codebook".to_owned() })
	}

	fn write_with_rng<R: Rng + ?Sized>(&self, value: &AttributeValue, choices: &mut WriterChoices, rng: &mut R) -> Result<String> {
		let point = value.scalars().ok_or(Error::ValueMismatch { writer: "QuantizedWriter", expected: "numbers" })?;
		let index = self.nearest(point)?;
		let label = self.labels.get(index).ok_or(Error::OutOfRange { index, len: self.labels.len() })?;
		let text = label.choose(choices, rng)?;
		self.phrasing.render(text, choices, rng)
	}
}

/// Index of the half-open bin `[t(i-1), t(i))` holding `value`.
///
/// `thresholds` must be sorted ascending; `len(thresholds) + 1` bins exist.
fn digitize(value: f64, thresholds: &[f64]) -> usize {
	thresholds.partition_point(|t| *t <= value)
}

fn finite_scalar(value: f64, writer: &'static str) -> Result<f64> {
	if value.is_finite() { Ok(value) } else { Err(Error::ValueMismatch { writer, expected: "a finite number" }) }
}

/// Scalar bucketed against sorted thresholds.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct BinsWriter {
	bins: Vec<f64>,
	labels: Vec<Label>,
	#[serde(flatten)]
	phrasing: Phrasing,
}

impl BinsWriter {
	/// `labels[i]` describes bin `i`; `bins` must be sorted ascending.
	pub fn new<L: Into<Label>>(bins: Vec<f64>, labels: impl IntoIterator<Item = L>) -> Self {
		Self { bins, labels: labels.into_iter().map(Into::into).collect(), phrasing: Phrasing::default() }
	}

	pub fn bucket(&self, value: f64) -> usize {
		digitize(value, &self.bins)
	}

	fn write_with_rng<R: Rng + ?Sized>(&self, value: &AttributeValue, choices: &mut WriterChoices, rng: &mut R) -> Result<String> {
		let value = match value.scalars() {
			Some(&[x]) => finite_scalar(x, "BinsWriter")?,
			_ => return Err(Error::ValueMismatch { writer: "BinsWriter", expected: "one number" }),
		};
		let index = self.bucket(value);
		let label = self.labels.get(index).ok_or(Error::OutOfRange { index, len: self.labels.len() })?;
		let text = label.choose(choices, rng)?;
		self.phrasing.render(text, choices, rng)
	}
}

/// Two scalars, each bucketed on its own axis, into a label grid.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Bins2dWriter {
	bins: [Vec<f64>; 2],
	labels: Vec<Vec<Label>>,
	#[serde(flatten)]
	phrasing: Phrasing,
}

impl Bins2dWriter {
	/// `labels[i][j]` describes bin `i` of the first axis and bin `j` of the second.
	pub fn new<L: Into<Label>>(bins: [Vec<f64>; 2], labels: Vec<Vec<L>>) -> Self {
		Self {
			bins,
			labels: labels.into_iter().map(|row| row.into_iter().map(Into::into).collect()).collect(),
			phrasing: Phrasing::default(),
		}
	}

	pub fn bucket(&self, x: f64, y: f64) -> (usize, usize) {
		(digitize(x, &self.bins[0]), digitize(y, &self.bins[1]))
	}

	fn write_with_rng<R: Rng + ?Sized>(&self, value: &AttributeValue, choices: &mut WriterChoices, rng: &mut R) -> Result<String> {
		let (x, y) = match value.scalars() {
			Some(&[x, y]) => (finite_scalar(x, "Bins2dWriter")?, finite_scalar(y, "Bins2dWriter")?),
			_ => return Err(Error::ValueMismatch { writer: "Bins2dWriter", expected: "two numbers" }),
		};
		let (i, j) = self.bucket(x, y);
		let row = self.labels.get(i).ok_or(Error::OutOfRange { index: i, len: self.labels.len() })?;
		let label = row.get(j).ok_or(Error::OutOfRange { index: j, len: row.len() })?;
		let text = label.choose(choices, rng)?;
		self.phrasing.render(text, choices, rng)
	}
}

fn default_sampling() -> NonZeroU32 {
	DEFAULT_SAMPLING
}

/// Angle in radians written as a whole number of degrees.
///
/// The angle is wrapped into `[0, 2π)`, converted to degrees, rounded to the
/// nearest multiple of `sampling` (ties to even) and taken modulo 360.
/// Outputs are multiples of `sampling` whenever it divides 360.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ContinuousAngleWriter {
	#[serde(default = "default_sampling")]
	sampling: NonZeroU32,
	#[serde(flatten)]
	phrasing: Phrasing,
}

impl Default for ContinuousAngleWriter {
	fn default() -> Self {
		Self { sampling: DEFAULT_SAMPLING, phrasing: Phrasing::default() }
	}
}

impl ContinuousAngleWriter {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_sampling(mut self, sampling: NonZeroU32) -> Self {
		self.sampling = sampling;
		self
	}

	pub fn degrees(&self, angle: f64) -> Result<u32> {
		let angle = finite_scalar(angle, "ContinuousAngleWriter")?;
		let step = f64::from(self.sampling.get());
		let degrees = angle.rem_euclid(TAU).to_degrees();
		let rounded = (degrees / step).round_ties_even() * step;
		Ok((rounded as i64).rem_euclid(360) as u32)
	}

	fn write_with_rng<R: Rng + ?Sized>(&self, value: &AttributeValue, choices: &mut WriterChoices, rng: &mut R) -> Result<String> {
		let angle = match value.scalars() {
			Some(&[angle]) => angle,
			_ => return Err(Error::ValueMismatch { writer: "ContinuousAngleWriter", expected: "one angle in radians" }),
		};
		let degrees = self.degrees(angle)?;
		self.phrasing.render(&degrees.to_string(), choices, rng)
	}
}

/// Converter from a raw attribute value to label text.
///
/// Writers hold immutable configuration only; all per-call decisions go
/// through the `WriterChoices` map handed to them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Writer {
	Options(OptionsWriter),
	Quantized(QuantizedWriter),
	Bins(BinsWriter),
	Bins2d(Bins2dWriter),
	ContinuousAngle(ContinuousAngleWriter),
}

impl Writer {
	pub fn kind(&self) -> &'static str {
		match self {
			Writer::Options(_) => "options",
			Writer::Quantized(_) => "quantized",
			Writer::Bins(_) => "bins",
			Writer::Bins2d(_) => "bins2d",
			Writer::ContinuousAngle(_) => "continuous_angle",
		}
	}

	fn phrasing_mut(&mut self) -> &mut Phrasing {
		match self {
			Writer::Options(w) => &mut w.phrasing,
			Writer::Quantized(w) => &mut w.phrasing,
			Writer::Bins(w) => &mut w.phrasing,
			Writer::Bins2d(w) => &mut w.phrasing,
			Writer::ContinuousAngle(w) => &mut w.phrasing,
		}
	}

	/// Caption wrapped around the label, e.g. `"rotated {val} degrees"`.
	pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
		self.phrasing_mut().caption = Some(caption.into());
		self
	}

	/// Adds a writer-level variant usable as `{name}` in labels and caption.
	///
	/// `val` and `_writer` are reserved: writing fails with
	/// `Error::ReservedName` when one of them is used.
	pub fn with_variant<I, S>(mut self, name: impl Into<String>, options: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.phrasing_mut().variants.insert(name.into(), options.into_iter().map(Into::into).collect());
		self
	}

	/// Writes `value`, reusing the sub-decisions found in `choices` and
	/// recording the ones it samples.
	pub fn write_with_rng<R: Rng + ?Sized>(
		&self,
		value: &AttributeValue,
		choices: &mut WriterChoices,
		rng: &mut R,
	) -> Result<String> {
		match self {
			Writer::Options(w) => w.write_with_rng(value, choices, rng),
			Writer::Quantized(w) => w.write_with_rng(value, choices, rng),
			Writer::Bins(w) => w.write_with_rng(value, choices, rng),
			Writer::Bins2d(w) => w.write_with_rng(value, choices, rng),
			Writer::ContinuousAngle(w) => w.write_with_rng(value, choices, rng),
		}
	}

	/// Same as [`Writer::write_with_rng`] using the thread-local generator.
	pub fn write(&self, value: &AttributeValue, choices: Option<WriterChoices>) -> Result<(String, WriterChoices)> {
		let mut choices = choices.unwrap_or_default();
		let text = self.write_with_rng(value, &mut choices, &mut rand::rng())?;
		Ok((text, choices))
	}
}

impl From<OptionsWriter> for Writer {
	fn from(writer: OptionsWriter) -> Self {
		Writer::Options(writer)
	}
}

impl From<QuantizedWriter> for Writer {
	fn from(writer: QuantizedWriter) -> Self {
		Writer::Quantized(writer)
	}
}

impl From<BinsWriter> for Writer {
	fn from(writer: BinsWriter) -> Self {
		Writer::Bins(writer)
	}
}

impl From<Bins2dWriter> for Writer {
	fn from(writer: Bins2dWriter) -> Self {
		Writer::Bins2d(writer)
	}
}

impl From<ContinuousAngleWriter> for Writer {
	fn from(writer: ContinuousAngleWriter) -> Self {
		Writer::ContinuousAngle(writer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn rng() -> StdRng {
		StdRng::seed_from_u64(42)
	}

	fn write(writer: &Writer, value: impl Into<AttributeValue>) -> Result<String> {
		writer.write_with_rng(&value.into(), &mut WriterChoices::new(), &mut rng())
	}

	#[test]
	fn options_writer_looks_up_its_key() {
		let writer: Writer = OptionsWriter::new().with_option("2", ["triangle"]).with_option("0", ["square"]).into();
		assert_eq!(write(&writer, 2).unwrap(), "triangle");
		assert_eq!(write(&writer, "0").unwrap(), "square");
		assert!(matches!(write(&writer, 7), Err(Error::KeyNotFound { key }) if key == "7"));
		assert!(matches!(write(&writer, (1.0, 2.0)), Err(Error::ValueMismatch { .. })));
	}

	#[test]
	fn options_writer_replays_recorded_label() {
		let writer: Writer = OptionsWriter::new().with_option("1", ["circle", "disc", "round shape"]).into();
		let mut choices = WriterChoices::from([(VALUE_KEY.to_owned(), 1)]);
		let text = writer.write_with_rng(&1.into(), &mut choices, &mut rng()).unwrap();
		assert_eq!(text, "disc");
		assert_eq!(choices[VALUE_KEY], 1);
	}

	#[test]
	fn bins_writer_uses_left_closed_buckets() {
		let writer = BinsWriter::new(vec![0.0, 10.0, 20.0], ["tiny", "small", "medium", "large"]);
		assert_eq!(writer.bucket(15.0), 2);
		assert_eq!(writer.bucket(-1.0), 0);
		assert_eq!(writer.bucket(0.0), 1);
		assert_eq!(writer.bucket(10.0), 2);
		assert_eq!(writer.bucket(99.0), 3);
		assert_eq!(write(&writer.into(), 15).unwrap(), "medium");
	}

	#[test]
	fn bins_writer_reports_missing_labels() {
		let writer: Writer = BinsWriter::new(vec![0.0, 10.0], ["small", "medium"]).into();
		assert!(matches!(write(&writer, 12), Err(Error::OutOfRange { index: 2, len: 2 })));
		assert!(matches!(write(&writer, f64::NAN), Err(Error::ValueMismatch { .. })));
		assert!(matches!(write(&writer, (1.0, 2.0)), Err(Error::ValueMismatch { .. })));
	}

	#[test]
	fn bins_are_monotonic() {
		let writer = BinsWriter::new(vec![-5.0, 0.0, 2.5, 10.0], ["a", "b", "c", "d", "e"]);
		let mut last = 0;
		for step in -100..=200 {
			let bucket = writer.bucket(step as f64 * 0.1);
			assert!(bucket >= last);
			last = bucket;
		}
		assert_eq!(last, 4);
	}

	#[test]
	fn bins2d_indexes_the_grid() {
		let writer = Bins2dWriter::new(
			[vec![10.0, 20.0], vec![10.0, 20.0]],
			vec![
				vec!["upper left", "left", "lower left"],
				vec!["top", "center", "bottom"],
				vec!["upper right", "right", "lower right"],
			],
		);
		assert_eq!(writer.bucket(29.0, 8.0), (2, 0));
		assert_eq!(write(&writer.clone().into(), (29.0, 8.0)).unwrap(), "upper right");
		assert_eq!(write(&writer.into(), (15.0, 15.0)).unwrap(), "center");
	}

	#[test]
	fn quantized_writer_picks_nearest_codeword() {
		let codebook = vec![vec![0.0, 0.0, 255.0], vec![255.0, 0.0, 0.0], vec![0.0, 255.0, 0.0]];
		let writer = QuantizedWriter::new(codebook, ["blue", "red", "green"]);
		assert_eq!(writer.nearest(&[10.0, 20.0, 200.0]).unwrap(), 0);
		assert_eq!(writer.nearest(&[200.0, 30.0, 30.0]).unwrap(), 1);
		assert_eq!(write(&writer.into(), (20.0, 230.0, 10.0)).unwrap(), "green");
	}

	#[test]
	fn quantized_ties_go_to_the_first_codeword() {
		let writer = QuantizedWriter::new(vec![vec![0.0], vec![2.0], vec![2.0]], ["low", "high", "twin"]);
		assert_eq!(writer.nearest(&[1.0]).unwrap(), 0);
		assert_eq!(writer.nearest(&[3.0]).unwrap(), 1);
	}

	#[test]
	fn quantized_norm_changes_the_winner() {
		// L2 favours the balanced codeword, L1 the axis-aligned one.
		let codebook = vec![vec![3.0, 3.0], vec![0.0, 4.5]];
		let l2 = QuantizedWriter::new(codebook.clone(), ["diagonal", "axis"]);
		let l1 = QuantizedWriter::new(codebook, ["diagonal", "axis"]).with_norm(Norm::L1);
		assert_eq!(l2.nearest(&[0.0, 0.0]).unwrap(), 0);
		assert_eq!(l1.nearest(&[0.0, 0.0]).unwrap(), 1);
		assert_eq!(l2.nearest(&[2.0, 1.0]).unwrap(), 0);
		assert_eq!(l1.nearest(&[0.5, 3.0]).unwrap(), 1);
	}

	#[test]
	fn quantized_writer_rejects_bad_shapes() {
		let writer = QuantizedWriter::new(vec![vec![0.0, 0.0]], ["origin"]);
		assert!(matches!(writer.nearest(&[1.0]), Err(Error::ValueMismatch { .. })));
		let empty = QuantizedWriter::new(Vec::new(), Vec::<Label>::new());
		assert!(matches!(empty.nearest(&[1.0]), Err(Error::EmptyOptions { .. })));
		let unlabeled: Writer = QuantizedWriter::new(vec![vec![0.0]], Vec::<Label>::new()).into();
		assert!(matches!(write(&unlabeled, 0.0), Err(Error::OutOfRange { index: 0, len: 0 })));
	}

	#[test]
	fn synonym_labels_record_their_pick() {
		let writer: Writer = BinsWriter::new(vec![10.0], [Label::from(["small", "little"]), Label::from("big")]).into();
		let mut choices = WriterChoices::new();
		let text = writer.write_with_rng(&3.into(), &mut choices, &mut rng()).unwrap();
		assert_eq!(text, ["small", "little"][choices[VALUE_KEY]]);

		let mut choices = WriterChoices::from([(VALUE_KEY.to_owned(), 5)]);
		assert_eq!(writer.write_with_rng(&30.into(), &mut choices, &mut rng()).unwrap(), "big");
		assert_eq!(choices[VALUE_KEY], 0);
	}

	#[test]
	fn angle_writer_rounds_to_sampling_step() {
		let writer = ContinuousAngleWriter::new();
		assert_eq!(writer.degrees(std::f64::consts::FRAC_PI_6).unwrap(), 30);
		assert_eq!(writer.degrees(-0.01).unwrap(), 0);
		assert_eq!(writer.degrees(TAU - 0.1).unwrap(), 355);
		assert_eq!(writer.degrees(0.0).unwrap(), 0);

		let coarse = ContinuousAngleWriter::new().with_sampling(NonZeroU32::new(90).unwrap());
		assert_eq!(coarse.degrees(1.0).unwrap(), 90);
	}

	#[test]
	fn angle_ties_round_to_even_steps() {
		let writer = ContinuousAngleWriter::new();
		let degrees: Vec<u32> =
			[22.5_f64, 12.5, 92.5, 112.5].iter().map(|d| writer.degrees(d.to_radians()).unwrap()).collect();
		assert_eq!(degrees, [20, 10, 90, 110]);
		assert_eq!(writer.degrees(std::f64::consts::FRAC_PI_8).unwrap(), 20);
		assert_eq!(writer.degrees(17.5_f64.to_radians()).unwrap(), 20);
	}

	#[test]
	fn reserved_variant_names_are_rejected() {
		for name in [VALUE_KEY, WRITER_KEY] {
			let writer = Writer::from(OptionsWriter::new().with_option("0", ["red"])).with_variant(name, ["x"]);
			assert!(matches!(write(&writer, 0), Err(Error::ReservedName(n)) if n == name));
		}
	}

	#[test]
	fn angle_writer_is_wrap_invariant() {
		let writer = ContinuousAngleWriter::new();
		for step in -50..50 {
			let angle = step as f64 * 0.37;
			let degrees = writer.degrees(angle).unwrap();
			assert_eq!(degrees, writer.degrees(angle + TAU).unwrap());
			assert!(degrees < 360);
			assert_eq!(degrees % 5, 0);
		}
	}

	#[test]
	fn caption_and_variants_format_the_label() {
		let writer = Writer::from(ContinuousAngleWriter::new())
			.with_caption("rotated {val} degrees {direction}")
			.with_variant("direction", ["clockwise", "counterclockwise"]);

		let mut choices = WriterChoices::from([("direction".to_owned(), 1)]);
		let text = writer.write_with_rng(&std::f64::consts::FRAC_PI_2.into(), &mut choices, &mut rng()).unwrap();
		assert_eq!(text, "rotated 90 degrees counterclockwise");
	}

	#[test]
	fn variants_reach_into_labels_and_unknown_tokens_survive() {
		let writer: Writer = OptionsWriter::new().with_option("0", ["{tone} red"]).into();
		let writer = writer.with_variant("tone", ["dark"]).with_caption("{val} {colored}");
		assert_eq!(write(&writer, 0).unwrap(), "dark red {colored}");
	}

	#[test]
	fn write_returns_the_recorded_sub_decisions() {
		let writer: Writer = OptionsWriter::new().with_option("a", ["x", "y"]).into();
		let (text, choices) = writer.write(&"a".into(), None).unwrap();
		assert_eq!(text, ["x", "y"][choices[VALUE_KEY]]);
		let (again, replayed) = writer.write(&"a".into(), Some(choices.clone())).unwrap();
		assert_eq!((again, replayed), (text, choices));
	}

	#[test]
	fn writers_load_from_tagged_json() {
		let json = r#"[
			{ "type": "options", "options": { "2": ["triangle"] }, "caption": "a {val}" },
			{ "type": "bins", "bins": [0, 10, 20], "labels": ["tiny", "small", ["medium", "average"], "large"] },
			{ "type": "bins2d", "bins": [[10], [10]], "labels": [["a", "b"], ["c", "d"]] },
			{ "type": "quantized", "codebook": [[0, 0]], "labels": ["origin"], "norm": "l1" },
			{ "type": "continuous_angle", "sampling": 15, "variants": { "unit": ["degrees", "°"] } }
		]"#;
		let writers: Vec<Writer> = serde_json::from_str(json).unwrap();
		let kinds: Vec<_> = writers.iter().map(Writer::kind).collect();
		assert_eq!(kinds, ["options", "bins", "bins2d", "quantized", "continuous_angle"]);
		assert_eq!(write(&writers[0], 2).unwrap(), "a triangle");
		assert_eq!(write(&writers[2], (12.0, 3.0)).unwrap(), "c");
		match &writers[4] {
			Writer::ContinuousAngle(w) => assert_eq!(w.degrees(0.2).unwrap(), 15),
			other => panic!("unexpected {other:?}"),
		}
	}
}
