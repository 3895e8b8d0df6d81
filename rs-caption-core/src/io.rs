use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::caption::choices::{ChoiceLog, Choices};
use crate::error::Result;

/// Reads a whole text file.
pub fn read_to_string<P: AsRef<Path>>(filename: P) -> Result<String> {
	Ok(fs::read_to_string(filename)?)
}

/// Reads a template file: one template per line.
///
/// - Splits on `\n` / `\r\n`
/// - Blank lines are skipped, surrounding whitespace is kept
pub fn read_templates<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	let contents = read_to_string(filename)?;
	Ok(contents.lines().filter(|line| !line.trim().is_empty()).map(str::to_owned).collect())
}

/// Builds an output path based on an input path and a new extension.
///
/// Example:
/// `data/captions.json` + `"bin"` → `data/captions.bin`
pub fn build_output_path<P: AsRef<Path>>(input_path: P, output_extension: &str) -> Result<PathBuf> {
	let input_path = input_path.as_ref();

	let parent = input_path.parent().unwrap_or_else(|| Path::new("."));
	let file_stem = input_path
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Input path has no filename"))?;

	let mut output = PathBuf::from(parent);
	output.push(file_stem);
	output.set_extension(output_extension);

	Ok(output)
}

/// Writes one choice record as pretty JSON.
pub fn save_choices<P: AsRef<Path>>(path: P, choices: &Choices) -> Result<()> {
	fs::write(path, choices.to_json()?)?;
	Ok(())
}

/// Reads one choice record from JSON.
pub fn load_choices<P: AsRef<Path>>(path: P) -> Result<Choices> {
	Choices::from_json(&read_to_string(path)?)
}

/// Writes a batch of choice records with `postcard`.
pub fn save_choice_log<P: AsRef<Path>>(path: P, log: &ChoiceLog) -> Result<()> {
	fs::write(path, log.to_bytes()?)?;
	Ok(())
}

/// Reads a batch of choice records written by [`save_choice_log`].
pub fn load_choice_log<P: AsRef<Path>>(path: P) -> Result<ChoiceLog> {
	let bytes = fs::read(path)?;
	ChoiceLog::from_bytes(&bytes)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;

	fn scratch(name: &str) -> PathBuf {
		let dir = std::env::temp_dir().join(format!("rs-caption-io-{}", std::process::id()));
		fs::create_dir_all(&dir).unwrap();
		dir.join(name)
	}

	#[test]
	fn output_path_swaps_extension() {
		assert_eq!(build_output_path("data/captions.json", "bin").unwrap(), PathBuf::from("data/captions.bin"));
		assert_eq!(build_output_path("captions", "bin").unwrap(), PathBuf::from("captions.bin"));
		assert!(build_output_path("/", "bin").is_err());
	}

	#[test]
	fn templates_skip_blank_lines() {
		let path = scratch("templates.txt");
		fs::write(&path, "{start} {shape}.\n\n   \r\n<{a}> <{b}>.\r\n").unwrap();
		assert_eq!(read_templates(&path).unwrap(), ["{start} {shape}.", "<{a}> <{b}>."]);
	}

	#[test]
	fn choices_round_trip_through_files() {
		let mut choices = Choices::new();
		choices.structure = Some(2);
		choices.variants.insert("start".to_owned(), 1);

		let json = scratch("choices.json");
		save_choices(&json, &choices).unwrap();
		assert_eq!(load_choices(&json).unwrap(), choices);

		let bin = build_output_path(&json, "bin").unwrap();
		let log: ChoiceLog = vec![choices.clone(), choices].into_iter().collect();
		save_choice_log(&bin, &log).unwrap();
		assert_eq!(load_choice_log(&bin).unwrap(), log);
	}

	#[test]
	fn missing_files_surface_io_errors() {
		assert!(matches!(read_templates(scratch("absent.txt")), Err(Error::Io(_))));
	}
}
