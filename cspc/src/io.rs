use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::Context;
use libcspc::alphabet::Alphabet;
use libcspc::context::ContextLibrary;
use libcspc::structs::{ContextProfile, Profile};
use serde::Deserialize;

use crate::args::OutputFormat;

/// The on-disk form of a context library.
#[derive(Deserialize, Debug)]
pub struct LibraryFile {
    #[serde(default)]
    pub alphabet: Alphabet,
    pub profiles: Vec<ContextProfile>,
}

impl LibraryFile {
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).context(format!(
            "failed to open library file: {}",
            path.to_string_lossy()
        ))?;

        serde_json::from_reader(BufReader::new(file)).context(format!(
            "failed to parse library file: {}",
            path.to_string_lossy()
        ))
    }

    pub fn into_library(
        self,
        weight_center: f64,
        weight_decay: f64,
    ) -> anyhow::Result<ContextLibrary> {
        ContextLibrary::from_context_profiles(
            self.alphabet,
            &self.profiles,
            weight_center,
            weight_decay,
        )
        .context("failed to build context library")
    }
}

pub fn write_profiles(
    profiles: &[Profile],
    format: OutputFormat,
    writer: &mut impl Write,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Tsv => profiles
            .iter()
            .try_for_each(|profile| write!(writer, ">{}\n{profile}", profile.name))
            .context("failed to write profiles")?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut *writer, profiles)
                .context("failed to write profiles")?;
            writeln!(writer)?;
        }
    }

    writer.flush()?;
    Ok(())
}
