use std::io::Write;
use std::time::Instant;

use anyhow::Context;
use libcspc::alphabet::Alphabet;
use libcspc::context::{admix_count_profile, admix_sequence, LibraryPseudocounts};
use libcspc::structs::{CountProfile, Profile, Sequence};
use log::{debug, info};
use thiserror::Error;

use crate::args::PseudocountsArgs;
use crate::io::{write_profiles, LibraryFile};
use crate::stats::{RunStats, RunStatsBuilder, Timed};
use crate::util::PathBufExt;

#[derive(Error, Debug)]
#[error("the queries use the {query} alphabet, but the context library uses {library}")]
pub struct QueryAlphabetError {
    pub query: Alphabet,
    pub library: Alphabet,
}

pub fn pseudocounts(args: &PseudocountsArgs) -> anyhow::Result<RunStats> {
    let total = Instant::now();
    let mut stats = RunStatsBuilder::default();

    let now = Instant::now();
    let library = LibraryFile::from_path(&args.library_path)?.into_library(
        args.context_args.weight_center,
        args.context_args.weight_decay,
    )?;
    stats
        .library_states(library.len())
        .add_time(Timed::LibraryBuild, now.elapsed());
    info!(
        "context library: {} states, window length {}, {} alphabet",
        library.len(),
        library.window_length(),
        library.alphabet()
    );

    let alphabet: Alphabet = args.alphabet.into();
    if alphabet != library.alphabet() {
        return Err(QueryAlphabetError {
            query: alphabet,
            library: library.alphabet(),
        }
        .into());
    }

    let now = Instant::now();
    let queries = Sequence::from_fasta(&args.query_path, alphabet)?;
    stats
        .queries(queries.len())
        .add_time(Timed::QueryRead, now.elapsed());
    debug!("read {} query records", queries.len());

    let pc = LibraryPseudocounts::new(&library).with_bias_weights(args.context_args.bias_weights);
    let admix = args.admix_args.admix();

    let profiles: Vec<Profile> = if args.alignment {
        let cp = CountProfile::from_alignment(&queries)
            .context("failed to build a count profile from the query alignment")?;

        let now = Instant::now();
        let profile = pc.pseudocounts(&cp)?;
        stats
            .add_positions(profile.length())
            .add_time(Timed::Pseudocounts, now.elapsed());

        let now = Instant::now();
        let profile = match &admix {
            Some(admix) => admix_count_profile(&cp, &profile, admix.as_ref())?,
            None => profile,
        };
        stats.add_time(Timed::Admix, now.elapsed());

        vec![profile]
    } else {
        queries
            .iter()
            .map(|seq| -> anyhow::Result<Profile> {
                let now = Instant::now();
                let profile = pc
                    .pseudocounts(seq)
                    .with_context(|| format!("failed to add pseudocounts to {}", seq.name))?;
                stats
                    .add_positions(profile.length())
                    .add_time(Timed::Pseudocounts, now.elapsed());

                let now = Instant::now();
                let profile = match &admix {
                    Some(admix) => admix_sequence(seq, &profile, admix.as_ref())?,
                    None => profile,
                };
                stats.add_time(Timed::Admix, now.elapsed());

                Ok(profile)
            })
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    let now = Instant::now();
    let mut writer: Box<dyn Write> = match &args.output_args.output_path {
        Some(path) => Box::new(path.open(args.common_args.allow_overwrite)?),
        None => Box::new(std::io::stdout().lock()),
    };
    write_profiles(&profiles, args.output_args.format, &mut writer)?;
    stats.add_time(Timed::OutputWrite, now.elapsed());

    stats.add_time(Timed::Total, total.elapsed());
    Ok(stats.build()?)
}
