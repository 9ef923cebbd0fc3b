use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use libcspc::alphabet::Alphabet;
use libcspc::context::{
    Admix, ConstantAdmix, CsBlastAdmix, HhsuiteAdmix, DEFAULT_WEIGHT_CENTER, DEFAULT_WEIGHT_DECAY,
};
use strum::Display;

#[derive(Subcommand)]
pub enum SubCommands {
    #[command(about = "Add context-specific pseudocounts to query sequences or an alignment")]
    Pseudocounts(PseudocountsArgs),
}

#[derive(Parser)]
#[command(name = "cspc")]
#[command(
    about = "Compute context-specific pseudocounts by scoring sequence windows against a context library"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: SubCommands,
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// The number of threads that cspc will use
    #[arg(
        short = 't',
        long = "threads",
        default_value_t = 8usize,
        value_name = "n"
    )]
    pub num_threads: usize,

    /// Allow cspc to overwrite files
    #[arg(short = 'q', long = "allow-overwrite", default_value_t = false)]
    pub allow_overwrite: bool,
}

#[derive(ValueEnum, Display, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[strum(serialize_all = "lowercase")]
pub enum AlphabetArg {
    #[default]
    Amino,
    Dna,
}

impl From<AlphabetArg> for Alphabet {
    fn from(value: AlphabetArg) -> Self {
        match value {
            AlphabetArg::Amino => Alphabet::Amino,
            AlphabetArg::Dna => Alphabet::Dna,
        }
    }
}

#[derive(Debug, Args)]
pub struct PseudocountsArgs {
    /// Context library file
    #[arg(value_name = "LIBRARY.json")]
    pub library_path: PathBuf,

    /// Query file
    #[arg(value_name = "QUERY.fasta")]
    pub query_path: PathBuf,

    /// Treat the query records as one multiple sequence alignment
    #[arg(long, action)]
    pub alignment: bool,

    /// The residue alphabet of the queries
    #[arg(long, value_enum, default_value_t = AlphabetArg::Amino)]
    pub alphabet: AlphabetArg,

    /// Arguments that control how the context library is scored
    #[command(flatten)]
    pub context_args: ContextArgs,

    /// Arguments that control pseudocount admixture
    #[command(flatten)]
    pub admix_args: AdmixArgs,

    /// Arguments that control output options
    #[command(flatten)]
    pub output_args: OutputArgs,

    /// Arguments that are common across all cspc subcommands
    #[command(flatten)]
    pub common_args: CommonArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ContextArgs {
    /// Weight of the central window column
    #[arg(long = "weight-center", default_value_t = DEFAULT_WEIGHT_CENTER, value_name = "F")]
    pub weight_center: f64,

    /// Per-column decay of the window weights away from the center
    #[arg(long = "weight-decay", default_value_t = DEFAULT_WEIGHT_DECAY, value_name = "F")]
    pub weight_decay: f64,

    /// Add the prior weight of each context state to its window score
    #[arg(long = "bias-weights", action)]
    pub bias_weights: bool,
}

#[derive(ValueEnum, Display, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[strum(serialize_all = "lowercase")]
pub enum AdmixKind {
    /// Report the pseudocounts alone
    #[default]
    None,
    /// Mix in a constant fraction of pseudocounts
    Constant,
    /// tau = pca * (pcb + 1) / (pcb + neff)
    Csblast,
    /// tau = pca / (1 + (neff / pcb)^pcc)
    Hhsuite,
}

#[derive(Args, Debug, Clone)]
pub struct AdmixArgs {
    /// How pseudocounts are mixed with the observed residues
    #[arg(long, value_enum, default_value_t = AdmixKind::None)]
    pub admix: AdmixKind,

    /// Admixture parameter a
    #[arg(long = "pca", default_value_t = 0.9, value_name = "F")]
    pub pca: f64,

    /// Admixture parameter b
    #[arg(long = "pcb", default_value_t = 12.0, value_name = "F")]
    pub pcb: f64,

    /// Admixture parameter c
    #[arg(long = "pcc", default_value_t = 1.0, value_name = "F")]
    pub pcc: f64,
}

impl AdmixArgs {
    pub fn admix(&self) -> Option<Box<dyn Admix>> {
        match self.admix {
            AdmixKind::None => None,
            AdmixKind::Constant => Some(Box::new(ConstantAdmix { pca: self.pca })),
            AdmixKind::Csblast => Some(Box::new(CsBlastAdmix {
                pca: self.pca,
                pcb: self.pcb,
            })),
            AdmixKind::Hhsuite => Some(Box::new(HhsuiteAdmix {
                pca: self.pca,
                pcb: self.pcb,
                pcc: self.pcc,
            })),
        }
    }
}

#[derive(ValueEnum, Display, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tsv,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Where to place the pseudocount profiles (default: stdout)
    #[arg(short = 'o', long = "output", value_name = "path")]
    pub output_path: Option<PathBuf>,

    /// The format of the pseudocount profiles
    #[arg(long, value_enum, default_value_t = OutputFormat::Tsv)]
    pub format: OutputFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::parse_from(["cspc", "pseudocounts", "lib.json", "query.fasta"]);
        let SubCommands::Pseudocounts(args) = cli.command;

        assert_eq!(args.alphabet, AlphabetArg::Amino);
        assert!(!args.alignment);
        assert_eq!(args.context_args.weight_center, DEFAULT_WEIGHT_CENTER);
        assert_eq!(args.admix_args.admix, AdmixKind::None);
        assert!(args.admix_args.admix().is_none());
        assert_eq!(args.output_args.format, OutputFormat::Tsv);
        assert_eq!(args.common_args.num_threads, 8);
    }

    #[test]
    fn test_parse_options() {
        let cli = Cli::parse_from([
            "cspc",
            "pseudocounts",
            "lib.json",
            "msa.fasta",
            "--alignment",
            "--alphabet",
            "dna",
            "--admix",
            "hhsuite",
            "--pca",
            "1.0",
            "--pcb",
            "1.5",
            "--format",
            "json",
            "-o",
            "out.json",
            "-t",
            "2",
            "-q",
        ]);
        let SubCommands::Pseudocounts(args) = cli.command;

        assert!(args.alignment);
        assert_eq!(Alphabet::from(args.alphabet), Alphabet::Dna);
        assert_eq!(args.admix_args.admix.to_string(), "hhsuite");
        let admix = args.admix_args.admix().unwrap();
        assert!((admix.tau(1.5) - 0.5).abs() < 1e-12);
        assert_eq!(args.output_args.format, OutputFormat::Json);
        assert_eq!(args.output_args.output_path, Some(PathBuf::from("out.json")));
        assert_eq!(args.common_args.num_threads, 2);
        assert!(args.common_args.allow_overwrite);
    }
}
