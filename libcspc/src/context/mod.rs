pub mod admix;
pub use admix::{
    admix_count_profile, admix_sequence, Admix, ConstantAdmix, CsBlastAdmix, HhsuiteAdmix,
};

pub mod library;
pub use library::ContextLibrary;

pub mod posterior;
pub use posterior::posterior_probs;

pub mod pseudocounts;
pub use pseudocounts::LibraryPseudocounts;

pub mod scoring;
pub use scoring::context_score;

pub mod state;
pub use state::{ContextState, DEFAULT_WEIGHT_CENTER, DEFAULT_WEIGHT_DECAY};

pub mod window;
pub use window::{Column, ContextWindow, Window};
