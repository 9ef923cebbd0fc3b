pub mod context_profile;
pub use context_profile::ContextProfile;

pub mod count_profile;
pub use count_profile::CountProfile;

pub mod po_graph;
pub use po_graph::PoGraph;

pub mod profile;
pub use profile::Profile;

pub mod sequence;
pub use sequence::Sequence;
