use std::time::Duration;

use derive_builder::Builder;
use log::info;
use strum::{Display, EnumCount, EnumIter, IntoEnumIterator};

#[repr(usize)]
#[derive(Clone, Copy, Debug, Display, EnumIter, EnumCount)]
#[strum(serialize_all = "lowercase")]
pub enum Timed {
    Total,
    #[strum(serialize = "library build")]
    LibraryBuild,
    #[strum(serialize = "query read")]
    QueryRead,
    Pseudocounts,
    Admix,
    #[strum(serialize = "output write")]
    OutputWrite,
}

#[derive(Builder, Default, Debug, Clone)]
#[builder(setter(strip_option), default)]
pub struct RunStats {
    pub library_states: usize,
    pub queries: usize,
    pub positions: usize,
    pub times: [Duration; Timed::COUNT],
}

impl RunStatsBuilder {
    pub fn add_time(&mut self, step: Timed, duration: Duration) -> &mut Self {
        let times = self.times.get_or_insert([Duration::ZERO; Timed::COUNT]);
        times[step as usize] += duration;
        self
    }

    pub fn add_positions(&mut self, positions: usize) -> &mut Self {
        *self.positions.get_or_insert(0) += positions;
        self
    }
}

impl RunStats {
    pub fn time(&self, step: Timed) -> Duration {
        self.times[step as usize]
    }

    pub fn log(&self) {
        info!(
            "added pseudocounts to {} positions in {} queries with {} context states",
            self.positions, self.queries, self.library_states
        );

        Timed::iter().for_each(|step| {
            info!("{:<16}{:>10.3}s", step.to_string(), self.time(step).as_secs_f64());
        });
    }
}
