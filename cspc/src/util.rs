use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;

pub trait PathBufExt {
    fn open(&self, allow_overwrite: bool) -> anyhow::Result<BufWriter<File>>;
}

impl PathBufExt for PathBuf {
    fn open(&self, allow_overwrite: bool) -> anyhow::Result<BufWriter<File>> {
        let mut file_options = File::options();

        if allow_overwrite {
            file_options.write(true).truncate(true).create(true);
        } else {
            file_options.write(true).create_new(true);
        };

        let file = file_options
            .open(self)
            .context(format!("failed to create file: {}", self.to_string_lossy()))?;

        Ok(BufWriter::new(file))
    }
}

pub fn set_threads(num_threads: usize) -> anyhow::Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .context("failed to build rayon global threadpool")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_open_respects_allow_overwrite() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out.tsv");

        let mut writer = path.open(false)?;
        writeln!(writer, "first")?;
        drop(writer);

        assert!(path.open(false).is_err());

        let mut writer = path.open(true)?;
        writeln!(writer, "second")?;
        drop(writer);

        assert_eq!(std::fs::read_to_string(&path)?, "second\n");
        Ok(())
    }
}
