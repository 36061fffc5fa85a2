use std::{fs::File, io::{Write, BufWriter}, path::Path};

use located_error::prelude::*;

mod error;
pub use error::WriterError;

/// THE field separator used for every tabular output of dpsim.
pub const WRITER_SEPARATOR: &str = "\t";

/// A generic line writer.
/// - source: Boxed `BufWriter` (can either handle file-writing, or stdout).
pub struct GenericWriter<'a> {
    source: BufWriter<Box<dyn Write + 'a>>
}

impl<'a> GenericWriter<'a>{
    /// Instantiate a new `Writer`, linked to a file, or to stdout if `path` is `None`.
    /// 
    /// # Errors
    /// if `path` is either an invalid file, or the user does not have the proper
    /// UNIX permissions to write at this location.
    pub fn new(path: Option<impl AsRef<Path>>) -> Result<GenericWriter<'a>>{
        use WriterError::CreateFile;
        let source: Box<dyn Write + 'a> = match path {
            Some(path) => {
                let path = path.as_ref();
                let file = File::create(path)
                    .map_err(|e| CreateFile(path.display().to_string(), e))
                    .loc("While creating file")?;
                Box::new(file)
            },
            None => Box::new(std::io::stdout()),
        };
        Ok(GenericWriter{ source: BufWriter::new(source) })
    }

    /// Write the contents of a generic iterator within a file/stdout.
    /// one Iteration step = one line.
    /// 
    /// # Errors
    /// - If any of the Items within `iter` fails to get written within the file.
    pub fn write_iter<T, I>(&mut self, iter: T) -> Result<()>
    where   T: IntoIterator<Item = I>,
            I: std::fmt::Display,
    {
        for obj in iter {
            writeln!(self.source, "{obj}")
                .map_err(WriterError::IOError)
                .loc("While writing contents into file")?;
        }
        self.source.flush()
            .map_err(WriterError::IOError)
            .loc("While flushing buffer contents of Writer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_file() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let path       = tmpdir.path().join("pairs.txt");
        let mut writer = GenericWriter::new(Some(&path))?;

        let lines = ["7_7", "30_20"];
        writer.write_iter(lines)?;
        writer.write_iter(["40_40"])?;

        let got = std::fs::read_to_string(&path)?;
        assert_eq!(got, "7_7\n30_20\n40_40\n");
        Ok(())
    }

    #[test]
    fn invalid_location() {
        let tmpdir = tempfile::tempdir().expect("Failed to create tempdir");
        let path   = tmpdir.path().join("missing-dir").join("pairs.txt");
        assert!(GenericWriter::new(Some(path)).is_err());
    }
}
