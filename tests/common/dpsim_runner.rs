use std::path::PathBuf;
use clap::Parser;

use super::Fixture;

/// Builds and runs a `dpsim` command line within temporary directories.
#[derive(Default)]
pub struct DpsimRunnerBuilder {
    module    : Option<&'static str>,
    input     : Option<&'static str>,
    table     : Option<PathBuf>,
    output_dir: Option<&'static str>,
    pop       : Option<&'static str>,
    pool_size : Option<u32>,
    reps      : Option<u32>,
    filter    : Option<f64>,
    threads   : Option<usize>,
    seed      : Option<u64>,
    overwrite : bool,
}

impl DpsimRunnerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(mut self, module: &'static str) -> Self {
        self.module = Some(module);
        self
    }

    pub fn set_input(mut self, input: &'static str) -> Self {
        self.input = Some(input);
        self
    }

    pub fn set_table(mut self, table: PathBuf) -> Self {
        self.table = Some(table);
        self
    }

    pub fn set_output_dir(mut self, output_dir: &'static str) -> Self {
        self.output_dir = Some(output_dir);
        self
    }

    pub fn set_pop(mut self, pop: &'static str) -> Self {
        self.pop = Some(pop);
        self
    }

    pub fn set_pool_size(mut self, pool_size: u32) -> Self {
        self.pool_size = Some(pool_size);
        self
    }

    pub fn set_reps(mut self, reps: u32) -> Self {
        self.reps = Some(reps);
        self
    }

    pub fn set_filter(mut self, filter: f64) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn set_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn overwrite(mut self) -> Self {
        self.overwrite = true;
        self
    }

    pub fn build(self) -> Result<DpsimRunner, String> {
        let module     = self.module.ok_or("Missing module")?;
        let input      = Fixture::copy(self.input.ok_or("Missing input")?);
        let output_dir = Fixture::blank(self.output_dir.unwrap_or("dpsim-test-output"));

        let mut args = vec![
            "dpsim".to_string(), module.to_string(),
            "--input".to_string(), input.to_string(),
            "--output-dir".to_string(), output_dir.to_string(),
        ];
        let optional = [
            ("--table",     self.table.map(|path| path.display().to_string())),
            ("--pop",       self.pop.map(str::to_string)),
            ("--pool-size", self.pool_size.map(|n| n.to_string())),
            ("--reps",      self.reps.map(|n| n.to_string())),
            ("--filter",    self.filter.map(|f| f.to_string())),
            ("--threads",   self.threads.map(|n| n.to_string())),
            ("--seed",      self.seed.map(|n| n.to_string())),
        ];
        for (flag, value) in optional {
            if let Some(value) = value {
                args.extend([flag.to_string(), value]);
            }
        }
        if self.overwrite {
            args.push("--overwrite".to_string());
        }

        Ok(DpsimRunner { args, input, output_dir })
    }
}

pub struct DpsimRunner {
    args      : Vec<String>,
    input     : Fixture,
    output_dir: Fixture,
}

impl DpsimRunner {
    pub fn cli(&self) -> parser::Cli {
        parser::Cli::try_parse_from(&self.args).expect("Failed to parse command line arguments")
    }

    pub fn run(&self) -> anyhow::Result<()> {
        dpsim_rs::run(self.cli())
    }

    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.to_path_buf()
    }

    fn output_file(&self, extension: &str) -> PathBuf {
        let stem = self.input.file_stem().expect("Missing input filestem").to_string_lossy();
        self.output_dir.join(format!("{stem}.{extension}"))
    }

    pub fn output_table(&self) -> PathBuf {
        self.output_file(dpsim_rs::TABLE_EXTENSION)
    }

    pub fn output_merged(&self) -> PathBuf {
        self.output_file(dpsim_rs::MERGED_EXTENSION)
    }
}
