use std::{
    fs::File,
    path::{Path, PathBuf},
    fmt::{self, Display, Formatter},
    ffi::OsStr,
};

use located_error::prelude::*;

use clap::{Parser, Subcommand, Args, ArgEnum};
use serde::{Serialize, Deserialize};
use log::debug;

mod error;
pub use error::ParserError;

#[derive(Parser, Debug, Serialize, Deserialize)]
#[clap(name="dpsim", author, version, about, long_about = None)]
#[clap(propagate_version = true)]
/// dpsim-rs: Simulated delta SNP-index confidence bounds for bulk-segregant analysis
pub struct Cli {
    ///Set the verbosity level (-v -vv -vvv)
    /// 
    /// Set the verbosity level of this program. Multiple levels allowed {n} 
    ///
    /// -v: Info  |  -vv: Debug  | -vvv: Trace {n}
    /// 
    /// Note that the program will still output warnings by default, even when this flag is off.
    /// Use The --quiet/-q to disable them
    #[clap(short='v', long, parse(from_occurrences), global=true)]
    pub verbose: u8,

    /// Disable warnings.
    /// 
    /// By default, warnings are emmited and redirected to the console, even when verbose mode is off.
    /// Use this argument to disable this. Only errors will be displayed.
    #[clap(short='q', long, global=true)]
    pub quiet: bool,

    #[clap(subcommand)]
    pub commands: Commands,
}

impl Cli{
    /// Map the `--verbose` and `--quiet` flags to a logger verbosity level.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {0} else {self.verbose.saturating_add(1)}
    }

    /// Serialize command line arguments within a `.yaml` file.
    /// 
    /// # Behavior
    /// - File naming follows the convention '{current time}-{module name}.yaml'. current time follows the format
    ///   `YYYY`-`MM`-`DD`T`hhmmss`
    /// - File is written at the root of the user-provided `--output-dir` folder.
    /// - Returns the path of the written file, or `None` when replaying a previous run through `from-yaml`
    /// 
    /// # Errors
    /// - if `serde_yaml` fails to parse `Self` to a string.
    /// - if the output file cannot be written.
    pub fn serialize(&self) -> Result<Option<PathBuf>> {
        use ParserError::{Serialize, Io};
        // ---- Parse arguments to yaml and print to console.
        let serialized = serde_yaml::to_string(&self)
            .map_err(Serialize)
            .loc("While serializing command line arguments")?;
        
        debug!("\n---- Command line args ----\n{}\n---", serialized);

        // ---- Fetch the appropriate output-directory and parse the name of the output file.
        let current_time = chrono::offset::Local::now().format("%Y-%m-%dT%H%M%S").to_string();
        let (output_dir, module) = match &self.commands {
            Commands::Simulate {common, ..} => (&common.output_dir, "simulate"),
            Commands::Merge {common, ..}    => (&common.output_dir, "merge"),
            Commands::FromYaml {..}         => return Ok(None),
        };
        let output_file = output_dir.join(format!("{current_time}-{module}.yaml"));

        // ---- Write arguments
        std::fs::write(&output_file, serialized)
            .map_err(|e| Io(output_file.clone(), e))
            .with_loc(|| format!("Unable to serialize arguments into {}", output_file.display()))?;
        Ok(Some(output_file))
    }

    /// Deserialize a `.yaml` file into Command line arguments.
    /// 
    /// # Errors
    /// - if the provided `.yaml` is invalid, or does not carry read permissions
    /// - if `serde_yaml` fails to parse the provided file to `Self`.
    pub fn deserialize(yaml: &Path) -> Result<Self> {
        use ParserError::{Deserialize, Io};
        let file = File::open(yaml).map_err(|e| Io(yaml.to_path_buf(), e)).loc("While deserializing arguments")?;
        serde_yaml::from_reader(file)
            .map_err(|e| Deserialize(yaml.to_path_buf(), e))
            .loc("While deserializing arguments")
    }
}

#[derive(Subcommand, Debug, Serialize, Deserialize)]
pub enum Commands {
    /// Simulate delta SNP-index confidence bounds for every depth pair found within a table of records.
    Simulate {
        #[clap(flatten)]
        common: Common,
        #[clap(flatten)]
        sim: Simulate,
    },

    /// Append a previously simulated table of confidence bounds onto a table of records.
    Merge {
        #[clap(flatten)]
        common: Common,
        #[clap(flatten)]
        merge: Merge,
    },

    /// Run dpsim using a previously generated .yaml configuration file.
    /// 
    /// This allows users to easily re-apply a dpsim command using the exact same parameters
    /// and arguments (including the RNG seed). 
    FromYaml {
        yaml: PathBuf,
    },
}

/// Population structure of the segregating population from which both bulks were sampled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ArgEnum, Serialize, Deserialize)]
pub enum PopulationModel {
    /// Recombinant inbred lines: homozygous individuals.
    Ril,
    /// Second filial generation: heterozygous-capable individuals.
    F2,
}

impl Display for PopulationModel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ril => write!(f, "RIL"),
            Self::F2  => write!(f, "F2"),
        }
    }
}

#[derive(Args, Debug, Default, Serialize, Deserialize)]
pub struct Common {
    /// Input table of bulk records.
    /// 
    /// Tab-separated file, where lines starting with '#' are considered as headers. Column 3 (0-based) must hold
    /// the genotype field of the wild-type bulk, and column 4 the genotype field of the mutant bulk. Genotype fields
    /// are ':'-separated, and carry the allelic depths (`<ref>,<alt>`) at index --ad-field. Missing genotypes ('.')
    /// are considered as having a depth of zero.
    #[clap(short='i', long, parse(try_from_os_str=valid_input_file))]
    pub input: PathBuf,

    /// Output directory where results will be written.
    /// 
    /// Note that dpsim will create the specified leaf directory if it is not present, but does not 
    /// allow itself from creating parent directories.
    #[clap(short='o', long, default_value("dpsim-output"), parse(try_from_os_str=valid_output_dir))]
    pub output_dir: PathBuf,

    /// Overwrite existing output files.
    /// 
    /// By default, dpsim does not allow itself from overwriting existing results files. Use this flag
    /// to force this behaviour.
    #[clap(short='w', long)]
    pub overwrite: bool,

    /// 0-based index of the allelic-depth sub-field within each ':'-separated genotype field.
    #[clap(short='a', long, default_value("2"))]
    pub ad_field: usize,
}

/// Simulate delta SNP-index confidence bounds for every observed pair of bulk depths.
/// 
/// Extract the set of distinct (wild-type, mutant) depth pairs from the input records, simulate the null
/// distribution of the delta SNP-index for each one of them, and write the obtained 90/95/99% two-sided
/// bounds. Bounds are then merged back onto the input records.
#[derive(Args, Debug, Serialize, Deserialize)]
pub struct Simulate {
    /// Population structure of the segregating population (RIL or F2).
    #[clap(short='p', long, arg_enum, ignore_case(true))]
    pub pop: PopulationModel,

    /// Number of individuals within each bulk.
    #[clap(short='n', long)]
    pub pool_size: u32,

    /// Number of simulation replicates performed for each depth pair.
    /// 
    /// Values in the range 10 000 and above are recommended to obtain stable 99% bounds.
    #[clap(short='r', long)]
    pub reps: u32,

    /// Minimal simulated SNP-index required in at least one bulk to keep a replicate.
    /// 
    /// Replicates where neither bulk reaches this value are considered non-informative and discarded.
    #[clap(short='f', long, default_value("0.3"))]
    pub filter: f64,

    /// Number of parallel worker threads.
    /// 
    /// Note that this value is capped by the available parallelism of the machine.
    #[clap(short='c', long, default_value("1"))]
    pub threads: usize,

    /// Provide the RNG with a set seed.
    #[clap(long, required(false), default_value_t=fastrand::u64(u64::MIN..=u64::MAX))]
    pub seed: u64,
}

/// Merge a previously simulated table of confidence bounds onto a set of records.
#[derive(Args, Debug, Serialize, Deserialize)]
pub struct Merge {
    /// Table of simulated bounds, generated by a previous 'dpsim simulate' run.
    #[clap(short='t', long, parse(try_from_os_str=valid_input_file))]
    pub table: PathBuf,
}

impl Common {
    /// Get a generic prefix for our output files: `{--output-dir}/{input filestem}`
    /// 
    /// # Errors 
    /// - if a default file-prefix cannot be created from the input filestem.
    pub fn get_file_prefix(&self) -> Result<PathBuf> {
        let file_stem = self.input.file_stem()
            .ok_or_else(|| ParserError::ParseOutputPrefix(self.input.clone()))
            .loc("While parsing command line arguments")?;
        Ok(self.output_dir.join(file_stem))
    }

    /// Format the path of an output file, using the provided extension, and ensure it can be written.
    ///
    /// # Errors
    /// - if the file prefix cannot be generated.
    /// - if the file already exists, while `--overwrite` was not requested.
    pub fn get_output_file(&self, extension: &str) -> Result<PathBuf> {
        let mut file = self.get_file_prefix()?.into_os_string();
        file.push(format!(".{extension}"));
        let file = PathBuf::from(file);
        self.can_write_file(&file)?;
        Ok(file)
    }

    /// Check if a given file already exists ; raise an error if such is the case, and the user did not explicitly 
    /// allow file overwriting.
    /// 
    /// # Errors
    /// - If the provided `pathbuf` already exists and the user did not specifically allow for file
    ///   overwrite using the `--overwrite` argument
    pub fn can_write_file(&self, pathbuf: &Path) -> Result<bool> {
        if ! self.overwrite && pathbuf.exists() {
            return Err(ParserError::CannotOverwrite(pathbuf.display().to_string()))
                .loc( "While parsing command line arguments" )
        }
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FileEntity {File, Directory}

impl Display for FileEntity {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::File      => write!(f, "File"),
            Self::Directory => write!(f, "Directory"),
        }
    }
}

impl FileEntity {
    fn validate(&self, path: &Path) -> Result<(), ParserError> {
        use ParserError::InvalidFileEntity;
        let valid = match self {
            Self::File      => path.is_file(),
            Self::Directory => path.is_dir()
        };

        match valid {
            true  => Ok(()),
            false => Err(InvalidFileEntity(*self, path.display().to_string()))
        }
    }
}

fn assert_filesystem_entity_is_valid(s: &OsStr, entity: &FileEntity) -> Result<()> {
    use ParserError::MissingFileEntity;
    let path = Path::new(s);
    if ! path.exists() {
        return Err(MissingFileEntity(*entity, path.display().to_string()))
            .loc("While parsing arguments.")
    }

    entity.validate(path).loc("While parsing arguments.")
}

fn valid_input_file(s: &OsStr) -> Result<PathBuf> {
    assert_filesystem_entity_is_valid(s, &FileEntity::File)
        .loc("While checking for file validity")?;
    Ok(PathBuf::from(s))
}

fn valid_output_dir(s: &OsStr) -> Result<PathBuf> {
    if ! Path::new(s).exists() {
        std::fs::create_dir(s)?;
    }
    assert_filesystem_entity_is_valid(s, &FileEntity::Directory)
        .loc("While checking for directory validity")?;
    Ok(PathBuf::from(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_input(dir: &Path) -> PathBuf {
        let input = dir.join("records.txt");
        std::fs::write(&input, "#ID\tgeno_v3\tgeno_CE\tgeno_WT\tgeno_MT\n").expect("Failed to write mock input");
        input
    }

    fn simulate_args<'a>(input: &'a str, output_dir: &'a str, pop: &'a str) -> Vec<&'a str> {
        vec!["dpsim", "simulate", "--input", input, "--output-dir", output_dir, "--pop", pop, "--pool-size", "10", "--reps", "100"]
    }

    #[test]
    fn parse_simulate_defaults() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let input  = mock_input(tmpdir.path());
        let output = tmpdir.path().join("out");

        let cli = Cli::try_parse_from(simulate_args(input.to_str().unwrap(), output.to_str().unwrap(), "f2"))?;
        assert_eq!(cli.verbosity(), 1);
        match cli.commands {
            Commands::Simulate { common, sim } => {
                assert_eq!(common.input, input);
                assert!(output.is_dir());
                assert_eq!(common.ad_field, 2);
                assert!(!common.overwrite);
                assert_eq!(sim.pop, PopulationModel::F2);
                assert_eq!(sim.pool_size, 10);
                assert_eq!(sim.reps, 100);
                assert!((sim.filter - 0.3).abs() < f64::EPSILON);
                assert_eq!(sim.threads, 1);
            },
            other => panic!("Expected the simulate subcommand. Got {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn population_model_ignores_case() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let input  = mock_input(tmpdir.path());
        let output = tmpdir.path().join("out");
        for (pop, want) in [("RIL", PopulationModel::Ril), ("ril", PopulationModel::Ril), ("F2", PopulationModel::F2)] {
            let cli = Cli::try_parse_from(simulate_args(input.to_str().unwrap(), output.to_str().unwrap(), pop))?;
            let Commands::Simulate { sim, .. } = cli.commands else { panic!("Expected the simulate subcommand") };
            assert_eq!(sim.pop, want);
        }
        Ok(())
    }

    #[test]
    fn missing_input_is_rejected() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let missing = tmpdir.path().join("missing.txt");
        let output  = tmpdir.path().join("out");
        let cli = Cli::try_parse_from(simulate_args(missing.to_str().unwrap(), output.to_str().unwrap(), "f2"));
        assert!(cli.is_err());
        Ok(())
    }

    #[test]
    fn quiet_overrides_verbose() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let input  = mock_input(tmpdir.path());
        let output = tmpdir.path().join("out");
        let mut args = simulate_args(input.to_str().unwrap(), output.to_str().unwrap(), "f2");
        args.extend(["-vv", "--quiet"]);
        assert_eq!(Cli::try_parse_from(args)?.verbosity(), 0);
        Ok(())
    }

    #[test]
    fn yaml_roundtrip_keeps_seed() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let input  = mock_input(tmpdir.path());
        let output = tmpdir.path().join("out");
        let mut args = simulate_args(input.to_str().unwrap(), output.to_str().unwrap(), "ril");
        args.extend(["--seed", "42"]);

        let cli  = Cli::try_parse_from(args)?;
        let yaml = cli.serialize()?.expect("Simulate should be serialized");
        assert!(yaml.starts_with(&output));

        let replay = Cli::deserialize(&yaml)?;
        let Commands::Simulate { sim, .. } = replay.commands else { panic!("Expected the simulate subcommand") };
        assert_eq!(sim.seed, 42);
        assert_eq!(sim.pop, PopulationModel::Ril);
        Ok(())
    }

    #[test]
    fn output_file_overwrite_guard() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let mut common = Common {
            input     : mock_input(tmpdir.path()),
            output_dir: tmpdir.path().to_path_buf(),
            overwrite : false,
            ad_field  : 2,
        };

        let table = common.get_output_file("dpsim.tsv")?;
        assert_eq!(table, tmpdir.path().join("records.dpsim.tsv"));

        std::fs::write(&table, "")?;
        assert!(common.get_output_file("dpsim.tsv").is_err());

        common.overwrite = true;
        assert_eq!(common.get_output_file("dpsim.tsv")?, table);
        Ok(())
    }
}
