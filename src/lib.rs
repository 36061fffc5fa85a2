use std::path::Path;

use parser::{Cli, Commands, Common, Merge, Simulate};
use depth_sims::SimConfig;
use dpsim_io::{
    read::{RecordReader, RecordTable},
    table::BoundsTable,
    merge::merge_records,
    write::GenericWriter,
};

use located_error::prelude::*;
use log::info;

/// Extension of simulated bounds tables: `{output-dir}/{input filestem}.dpsim.tsv`
pub const TABLE_EXTENSION : &str = "dpsim.tsv";
/// Extension of merged records: `{output-dir}/{input filestem}.dpsim.merged.tsv`
pub const MERGED_EXTENSION: &str = "dpsim.merged.tsv";

/// Unpack command line arguments and run the requested module.
/// 
/// # Errors
/// - if the requested module fails. The error is propagated as is.
pub fn run(cli: Cli) -> Result<()> {
    match cli.commands {
        Commands::Simulate {common, sim} => {
            simulate(&common, &sim)?;
        },

        Commands::Merge {common, merge: merge_args} => {
            merge(&common, &merge_args)?;
        },

        Commands::FromYaml {yaml} => {
            let cli = Cli::deserialize(&yaml)?;
            if let Commands::FromYaml {..} = cli.commands {
                bail!("{} points to another 'from-yaml' configuration. Refusing to recurse.", yaml.display())
            }
            self::run(cli)?;
        },
    };
    Ok(())
}

/// Check the requested module's parameters, without touching the filesystem.
/// 
/// # Errors
/// - if the simulation parameters of a `simulate` command are invalid.
pub fn validate(cli: &Cli) -> Result<()> {
    if let Commands::Simulate {sim, ..} = &cli.commands {
        SimConfig::try_from(sim).loc("While validating simulation parameters")?;
    }
    Ok(())
}

/// Simulate confidence bounds for every depth pair found within `common.input`, write the resulting
/// bounds table, and merge it back onto the input records.
/// 
/// Simulation parameters are validated before any file is read or written.
/// 
/// # Errors
/// - if the simulation parameters are invalid.
/// - if any output file already exists, and `--overwrite` was not requested.
/// - if the input records cannot be read or parsed.
/// - if the worker pool fails.
pub fn simulate(common: &Common, sim: &Simulate) -> Result<BoundsTable> {
    // ----------------------------- Validate configuration.
    let config = SimConfig::try_from(sim).loc("While validating simulation parameters")?;
    info!("Population: {} - Pool size: {} - Replicates: {} - Filter: {} - Seed: {}",
        config.model(), config.pool_size(), config.replicates(), config.filter(), config.seed()
    );

    // ----------------------------- Check output files.
    let table_path  = common.get_output_file(TABLE_EXTENSION)?;
    let merged_path = common.get_output_file(MERGED_EXTENSION)?;

    // ----------------------------- Extract depth pairs.
    let records = RecordReader::new(&common.input, common.ad_field)?.read_records()?;
    let pairs = records.depth_pairs();

    // ----------------------------- Run simulations.
    let bounds = depth_sims::run_all(&pairs, config).loc("While simulating confidence bounds")?;
    let table  = BoundsTable::from(bounds);

    // ----------------------------- Write results.
    info!("Writing bounds table to {}", table_path.display());
    table.write(Some(&table_path))?;
    write_merged(&records, &table, &merged_path)?;
    Ok(table)
}

/// Merge a previously written bounds table onto the records of `common.input`.
/// 
/// # Errors
/// - if the output file already exists, and `--overwrite` was not requested.
/// - if the bounds table or input records cannot be read or parsed.
pub fn merge(common: &Common, merge: &Merge) -> Result<()> {
    let merged_path = common.get_output_file(MERGED_EXTENSION)?;
    let table   = BoundsTable::read(&merge.table)?;
    let records = RecordReader::new(&common.input, common.ad_field)?.read_records()?;
    write_merged(&records, &table, &merged_path)
}

fn write_merged(records: &RecordTable, table: &BoundsTable, path: &Path) -> Result<()> {
    let merged = merge_records(records, table);
    info!("Writing merged records to {}", path.display());
    GenericWriter::new(Some(path))?
        .write_iter(merged.iter())
        .with_loc(|| format!("While writing merged records into {}", path.display()))
}
