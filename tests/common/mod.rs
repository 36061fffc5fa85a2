#[cfg(test)]
mod fixture;
pub use fixture::Fixture;

#[cfg(test)]
mod dpsim_runner;
pub use dpsim_runner::{DpsimRunner, DpsimRunnerBuilder};

/// Read a tab-separated output file, as a vector of rows.
pub fn read_rows(path: &std::path::Path) -> Vec<Vec<String>> {
    std::fs::read_to_string(path)
        .unwrap_or_else(|_| panic!("Failed to open {}", path.display()))
        .lines()
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}
