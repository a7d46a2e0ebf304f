use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use pcset::catalog::DEFAULT_TIMEOUT;
use pcset::config::{CatalogSource, Config};
use pcset::{AnalysisResult, Analyzer};
use tracing::level_filters::LevelFilter;

/// Analyze a pitch-class set: normal form, prime form, interval-class vector
/// and Forte number.
#[derive(Parser)]
#[command(name = "pcset", version)]
struct Options {
    /// Pitch classes as integers or note names, e.g. `C Eb G` or `0,3,7`
    #[arg(allow_negative_numbers = true)]
    set: Vec<String>,

    /// Read catalog settings from a TOML file
    #[arg(long, env = "PCSET_CONFIG")]
    config: Option<PathBuf>,

    /// Prime-form to Forte number map (JSON)
    #[arg(long, requires = "z_relations", conflicts_with = "remote")]
    forte_map: Option<PathBuf>,

    /// Forte number to Z-mate map (JSON)
    #[arg(long, requires = "forte_map")]
    z_relations: Option<PathBuf>,

    /// Query a catalog service at this address instead of local data
    #[arg(long)]
    remote: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Disable logging
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Options {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::OFF;
        }

        match self.verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    /// Command-line overrides win over the configuration file.
    fn catalog_source(&self) -> Result<CatalogSource> {
        if let Some(ref address) = self.remote {
            return Ok(CatalogSource::Remote {
                address: address.clone(),
                timeout_ms: DEFAULT_TIMEOUT.as_millis() as u64,
            });
        }

        if self.forte_map.is_some() {
            return Ok(CatalogSource::Local {
                forte_map: self.forte_map.clone(),
                z_relations: self.z_relations.clone(),
            });
        }

        match self.config {
            Some(ref path) => Ok(Config::load(path)
                .with_context(|| format!("Failed to load config file: {:?}", path))?
                .catalog),
            None => Ok(CatalogSource::default()),
        }
    }
}

fn print_report(result: &AnalysisResult) {
    println!("Parsed:       {}", result.parsed);
    println!("Normal form:  {}", result.normal_form);
    println!("Prime form:   {}", result.prime_form);
    if let Some(ref alternate) = result.divergent_prime_form {
        println!("              (digit-string rule gives {})", alternate);
    }
    println!("IC vector:    {}", result.interval_class_vector);
    println!("Forte number: {}", result.classification);

    let derived = if result.complement_verified || !result.complement_classification.is_classified() {
        ""
    } else {
        " (derived)"
    };
    println!("Complement:   {} {}{}", result.complement, result.complement_classification.code_str(), derived);
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = Options::parse();

    tracing_subscriber::fmt()
        .with_max_level(options.log_level())
        .with_writer(std::io::stderr)
        .init();

    let catalog = options
        .catalog_source()?
        .open()
        .await
        .context("Failed to open catalog")?;

    let mut analyzer = Analyzer::new(catalog);
    let input = options.set.join(" ");

    let result = match analyzer.analyze(&input).await? {
        Some(result) => result,
        None => return Ok(()),
    };

    if options.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_report(&result);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use clap::CommandFactory;

    #[test]
    fn options_are_consistent() {
        Options::command().debug_assert();
    }

    #[test]
    fn negative_integers_are_pitch_classes() {
        let options = Options::try_parse_from(["pcset", "0", "-1", "4"]).unwrap();
        assert_eq!(options.set, vec!["0", "-1", "4"]);
        assert_eq!(options.verbose, 0);

        let options = Options::try_parse_from(["pcset", "-v", "-13", "+2", "C"]).unwrap();
        assert_eq!(options.set, vec!["-13", "+2", "C"]);
        assert_eq!(options.verbose, 1);
    }

    #[test]
    fn catalog_paths_require_each_other() {
        assert!(Options::try_parse_from(["pcset", "--forte-map", "map.json", "C"]).is_err());
        assert!(Options::try_parse_from(["pcset", "--remote", "localhost:7878", "C"]).is_ok());
    }
}
