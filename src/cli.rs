use crate::atlas::MapKind;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// TOML config file; defaults to `urban-atlas.toml` when present
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Map shown at startup
    #[arg(short, long, value_enum, default_value_t = MapKind::World)]
    pub map: MapKind,

    /// Override the config's data directory
    #[arg(short, long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["urban-atlas"]);
        assert_eq!(cli.map, MapKind::World);
        assert!(cli.config.is_none());
        assert!(cli.data_dir.is_none());
    }

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from(["urban-atlas", "--map", "us", "--data-dir", "/tmp/atlas", "-c", "a.toml"]);
        assert_eq!(cli.map, MapKind::Us);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/atlas")));
        assert_eq!(cli.config, Some(PathBuf::from("a.toml")));
    }

    #[test]
    fn test_rejects_unknown_map() {
        assert!(Cli::try_parse_from(["urban-atlas", "--map", "mars"]).is_err());
    }
}
