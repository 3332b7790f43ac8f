use std::path::PathBuf;

use crate::{
    error::{Error, Result},
    generators::Generator,
    playback::PlaybackConfig,
    solvers::Solver,
};

pub const USAGE: &str =
    "Usage: pathest [ALGORITHM] [GENERATOR|none] [ROWS COLS] [--seed N] [--log-dir DIR]";

/// Settings for one session of the terminal front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub solver: Solver,
    /// Maze or pattern drawn as walls before the traversal, if any
    pub generator: Option<Generator>,
    /// Grid size as (rows, cols). `None` fits the grid to the terminal.
    pub dimensions: Option<(u16, u16)>,
    pub seed: Option<u64>,
    pub log_dir: PathBuf,
    pub playback: PlaybackConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            solver: Solver::Bfs,
            generator: Some(Generator::RecurDiv),
            dimensions: None,
            seed: None,
            log_dir: PathBuf::from("."),
            playback: PlaybackConfig::default(),
        }
    }
}

impl AppConfig {
    /// Parses command-line arguments, without the executable name.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = AppConfig::default();
        let mut positional = Vec::new();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--seed" => {
                    let value = AppConfig::flag_value(&mut args, "--seed")?;
                    let seed = value
                        .parse::<u64>()
                        .map_err(|_| Error::Config(format!("invalid seed '{}'", value)))?;
                    config.seed = Some(seed);
                }
                "--log-dir" => {
                    config.log_dir = PathBuf::from(AppConfig::flag_value(&mut args, "--log-dir")?);
                }
                flag if flag.starts_with("--") => {
                    return Err(Error::Config(format!("unknown flag '{}'. {}", flag, USAGE)));
                }
                _ => positional.push(arg),
            }
        }

        let mut positional = positional.into_iter();
        if let Some(key) = positional.next() {
            config.solver = key.parse()?;
        }
        if let Some(key) = positional.next() {
            config.generator = match key.as_str() {
                "none" => None,
                _ => Some(key.parse()?),
            };
        }
        match (positional.next(), positional.next()) {
            (None, _) => {}
            (Some(rows), Some(cols)) => {
                config.dimensions = Some((
                    AppConfig::parse_dimension(&rows, "rows")?,
                    AppConfig::parse_dimension(&cols, "cols")?,
                ));
            }
            (Some(_), None) => {
                return Err(Error::Config(format!(
                    "grid size needs both ROWS and COLS. {}",
                    USAGE
                )));
            }
        }
        if let Some(extra) = positional.next() {
            return Err(Error::Config(format!(
                "unexpected argument '{}'. {}",
                extra, USAGE
            )));
        }

        Ok(config)
    }

    fn flag_value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
        args.next()
            .ok_or_else(|| Error::Config(format!("{} needs a value", flag)))
    }

    fn parse_dimension(value: &str, name: &str) -> Result<u16> {
        match value.parse::<u16>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(Error::Config(format!(
                "{} must be a number between 1 and {}, got '{}'",
                name,
                u16::MAX,
                value
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<AppConfig> {
        AppConfig::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults() {
        assert_eq!(parse(&[]).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_full_arguments() {
        let config = parse(&[
            "astar",
            "concentric-circles",
            "30",
            "60",
            "--seed",
            "7",
            "--log-dir",
            "/tmp/logs",
        ])
        .unwrap();
        assert_eq!(config.solver, Solver::AStar);
        assert_eq!(config.generator, Some(Generator::ConcentricCircles));
        assert_eq!(config.dimensions, Some((30, 60)));
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
    }

    #[test]
    fn test_no_generator() {
        let config = parse(&["--seed", "1", "dfs", "none"]).unwrap();
        assert_eq!(config.solver, Solver::Dfs);
        assert_eq!(config.generator, None);
    }

    #[test]
    fn test_invalid_arguments() {
        for args in [
            &["greedy"][..],
            &["bfs", "prim"],
            &["bfs", "none", "10"],
            &["bfs", "none", "0", "10"],
            &["bfs", "none", "10", "10", "10"],
            &["--seed"],
            &["--seed", "abc"],
            &["--speed", "3"],
        ] {
            assert!(matches!(parse(args), Err(Error::Config(_))), "{:?}", args);
        }
    }
}
