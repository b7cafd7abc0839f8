//! Working directory and configuration shared by the commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use tantivy::Index;
use tracing::debug;
use xtf_config::{CONFIG_FILENAME, Config};

/// Everything a command needs before it touches an index.
pub struct CommandContext {
    /// Directory relative paths resolve against.
    pub cwd: PathBuf,
    /// Loaded configuration (default if no config file was found).
    pub config: Config,
}

impl CommandContext {
    /// Loads configuration from `explicit`, or from `xtf.toml` in the
    /// current directory when it exists.
    ///
    /// An explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ExitCode> {
        let cwd = working_dir()?;
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Some(cwd.join(CONFIG_FILENAME)).filter(|path| path.exists()),
        };

        let config = match path {
            Some(path) => read_config(&path)?,
            None => {
                debug!("no configuration file, using defaults");
                Config::default()
            }
        };
        Ok(Self { cwd, config })
    }

    /// Resolves an index directory, falling back to the configured one.
    pub fn index_dir(&self, explicit: Option<&Path>) -> PathBuf {
        let path = explicit.unwrap_or(&self.config.index.path);
        if path.is_relative() {
            self.cwd.join(path)
        } else {
            path.to_path_buf()
        }
    }

    /// Opens the index at `dir`, exiting with a consistent error on failure.
    pub fn open_index(dir: &Path) -> Result<Index, ExitCode> {
        Index::open_in_dir(dir).map_err(|e| {
            eprintln!("error: failed to open index {}: {e}", dir.display());
            ExitCode::FAILURE
        })
    }
}

/// The working directory, or a failure exit after reporting why.
fn working_dir() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: cannot read working directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads `path`, or reports the error and fails.
fn read_config(path: &Path) -> Result<Config, ExitCode> {
    Config::load(path).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
