use std::fs::OpenOptions;
use std::path::PathBuf;

/// Where log lines go.
pub enum LogTarget {
    Stderr,
    /// Append to a file; used while the TUI owns the terminal.
    File(Option<PathBuf>),
}

pub fn default_log_path() -> Option<PathBuf> {
    crate::config::project_dirs().map(|dirs| dirs.cache_dir().join("movie-explorer.log"))
}

/// `level` applies until `RUST_LOG` says otherwise.
pub fn setup_logging(target: LogTarget, level: log::LevelFilter) {
    let mut builder = env_logger::Builder::new();

    builder.filter(None, level);

    if let Ok(rust_log) = std::env::var("RUST_LOG") {
        builder.parse_filters(&rust_log);
    }

    if let LogTarget::File(path) = target {
        let file = path.and_then(|path| {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).ok()?;
            }
            OpenOptions::new().create(true).append(true).open(path).ok()
        });
        match file {
            Some(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            // Never write over the TUI.
            None => {
                builder.target(env_logger::Target::Pipe(Box::new(std::io::sink())));
            }
        }
    }

    builder.init();
}
