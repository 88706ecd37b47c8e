use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use hm_platform::AppPaths;

const LOG_TARGET_PREFIX: &str = "hm_";

/// Append-only debug log capped at `max_size` bytes.
///
/// Once the cap is passed the oldest half of the file is dropped at a line
/// boundary. A file deleted while the updater runs is created again on the
/// next write.
struct DebugLogFile {
    path: PathBuf,
    max_size: u64,
    file: File,
    len: u64,
}

impl DebugLogFile {
    fn open(path: PathBuf, max_size: u64) -> io::Result<Self> {
        let (file, len) = open_capped(&path, max_size)?;
        Ok(Self {
            path,
            max_size,
            file,
            len,
        })
    }

    fn reopen(&mut self) -> io::Result<()> {
        let (file, len) = open_capped(&self.path, self.max_size)?;
        self.file = file;
        self.len = len;
        Ok(())
    }
}

impl Write for DebugLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.len > self.max_size || !self.path.exists() {
            self.reopen()?;
        }
        let written = self.file.write(buf)?;
        self.len += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_capped(path: &Path, max_size: u64) -> io::Result<(File, u64)> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if std::fs::metadata(path).is_ok_and(|metadata| metadata.len() > max_size) {
        drop_oldest_half(path)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let len = file.metadata()?.len();
    Ok((file, len))
}

/// Keep the lines that start in the second half of the file.
fn drop_oldest_half(path: &Path) -> io::Result<()> {
    let contents = std::fs::read(path)?;
    let half = contents.len() / 2;
    let keep_from = contents[half..]
        .iter()
        .position(|&byte| byte == b'\n')
        .map_or(contents.len(), |pos| half + pos + 1);
    std::fs::write(path, &contents[keep_from..])
}

fn console_level(debug_enabled: bool) -> LevelFilter {
    if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Narrate progress on stdout and keep a debug log in the data directory.
///
/// Returns the log file path when file logging could be set up.
pub fn init_logging(debug_enabled: bool, max_log_size: u64) -> Option<PathBuf> {
    let console_config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_location_level(LevelFilter::Off)
        .add_filter_allow_str(LOG_TARGET_PREFIX)
        .build();
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        console_level(debug_enabled),
        console_config,
        TerminalMode::Stdout,
        ColorChoice::Auto,
    ));

    let log_path = AppPaths::new().ok().and_then(|paths| {
        paths.ensure_dirs().ok()?;
        let log_path = paths.log_file();

        let file_config = ConfigBuilder::new()
            .set_time_format_rfc3339()
            .add_filter_allow_str(LOG_TARGET_PREFIX)
            .build();
        let writer = DebugLogFile::open(log_path.clone(), max_log_size).ok()?;
        loggers.push(WriteLogger::new(LevelFilter::Debug, file_config, writer));
        Some(log_path)
    });

    let _ = CombinedLogger::init(loggers);

    if let Some(path) = &log_path {
        log::debug!("Debug log file: {}", path.display());
    }
    log_path
}
