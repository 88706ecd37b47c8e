use std::path::PathBuf;

use clap::Parser;

#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug, Default)]
#[command(
    version,
    about = "Download and unpack the latest Heated Metal release when it changes"
)]
pub struct Args {
    /// Game directory to update (defaults to the current directory)
    #[arg(long, short = 'd', value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Settings file to use instead of the per-user settings.json
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Refuse to run unless the game directory contains the game executable
    #[arg(long)]
    pub verify_game_dir: bool,

    /// Delete the downloaded archive after a successful extraction
    #[arg(long)]
    pub remove_archive: bool,

    /// Exit immediately instead of waiting for Enter
    #[arg(long)]
    pub no_pause: bool,

    /// Narrate debug detail on the console
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;

    #[test]
    fn defaults_are_all_off() {
        let args = Args::try_parse_from(["hm-updater"]).expect("empty args should parse");

        assert!(args.dir.is_none());
        assert!(args.config.is_none());
        assert!(!args.verify_game_dir);
        assert!(!args.remove_archive);
        assert!(!args.no_pause);
        assert!(!args.debug);
    }

    #[test]
    fn parses_short_and_long_flags() {
        let args = Args::try_parse_from([
            "hm-updater",
            "-d",
            "/games/siege",
            "--config",
            "custom.json",
            "--verify-game-dir",
            "--remove-archive",
            "--no-pause",
        ])
        .expect("flags should parse");

        assert_eq!(args.dir.as_deref(), Some(std::path::Path::new("/games/siege")));
        assert_eq!(
            args.config.as_deref(),
            Some(std::path::Path::new("custom.json"))
        );
        assert!(args.verify_game_dir);
        assert!(args.remove_archive);
        assert!(args.no_pause);
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Args::try_parse_from(["hm-updater", "--install"]).is_err());
    }
}
