//! CLI definitions for expyre.

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};

use expyre_protocols::GuardSet;

/// expyre CLI.
#[derive(Parser, Debug)]
#[command(name = "expyre")]
#[command(about = "Schedule paths for deletion")]
#[command(version)]
#[command(override_usage = "expyre [-m] [-a] -p PATH TIMESPEC...\n       \
    expyre -l\n       \
    expyre -L [DIR]\n       \
    expyre -r PATH...")]
#[command(after_help = "Timespec examples: now+2days, 18:00 tomorrow, 18:00 2017-12-31, 5pm Friday")]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(long, default_value = "table")]
    pub format: String,

    /// Do not expire path if modified before scheduled time
    #[arg(short = 'm', long, help_heading = "Scheduling")]
    pub unless_modified: bool,

    /// Do not expire path if accessed before scheduled time
    #[arg(short = 'a', long, help_heading = "Scheduling")]
    pub unless_accessed: bool,

    /// Path to schedule for expiry
    #[arg(short, long, help_heading = "Scheduling")]
    pub path: Option<PathBuf>,

    /// Time specification in the same format as recognized by at(1)
    #[arg(value_name = "TIMESPEC", trailing_var_arg = true, help_heading = "Scheduling")]
    pub timespec: Vec<String>,

    /// List paths scheduled for expiry
    #[arg(short, long, help_heading = "Listing")]
    pub list: bool,

    /// List paths scheduled for expiry within directory
    #[arg(short = 'L', long, value_name = "DIR", num_args = 0..=1, help_heading = "Listing")]
    pub list_in: Option<Option<PathBuf>>,

    /// Remove specified paths from expiry schedule
    #[arg(short, long, value_name = "PATH", num_args = 1.., help_heading = "Removal")]
    pub reset: Vec<PathBuf>,
}

/// What a validated command line asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Request {
    Schedule {
        path: PathBuf,
        timespec: String,
        guards: GuardSet,
    },
    List {
        under: Option<PathBuf>,
    },
    Reset {
        paths: Vec<PathBuf>,
    },
}

impl Cli {
    /// Check that only one group of options was used and that scheduling
    /// has both a path and a timespec.
    pub(crate) fn into_request(self) -> Result<Request, clap::Error> {
        let scheduling = self.unless_modified
            || self.unless_accessed
            || self.path.is_some()
            || !self.timespec.is_empty();
        let listing = self.list || self.list_in.is_some();
        let resetting = !self.reset.is_empty();

        if [scheduling, listing, resetting].iter().filter(|set| **set).count() > 1 {
            return Err(Cli::command().error(
                ErrorKind::ArgumentConflict,
                "Conflicting options provided; you can either schedule paths for deletion or list or reset",
            ));
        }

        if listing {
            let under = self.list_in.map(|dir| dir.unwrap_or_else(|| PathBuf::from(".")));
            return Ok(Request::List { under });
        }

        if resetting {
            return Ok(Request::Reset { paths: self.reset });
        }

        let timespec = join_timespec(&self.timespec);
        let Some(path) = self.path else {
            return Err(Cli::command().error(ErrorKind::MissingRequiredArgument, "Missing path"));
        };
        if timespec.is_empty() {
            return Err(Cli::command().error(ErrorKind::MissingRequiredArgument, "Missing timespec"));
        }

        Ok(Request::Schedule {
            path,
            timespec,
            guards: GuardSet::new(self.unless_accessed, self.unless_modified),
        })
    }
}

/// Strip `@` and spaces around each word and join the rest with spaces.
fn join_timespec(words: &[String]) -> String {
    words
        .iter()
        .map(|word| word.trim_matches(|c| c == '@' || c == ' '))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Request, clap::Error> {
        let mut argv = vec!["expyre"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv)?.into_request()
    }

    #[test]
    fn test_schedule_request() {
        let request = parse(&["--unless-modified", "--path", "/path/to/file", "now+3days"]).unwrap();
        assert_eq!(
            request,
            Request::Schedule {
                path: PathBuf::from("/path/to/file"),
                timespec: "now+3days".to_string(),
                guards: GuardSet::new(false, true),
            }
        );
    }

    #[test]
    fn test_schedule_joins_timespec_words() {
        match parse(&["-a", "-p", "foo", "@", "18:00", "tomorrow"]).unwrap() {
            Request::Schedule { timespec, guards, .. } => {
                assert_eq!(timespec, "18:00 tomorrow");
                assert_eq!(guards, GuardSet::new(true, false));
            }
            other => panic!("Expected Schedule, got {:?}", other),
        }
    }

    #[test]
    fn test_join_timespec_strips_markers() {
        let words = vec!["@now".to_string(), "+".to_string(), " 3 ".to_string(), "days@".to_string()];
        assert_eq!(join_timespec(&words), "now + 3 days");
        assert_eq!(join_timespec(&["@".to_string()]), "");
    }

    #[test]
    fn test_missing_path() {
        let err = parse(&["now"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.to_string().contains("Missing path"));

        let err = parse(&[]).unwrap_err();
        assert!(err.to_string().contains("Missing path"));
    }

    #[test]
    fn test_missing_timespec() {
        let err = parse(&["-p", "/path/to/file"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.to_string().contains("Missing timespec"));

        let err = parse(&["-p", "/path/to/file", "@"]).unwrap_err();
        assert!(err.to_string().contains("Missing timespec"));
    }

    #[test]
    fn test_list_requests() {
        assert_eq!(parse(&["-l"]).unwrap(), Request::List { under: None });
        assert_eq!(
            parse(&["-L"]).unwrap(),
            Request::List { under: Some(PathBuf::from(".")) }
        );
        assert_eq!(
            parse(&["--list-in", "/var/tmp"]).unwrap(),
            Request::List { under: Some(PathBuf::from("/var/tmp")) }
        );
    }

    #[test]
    fn test_reset_request() {
        assert_eq!(
            parse(&["--reset", "/path/to/file1", "/path/to/file2"]).unwrap(),
            Request::Reset {
                paths: vec![PathBuf::from("/path/to/file1"), PathBuf::from("/path/to/file2")],
            }
        );
    }

    #[test]
    fn test_conflicting_options() {
        for args in [
            &["-l", "-p", "/path/to/file"][..],
            &["-l", "-m"][..],
            &["-L", "/tmp", "-a"][..],
            &["-l", "-r", "/path/to/file"][..],
            &["-m", "-r", "/path/to/file"][..],
            &["-p", "/path/to/file", "-r", "/path/to/other"][..],
        ] {
            let err = parse(args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ArgumentConflict, "args: {:?}", args);
            assert!(err.to_string().contains("Conflicting options provided"));
        }
    }

    #[test]
    fn test_format_defaults_to_table() {
        let cli = Cli::try_parse_from(["expyre", "-l"]).unwrap();
        assert_eq!(cli.format, "table");
        let cli = Cli::try_parse_from(["expyre", "-l", "--format", "json"]).unwrap();
        assert_eq!(cli.format, "json");
    }
}
