//! Command line options.

use std::path::PathBuf;

use acl_sjson::{AclVersion, Error, Result};

/// What the tool was asked to do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Convert { input: PathBuf, output: PathBuf },
    Info { input: PathBuf },
}

/// Log verbosity selected by flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Trace,
}

impl Verbosity {
    /// `EnvFilter` directive for this level.
    pub const fn directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Parsed command line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Options {
    pub action: Option<Action>,
    /// Output revision; `None` keeps the source revision.
    pub target: Option<AclVersion>,
    pub verbosity: Verbosity,
    /// Arguments that were not understood, reported and then ignored.
    pub unknown: Vec<String>,
}

fn set_action(options: &mut Options, action: Action) -> Result<()> {
    if options.action.is_some() {
        return Err(Error::Argument("Only one action can be provided".into()));
    }
    options.action = Some(action);
    Ok(())
}

impl Options {
    /// Parse arguments, excluding the program name.
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--convert" => {
                    let (Some(input), Some(output)) = (args.next(), args.next()) else {
                        return Err(Error::Argument(
                            "--convert requires input and output files".into(),
                        ));
                    };
                    set_action(
                        &mut options,
                        Action::Convert {
                            input: input.into(),
                            output: output.into(),
                        },
                    )?;
                }
                "--info" => {
                    let Some(input) = args.next() else {
                        return Err(Error::Argument("--info requires an input file".into()));
                    };
                    set_action(&mut options, Action::Info { input: input.into() })?;
                }
                "--target" => {
                    let Some(version) = args.next() else {
                        return Err(Error::Argument("--target requires a version".into()));
                    };
                    let version = version.parse::<AclVersion>().map_err(|_| {
                        Error::Argument(format!("--target requires a valid version, got '{version}'"))
                    })?;
                    options.target = Some(version);
                }
                "-v" | "--verbose" => options.verbosity = Verbosity::Verbose,
                "-vv" | "--trace" => options.verbosity = Verbosity::Trace,
                "-q" | "--quiet" => options.verbosity = Verbosity::Quiet,
                _ => options.unknown.push(arg),
            }
        }

        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options> {
        Options::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_convert_with_target() {
        let options = parse(&["--convert", "in.acl", "out.acl.sjson", "--target", "2.0"]).unwrap();
        assert_eq!(
            options.action,
            Some(Action::Convert {
                input: "in.acl".into(),
                output: "out.acl.sjson".into(),
            })
        );
        assert_eq!(options.target, Some(AclVersion::V02_00_00));
        assert_eq!(options.verbosity, Verbosity::Normal);
    }

    #[test]
    fn test_target_defaults_to_source() {
        let options = parse(&["--info", "clip.acl"]).unwrap();
        assert_eq!(options.target, None);
        assert_eq!(options.action, Some(Action::Info { input: "clip.acl".into() }));
    }

    #[test]
    fn test_argument_errors() {
        assert!(matches!(parse(&["--convert", "in.acl"]), Err(Error::Argument(_))));
        assert!(matches!(parse(&["--info"]), Err(Error::Argument(_))));
        assert!(matches!(parse(&["--info", "a", "--target", "3.0"]), Err(Error::Argument(_))));
        assert!(matches!(parse(&["--info", "a", "--target"]), Err(Error::Argument(_))));
        assert!(matches!(parse(&["--info", "a", "--info", "b"]), Err(Error::Argument(_))));
    }

    #[test]
    fn test_unknown_and_verbosity() {
        let options = parse(&["-vv", "--frobnicate", "--info", "a.acl", "--info2"]).unwrap();
        assert_eq!(options.unknown, vec!["--frobnicate".to_string(), "--info2".to_string()]);
        assert_eq!(options.verbosity, Verbosity::Trace);
        assert_eq!(options.verbosity.directive(), "trace");

        let options = parse(&[]).unwrap();
        assert!(options.action.is_none());
    }
}
