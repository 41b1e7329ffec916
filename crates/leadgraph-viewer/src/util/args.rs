use anyhow::Result;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::util::config::ViewMode;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewerArgs {
    pub records: Option<PathBuf>,
    pub view: Option<ViewMode>,
    pub search: Option<String>,
    pub config: Option<PathBuf>,
    pub dump: bool,
}

pub fn parse_args() -> Result<ViewerArgs> {
    parse_args_from(std::env::args_os().skip(1))
}

pub fn parse_args_from<I>(args: I) -> Result<ViewerArgs>
where
    I: IntoIterator<Item = OsString>,
{
    let mut out = ViewerArgs::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        if arg == "--records" {
            let Some(path) = args.next() else {
                anyhow::bail!("--records expects a path");
            };
            out.records = Some(PathBuf::from(path));
        } else if arg == "--view" {
            let Some(value) = args.next() else {
                anyhow::bail!("--view expects network|flow");
            };
            out.view = Some(ViewMode::parse(&value.to_string_lossy())?);
        } else if arg == "--search" {
            let Some(term) = args.next() else {
                anyhow::bail!("--search expects a term");
            };
            out.search = Some(term.to_string_lossy().into_owned());
        } else if arg == "--config" {
            let Some(path) = args.next() else {
                anyhow::bail!("--config expects a path");
            };
            out.config = Some(PathBuf::from(path));
        } else if arg == "--dump" {
            out.dump = true;
        } else {
            anyhow::bail!("unknown argument: {:?}", arg);
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os(args: &[&str]) -> Vec<OsString> {
        args.iter().map(OsString::from).collect()
    }

    #[test]
    fn parses_all_flags() {
        let args = parse_args_from(os(&[
            "--records",
            "/tmp/r.json",
            "--view",
            "flow",
            "--search",
            "tom",
            "--config",
            "/tmp/viewer.toml",
            "--dump",
        ]))
        .expect("args parsed");
        assert_eq!(args.records, Some(PathBuf::from("/tmp/r.json")));
        assert_eq!(args.view, Some(ViewMode::Flow));
        assert_eq!(args.search.as_deref(), Some("tom"));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/viewer.toml")));
        assert!(args.dump);
    }

    #[test]
    fn no_flags_means_defaults() {
        assert_eq!(parse_args_from(os(&[])).expect("args"), ViewerArgs::default());
    }

    #[test]
    fn rejects_unknown_and_incomplete_flags() {
        assert!(parse_args_from(os(&["--verbose"])).is_err());
        assert!(parse_args_from(os(&["--records"])).is_err());
        assert!(parse_args_from(os(&["--view", "table"])).is_err());
    }
}
