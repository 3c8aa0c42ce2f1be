//! Command-line arguments

use clap::Parser;
use std::path::PathBuf;

/// CCPatch - create, save and recall BeatStep CC patches
///
/// Tweak knobs to build a patch, press Stop to save it, and pass a saved
/// file to load it back at startup.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Patch file to load at startup
    pub patch: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_arguments() {
        let args = Args::try_parse_from(["ccpatch"]).unwrap();
        assert!(args.patch.is_none());
    }

    #[test]
    fn test_patch_argument() {
        let args = Args::try_parse_from(["ccpatch", "patch-202603291405.json"]).unwrap();
        assert_eq!(args.patch, Some(PathBuf::from("patch-202603291405.json")));
    }

    #[test]
    fn test_rejects_flags_and_extra_arguments() {
        assert!(Args::try_parse_from(["ccpatch", "--config", "x"]).is_err());
        assert!(Args::try_parse_from(["ccpatch", "a.json", "b.json"]).is_err());
    }
}
