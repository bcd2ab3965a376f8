use crate::episode::Inference;
use anyhow::{Result, bail};
use std::path::{Path, PathBuf};

/// Recognized video extensions, in the order they are processed.
pub const VIDEO_EXTENSIONS: [&str; 3] = ["mkv", "mp4", "avi"];

pub const SPECIALS_DIR: &str = "Specials";

pub fn parse_extension(path: &Path) -> Option<String> {
    if path.is_dir() {
        return None;
    }

    let ext = path.extension()?.to_str()?.to_lowercase();
    if !VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }

    Some(ext)
}

/// Canonical file name, e.g. `Show - 03.mkv` or `Show - 02 - Special.mp4`.
/// Episodes pad to two digits and are never truncated.
pub fn episode_file_name(show_name: &str, episode: u32, special: bool, ext: &str) -> String {
    if special {
        format!("{} - {:02} - Special.{}", show_name, episode, ext)
    } else {
        format!("{} - {:02}.{}", show_name, episode, ext)
    }
}

/// Show names are used verbatim in file names, so they may not be empty or
/// contain a path separator.
pub fn validate_show_name(show_name: &str) -> Result<()> {
    if show_name.is_empty() {
        bail!("Show name must not be empty");
    }
    if show_name.contains(['/', '\\']) {
        bail!("Show name must not contain a path separator: {:?}", show_name);
    }
    Ok(())
}

pub fn destination(target: &Path, show_name: &str, inference: Inference, ext: &str) -> PathBuf {
    let name = episode_file_name(show_name, inference.episode, inference.special, ext);
    if inference.special {
        target.join(SPECIALS_DIR).join(name)
    } else {
        target.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_episode_file_name() {
        assert_eq!(episode_file_name("MyShow", 3, false, "mkv"), "MyShow - 03.mkv");
        assert_eq!(
            episode_file_name("MyShow", 2, true, "mp4"),
            "MyShow - 02 - Special.mp4"
        );
    }

    #[test]
    fn test_episode_file_name_padding() {
        assert_eq!(episode_file_name("Show", 7, false, "avi"), "Show - 07.avi");
        assert_eq!(episode_file_name("Show", 42, false, "avi"), "Show - 42.avi");
        assert_eq!(episode_file_name("Show", 123, false, "avi"), "Show - 123.avi");
    }

    #[test]
    fn test_episode_file_name_is_stable() {
        assert_eq!(
            episode_file_name("Show Name", 11, true, "mkv"),
            episode_file_name("Show Name", 11, true, "mkv")
        );
    }

    #[test]
    fn test_destination_regular() {
        let inference = Inference {
            episode: 3,
            special: false,
        };
        assert_eq!(
            destination(Path::new("/out"), "MyShow", inference, "mkv"),
            Path::new("/out").join("MyShow - 03.mkv")
        );
    }

    #[test]
    fn test_destination_special() {
        let inference = Inference {
            episode: 2,
            special: true,
        };
        assert_eq!(
            destination(Path::new("/out"), "MyShow", inference, "mp4"),
            Path::new("/out")
                .join("Specials")
                .join("MyShow - 02 - Special.mp4")
        );
    }

    #[test]
    fn test_destination_keeps_show_name_verbatim() {
        let inference = Inference {
            episode: 1,
            special: false,
        };
        assert_eq!(
            destination(Path::new("/out"), "Star Wars: Andor", inference, "mkv"),
            Path::new("/out").join("Star Wars: Andor - 01.mkv")
        );
        assert_eq!(
            destination(Path::new("/out"), "What If...?", inference, "mkv"),
            Path::new("/out").join("What If...? - 01.mkv")
        );
    }

    #[test]
    fn test_validate_show_name() {
        assert!(validate_show_name("MyShow").is_ok());
        assert!(validate_show_name("Star Wars: Andor").is_ok());
        assert!(validate_show_name("What If...?").is_ok());
    }

    #[test]
    fn test_validate_show_name_rejects_path_separators() {
        assert!(validate_show_name("").is_err());
        assert!(validate_show_name("AC/DC").is_err());
        assert!(validate_show_name("..\\Show").is_err());
    }

    #[test]
    fn test_parse_extension_with_valid_extensions() {
        assert_eq!(
            parse_extension(Path::new("movie.mkv")).as_deref(),
            Some("mkv")
        );
        assert_eq!(
            parse_extension(Path::new("video.mp4")).as_deref(),
            Some("mp4")
        );
        assert_eq!(
            parse_extension(Path::new("film.avi")).as_deref(),
            Some("avi")
        );
    }

    #[test]
    fn test_parse_extension_with_unsupported_extensions() {
        assert_eq!(parse_extension(Path::new("clip.mov")), None);
        assert_eq!(parse_extension(Path::new("subs.srt")), None);
        assert_eq!(parse_extension(Path::new("document.txt")), None);
    }

    #[test]
    fn test_parse_extension_with_directory() {
        assert_eq!(parse_extension(Path::new("some_directory/")), None);
    }

    #[test]
    fn test_parse_extension_with_no_extension() {
        assert_eq!(parse_extension(Path::new("noextension")), None);
    }

    #[test]
    fn test_parse_extension_case_insensitive() {
        assert_eq!(
            parse_extension(Path::new("video.MKV")),
            Some("mkv".to_string())
        );
        assert_eq!(
            parse_extension(Path::new("video.Avi")),
            Some("avi".to_string())
        );
    }

    #[test]
    fn test_parse_extension_with_multiple_dots() {
        assert_eq!(
            parse_extension(Path::new("My.Show.S01E01.mp4")),
            Some("mp4".to_string())
        );
    }
}
