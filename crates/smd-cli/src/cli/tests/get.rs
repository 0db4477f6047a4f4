//! Tests for the get subcommand.

use super::parse;
use crate::cli::CliCommand;

#[test]
fn cli_parse_get() {
    match parse(&["smd", "get", "youtube", "video", "https://youtu.be/abc"]) {
        CliCommand::Get {
            platform,
            content_type,
            url,
            format,
            download_dir,
        } => {
            assert_eq!(platform, "youtube");
            assert_eq!(content_type, "video");
            assert_eq!(url, "https://youtu.be/abc");
            assert!(format.is_none());
            assert!(download_dir.is_none());
        }
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_get_format_and_dir() {
    match parse(&[
        "smd",
        "get",
        "tiktok",
        "video",
        "https://www.tiktok.com/@a/video/1",
        "-f",
        "audio",
        "--download-dir",
        "/tmp/out",
    ]) {
        CliCommand::Get {
            format,
            download_dir,
            ..
        } => {
            assert_eq!(format.as_deref(), Some("audio"));
            assert_eq!(
                download_dir.as_deref(),
                Some(std::path::Path::new("/tmp/out"))
            );
        }
        _ => panic!("expected Get with --format and --download-dir"),
    }
}

#[test]
fn cli_parse_get_long_format() {
    match parse(&[
        "smd",
        "get",
        "youtube",
        "playlist",
        "https://www.youtube.com/playlist?list=PL1",
        "--format",
        "video_mp4",
    ]) {
        CliCommand::Get { format, .. } => assert_eq!(format.as_deref(), Some("video_mp4")),
        _ => panic!("expected Get"),
    }
}

#[test]
fn cli_parse_get_requires_url() {
    use clap::Parser;
    assert!(crate::cli::Cli::try_parse_from(["smd", "get", "youtube", "video"]).is_err());
}
