// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use super::*;

fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
    Cli::try_parse_from(args)
}

#[test]
fn test_new_with_image_file() {
    let cli = parse(&["ocat", "new", "-t", "Lamp", "--image", "lamp.jpg"]).unwrap();
    match cli.command {
        Command::New {
            title,
            description,
            image,
            output,
        } => {
            assert_eq!(title, "Lamp");
            assert_eq!(description, "");
            assert_eq!(image.image, Some(PathBuf::from("lamp.jpg")));
            assert!(image.image_url.is_none());
            assert_eq!(output, "text");
        }
        _ => panic!("Expected New command"),
    }
}

#[test]
fn test_new_with_image_url() {
    let cli = parse(&["ocat", "new", "-t", "Lamp", "-i", "https://img.example/l.jpg"]).unwrap();
    match cli.command {
        Command::New { image, .. } => {
            assert!(image.image.is_none());
            assert_eq!(image.image_url.as_deref(), Some("https://img.example/l.jpg"));
        }
        _ => panic!("Expected New command"),
    }
}

#[test]
fn test_new_requires_an_image() {
    assert!(parse(&["ocat", "new", "-t", "Lamp"]).is_err());
}

#[test]
fn test_new_rejects_both_image_sources() {
    let result = parse(&[
        "ocat", "new", "-t", "Lamp", "--image", "a.jpg", "-i", "https://img.example/a.jpg",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_new_rejects_blank_title() {
    assert!(parse(&["ocat", "new", "-t", "  ", "--image", "a.jpg"]).is_err());
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&["ocat", "list", "--verbose", "--config", "c.toml"]).unwrap();
    assert!(cli.verbose);
    assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
    assert!(matches!(cli.command, Command::List { .. }));
}
