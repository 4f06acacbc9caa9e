// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Parse a string that must not be empty or whitespace-only.
fn non_empty_string(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("cannot be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}

const QUICKSTART_HELP: &str = "\
Get started:
  ocat list                          List the catalog, newest first
  ocat new -t \"Lamp\" --image <path>  Create an object
  ocat watch                         Follow the catalog live

Environment:
  OCAT_API_BASE   Catalog API base URL (default: http://localhost:3000)
  OCAT_LOG        Log filter, e.g. debug or ocat=trace";

#[derive(Parser)]
#[command(name = "ocat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Browse and follow an objects catalog with realtime updates")]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Read configuration from this file instead of the default location
    #[arg(long, global = true, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List all objects, newest first
    List {
        /// Output format (text, json)
        #[arg(long, short, default_value = "text")]
        output: String,
    },

    /// Show one object
    #[command(arg_required_else_help = true)]
    Show {
        /// Object ID
        id: String,

        /// Output format (text, json)
        #[arg(long, short, default_value = "text")]
        output: String,
    },

    /// Create an object
    #[command(after_help = "Examples:\n  \
        ocat new -t \"Desk lamp\" --image ./lamp.jpg\n  \
        ocat new -t \"Chair\" -d \"Oak, 1960s\" -i https://img.example/chair.jpg")]
    New {
        /// Title
        #[arg(long, short, value_parser = non_empty_string)]
        title: String,

        /// Description
        #[arg(long, short, default_value = "")]
        description: String,

        #[command(flatten)]
        image: ImageArgs,

        /// Output format (text, json)
        #[arg(long, short, default_value = "text")]
        output: String,
    },

    /// Delete an object (deleting an already deleted object succeeds)
    #[command(arg_required_else_help = true)]
    Delete {
        /// Object ID
        id: String,
    },

    /// Follow the catalog live, falling back to manual refresh
    #[command(after_help = "Keys (followed by Enter):\n  \
        r   Refresh the list\n  \
        t   Retry the live connection (manual mode only)\n  \
        d   Dismiss the manual mode notice\n  \
        q   Quit (Ctrl-C also quits)")]
    Watch,
}

/// Image of a new object: a local file to upload, or a hosted URL.
#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct ImageArgs {
    /// Image file to upload (jpg, png, gif, webp, heic)
    #[arg(long, value_name = "path")]
    pub image: Option<PathBuf>,

    /// URL of an already uploaded image
    #[arg(long, short, value_parser = non_empty_string)]
    pub image_url: Option<String>,
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
