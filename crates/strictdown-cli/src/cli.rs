use clap::Parser;
use std::path::PathBuf;
use strictdown_config::MIN_TAPE_ENTRIES;

#[derive(Parser, Debug)]
#[command(name = "strictdown")]
#[command(author, version)]
#[command(about = "Converts strict Markdown to HTML in bounded memory")]
#[command(after_help = "\
EXAMPLES:

    # Convert a file to stdout
    strictdown notes.md

    # Convert from stdin to a file, as XHTML
    cat notes.md | strictdown --xhtml -o notes.html

    # Write the default configuration
    strictdown --init-config

CONFIGURATION:

Settings are read from the --config path if given, otherwise from
~/.config/strictdown/config.toml. Command-line flags override both.

    max_tape_entries = 102400
    flavor = \"html\"
    chunk_size = 8192
    output_capacity = 4096
")]
pub struct Cli {
    /// Markdown file to convert (stdin if omitted)
    pub input: Option<PathBuf>,

    /// File to write HTML to (stdout if omitted)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Close void elements XHTML-style (`<br/>`)
    #[arg(long)]
    pub xhtml: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Bytes read from the input at a time
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub chunk_size: Option<u64>,

    /// Ceiling on parser tape entries (at least 64)
    #[arg(long, value_parser = clap::value_parser!(u64).range(MIN_TAPE_ENTRIES as u64..))]
    pub max_tape_entries: Option<u64>,

    /// Write the effective configuration to the config path and exit
    #[arg(long)]
    pub init_config: bool,
}
