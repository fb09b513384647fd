use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "depreport",
    about = "Dependency Report - generate a Go module freshness report and publish it to gh-pages",
    version,
    author
)]
pub struct Cli {
    /// Directory in which the markdown report is written locally
    #[arg(long = "output-path", value_name = "DIR", default_value = "")]
    pub output_path: String,

    /// Path to the project directory (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub path: String,

    /// Project name used in the report title
    #[arg(long = "project-name", default_value = "CRI-O")]
    pub project_name: String,

    /// Repository URL used to link the reported commit
    #[arg(long = "repository-url", default_value = "https://github.com/cri-o/cri-o")]
    pub repository_url: String,

    /// Branch the report is published to
    #[arg(long, default_value = "gh-pages")]
    pub branch: String,

    /// Remote the publishing branch is pushed to
    #[arg(long, default_value = "origin")]
    pub remote: String,

    /// Go toolchain used to list modules
    #[arg(long = "go", value_name = "PROGRAM", default_value = "go")]
    pub go_binary: String,

    /// External go-mod-outdated compatible formatter (built-in formatter if omitted)
    #[arg(long, value_name = "PROGRAM")]
    pub formatter: Option<String>,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,
}
