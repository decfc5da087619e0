use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "apexec", about = "Execute anonymous Apex against a Salesforce org", version)]
pub struct Cli {
    /// Apex source file to execute. Reads piped stdin when omitted.
    #[arg(value_name = "FILE")]
    pub file: Option<String>,

    /// Execute only a 1-based inclusive line range of the input, e.g. 3:10.
    #[arg(long, value_name = "START:END")]
    pub lines: Option<String>,

    /// Omit the debugging header so the server produces no debug log.
    #[arg(long = "no-debug-log")]
    pub no_debug_log: bool,

    /// Print the normalized result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Suppress the debug log in human-readable output.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}
