//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tokenlint",
    version,
    about = "Lint design tokens with static and AI-assisted rules",
    long_about = "tokenlint checks design tokens and the code that consumes them. Static rules run locally; AI rules run when GEMINI_API_KEY or OPENAI_API_KEY is set.\n\nConfiguration precedence: CLI > tokenlint.toml > defaults.",
    after_help = "Examples:\n  tokenlint lint --tokens design/tokens.json --files 'src/**/*.css'\n  tokenlint lint --no-ai --output json\n  tokenlint lint --provider openai --model gpt-4o --report-md lint.md\n  tokenlint rules",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version
    #[command(about = "Show version", long_about = "Print the current tokenlint version.")]
    Version,
    /// List available rules
    #[command(
        about = "List rules",
        long_about = "List static and AI rules, including custom AI rules from tokenlint.toml."
    )]
    Rules {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
    },
    /// Lint design tokens and code files
    #[command(
        about = "Run lint checks",
        long_about = "Run static rules over tokens and code files, then AI rules over the selected candidate tokens. Exits 1 when any error diagnostic is reported, 2 on configuration or input errors.",
        after_help = "Examples:\n  tokenlint lint\n  tokenlint lint --files 'src/**/*.{css,tsx}' --output markdown"
    )]
    Lint {
        #[arg(long, help = "Repository root (default: current dir)")]
        repo_root: Option<String>,
        #[arg(long, help = "Token file (default: tokens.json)")]
        tokens: Option<String>,
        #[arg(long = "files", num_args = 1.., help = "Glob patterns for code files to scan")]
        files: Vec<String>,
        #[arg(long, help = "Output mode: human|json|markdown (default: human)")]
        output: Option<String>,
        #[arg(long, help = "Also write the JSON report to this path")]
        report_json: Option<String>,
        #[arg(long, help = "Also write the Markdown report to this path")]
        report_md: Option<String>,
        #[arg(long, action = clap::ArgAction::SetTrue, help = "Skip AI rules")]
        no_ai: bool,
        #[arg(long, help = "LLM provider: gemini|openai")]
        provider: Option<String>,
        #[arg(long, help = "Pin a single model instead of the fallback list")]
        model: Option<String>,
        #[arg(long, help = "API key (overrides GEMINI_API_KEY / OPENAI_API_KEY)")]
        api_key: Option<String>,
        #[arg(long, short = 'v', action = clap::ArgAction::SetTrue, help = "Debug logging to stderr")]
        verbose: bool,
    },
}
