use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct IndexArgs {
    /// Glob of text files to learn before reading commands; repeatable
    #[arg(long)]
    pub corpus: Vec<String>,
    #[arg(long, default_value_t = 1)]
    pub min_word_len: usize,
    /// Suggestions returned by `complete` when no limit is given
    #[arg(long, default_value_t = 5)]
    pub limit: usize,
    #[arg(long)]
    pub json: bool,
    #[arg(long)]
    pub debug: bool,
}
