use super::Parser;
use crate::logger::LogFormat;

#[derive(Parser, Debug)]
#[command(name = "bookshelf", about = "Book-collecting social service")]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,

    #[arg(long, value_enum, default_value_t = LogFormat::Full)]
    pub log_format: LogFormat,
}
