//! 命令行参数

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

pub const USAGE: &str = "\
Usage: chess-analyzer [OPTIONS]

Options:
  --fen <FEN>          Position to analyze (default: built from --board or the starting position)
  --board <PATH>       JSON board snapshot to convert to FEN
  --side <SIDE>        Side to move for --board/starting position (default: white)
  --depth <N>          Search depth (default: from config)
  --engine <PROGRAM>   UCI engine executable (default: from config)
  --config <PATH>      JSON engine config
  -h, --help           Print this help";

/// 命令行选项
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub fen: Option<String>,
    pub board: Option<PathBuf>,
    pub side: Option<String>,
    pub depth: Option<u32>,
    pub engine: Option<String>,
    pub config: Option<PathBuf>,
    pub help: bool,
}

impl Options {
    /// 解析参数（不含程序名）
    pub fn parse<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Options::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => options.help = true,
                "--fen" => options.fen = Some(value(&mut args, &arg)?),
                "--board" => options.board = Some(value(&mut args, &arg)?.into()),
                "--side" => options.side = Some(value(&mut args, &arg)?),
                "--engine" => options.engine = Some(value(&mut args, &arg)?),
                "--config" => options.config = Some(value(&mut args, &arg)?.into()),
                "--depth" => {
                    let depth = value(&mut args, &arg)?;
                    options.depth = Some(
                        depth
                            .parse()
                            .with_context(|| format!("Invalid depth: {}", depth))?,
                    );
                }
                other => bail!("Unknown argument: {}", other),
            }
        }

        if options.fen.is_some() && options.board.is_some() {
            bail!("--fen and --board cannot be used together");
        }

        Ok(options)
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .with_context(|| format!("Missing value for {}", flag))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Options> {
        Options::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(parse(&[]).unwrap(), Options::default());
    }

    #[test]
    fn test_parse_all_options() {
        let options = parse(&[
            "--fen",
            "8/8/8/8/8/8/8/8 w - - 0 1",
            "--depth",
            "20",
            "--engine",
            "/usr/games/stockfish",
            "--config",
            "engine.json",
        ])
        .unwrap();

        assert_eq!(options.fen.as_deref(), Some("8/8/8/8/8/8/8/8 w - - 0 1"));
        assert_eq!(options.depth, Some(20));
        assert_eq!(options.engine.as_deref(), Some("/usr/games/stockfish"));
        assert_eq!(options.config, Some(PathBuf::from("engine.json")));
        assert!(!options.help);
    }

    #[test]
    fn test_parse_board_and_side() {
        let options = parse(&["--board", "board.json", "--side", "black"]).unwrap();
        assert_eq!(options.board, Some(PathBuf::from("board.json")));
        assert_eq!(options.side.as_deref(), Some("black"));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&["--depth"]).is_err());
        assert!(parse(&["--depth", "deep"]).is_err());
        assert!(parse(&["--verbose"]).is_err());
        assert!(parse(&["--fen", "8/8/8/8/8/8/8/8", "--board", "b.json"]).is_err());
    }

    #[test]
    fn test_parse_help() {
        assert!(parse(&["-h"]).unwrap().help);
        assert!(parse(&["--help"]).unwrap().help);
    }
}
