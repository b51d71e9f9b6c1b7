mod cli;

use anyhow::{Context, Result};
use chess_board::{Board, Fen, Side};
use chess_engine::{EngineConfig, EngineEvent, EngineHandle};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Options, USAGE};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志（输出到 stderr，stdout 只输出分析结果）
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("chess_engine=info".parse()?)
            .add_directive("chess_analyzer=info".parse()?))
        .init();

    let options = Options::parse(std::env::args().skip(1))?;
    if options.help {
        println!("{}", USAGE);
        return Ok(());
    }

    let mut config = match &options.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(engine) = &options.engine {
        config.program = engine.clone();
    }

    let depth = options.depth.unwrap_or(config.default_depth);
    let fen = position_fen(&options)?;
    info!("Analyzing {} at depth {}", fen, depth);

    let (handle, mut events) = EngineHandle::spawn(&config);
    handle.analyze(fen, depth).await;

    let mut interrupted = false;
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(EngineEvent::Ready) => info!("Engine ready"),
                Some(event @ EngineEvent::Analysis(_)) => {
                    println!("{}", serde_json::to_string(&event)?);
                }
                Some(event @ EngineEvent::BestMove(_)) => {
                    println!("{}", serde_json::to_string(&event)?);
                    break;
                }
                None => {
                    warn!("Engine session ended without a best move");
                    break;
                }
            },
            _ = tokio::signal::ctrl_c() => {
                if interrupted {
                    break;
                }
                info!("Interrupted, stopping analysis (press Ctrl-C again to quit)");
                interrupted = true;
                handle.stop().await;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

/// 确定要分析的 FEN：显式给出的 FEN、棋盘快照或初始局面
fn position_fen(options: &Options) -> Result<String> {
    if let Some(fen) = &options.fen {
        return Ok(fen.clone());
    }

    let side = options.side.as_deref().unwrap_or(Side::White.name());
    let board = match &options.board {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read board snapshot {:?}", path))?;
            Board::from_json(&json)?
        }
        None => Board::standard(),
    };

    Ok(Fen::to_fen(&board, side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_board::INITIAL_FEN;

    #[test]
    fn test_default_position() {
        assert_eq!(position_fen(&Options::default()).unwrap(), INITIAL_FEN);
    }

    #[test]
    fn test_explicit_fen_is_passed_through() {
        let options = Options {
            fen: Some("4k3/8/8/8/8/8/8/4K3 b - - 0 1".to_string()),
            side: Some("white".to_string()),
            ..Default::default()
        };
        assert_eq!(position_fen(&options).unwrap(), "4k3/8/8/8/8/8/8/4K3 b - - 0 1");
    }

    #[test]
    fn test_board_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        std::fs::write(
            &path,
            r#"{ "squares": [
                { "file": "e", "rank": 1, "piece": { "type": "king", "side": "white", "moveCount": 0 } },
                { "file": "h", "rank": 1, "piece": { "type": "rook", "side": "white", "moveCount": 0 } },
                { "file": "e", "rank": 8, "piece": { "type": "king", "side": "black", "moveCount": 4 } }
            ] }"#,
        )
        .unwrap();

        let options = Options {
            board: Some(path),
            side: Some("black".to_string()),
            ..Default::default()
        };
        assert_eq!(
            position_fen(&options).unwrap(),
            "4k3/8/8/8/8/8/8/4K2R b K - 0 1"
        );
    }

    #[test]
    fn test_missing_board_file() {
        let options = Options {
            board: Some("/nonexistent/board.json".into()),
            ..Default::default()
        };
        assert!(position_fen(&options).is_err());
    }
}
