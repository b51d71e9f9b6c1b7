//! 局面分析演示
//!
//! 需要本地安装 UCI 引擎（默认 stockfish）。
//!
//! 运行方式:
//! ```bash
//! cargo run -p chess-engine --example analyze_position
//! ```

use chess_board::{Board, Fen, Piece, PieceKind, Side};
use chess_engine::{EngineConfig, EngineEvent, EngineHandle};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== 局面分析演示 ===\n");

    // 1. 构造局面：初始局面走 1.e4 后
    println!("1. 生成 FEN...");
    let mut board = Board::standard();
    board.remove('e', 2);
    board.place('e', 4, Piece::new(PieceKind::Pawn, Side::White).with_move_count(1))?;
    let fen = Fen::to_fen(&board, "black");
    println!("   {}\n", fen);

    // 2. 启动引擎
    let config = EngineConfig {
        default_depth: 14,
        ..Default::default()
    };
    println!("2. 启动引擎 {}...", config.program);
    let (handle, mut events) = EngineHandle::spawn(&config);

    // 3. 提交分析（就绪前提交，就绪后自动执行）
    println!("3. 分析中...\n");
    handle.analyze_default(fen).await;

    while let Some(event) = events.recv().await {
        match event {
            EngineEvent::Ready => println!("   ✅ 引擎就绪"),
            EngineEvent::Analysis(result) => match result.mate {
                Some(mate) => println!("   depth {:>2}  mate {:+}  {:?}", result.depth, mate, result.best_move),
                None => println!("   depth {:>2}  cp {:+}  {:?}", result.depth, result.score, result.best_move),
            },
            EngineEvent::BestMove(mv) => {
                println!("\n   最佳着法: {}", mv);
                break;
            }
        }
    }

    handle.shutdown().await;
    println!("\n=== 演示结束 ===");
    Ok(())
}
