//! Asks the configured oracle for an opening Xiangqi move and checks it

use board_oracle_core::oracle::{extract_move_token, DEFAULT_BASE_URL};
use board_oracle_core::xiangqi::Xiangqi;
use board_oracle_core::{ApiSettings, Database, GameKind, OracleClient, OracleRequest};

#[tokio::main]
async fn main() {
    let settings = match std::env::args().nth(1) {
        Some(db_path) => match Database::open(&db_path).and_then(|db| db.load_settings()) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Failed to read settings from {}: {}", db_path, e);
                std::process::exit(1);
            }
        },
        None => ApiSettings {
            base_url: std::env::var("ORACLE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            api_key: std::env::var("ORACLE_API_KEY").unwrap_or_default(),
            model: std::env::var("ORACLE_MODEL").unwrap_or_default(),
        },
    };

    let client = match OracleClient::new(settings) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Usage: oracle_probe [settings.db]");
            eprintln!("  or set ORACLE_API_KEY and ORACLE_MODEL (ORACLE_BASE_URL optional)");
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let mut game = Xiangqi::new();
    println!("{}", game.position().board());
    println!("Asking {} ({})...", client.settings().model, client.settings().base_url);

    let request = OracleRequest {
        kind: GameKind::Xiangqi,
        fen: game.fen(),
        history: Vec::new(),
        side: game.turn().fen_char(),
    };

    let reply = match client.next_move(&request).await {
        Ok(reply) => reply,
        Err(e) => {
            eprintln!("Oracle failed: {}", e);
            std::process::exit(1);
        }
    };
    println!("Reply: {}", reply);

    let Some(token) = extract_move_token(&reply) else {
        eprintln!("[ERROR] reply contained no move");
        std::process::exit(1);
    };

    match game.apply_notation(&token) {
        Ok(true) => {
            println!("[OK] {} is legal", token);
            println!("{}", game.position().board());
        }
        Ok(false) => println!("[WARN] {} is not legal here", token),
        Err(e) => println!("[WARN] {}", e),
    }
}
