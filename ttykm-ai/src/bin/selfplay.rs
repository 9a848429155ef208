//! AI vs AI games from the command line.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- --white-level 3 --black-level 1 --seed 7
//!   RUST_LOG=debug cargo run --release --bin selfplay -- --opening sparse

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use ttykm_ai::{request_ai_move, AiConfig, AiDecision};
use ttykm_core::{Game, GameConfig, Opening, Player, Pos, Position, Timeline, BOARD_SIZE};

#[derive(Parser, Debug)]
#[command(name = "selfplay", version, about = "Play the AI against itself")]
struct Args {
    /// Search level for White (0-1 easy, 2 medium, 3+ hard)
    #[arg(long, default_value_t = 2)]
    white_level: u8,

    /// Search level for Black
    #[arg(long, default_value_t = 2)]
    black_level: u8,

    /// Starting layout: classic or sparse
    #[arg(long, default_value = "classic")]
    opening: Opening,

    /// Clone tokens per player
    #[arg(long, default_value_t = 4)]
    clones: u8,

    /// Seed for move sampling
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Stop after this many turns
    #[arg(long, default_value_t = 100)]
    max_turns: u32,

    /// Score root turns on one thread
    #[arg(long)]
    sequential: bool,

    /// Print the boards after every turn
    #[arg(long)]
    show: bool,
}

/// Text rendering of the three boards side by side.
fn render(position: &Position) -> String {
    let mut out = String::new();
    for t in Timeline::all() {
        out.push_str(&format!("{:<10}", format!("{:?}", t)));
    }
    out.push('\n');
    for row in 0..BOARD_SIZE as u8 {
        for t in Timeline::all() {
            let board = position.board(t);
            for col in 0..BOARD_SIZE as u8 {
                let c = match board.get(Pos::from_row_col(row, col)).map(|p| p.owner) {
                    Some(Player::One) => 'W',
                    Some(Player::Two) => 'B',
                    None => '.',
                };
                out.push(c);
                out.push(' ');
            }
            out.push_str("  ");
        }
        out.push('\n');
    }
    out
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = GameConfig {
        opening: args.opening,
        clone_tokens: args.clones,
        ..GameConfig::default()
    };
    let ai_for = |player: Player| {
        let level = match player {
            Player::One => args.white_level,
            Player::Two => args.black_level,
        };
        let ai = AiConfig::from_level(level);
        if args.sequential {
            ai.sequential()
        } else {
            ai
        }
    };

    let mut game = Game::new(config);
    let mut rng = StdRng::seed_from_u64(args.seed);

    println!("That Time You Killed Me - selfplay");
    println!("White level {}, Black level {}, seed {}", args.white_level, args.black_level, args.seed);
    println!();
    println!("{}", render(game.position()));

    while !game.is_over() && game.history().turns() < args.max_turns {
        let player = game.to_move();
        let decision = match request_ai_move(&game, player, &ai_for(player), &mut rng) {
            Ok(decision) => decision,
            Err(e) => {
                eprintln!("AI request failed: {}", e);
                std::process::exit(1);
            }
        };

        match decision {
            AiDecision::Play { plan, score } => {
                if let Err(e) = game.apply_turn(player, &plan) {
                    eprintln!("AI produced an illegal turn {:?}: {}", plan, e);
                    std::process::exit(1);
                }
                println!(
                    "turn {:>3} {}: {:?} ({}, {}) {:?} then {:?}, next {:?}  [score {}]",
                    game.history().turns(),
                    player.name(),
                    plan.board,
                    plan.from.row(),
                    plan.from.col(),
                    plan.first,
                    plan.second,
                    plan.next_board,
                    score
                );
                if args.show {
                    println!("{}", render(game.position()));
                }
            }
            AiDecision::NoLegalTurn { winner } => {
                println!("{} has no legal turn; {} wins", player.name(), winner.name());
                return;
            }
        }
    }

    println!();
    println!("{}", render(game.position()));
    match game.winner() {
        Some(winner) => println!("{} wins after {} turns", winner.name(), game.history().turns()),
        None => println!("No result after {} turns", game.history().turns()),
    }
}
