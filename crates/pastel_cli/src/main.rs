//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `pastel_core` linkage.
//! - Print the persisted board in stacking order for quick local checks.

use pastel_core::{Board, BoardConfig, SqliteBlobStore, SystemClock};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("pastel_core ping={}", pastel_core::ping());
    println!("pastel_core version={}", pastel_core::core_version());

    let config = BoardConfig::from_env();
    let storage = match SqliteBlobStore::open(&config.db_path) {
        Ok(storage) => storage,
        Err(err) => {
            eprintln!(
                "pastel_core board open failed path={} error={err}",
                config.db_path.display()
            );
            return ExitCode::FAILURE;
        }
    };
    let board = Board::open(storage, SystemClock, &config);
    let notes = board.render_list();
    println!(
        "pastel_core board key={} notes={}",
        config.storage_key,
        notes.len()
    );
    for note in notes {
        let left = board
            .time_left(&note.id)
            .map(|left| left.to_string())
            .unwrap_or_default();
        println!(
            "{} kind={} z={} left={}",
            note.id,
            note.kind.as_str(),
            note.z_order,
            left
        );
    }
    ExitCode::SUCCESS
}
