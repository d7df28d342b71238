//! Built-in opening catalog.
//!
//! Compiled-in static data, built once on first access. Registration order is
//! the order openings are listed to the trainee.

use std::sync::LazyLock;

use crate::book::OpeningBook;
use crate::entry::{OpeningEntry, PlayerColor};

use PlayerColor::{Black, White};

/// Global catalog, built at first access.
pub static BUILTIN: LazyLock<OpeningBook> = LazyLock::new(|| {
    let book = OpeningBook::new(builtin_entries());
    tracing::info!(
        "Loaded opening catalog: {} openings, {} positions",
        book.len(),
        book.total_positions()
    );
    for entry in book.entries() {
        let orphans = crate::book::unreachable_keys(entry);
        if !orphans.is_empty() {
            tracing::debug!(opening = %entry.key, ?orphans, "Tree keys not reachable from the start position");
        }
    }
    book
});

/// The catalog entries in registration order.
pub fn builtin_entries() -> Vec<OpeningEntry> {
    vec![
        OpeningEntry::sequence("ruy", "Ruy Lopez", White, &["e4", "e5", "Nf3", "Nc6", "Bb5"]),
        OpeningEntry::sequence(
            "italian",
            "Italian Game",
            White,
            &["e4", "e5", "Nf3", "Nc6", "Bc4", "Bc5"],
        ),
        sicilian(),
        OpeningEntry::sequence("french", "French Defense", Black, &["e4", "e6", "d4", "d5", "Nc3"]),
        OpeningEntry::sequence(
            "carokann",
            "Caro-Kann Defense",
            Black,
            &["e4", "c6", "d4", "d5", "Nc3", "dxe4", "Nxe4", "Bf5"],
        ),
        OpeningEntry::sequence(
            "scandinavian",
            "Scandinavian Defense",
            Black,
            &["e4", "d5", "exd5", "Qxd5", "Nc3", "Qa5"],
        ),
        OpeningEntry::sequence("pirc", "Pirc Defense", Black, &["e4", "d6", "d4", "Nf6", "Nc3", "g6"]),
        OpeningEntry::sequence("modern", "Modern Defense", Black, &["e4", "g6", "d4", "Bg7", "Nc3", "d6"]),
        OpeningEntry::sequence(
            "kingsindian",
            "King's Indian Defense",
            Black,
            &["d4", "Nf6", "c4", "g6", "Nc3", "Bg7", "e4", "d6"],
        ),
        OpeningEntry::sequence(
            "nimzo",
            "Nimzo-Indian Defense",
            Black,
            &["d4", "Nf6", "c4", "e6", "Nc3", "Bb4"],
        ),
        queens_gambit(),
        OpeningEntry::sequence(
            "london",
            "London System",
            White,
            &["d4", "d5", "Nf3", "Nf6", "Bf4", "e6", "e3", "c5", "c3", "Nc6"],
        ),
        OpeningEntry::sequence("english", "English Opening", White, &["c4", "e5", "Nc3", "Nf6"]),
    ]
}

fn sicilian() -> OpeningEntry {
    OpeningEntry::tree(
        "sicilian",
        "Sicilian Defense",
        Black,
        &[
            ("", "e4"),
            ("e4", "c5"),
            ("e4 c5", "Nf3 Nc3"),
            ("e4 c5 Nf3", "d6 Nc6 e6"),
            // Najdorf / Dragon
            ("e4 c5 Nf3 d6", "d4"),
            ("e4 c5 Nf3 d6 d4", "cxd4"),
            ("e4 c5 Nf3 d6 d4 cxd4", "Nxd4"),
            ("e4 c5 Nf3 d6 d4 cxd4 Nxd4", "Nf6"),
            ("e4 c5 Nf3 d6 d4 cxd4 Nxd4 Nf6", "Nc3"),
            ("e4 c5 Nf3 d6 d4 cxd4 Nxd4 Nf6 Nc3", "a6 g6"),
            // Classical
            ("e4 c5 Nf3 Nc6", "d4"),
            ("e4 c5 Nf3 Nc6 d4", "cxd4"),
            ("e4 c5 Nf3 Nc6 d4 cxd4", "Nxd4"),
            ("e4 c5 Nf3 Nc6 d4 cxd4 Nxd4", "Nf6 g6"),
            // Taimanov / Kan
            ("e4 c5 Nf3 e6", "d4"),
            ("e4 c5 Nf3 e6 d4", "cxd4"),
            ("e4 c5 Nf3 e6 d4 cxd4", "Nxd4"),
            ("e4 c5 Nf3 e6 d4 cxd4 Nxd4", "a6 Nc6"),
            // Closed
            ("e4 c5 Nc3", "Nc6"),
            ("e4 c5 Nc3 Nc6", "g3 f4"),
            ("e4 c5 Nc3 Nc6 g3", "g6"),
            ("e4 c5 Nc3 Nc6 f4", "g6"),
        ],
    )
}

fn queens_gambit() -> OpeningEntry {
    OpeningEntry::tree(
        "queensgambit",
        "Queen's Gambit",
        White,
        &[
            ("", "d4"),
            ("d4", "d5"),
            ("d4 d5", "c4"),
            ("d4 d5 c4", "e6 c6 dxc4"),
            // Declined
            ("d4 d5 c4 e6", "Nc3"),
            ("d4 d5 c4 e6 Nc3", "Nf6 Be7"),
            ("d4 d5 c4 e6 Nc3 Nf6", "Bg5"),
            ("d4 d5 c4 e6 Nc3 Be7", "Nf3"),
            // Slav
            ("d4 d5 c4 c6", "Nf3"),
            ("d4 d5 c4 c6 Nf3", "Nf6"),
            ("d4 d5 c4 c6 Nf3 Nf6", "Nc3"),
            // Accepted
            ("d4 d5 c4 dxc4", "e3 Nf3"),
            ("d4 d5 c4 dxc4 e3", "Nf6 e5"),
            ("d4 d5 c4 dxc4 e3 Nf6", "Bxc4"),
            ("d4 d5 c4 dxc4 e3 e5", "Bxc4"),
            ("d4 d5 c4 dxc4 Nf3", "Nf6"),
            ("d4 d5 c4 dxc4 Nf3 Nf6", "e3"),
        ],
    )
}
