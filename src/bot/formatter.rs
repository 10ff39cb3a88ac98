//! Reply text formatting.

use crate::challonge::Tournament;

/// Escape Discord markdown special characters in remote text.
///
/// Tournament and participant names are chosen by organisers and players,
/// so they are shown literally.
pub fn escape_discord_markdown(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace('*', "\\*")
        .replace('_', "\\_")
        .replace('~', "\\~")
        .replace('|', "\\|")
}

/// Header of the tournament listing.
pub fn tournaments_header() -> &'static str {
    "**Tournaments:**"
}

/// `<name> (id: <id>)`
pub fn tournament_line(tournament: &Tournament) -> String {
    format!(
        "{} (id: {})",
        escape_discord_markdown(&tournament.name),
        escape_discord_markdown(tournament.id.as_str())
    )
}

/// Header of one tournament's open match block.
pub fn open_matches_header(tournament_name: &str) -> String {
    format!(
        "**Open matches for \"{}\":**",
        escape_discord_markdown(tournament_name)
    )
}

/// `<player one> vs. <player two>`
pub fn match_line(player_one: &str, player_two: &str) -> String {
    format!(
        "{} vs. {}",
        escape_discord_markdown(player_one),
        escape_discord_markdown(player_two)
    )
}

/// Find the last UTF-8 char boundary at or before `byte_index` in `s`.
fn floor_char_boundary(s: &str, byte_index: usize) -> usize {
    if byte_index >= s.len() {
        return s.len();
    }
    let mut i = byte_index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Split a reply into chunks of at most `max_len` bytes.
///
/// Splits on line breaks when possible so listing lines stay whole. A single
/// line longer than `max_len` is hard split at a char boundary.
pub fn split_message(message: &str, max_len: usize) -> Vec<String> {
    if message.len() <= max_len {
        return vec![message.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = message;

    while !remaining.is_empty() {
        remaining = remaining.trim_start_matches('\n');
        if remaining.is_empty() {
            break;
        }

        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        let split_at = floor_char_boundary(remaining, max_len);

        // Always make progress, even if the first char is wider than max_len.
        if split_at == 0 {
            let first_char_end = remaining
                .char_indices()
                .nth(1)
                .map(|(i, _)| i)
                .unwrap_or(remaining.len());
            chunks.push(remaining[..first_char_end].to_string());
            remaining = &remaining[first_char_end..];
            continue;
        }

        let chunk = &remaining[..split_at];
        match chunk.rfind('\n') {
            Some(newline) if newline > 0 => {
                chunks.push(remaining[..newline].to_string());
                remaining = &remaining[newline + 1..];
            }
            _ => {
                chunks.push(chunk.to_string());
                remaining = &remaining[split_at..];
            }
        }
    }

    chunks
}
