//! Room codes and display names.

use haven_protocol::{PlayerSlot, RoomCode};
use rand::Rng;

/// Upper-case letters and digits minus the look-alikes (`I`, `O`, `0`, `1`).
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Characters per code.
pub const CODE_LEN: usize = 6;

/// Longest display name kept, in characters.
pub const MAX_NAME_LEN: usize = 24;

/// Draws a random code. Uniqueness is the caller's job.
pub fn generate_code<R: Rng + ?Sized>(rng: &mut R) -> RoomCode {
    let code: String = (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    RoomCode::new(code)
}

/// Trims and truncates a requested name; blank names become
/// `"Player 1"` / `"Player 2"`.
pub fn display_name(raw: &str, slot: PlayerSlot) -> String {
    let name: String = raw.trim().chars().take(MAX_NAME_LEN).collect();
    let name = name.trim_end();
    if name.is_empty() {
        format!("Player {}", u8::from(slot))
    } else {
        name.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_codes_use_alphabet() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let code = generate_code(&mut rng);
            assert_eq!(code.as_str().len(), CODE_LEN);
            assert!(code.as_str().bytes().all(|b| CODE_ALPHABET.contains(&b)));
            assert_eq!(code.normalized(), code);
        }
    }

    #[test]
    fn test_display_name_defaults_and_truncates() {
        assert_eq!(display_name("  Ada ", PlayerSlot::One), "Ada");
        assert_eq!(display_name("   ", PlayerSlot::Two), "Player 2");
        assert_eq!(display_name("", PlayerSlot::One), "Player 1");
        let long = "x".repeat(40);
        assert_eq!(display_name(&long, PlayerSlot::One).chars().count(), MAX_NAME_LEN);
    }
}
