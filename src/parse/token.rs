//! Rally string tokenizer.
//!
//! Charted rallies have no separators: every shot is a shot letter followed
//! by its modifier characters, and the serve (first token) carries digits
//! instead of a letter. Scanning from the end lets each shot letter close the
//! token that trails it.

use smallvec::SmallVec;

use crate::core::ShotTreeConfig;

/// Ordered shot tokens of one rally. Most rallies are short.
pub type Tokens = SmallVec<[String; 8]>;

/// Split a raw rally string into shot tokens, in rally order.
///
/// Never fails: characters before the first shot letter form their own
/// token, and a string without any shot letter yields a single token.
/// An empty string yields no tokens.
#[must_use]
pub fn tokenize(raw: &str, config: &ShotTreeConfig) -> Tokens {
    let mut tokens = Tokens::new();
    let mut end = raw.len();

    for (idx, c) in raw.char_indices().rev() {
        if config.is_shot_letter(c) {
            tokens.push(raw[idx..end].to_string());
            end = idx;
        }
    }
    if end > 0 {
        tokens.push(raw[..end].to_string());
    }

    tokens.reverse();
    tokens
}
