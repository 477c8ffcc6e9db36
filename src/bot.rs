//! Canned bot responder
//!
//! The "bot" is a randomized picker over a fixed set of reply strings with
//! an artificial typing delay. It never touches storage; the chat command
//! persists whatever it returns.

use crate::config::BotConfig;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::time::Duration;

/// Fixed pool of bot replies
const RESPONSES: [&str; 15] = [
    "That's a great question! Let me think about it for a moment.",
    "Interesting! Tell me more about that.",
    "I see what you mean. Have you considered looking at it differently?",
    "Thanks for sharing that with me!",
    "Hmm, that's worth a deeper conversation.",
    "I'm not sure I follow. Could you rephrase that?",
    "Absolutely! That makes a lot of sense.",
    "That reminds me of something I've heard before.",
    "Good point. What led you to that conclusion?",
    "I appreciate you telling me that.",
    "Let's explore that idea together.",
    "Wow, I hadn't thought about it that way.",
    "That sounds exciting! What happens next?",
    "I understand. It can be tricky sometimes.",
    "Noted! Is there anything else on your mind?",
];

/// Pick a random canned response
pub fn pick_response() -> String {
    let mut rng = rand::rng();
    RESPONSES
        .choose(&mut rng)
        .copied()
        .unwrap_or(RESPONSES[0])
        .to_string()
}

/// Pick a response after a randomized "typing" delay.
///
/// The delay is uniform between `min_delay_ms` and `max_delay_ms`; a
/// misconfigured range (min > max) collapses to min.
pub async fn reply_with_delay(config: &BotConfig) -> String {
    let delay_ms = {
        let mut rng = rand::rng();
        let min = config.min_delay_ms;
        let max = config.max_delay_ms.max(min);
        rng.random_range(min..=max)
    };

    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    pick_response()
}
