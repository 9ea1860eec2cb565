/// Minimum milliseconds a human plausibly needs between form render and
/// submit. Anything faster is classified as automated.
pub const MIN_FORM_FILL_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotVerdict {
    Human,
    HoneypotTripped,
    TooFast,
}

/// Heuristic bot classification for public form submissions: a hidden
/// "website" field that must stay empty, plus the time elapsed since the
/// form was rendered. Single-shot, no state.
pub fn classify_submission(honeypot: &str, elapsed_ms: u64) -> BotVerdict {
    if !honeypot.trim().is_empty() {
        return BotVerdict::HoneypotTripped;
    }
    if elapsed_ms < MIN_FORM_FILL_MS {
        return BotVerdict::TooFast;
    }
    BotVerdict::Human
}

impl BotVerdict {
    pub fn is_human(self) -> bool {
        self == BotVerdict::Human
    }
}
