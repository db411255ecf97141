//! Simulated-reply engine.
//!
//! An ordered list of (predicate, response set) rules evaluated
//! top-to-bottom, first match wins. The final fallback is unconditional, so
//! selection is total. Time and randomness are injected by the caller; the
//! engine itself is pure.

use chrono::{DateTime, Timelike, Utc};
use rand::Rng;
use std::time::Duration;

pub(crate) const GREETING: &[&str] = &[
    "Hi there! 👋",
    "Hello! How are you doing?",
    "Hey! Good to hear from you!",
    "Hi! What's up?",
    "Hello! Hope you're having a great day!",
];

pub(crate) const HOW_ARE_YOU: &[&str] = &[
    "I'm doing great, thanks for asking! How about you?",
    "Pretty good! Just busy with some work. You?",
    "All good here! What about you?",
    "I'm fine, thanks! How's your day going?",
    "Great! Thanks for asking 😊",
];

pub(crate) const QUESTION: &[&str] = &[
    "That's a good question! Let me think about it.",
    "Hmm, I'm not sure about that one.",
    "Interesting question! What do you think?",
    "I'd need to look into that more.",
    "Good point! I hadn't thought of that.",
];

pub(crate) const THANKS: &[&str] = &[
    "You're welcome! 😊",
    "No problem at all!",
    "Happy to help!",
    "Anytime!",
    "Glad I could help! 👍",
];

pub(crate) const STUDY: &[&str] = &[
    "Yeah, that assignment is pretty challenging!",
    "I'm working on it too. Want to collaborate?",
    "Did you check the resources shared earlier?",
    "The deadline is coming up fast!",
    "Let me know if you need any help with that.",
];

pub(crate) const GROUP: &[&str] = &[
    "Thanks for sharing that with the group!",
    "That's really helpful for everyone.",
    "Good point! Others might find this useful too.",
    "Appreciate you keeping us updated!",
    "This is exactly what we needed to know.",
];

pub(crate) const MORNING: &[&str] = &[
    "Good morning! ☀️",
    "Morning! Hope you slept well.",
    "Early bird today! 🐦",
    "Good morning! Ready for the day?",
];

pub(crate) const AFTERNOON: &[&str] = &[
    "Good afternoon! 🌤️",
    "Hope your day is going well!",
    "Afternoon! How's everything?",
    "Good to hear from you this afternoon!",
];

pub(crate) const EVENING: &[&str] = &[
    "Good evening! 🌙",
    "Evening! How was your day?",
    "Hope you had a good day!",
    "Evening! Time to relax now.",
];

pub(crate) const FALLBACK: &[&str] = &[
    "That's interesting!",
    "I see what you mean.",
    "Tell me more about that.",
    "That sounds good!",
    "I agree with you on that.",
    "Really? That's cool!",
    "Nice! 👍",
    "Awesome! 😄",
    "Got it! Thanks for letting me know.",
    "That makes sense.",
    "Interesting perspective!",
    "I hadn't thought of it that way.",
    "Good to know!",
    "Thanks for sharing that.",
    "That's helpful information.",
];

/// Lowercased view of the outgoing text and the conversation's display name,
/// plus the local hour for the time-of-day sets.
struct Prompt {
    text: String,
    name: String,
    hour: u32,
}

struct Rule {
    applies: fn(&Prompt) -> bool,
    select: fn(&Prompt) -> &'static [&'static str],
}

static RULES: [Rule; 8] = [
    Rule {
        applies: |p| p.text.contains("hi") || p.text.contains("hello") || p.text.contains("hey"),
        select: |_| GREETING,
    },
    Rule {
        applies: |p| p.text.contains("how are you") || p.text.contains("how r u"),
        select: |_| HOW_ARE_YOU,
    },
    Rule {
        applies: |p| p.text.contains('?'),
        select: |_| QUESTION,
    },
    Rule {
        applies: |p| p.text.contains("thank") || p.text.contains("thx"),
        select: |_| THANKS,
    },
    Rule {
        applies: |p| {
            p.name.contains("cs") || p.text.contains("assignment") || p.text.contains("project")
        },
        select: |_| STUDY,
    },
    Rule {
        applies: |p| p.name.contains("group") || p.name.contains("club"),
        select: |_| GROUP,
    },
    Rule {
        applies: |_| true,
        select: |p| {
            if p.hour < 12 {
                MORNING
            } else if p.hour < 17 {
                AFTERNOON
            } else {
                EVENING
            }
        },
    },
    Rule {
        applies: |_| true,
        select: |_| FALLBACK,
    },
];

/// Pick a canned reply to the given outgoing text, uniformly at random
/// within the first matching rule's response set.
pub fn pick_reply<R: Rng>(
    text: &str,
    conversation_name: &str,
    now: DateTime<Utc>,
    rng: &mut R,
) -> &'static str {
    let prompt = Prompt {
        text: text.to_lowercase(),
        name: conversation_name.to_lowercase(),
        hour: now.hour(),
    };

    let set = RULES
        .iter()
        .find(|rule| (rule.applies)(&prompt))
        .map(|rule| (rule.select)(&prompt))
        .unwrap_or(FALLBACK);

    set[rng.gen_range(0..set.len())]
}

/// How long the simulated contact "types" before the reply lands: uniform
/// within a one-to-four-second window.
pub fn reply_delay<R: Rng>(rng: &mut R) -> Duration {
    Duration::from_millis(1_000 + rng.gen_range(0..3_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn at_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, hour, 30, 0).unwrap()
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn greeting_keywords_pick_from_the_greeting_set() {
        let reply = pick_reply("hi", "Dana", at_hour(10), &mut rng());
        assert!(GREETING.contains(&reply));
    }

    #[test]
    fn question_mark_beats_gratitude_by_rule_order() {
        let reply = pick_reply("thanks?", "Dana", at_hour(10), &mut rng());
        assert!(QUESTION.contains(&reply));
    }

    #[test]
    fn gratitude_without_question_mark_picks_thanks() {
        let reply = pick_reply("thx a lot", "Dana", at_hour(10), &mut rng());
        assert!(THANKS.contains(&reply));
    }

    #[test]
    fn how_are_you_has_its_own_set() {
        let reply = pick_reply("how are you today", "Dana", at_hour(10), &mut rng());
        assert!(HOW_ARE_YOU.contains(&reply));
    }

    #[test]
    fn academic_conversation_name_selects_study_replies() {
        let reply = pick_reply("good stuff", "CS - A", at_hour(10), &mut rng());
        assert!(STUDY.contains(&reply));
    }

    #[test]
    fn assignment_talk_selects_study_replies() {
        let reply = pick_reply("done with the assignment", "Dana", at_hour(10), &mut rng());
        assert!(STUDY.contains(&reply));
    }

    #[test]
    fn group_like_names_select_group_replies() {
        let reply = pick_reply("good stuff", "The family group🔥", at_hour(10), &mut rng());
        assert!(GROUP.contains(&reply));
    }

    #[test]
    fn unmatched_text_falls_through_to_time_of_day() {
        assert!(MORNING.contains(&pick_reply("good stuff", "Dana", at_hour(9), &mut rng())));
        assert!(AFTERNOON.contains(&pick_reply("good stuff", "Dana", at_hour(14), &mut rng())));
        assert!(EVENING.contains(&pick_reply("good stuff", "Dana", at_hour(21), &mut rng())));
    }

    #[test]
    fn same_seed_same_reply() {
        let a = pick_reply("hi", "Dana", at_hour(10), &mut StdRng::seed_from_u64(42));
        let b = pick_reply("hi", "Dana", at_hour(10), &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn reply_delay_stays_in_its_window() {
        let mut rng = rng();
        for _ in 0..200 {
            let delay = reply_delay(&mut rng);
            assert!(delay >= Duration::from_millis(1_000));
            assert!(delay < Duration::from_millis(4_000));
        }
    }
}
