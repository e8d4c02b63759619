//! Persona catalogs for the courtroom actors.
//!
//! Two axes: the judge's personality and each counsel's strategy. Every
//! entry maps to a short description for display and a directive that is
//! injected into that actor's prompt. Unknown keys never fail — they
//! resolve to the neutral/standard defaults.

use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JudgePersonality {
    #[default]
    Neutral,
    Stern,
    Procedural,
    Empathetic,
    Impatient,
}

impl JudgePersonality {
    pub const ALL: [JudgePersonality; 5] = [
        JudgePersonality::Neutral,
        JudgePersonality::Stern,
        JudgePersonality::Procedural,
        JudgePersonality::Empathetic,
        JudgePersonality::Impatient,
    ];

    /// Resolves a stored key, falling back to `Neutral` on anything
    /// unrecognized.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "stern" => JudgePersonality::Stern,
            "procedural" => JudgePersonality::Procedural,
            "empathetic" => JudgePersonality::Empathetic,
            "impatient" => JudgePersonality::Impatient,
            _ => JudgePersonality::Neutral,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            JudgePersonality::Neutral => "neutral",
            JudgePersonality::Stern => "stern",
            JudgePersonality::Procedural => "procedural",
            JudgePersonality::Empathetic => "empathetic",
            JudgePersonality::Impatient => "impatient",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            JudgePersonality::Neutral => {
                "A balanced judge who carefully weighs all arguments without bias."
            }
            JudgePersonality::Stern => {
                "A strict judge who demands formal adherence to procedure and protocol."
            }
            JudgePersonality::Procedural => {
                "A judge who focuses on technical legal details and procedural correctness."
            }
            JudgePersonality::Empathetic => {
                "A compassionate judge who considers the human impact of legal decisions."
            }
            JudgePersonality::Impatient => {
                "A judge who prefers brief, direct arguments and dislikes unnecessary detail."
            }
        }
    }

    /// Prompt directive shaping how the judge speaks.
    pub fn directive(&self) -> &'static str {
        match self {
            JudgePersonality::Neutral => {
                "You are a neutral judge who carefully considers all sides of a case. \
                 You aim to remain impartial and focus on the legal merits of arguments. \
                 You speak in a measured, thoughtful manner and maintain a professional demeanor."
            }
            JudgePersonality::Stern => {
                "You are a stern, no-nonsense judge who demands respect for the court. \
                 You have little patience for unprepared attorneys or weak arguments. \
                 You speak firmly and directly, and expect strict adherence to court procedures. \
                 You may occasionally interrupt attorneys who are straying from relevant points."
            }
            JudgePersonality::Procedural => {
                "You are a procedurally-focused judge who pays close attention to technical details. \
                 You care deeply about proper legal process and precedent. \
                 You frequently reference specific statutes, rules, or case law in your remarks. \
                 You value precision in legal reasoning above rhetorical flourishes."
            }
            JudgePersonality::Empathetic => {
                "You are an empathetic judge who considers the human impact of legal decisions. \
                 While you uphold the law, you also seek to understand the circumstances of all parties. \
                 You speak in a compassionate tone and sometimes ask questions about personal impacts. \
                 You try to ensure that justice serves people, not just abstract principles."
            }
            JudgePersonality::Impatient => {
                "You are an impatient judge who values efficiency and directness. \
                 You dislike lengthy arguments and unnecessary detail. \
                 You sometimes cut attorneys off when they become repetitive. \
                 You speak in short, direct sentences and expect others to do the same. \
                 You occasionally show irritation when proceedings move too slowly."
            }
        }
    }
}

impl fmt::Display for JudgePersonality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for JudgePersonality {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for JudgePersonality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(JudgePersonality::from_key(&key))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounselStrategy {
    #[default]
    Standard,
    Aggressive,
    Technical,
    Emotional,
    Passive,
}

impl CounselStrategy {
    pub const ALL: [CounselStrategy; 5] = [
        CounselStrategy::Standard,
        CounselStrategy::Aggressive,
        CounselStrategy::Technical,
        CounselStrategy::Emotional,
        CounselStrategy::Passive,
    ];

    /// Resolves a stored key, falling back to `Standard` on anything
    /// unrecognized.
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "aggressive" => CounselStrategy::Aggressive,
            "technical" => CounselStrategy::Technical,
            "emotional" => CounselStrategy::Emotional,
            "passive" => CounselStrategy::Passive,
            _ => CounselStrategy::Standard,
        }
    }

    pub fn key(&self) -> &'static str {
        match self {
            CounselStrategy::Standard => "standard",
            CounselStrategy::Aggressive => "aggressive",
            CounselStrategy::Technical => "technical",
            CounselStrategy::Emotional => "emotional",
            CounselStrategy::Passive => "passive",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CounselStrategy::Standard => {
                "A balanced approach that presents facts and law in a professional manner."
            }
            CounselStrategy::Aggressive => {
                "A confrontational style that challenges opposing arguments directly."
            }
            CounselStrategy::Technical => {
                "A detail-oriented approach focusing on procedural rules and precise legal interpretation."
            }
            CounselStrategy::Emotional => {
                "An approach that emphasizes human impact and appeals to moral considerations."
            }
            CounselStrategy::Passive => {
                "A restrained style that minimizes direct confrontation while defending positions."
            }
        }
    }

    /// Prompt directive shaping how counsel argues.
    pub fn directive(&self) -> &'static str {
        match self {
            CounselStrategy::Standard => {
                "You are an attorney using a balanced, professional approach. \
                 You present facts clearly and cite relevant law to support your positions. \
                 You remain respectful of the court and opposing counsel. \
                 You speak confidently but not aggressively."
            }
            CounselStrategy::Aggressive => {
                "You are an attorney using an aggressive, confrontational approach. \
                 You directly challenge the opposing counsel's arguments and credibility. \
                 You speak forcefully and use strong language to emphasize your points. \
                 While still respectful of the court, you are uncompromising in your positions. \
                 You frequently point out flaws in the opposing side's reasoning."
            }
            CounselStrategy::Technical => {
                "You are an attorney using a technically precise, detail-oriented approach. \
                 You rely heavily on procedural rules, statutes, and case law citations. \
                 You speak methodically and use precise legal terminology. \
                 You focus on technical legal arguments rather than emotional appeals. \
                 You may point out procedural errors or technical oversights by the opposition."
            }
            CounselStrategy::Emotional => {
                "You are an attorney who emphasizes the human impact and moral dimensions of the case. \
                 You frame legal arguments within broader contexts of fairness and justice. \
                 You use vivid language and scenarios to help the court visualize consequences. \
                 While still providing legal support, you appeal to empathy and moral principles. \
                 You speak with passion and conviction about your client's position."
            }
            CounselStrategy::Passive => {
                "You are an attorney using a restrained, non-confrontational approach. \
                 You focus primarily on defending your own positions rather than attacking the opposition. \
                 You speak calmly and avoid strong or provocative language. \
                 You aim to appear reasonable and cooperative while still advocating for your client. \
                 You may concede minor points to strengthen your position on major issues."
            }
        }
    }
}

impl fmt::Display for CounselStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl Serialize for CounselStrategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

impl<'de> Deserialize<'de> for CounselStrategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(CounselStrategy::from_key(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_keys_round_trip() {
        for personality in JudgePersonality::ALL {
            assert_eq!(JudgePersonality::from_key(personality.key()), personality);
        }
        for strategy in CounselStrategy::ALL {
            assert_eq!(CounselStrategy::from_key(strategy.key()), strategy);
        }
    }

    #[test]
    fn unknown_keys_fall_back_to_defaults() {
        assert_eq!(
            JudgePersonality::from_key("sarcastic"),
            JudgePersonality::Neutral
        );
        assert_eq!(JudgePersonality::from_key(""), JudgePersonality::Neutral);
        assert_eq!(
            CounselStrategy::from_key("theatrical"),
            CounselStrategy::Standard
        );
    }

    #[test]
    fn keys_are_case_insensitive() {
        assert_eq!(JudgePersonality::from_key("STERN"), JudgePersonality::Stern);
        assert_eq!(
            CounselStrategy::from_key(" Aggressive "),
            CounselStrategy::Aggressive
        );
    }

    #[test]
    fn deserializes_unknown_key_to_default() {
        let personality: JudgePersonality = serde_json::from_str("\"whimsical\"").unwrap();
        assert_eq!(personality, JudgePersonality::Neutral);
        let strategy: CounselStrategy = serde_json::from_str("\"technical\"").unwrap();
        assert_eq!(strategy, CounselStrategy::Technical);
    }

    #[test]
    fn every_entry_has_description_and_directive() {
        for personality in JudgePersonality::ALL {
            assert!(!personality.description().is_empty());
            assert!(!personality.directive().is_empty());
        }
        for strategy in CounselStrategy::ALL {
            assert!(!strategy.description().is_empty());
            assert!(!strategy.directive().is_empty());
        }
    }
}
