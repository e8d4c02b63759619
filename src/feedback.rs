//! Performance feedback over a finished (or partial) transcript.
//!
//! The evaluation prompt asks for five category ratings on a 1-5 scale plus
//! free-text commentary. The extraction side is deliberately lossy text
//! mining: a category whose pattern is absent keeps the 0 sentinel, and the
//! highlight/suggestion lists degrade to empty rather than erroring.

use std::fmt::Write as _;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::config::RETRY_DELAY;
use crate::engine::Turn;
use crate::llm::{complete_with_retry, ChatMessage, CompletionClient};
use crate::prompts::{FEEDBACK_FEW_SHOT, FEEDBACK_SYSTEM_PROMPT};
use crate::scenario::Scenario;

/// Lower than dialogue for consistent grading.
const FEEDBACK_TEMPERATURE: f32 = 0.4;
/// Larger budget for the full written evaluation.
const FEEDBACK_MAX_TOKENS: u32 = 1500;

const UNAVAILABLE_NOTICE: &str = "Unable to generate detailed feedback at this time.";

const POSITIVE_KEYWORDS: [&str; 6] = [
    "well done",
    "effective",
    "strong",
    "excellent",
    "good",
    "impressive",
];

const SUGGESTION_STARTERS: [&str; 6] =
    ["consider", "try to", "should", "could", "improve", "focus on"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackCategory {
    LegalReasoning,
    Presentation,
    Responsiveness,
    ProceduralKnowledge,
    Overall,
}

impl FeedbackCategory {
    pub const ALL: [FeedbackCategory; 5] = [
        FeedbackCategory::LegalReasoning,
        FeedbackCategory::Presentation,
        FeedbackCategory::Responsiveness,
        FeedbackCategory::ProceduralKnowledge,
        FeedbackCategory::Overall,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FeedbackCategory::LegalReasoning => "Legal Reasoning",
            FeedbackCategory::Presentation => "Presentation",
            FeedbackCategory::Responsiveness => "Responsiveness",
            FeedbackCategory::ProceduralKnowledge => "Procedural Knowledge",
            FeedbackCategory::Overall => "Overall",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FeedbackCategory::LegalReasoning => {
                "Quality of legal analysis and argument construction"
            }
            FeedbackCategory::Presentation => {
                "Clarity, organization, and persuasiveness of arguments"
            }
            FeedbackCategory::Responsiveness => {
                "Ability to address questions and adapt to feedback"
            }
            FeedbackCategory::ProceduralKnowledge => {
                "Understanding of court procedures and legal standards"
            }
            FeedbackCategory::Overall => "Overall performance evaluation",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scores {
    pub legal_reasoning: f32,
    pub presentation: f32,
    pub responsiveness: f32,
    pub procedural_knowledge: f32,
    pub overall: f32,
}

impl Scores {
    pub fn uniform(value: f32) -> Self {
        Scores {
            legal_reasoning: value,
            presentation: value,
            responsiveness: value,
            procedural_knowledge: value,
            overall: value,
        }
    }

    pub fn get(&self, category: FeedbackCategory) -> f32 {
        match category {
            FeedbackCategory::LegalReasoning => self.legal_reasoning,
            FeedbackCategory::Presentation => self.presentation,
            FeedbackCategory::Responsiveness => self.responsiveness,
            FeedbackCategory::ProceduralKnowledge => self.procedural_knowledge,
            FeedbackCategory::Overall => self.overall,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackReport {
    pub summary: String,
    pub scores: Scores,
    pub highlights: Vec<String>,
    pub suggestions: Vec<String>,
}

pub struct FeedbackGenerator<C> {
    client: C,
    retry_delay: Duration,
}

impl<C: CompletionClient> FeedbackGenerator<C> {
    pub fn new(client: C) -> Self {
        FeedbackGenerator {
            client,
            retry_delay: RETRY_DELAY,
        }
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    /// Evaluates `user_turns` against the full transcript. Total call
    /// failure yields the fixed notice with middle-of-scale scores; a
    /// successful call is mined for scores, highlights, and suggestions.
    pub async fn evaluate(
        &self,
        scenario: &Scenario,
        transcript: &[Turn],
        user_turns: &[Turn],
    ) -> FeedbackReport {
        let messages = build_evaluation_messages(scenario, transcript, user_turns);
        match complete_with_retry(
            &self.client,
            &messages,
            FEEDBACK_MAX_TOKENS,
            FEEDBACK_TEMPERATURE,
            self.retry_delay,
        )
        .await
        {
            Some(text) => FeedbackReport {
                scores: extract_scores(&text),
                highlights: extract_highlights(&text),
                suggestions: extract_suggestions(&text),
                summary: text,
            },
            None => FeedbackReport {
                summary: UNAVAILABLE_NOTICE.to_string(),
                scores: Scores::uniform(3.0),
                highlights: Vec::new(),
                suggestions: Vec::new(),
            },
        }
    }
}

fn build_evaluation_messages(
    scenario: &Scenario,
    transcript: &[Turn],
    user_turns: &[Turn],
) -> Vec<ChatMessage> {
    let arguments = user_turns
        .iter()
        .map(|turn| turn.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut transcript_text = String::new();
    for turn in transcript {
        let _ = writeln!(
            transcript_text,
            "{}: {}\n",
            turn.role.display_name(),
            turn.content
        );
    }

    let user_prompt = format!(
        "Case Title: {title}\n\
         Case Type: {case_type}\n\
         Case Facts: {facts}\n\n\
         Student's Arguments:\n{arguments}\n\n\
         Full Simulation Transcript:\n{transcript_text}\n\
         Provide a detailed evaluation of the student's performance in this simulated court proceeding.\n\
         Rate their performance in these categories on a scale of 1-5:\n\
         1. Legal Reasoning\n\
         2. Presentation and Advocacy\n\
         3. Responsiveness to Questions\n\
         4. Procedural Knowledge\n\
         5. Overall Performance\n\n\
         For each category, explain the rating with specific examples from their arguments.\n\
         Provide specific suggestions for improvement.",
        title = scenario.title,
        case_type = scenario.case_type,
        facts = scenario.facts,
    );

    let mut messages = Vec::with_capacity(FEEDBACK_FEW_SHOT.len() + 2);
    messages.push(ChatMessage::system(FEEDBACK_SYSTEM_PROMPT));
    for (role, content) in FEEDBACK_FEW_SHOT {
        messages.push(ChatMessage {
            role: role.to_string(),
            content: content.to_string(),
        });
    }
    messages.push(ChatMessage::user(user_prompt));
    messages
}

static LEGAL_REASONING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Legal Reasoning:?\s*(\d+(?:\.\d+)?)").expect("invalid score regex"));
static PRESENTATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Presentation.*?:?\s*(\d+(?:\.\d+)?)").expect("invalid score regex"));
static RESPONSIVENESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Responsiveness.*?:?\s*(\d+(?:\.\d+)?)").expect("invalid score regex")
});
static PROCEDURAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Procedural.*?:?\s*(\d+(?:\.\d+)?)").expect("invalid score regex"));
static OVERALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Overall.*?:?\s*(\d+(?:\.\d+)?)").expect("invalid score regex"));

fn match_score(re: &Regex, text: &str) -> f32 {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

/// Per-category pattern search; a missing label keeps the 0 sentinel.
pub fn extract_scores(text: &str) -> Scores {
    Scores {
        legal_reasoning: match_score(&LEGAL_REASONING_RE, text),
        presentation: match_score(&PRESENTATION_RE, text),
        responsiveness: match_score(&RESPONSIVENESS_RE, text),
        procedural_knowledge: match_score(&PROCEDURAL_RE, text),
        overall: match_score(&OVERALL_RE, text),
    }
}

fn section_between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let (_, rest) = text.split_once(start)?;
    Some(match rest.find(end) {
        Some(idx) => &rest[..idx],
        None => rest,
    })
}

fn is_list_item(line: &str, taken: usize) -> bool {
    line.starts_with('-')
        || line.starts_with('•')
        || (line.starts_with(&(taken + 1).to_string()) && line.contains(':'))
}

fn strip_list_marker(line: &str) -> String {
    line.trim_start_matches(|c: char| {
        c == '-' || c == '•' || c == '.' || c == ' ' || c.is_ascii_digit()
    })
    .trim()
    .to_string()
}

fn collect_list_items(section: &str, out: &mut Vec<String>) {
    for line in section.lines() {
        let line = line.trim();
        if is_list_item(line, out.len()) {
            out.push(strip_list_marker(line));
        }
    }
}

fn collect_keyword_lines(text: &str, keywords: &[&str], out: &mut Vec<String>) {
    for line in text.lines() {
        let lower = line.to_lowercase();
        if line.trim().len() > 20 && keywords.iter().any(|keyword| lower.contains(keyword)) {
            out.push(line.trim().to_string());
        }
    }
}

/// Up to 3 positive points: the strengths section if one exists, otherwise
/// lines carrying positive-sentiment keywords.
pub fn extract_highlights(text: &str) -> Vec<String> {
    let mut highlights = Vec::new();
    if let Some(section) = section_between(text, "Strengths:", "Areas for Improvement") {
        collect_list_items(section, &mut highlights);
    }
    if highlights.is_empty() {
        collect_keyword_lines(text, &POSITIVE_KEYWORDS, &mut highlights);
    }
    highlights.truncate(3);
    highlights
}

/// Up to 3 improvement points: the improvement section, then a trailing
/// suggestions section, then imperative-keyword lines.
pub fn extract_suggestions(text: &str) -> Vec<String> {
    let mut suggestions = Vec::new();
    if let Some(section) = section_between(text, "Areas for Improvement", "Suggestions") {
        collect_list_items(section, &mut suggestions);
    }
    if suggestions.is_empty() {
        if let Some(section) = section_between(text, "Suggestions", "#") {
            collect_list_items(section, &mut suggestions);
        }
    }
    if suggestions.is_empty() {
        collect_keyword_lines(text, &SUGGESTION_STARTERS, &mut suggestions);
    }
    suggestions.truncate(3);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Role;
    use anyhow::{anyhow, Result};

    const WELL_FORMED: &str = "\
# Performance Evaluation

Legal Reasoning: 4
Presentation: 3.5
Responsiveness: 2
Procedural Knowledge: 5
Overall: 4

## Strengths:
- Clear statutory anchoring throughout the opening statement.
- Strong command of the procedural posture of the motion.
- Persuasive framing of the damages theory.
- Confident delivery under questioning.

## Areas for Improvement:
- Cite controlling precedent when characterizing the force majeure clause.
- Quantify damages instead of describing them generally.

## Suggestions:
- Consider a short roadmap before numbered points.
";

    struct FailingClient;

    impl CompletionClient for FailingClient {
        async fn complete(&self, _: &[ChatMessage], _: u32, _: f32) -> Result<String> {
            Err(anyhow!("transport down"))
        }
    }

    struct ScriptedClient;

    impl CompletionClient for ScriptedClient {
        async fn complete(&self, _: &[ChatMessage], _: u32, _: f32) -> Result<String> {
            Ok(WELL_FORMED.to_string())
        }
    }

    fn scenario() -> Scenario {
        serde_json::from_str(r#"{"id": "c1", "title": "Contract", "case_type": "contract"}"#)
            .unwrap()
    }

    fn turn(content: &str) -> Turn {
        Turn {
            role: Role::PlaintiffCounsel,
            content: content.to_string(),
        }
    }

    #[test]
    fn extracts_all_five_scores() {
        let scores = extract_scores(WELL_FORMED);
        assert_eq!(scores.legal_reasoning, 4.0);
        assert_eq!(scores.presentation, 3.5);
        assert_eq!(scores.responsiveness, 2.0);
        assert_eq!(scores.procedural_knowledge, 5.0);
        assert_eq!(scores.overall, 4.0);
    }

    #[test]
    fn extraction_is_idempotent() {
        assert_eq!(extract_scores(WELL_FORMED), extract_scores(WELL_FORMED));
    }

    #[test]
    fn missing_category_keeps_zero_sentinel() {
        let scores = extract_scores("Legal Reasoning: 4\nOverall: 3");
        assert_eq!(scores.legal_reasoning, 4.0);
        assert_eq!(scores.presentation, 0.0);
        assert_eq!(scores.responsiveness, 0.0);
        assert_eq!(scores.procedural_knowledge, 0.0);
        assert_eq!(scores.overall, 3.0);
    }

    #[test]
    fn labeled_variants_still_match() {
        let scores = extract_scores("Presentation and Advocacy: 4\nProcedural: 2");
        assert_eq!(scores.presentation, 4.0);
        assert_eq!(scores.procedural_knowledge, 2.0);
    }

    #[test]
    fn highlights_come_from_strengths_section_capped_at_three() {
        let highlights = extract_highlights(WELL_FORMED);
        assert_eq!(highlights.len(), 3);
        assert_eq!(
            highlights[0],
            "Clear statutory anchoring throughout the opening statement."
        );
    }

    #[test]
    fn highlights_fall_back_to_positive_keywords() {
        let text = "The closing argument was an excellent synthesis of the record.\nShort note.";
        let highlights = extract_highlights(text);
        assert_eq!(highlights.len(), 1);
        assert!(highlights[0].contains("excellent synthesis"));
    }

    #[test]
    fn suggestions_come_from_improvement_section() {
        let suggestions = extract_suggestions(WELL_FORMED);
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions[0].starts_with("Cite controlling precedent"));
    }

    #[test]
    fn suggestions_fall_back_to_imperative_lines() {
        let text = "You should tie each exhibit to a named element of the claim.";
        let suggestions = extract_suggestions(text);
        assert_eq!(suggestions.len(), 1);
    }

    #[test]
    fn extraction_degrades_to_empty_lists() {
        assert!(extract_highlights("No usable content.").is_empty());
        assert!(extract_suggestions("No usable content.").is_empty());
    }

    #[tokio::test]
    async fn evaluation_failure_yields_notice_and_middle_scores() {
        let generator = FeedbackGenerator::new(FailingClient).with_retry_delay(Duration::ZERO);
        let report = generator
            .evaluate(&scenario(), &[turn("argument")], &[turn("argument")])
            .await;
        assert_eq!(report.summary, UNAVAILABLE_NOTICE);
        assert_eq!(report.scores, Scores::uniform(3.0));
        assert!(report.highlights.is_empty());
        assert!(report.suggestions.is_empty());
    }

    #[tokio::test]
    async fn successful_evaluation_is_fully_mined() {
        let generator = FeedbackGenerator::new(ScriptedClient);
        let report = generator
            .evaluate(&scenario(), &[turn("argument")], &[turn("argument")])
            .await;
        assert_eq!(report.scores.procedural_knowledge, 5.0);
        assert_eq!(report.highlights.len(), 3);
        assert_eq!(report.suggestions.len(), 2);
        assert!(report.summary.contains("Performance Evaluation"));
    }
}
