//! Task and repair prompts.
//!
//! Both are plain text handed to the agent runtime. Session fields are
//! interpolated verbatim.

/// JSON shape the task prompt asks for, with placeholder guidance.
pub const SCHEMA: &str = r#"{
  "context_summary": "max 3 sentences",
  "objective_understanding": ["...","..."],
  "counterpart_profile": {
    "communication_habits": ["...","..."],
    "likely_needs": ["...","..."],
    "triggers_or_sensitive_points": [{"trigger":"...","evidence":"..."}],
    "what_helps": ["...","..."],
    "confidence": "low|medium|high"
  },
  "north_star_strategy": {
    "principles": ["...","..."],
    "what_to_prioritize": ["...","..."],
    "what_to_avoid": ["...","..."]
  },
  "next_step_strategy": {
    "goal_this_turn": "...",
    "moves": ["...","..."],
    "watch_outs": ["...","..."]
  },
  "draft_messages": [
    {"label":"Option A (warm)", "text":"..."},
    {"label":"Option B (direct)", "text":"..."},
    {"label":"Option C (light)", "text":"..."},
    {"label":"Option D (repair/apology)", "text":"..."},
    {"label":"Option E (boundary + care)", "text":"..."},
    {"label":"Option F (ask a question)", "text":"..."}
  ],
  "recommended_option_label": "Option ...",
  "do_not_say": ["...","..."],
  "follow_up_questions": ["...","..."],
  "session_memory_update": "Short memory for next round: 4-8 bullet-like lines, plain text",
  "agency_timeline": [
    {"phase":"Read", "detail":"..."},
    {"phase":"Assess", "detail":"..."},
    {"phase":"Profile", "detail":"..."},
    {"phase":"Plan", "detail":"..."},
    {"phase":"Draft", "detail":"..."},
    {"phase":"Safety", "detail":"..."}
  ]
}"#;

/// Same shape without the guidance, for the repair pass.
pub const REPAIR_SCHEMA: &str = r#"{
  "context_summary": "...",
  "objective_understanding": ["..."],
  "counterpart_profile": {
    "communication_habits": ["..."],
    "likely_needs": ["..."],
    "triggers_or_sensitive_points": [{"trigger":"...","evidence":"..."}],
    "what_helps": ["..."],
    "confidence": "low|medium|high"
  },
  "north_star_strategy": {"principles":["..."],"what_to_prioritize":["..."],"what_to_avoid":["..."]},
  "next_step_strategy": {"goal_this_turn":"...","moves":["..."],"watch_outs":["..."]},
  "draft_messages": [{"label":"Option A","text":"..."}],
  "recommended_option_label": "Option ...",
  "do_not_say": ["..."],
  "follow_up_questions": ["..."],
  "session_memory_update": "...",
  "agency_timeline": [{"phase":"...","detail":"..."}]
}"#;

const PREAMBLE: &str = "\
You are Someleon (Social Cameleon), an agentic conversation copilot for multi-turn chat.

Hard constraints:
- Base personality/communication analysis ONLY on the text in the transcript. No stereotypes. No assumptions like \"women always...\"
- Provide respectful, non-manipulative guidance. No deception, coercion, harassment, or \"tricking\" someone.
- If the objective implies manipulation/dishonesty, refuse that part and redirect to honest, respectful communication.";

const CRAWL_GUIDANCE: &str = "\
- If enabled AND useful, you may use public web research to find PUBLIC, general templates for communication.
- Do NOT copy long text. Extract short patterns and rephrase.";

const OUTPUT_CONTRACT: &str = "\
IMPORTANT OUTPUT CONTRACT:
Return ONLY valid JSON. No markdown. No code fences. No extra text.";

/// Everything the task prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct TaskInput<'a> {
    pub objective: &'a str,
    /// Rendered `You:`/`Them:` transcript.
    pub transcript: &'a str,
    pub crawl: bool,
    /// Memory carried over from the previous round; may be empty.
    pub memory: &'a str,
}

/// Build the analysis prompt for one run.
pub fn build_task_prompt(input: TaskInput<'_>) -> String {
    let memory = if input.memory.is_empty() {
        "(empty)"
    } else {
        input.memory
    };

    let mut out = String::with_capacity(
        PREAMBLE.len() + SCHEMA.len() + input.transcript.len() + input.memory.len() + 512,
    );
    out.push_str(PREAMBLE);
    out.push_str("\n\nUser objective (free-form):\n\"");
    out.push_str(input.objective);
    out.push_str("\"\n\nWeb crawl:\n- enabled: ");
    out.push_str(if input.crawl { "yes" } else { "no" });
    out.push('\n');
    out.push_str(CRAWL_GUIDANCE);
    out.push_str("\n\nSession memory from previous rounds (may be empty):\n");
    out.push_str(memory);
    out.push_str("\n\n");
    out.push_str(OUTPUT_CONTRACT);
    out.push_str("\n\nJSON schema:\n");
    out.push_str(SCHEMA);
    out.push_str("\n\nTranscript:\n");
    out.push_str(input.transcript);
    out.trim().to_owned()
}

/// Build the one-shot prompt that asks the model to reformat `raw` as JSON.
pub fn build_repair_prompt(raw: &str) -> String {
    let mut out = String::with_capacity(REPAIR_SCHEMA.len() + raw.len() + 96);
    out.push_str("Return ONLY valid JSON matching the schema below. No markdown.\n\n");
    out.push_str(REPAIR_SCHEMA);
    out.push_str("\n\nRaw:\n");
    out.push_str(raw);
    out.trim().to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input<'a>(crawl: bool, memory: &'a str) -> TaskInput<'a> {
        TaskInput {
            objective: "Close the deal",
            transcript: "You: hi\nThem: hey",
            crawl,
            memory,
        }
    }

    #[test]
    fn quotes_objective_and_ends_with_transcript() {
        let p = build_task_prompt(input(false, ""));
        assert!(p.starts_with("You are Someleon"));
        assert!(p.contains("User objective (free-form):\n\"Close the deal\""));
        assert!(p.ends_with("Transcript:\nYou: hi\nThem: hey"));
    }

    #[test]
    fn crawl_flag_is_literal_yes_or_no() {
        assert!(build_task_prompt(input(true, "")).contains("- enabled: yes"));
        assert!(build_task_prompt(input(false, "")).contains("- enabled: no"));
    }

    #[test]
    fn empty_memory_is_marked() {
        let p = build_task_prompt(input(false, ""));
        assert!(p.contains("(may be empty):\n(empty)\n"));

        let p = build_task_prompt(input(false, "- prefers short replies"));
        assert!(p.contains("(may be empty):\n- prefers short replies\n"));
        assert!(!p.contains("(empty)"));
    }

    #[test]
    fn contract_precedes_schema_precedes_transcript() {
        let p = build_task_prompt(input(false, ""));
        let contract = p.find("IMPORTANT OUTPUT CONTRACT").unwrap();
        let schema = p.find("JSON schema:").unwrap();
        let transcript = p.find("Transcript:").unwrap();
        assert!(contract < schema && schema < transcript);
        assert!(p.contains("\"agency_timeline\""));
        assert!(p.contains("Option F (ask a question)"));
    }

    #[test]
    fn objective_is_not_sanitised() {
        let p = build_task_prompt(TaskInput {
            objective: "say \"no\"\nplease",
            ..input(false, "")
        });
        assert!(p.contains("\"say \"no\"\nplease\""));
    }

    #[test]
    fn repair_prompt_wraps_raw_text() {
        let p = build_repair_prompt("not json at all");
        assert!(p.starts_with("Return ONLY valid JSON matching the schema below. No markdown."));
        assert!(p.contains("\"session_memory_update\": \"...\""));
        assert!(p.ends_with("Raw:\nnot json at all"));
    }
}
