//! Plain-text views of a structured result.

use sl_domain::result::{Confidence, StructuredResult};

fn joined(items: &[String]) -> String {
    items.join(" | ")
}

/// The counterpart profile block.
pub fn profile_text(result: &StructuredResult) -> String {
    let Some(p) = result.counterpart_profile() else {
        return "(no profile)".into();
    };

    let confidence = match p.confidence {
        Some(Confidence::Low) => "low",
        Some(Confidence::Medium) => "medium",
        Some(Confidence::High) => "high",
        None => "unknown",
    };
    let mut out = vec![format!("confidence: {confidence}")];
    if !p.communication_habits.is_empty() {
        out.push(format!("habits: {}", joined(&p.communication_habits)));
    }
    if !p.likely_needs.is_empty() {
        out.push(format!("needs: {}", joined(&p.likely_needs)));
    }
    if !p.what_helps.is_empty() {
        out.push(format!("helps: {}", joined(&p.what_helps)));
    }
    if !p.triggers_or_sensitive_points.is_empty() {
        let lines: Vec<String> = p
            .triggers_or_sensitive_points
            .iter()
            .map(|t| format!("- {} (evidence: {})", t.trigger, t.evidence))
            .collect();
        out.push(format!("triggers:\n{}", lines.join("\n")));
    }
    out.join("\n\n")
}

/// North-star and next-step strategy.
pub fn strategy_text(result: &StructuredResult) -> String {
    let mut out = Vec::new();
    if let Some(ns) = result.north_star_strategy() {
        out.push("NORTH-STAR".to_string());
        if !ns.principles.is_empty() {
            out.push(format!("principles: {}", joined(&ns.principles)));
        }
        if !ns.what_to_prioritize.is_empty() {
            out.push(format!("prioritize: {}", joined(&ns.what_to_prioritize)));
        }
        if !ns.what_to_avoid.is_empty() {
            out.push(format!("avoid: {}", joined(&ns.what_to_avoid)));
        }
    }
    if let Some(nx) = result.next_step_strategy() {
        out.push("\nNEXT STEP".to_string());
        if let Some(goal) = nx.goal_this_turn.filter(|g| !g.is_empty()) {
            out.push(format!("goal: {goal}"));
        }
        if !nx.moves.is_empty() {
            out.push(format!("moves: {}", joined(&nx.moves)));
        }
        if !nx.watch_outs.is_empty() {
            out.push(format!("watch outs: {}", joined(&nx.watch_outs)));
        }
    }
    if out.is_empty() {
        "(no strategy)".into()
    } else {
        out.join("\n")
    }
}

/// Draft replies, the recommended one starred.
pub fn options_text(result: &StructuredResult) -> String {
    let drafts = result.draft_messages();
    if drafts.is_empty() {
        return "(no options)".into();
    }
    let recommended = result.recommended_option_label();
    drafts
        .iter()
        .map(|d| {
            let label = if d.label.is_empty() { "Option" } else { d.label.as_str() };
            let star = if recommended.as_deref() == Some(d.label.as_str()) {
                " *"
            } else {
                ""
            };
            format!("[{label}]{star}\n{}", d.text)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
