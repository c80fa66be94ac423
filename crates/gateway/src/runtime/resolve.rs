//! Turning accumulated model text into a [`StructuredResult`].

use std::sync::LazyLock;

use futures_util::StreamExt;
use regex::Regex;
use serde_json::Value;
use sl_domain::error::Result;
use sl_domain::StructuredResult;
use sl_providers::{RunnerSource, UnitStream};

use super::prompt::build_repair_prompt;

static LEADING_JSON_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^```json\s*").expect("valid json fence regex"));
static LEADING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```\s*").expect("valid fence regex"));
static TRAILING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```$").expect("valid trailing fence regex"));

/// Resolve model output into a result object.
///
/// Strips one code fence, tries a strict parse, then falls back to the
/// span between the first `{` and the last `}`. Anything that is not a
/// JSON object counts as unresolved.
pub fn parse_final(text: &str) -> Option<StructuredResult> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let unfenced = LEADING_JSON_FENCE.replace(trimmed, "");
    let unfenced = LEADING_FENCE.replace(&unfenced, "");
    let unfenced = TRAILING_FENCE.replace(&unfenced, "");
    let unfenced = unfenced.trim();

    if let Some(result) = parse_object(unfenced) {
        return Some(result);
    }

    let first = unfenced.find('{')?;
    let last = unfenced.rfind('}')?;
    if last <= first {
        return None;
    }
    parse_object(&unfenced[first..=last])
}

fn parse_object(candidate: &str) -> Option<StructuredResult> {
    serde_json::from_str::<Value>(candidate)
        .ok()
        .and_then(StructuredResult::from_value)
}

/// Drain a unit stream, concatenating the text each unit carries.
pub async fn collect_text(mut stream: UnitStream) -> Result<String> {
    let mut buf = String::new();
    while let Some(unit) = stream.next().await {
        buf.push_str(unit?.text_content());
    }
    Ok(buf)
}

/// One repair round-trip: ask the runtime to reformat `raw` as JSON and
/// resolve whatever comes back.
pub async fn repair(
    runners: &dyn RunnerSource,
    model: &str,
    raw: &str,
) -> Result<Option<StructuredResult>> {
    let runner = runners.acquire().await?;
    let stream = runner.run_task(&build_repair_prompt(raw), model).await?;
    let text = collect_text(stream).await?;
    Ok(parse_final(&text))
}

/// First `max` characters of `s`.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_owned(),
        None => s.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use sl_domain::stream::AgentUnit;
    use sl_providers::{Script, ScriptedRunner, StaticSource};

    use super::*;

    fn summary(r: &StructuredResult) -> Option<String> {
        r.context_summary()
    }

    #[test]
    fn exact_json() {
        let r = parse_final(r#"{"context_summary":"x"}"#).unwrap();
        assert_eq!(summary(&r).as_deref(), Some("x"));
    }

    #[test]
    fn fenced_json() {
        let r = parse_final("```json\n{\"context_summary\":\"x\"}\n```").unwrap();
        assert_eq!(summary(&r).as_deref(), Some("x"));

        let r = parse_final("```JSON {\"a\":1}```").unwrap();
        assert_eq!(r.as_map()["a"], 1);

        let r = parse_final("```\n{\"a\":1}\n```").unwrap();
        assert_eq!(r.as_map()["a"], 1);
    }

    #[test]
    fn text_around_one_object() {
        let r = parse_final("Sure! Here it is:\n{\"a\": {\"b\": 2}}\nHope that helps.").unwrap();
        assert_eq!(r.as_map()["a"]["b"], 2);
    }

    #[test]
    fn unresolvable_inputs() {
        assert!(parse_final("").is_none());
        assert!(parse_final("   \n ").is_none());
        assert!(parse_final("not json at all").is_none());
        assert!(parse_final("} backwards {").is_none());
        assert!(parse_final("{ broken: ").is_none());
        assert!(parse_final("{\"a\":1} and {\"b\":2}").is_none());
    }

    #[test]
    fn non_objects_are_unresolved() {
        assert!(parse_final("[1,2,3]").is_none());
        assert!(parse_final("42").is_none());
        assert!(parse_final("\"string\"").is_none());
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate_chars("hello", 3), "hel");
        assert_eq!(truncate_chars("hi", 10), "hi");
        assert_eq!(truncate_chars("héllo wörld", 7), "héllo w");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[tokio::test]
    async fn collect_text_ignores_non_text_units() {
        let runner = ScriptedRunner::new([Script::Units(vec![
            AgentUnit::text("{\"a\":"),
            AgentUnit::status("thinking", None),
            AgentUnit::text("1}"),
        ])]);
        let stream = sl_providers::TaskRunner::run_task(&runner, "p", "m")
            .await
            .unwrap();
        assert_eq!(collect_text(stream).await.unwrap(), "{\"a\":1}");
    }

    #[tokio::test]
    async fn repair_sends_raw_text_and_resolves_reply() {
        let runner = Arc::new(ScriptedRunner::new([Script::text(
            "```json\n{\"context_summary\":\"fixed\"}\n```",
        )]));
        let source = StaticSource(runner.clone());

        let r = repair(&source, "m", "not json at all").await.unwrap().unwrap();
        assert_eq!(summary(&r).as_deref(), Some("fixed"));

        let prompts = runner.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].ends_with("Raw:\nnot json at all"));
    }

    #[tokio::test]
    async fn repair_can_fail_to_resolve() {
        let source = StaticSource(Arc::new(ScriptedRunner::new([Script::text("still prose")])));
        assert!(repair(&source, "m", "prose").await.unwrap().is_none());
    }
}
