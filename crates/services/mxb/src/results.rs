//! Test-result failure extraction.
//!
//! The harness writes a structured XML result file at an agreed path. Only
//! the failure fields matter here: failed test-case names, failure messages,
//! and stack traces. Extraction is line-oriented over those subtrees; the
//! rest of the schema is ignored.

use std::sync::LazyLock;

use regex::Regex;

static TEST_CASE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<test-case[^>]*\bname="(?P<name>[^"]*)""#).expect("pattern"));

/// One failed test case pulled out of the result file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestFailure {
    pub name: String,
    pub message: String,
    pub stack_trace: String,
}

/// Which failure subtree the cursor is inside.
enum Field {
    None,
    Message,
    StackTrace,
}

/// Extract every failed test case from result-file content.
pub fn parse_failures(content: &str) -> Vec<TestFailure> {
    let mut failures = Vec::new();
    let mut current_name = String::new();
    let mut in_failure = false;
    let mut field = Field::None;
    let mut pending: Option<TestFailure> = None;

    for raw_line in content.lines() {
        let line = raw_line.trim();

        if let Some(caps) = TEST_CASE_NAME.captures(line) {
            current_name = caps["name"].to_string();
        }

        if line.starts_with("<failure") {
            in_failure = true;
            pending = Some(TestFailure {
                name: current_name.clone(),
                ..TestFailure::default()
            });
        }

        if in_failure {
            if let Some(failure) = pending.as_mut() {
                if line.contains("<message>") {
                    field = Field::Message;
                }
                if line.contains("<stack-trace>") {
                    field = Field::StackTrace;
                }
                match field {
                    Field::Message => append_text(&mut failure.message, line, "message"),
                    Field::StackTrace => append_text(&mut failure.stack_trace, line, "stack-trace"),
                    Field::None => {}
                }
                if line.contains("</message>") || line.contains("</stack-trace>") {
                    field = Field::None;
                }
            }
            if line.contains("</failure>") {
                in_failure = false;
                field = Field::None;
                if let Some(failure) = pending.take() {
                    failures.push(failure);
                }
            }
        }
    }

    failures
}

/// Append one line of a field subtree, with tags and CDATA wrappers pruned.
fn append_text(target: &mut String, line: &str, tag: &str) {
    let mut text = line
        .replace(&format!("<{tag}>"), "")
        .replace(&format!("</{tag}>"), "");
    text = text.replace("<![CDATA[", "").replace("]]>", "");
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push('\n');
    }
    target.push_str(text);
}
