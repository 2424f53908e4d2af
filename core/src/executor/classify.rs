use std::sync::OnceLock;

use regex::Regex;

use super::types::{ErrorKind, SnippetFailure};

/// Map an error name to its reporting class.
pub fn classify(name: &str) -> ErrorKind {
    match name.trim() {
        "TypeError" => ErrorKind::TypeLike,
        "ReferenceError" => ErrorKind::ReferenceLike,
        "RangeError" => ErrorKind::RangeLike,
        _ => ErrorKind::Other,
    }
}

fn error_line_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^\s*(?:Uncaught\s+)?((?:[A-Z][A-Za-z0-9_$]*)?(?:Error|Exception))(?:\s*\[[A-Za-z0-9_]+\])?:\s?(.*)$",
        )
        .expect("valid error line regex")
    })
}

/// Parse a `Name: message` line, e.g. `TypeError: x is not a function`.
pub fn parse_error_line(line: &str) -> Option<SnippetFailure> {
    let caps = error_line_re().captures(line)?;
    let name = caps.get(1)?.as_str();
    let message = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
    Some(SnippetFailure::named(name, message))
}

fn location_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\S+:\d+$").expect("valid location regex"))
}

fn is_caret_line(line: &str) -> bool {
    let t = line.trim();
    !t.is_empty() && t.chars().all(|c| c == '^')
}

/// The value an interpreter reported as uncaught.
///
/// Node prints `<file>:<line>`, the offending source line and a `^` marker, then a blank
/// line and the thrown value (`Name: message` for errors, the bare value otherwise).
fn uncaught_block(lines: &[String]) -> Option<SnippetFailure> {
    let header = (0..lines.len()).rev().find(|&i| {
        location_re().is_match(lines[i].trim())
            && lines[i + 1..].iter().take(3).any(|l| is_caret_line(l))
    })?;
    let caret = header + 1 + lines[header + 1..].iter().position(|l| is_caret_line(l))?;
    let thrown = lines[caret + 1..]
        .iter()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())?;
    Some(parse_error_line(thrown).unwrap_or_else(|| SnippetFailure::other(thrown)))
}

/// Best-effort failure description from an interpreter's stderr tail.
///
/// Prefers the interpreter's uncaught-exception block. Without one, the last
/// `XxxError: message` line (earlier ones are usually caught errors the snippet printed
/// itself); otherwise the last line that is not a stack frame or interpreter banner;
/// otherwise the exit status.
pub fn failure_from_stderr(lines: &[String], exit_code: Option<i32>) -> SnippetFailure {
    if let Some(failure) = uncaught_block(lines) {
        return failure;
    }

    if let Some(failure) = lines.iter().rev().find_map(|l| parse_error_line(l)) {
        return failure;
    }

    let meaningful = lines.iter().rev().map(|l| l.trim()).find(|l| {
        !l.is_empty()
            && !l.starts_with("at ")
            && !l.starts_with("Node.js v")
            && !l.starts_with("(Use `node")
            && !l.chars().all(|c| c == '^' || c == ' ')
    });
    if let Some(line) = meaningful {
        return SnippetFailure::other(line);
    }

    match exit_code {
        Some(code) => SnippetFailure::other(format!("process exited with status {code}")),
        None => SnippetFailure::other("process terminated by signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(s: &str) -> Vec<String> {
        s.lines().map(str::to_string).collect()
    }

    #[test]
    fn classifies_standard_error_names() {
        assert_eq!(classify("TypeError"), ErrorKind::TypeLike);
        assert_eq!(classify("ReferenceError"), ErrorKind::ReferenceLike);
        assert_eq!(classify("RangeError"), ErrorKind::RangeLike);
        assert_eq!(classify("SyntaxError"), ErrorKind::Other);
        assert_eq!(classify("Error"), ErrorKind::Other);
    }

    #[test]
    fn extracts_uncaught_error_from_stack_dump() {
        let stderr = lines(
            "[stdin]:3\n    undefinedFn();\n    ^\n\nReferenceError: undefinedFn is not defined\n    at [stdin]:3:5\n\nNode.js v20.11.0",
        );
        let f = failure_from_stderr(&stderr, Some(1));
        assert_eq!(f.kind, ErrorKind::ReferenceLike);
        assert_eq!(f.message, "undefinedFn is not defined");
    }

    #[test]
    fn uncaught_error_wins_over_printed_ones() {
        let stderr = lines("TypeError: caught and logged

Error: boom
    at [stdin]:9:7");
        let f = failure_from_stderr(&stderr, Some(1));
        assert_eq!(f.kind, ErrorKind::Other);
        assert_eq!(f.message, "boom");
    }

    #[test]
    fn thrown_value_beats_printed_error_lines() {
        let stderr = lines(
            "TypeError: handled earlier\n[stdin]:1\nconsole.error('TypeError: handled earlier'); throw 'boom';\n                                                    ^\nboom\n(Use `node --trace-uncaught ...` to show where the exception was thrown)\n\nNode.js v20.11.0",
        );
        let f = failure_from_stderr(&stderr, Some(1));
        assert_eq!(f.kind, ErrorKind::Other);
        assert_eq!(f.message, "boom");
    }

    #[test]
    fn uncaught_block_ignores_lines_printed_before_it() {
        let stderr = lines(
            "RangeError: logged by the snippet\n[stdin]:4\n    null.x;\n         ^\n\nTypeError: Cannot read properties of null (reading 'x')\n    at [stdin]:4:10\n\nNode.js v20.11.0",
        );
        let f = failure_from_stderr(&stderr, Some(1));
        assert_eq!(f.kind, ErrorKind::TypeLike);
        assert_eq!(f.message, "Cannot read properties of null (reading 'x')");
    }

    #[test]
    fn location_without_caret_is_not_a_block() {
        let stderr = lines("config.js:12\nTypeError: bad");
        assert_eq!(failure_from_stderr(&stderr, Some(1)).message, "bad");
    }

    #[test]
    fn error_codes_in_brackets_are_skipped() {
        let f = parse_error_line("RangeError [ERR_OUT_OF_RANGE]: value out of range").unwrap();
        assert_eq!(f.kind, ErrorKind::RangeLike);
        assert_eq!(f.message, "value out of range");
    }

    #[test]
    fn falls_back_to_last_meaningful_line() {
        let stderr = lines("boom\n(Use `node --trace-uncaught ...` to show where)\n\nNode.js v20");
        assert_eq!(failure_from_stderr(&stderr, Some(1)).message, "boom");
    }

    #[test]
    fn falls_back_to_exit_status() {
        let f = failure_from_stderr(&[], Some(3));
        assert_eq!(f.message, "process exited with status 3");
        assert_eq!(failure_from_stderr(&[], None).message, "process terminated by signal");
    }
}
