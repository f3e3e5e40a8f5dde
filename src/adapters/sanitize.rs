//! Log sanitization for patient-identifying text.
//!
//! Formatted log lines pass through [`SanitizingMakeWriter`] before reaching
//! the sink. The patterns cover:
//! - prediction ids (UUIDs)
//! - e-mail addresses and phone numbers
//! - CPF numbers
//! - dumped feature vectors and raw answer fields
//!
//! Call sites should still avoid logging answers; this is the fallback.
//! Input is capped (see `OBESITRACK_SANITIZE_MAX_BYTES`) so a single huge
//! line cannot stall the logger.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

/// Default per-call cap, 16 KiB.
const DEFAULT_SANITIZE_MAX_BYTES: usize = 16 * 1024;

struct Rule {
    regex: Regex,
    replacement: &'static str,
}

struct Patterns {
    set: RegexSet,
    rules: Vec<Rule>,
}

fn truncate_to_char_boundary(input: &str, max_bytes: usize) -> (&str, bool) {
    if input.len() <= max_bytes {
        return (input, false);
    }

    let mut end = max_bytes;
    while end > 0 && !input.is_char_boundary(end) {
        end -= 1;
    }
    (&input[..end], true)
}

fn max_sanitize_bytes() -> usize {
    std::env::var("OBESITRACK_SANITIZE_MAX_BYTES")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_SANITIZE_MAX_BYTES)
}

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| {
        let table: [(&'static str, &'static str); 6] = [
            (
                r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}",
                "[REDACTED-ID]",
            ),
            (
                r"(?i)\b[a-z0-9](?:[a-z0-9._%+-]{0,62}[a-z0-9])?@(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}\b",
                "[REDACTED-EMAIL]",
            ),
            // CPF before phone so the phone rule cannot eat part of it.
            (r"\b\d{3}\.\d{3}\.\d{3}-\d{2}\b", "[REDACTED-CPF]"),
            (
                r"(?:\+\d{1,3}[-.\s]?)?\(?\b\d{2,3}\)?[-.\s]?\d{4,5}[-.\s]?\d{4}\b",
                "[REDACTED-PHONE]",
            ),
            // `values: [24.2, 2.0, ...]` or `values=[...]` from a Debug-printed FeatureVector
            (r"\bvalues\s*[:=]\s*\[[^\]]{0,2048}\]", "values: [REDACTED-VECTOR]"),
            (
                r"(?i)\b(age|height(?:_m)?|weight(?:_kg)?|bmi|fcvc|ncp|ch2o|faf|tue)\s*[:=]\s*-?\d+(?:\.\d+)?",
                "$1: [REDACTED]",
            ),
        ];

        let set = RegexSet::new(table.iter().map(|(p, _)| *p)).expect("Valid regex set");
        let rules = table
            .into_iter()
            .map(|(pattern, replacement)| Rule {
                regex: Regex::new(pattern).expect("Valid regex"),
                replacement,
            })
            .collect();

        Patterns { set, rules }
    })
}

/// Redact identifying patterns from `input`.
#[must_use]
pub fn sanitize(input: &str) -> String {
    sanitize_with_limit(input, max_sanitize_bytes())
}

fn sanitize_with_limit(input: &str, max_bytes: usize) -> String {
    let patterns = patterns();
    let (prefix, truncated) = truncate_to_char_boundary(input, max_bytes);

    let mut result = prefix.to_string();
    // Rules run in table order, only for those that matched the original text.
    for idx in patterns.set.matches(prefix).into_iter() {
        let rule = &patterns.rules[idx];
        result = rule.regex.replace_all(&result, rule.replacement).to_string();
    }

    if truncated {
        result.push_str(" [TRUNCATED]");
    }
    result
}

/// Whether `input` contains anything [`sanitize`] would redact.
#[must_use]
pub fn contains_sensitive(input: &str) -> bool {
    let (prefix, _) = truncate_to_char_boundary(input, max_sanitize_bytes());
    patterns().set.is_match(prefix)
}

/// `MakeWriter` wrapper that sanitizes each formatted line.
#[derive(Debug, Clone)]
pub struct SanitizingMakeWriter<M> {
    inner: M,
}

impl<M> SanitizingMakeWriter<M> {
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

/// Line-buffering writer produced by [`SanitizingMakeWriter`].
pub struct SanitizingWriter<W> {
    inner: W,
    buffer: Vec<u8>,
}

impl<W: std::io::Write> SanitizingWriter<W> {
    fn write_sanitized(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.inner.write_all(sanitize(&text).as_bytes())
    }

    fn flush_lines(&mut self) -> std::io::Result<()> {
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.write_sanitized(&line)?;
        }
        Ok(())
    }
}

impl<W: std::io::Write> std::io::Write for SanitizingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer.extend_from_slice(buf);

        // A line with no newline in sight is flushed once it passes twice the cap.
        if self.buffer.len() > max_sanitize_bytes().saturating_mul(2) {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
            self.inner.write_all(b"\n")?;
            return Ok(buf.len());
        }

        self.flush_lines()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_lines()?;
        if !self.buffer.is_empty() {
            let pending = std::mem::take(&mut self.buffer);
            self.write_sanitized(&pending)?;
        }
        self.inner.flush()
    }
}

impl<'a, M> MakeWriter<'a> for SanitizingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = SanitizingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SanitizingWriter {
            inner: self.inner.make_writer(),
            buffer: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_sanitize_prediction_id() {
        let sanitized = sanitize("Prediction 550e8400-e29b-41d4-a716-446655440000 stored");
        assert!(sanitized.contains("[REDACTED-ID]"));
        assert!(!sanitized.contains("550e8400"));
    }

    #[test]
    fn test_sanitize_email_and_phone() {
        let sanitized = sanitize("Contact: paciente@clinica.com.br or (11) 98765-4321");
        assert!(sanitized.contains("[REDACTED-EMAIL]"));
        assert!(sanitized.contains("[REDACTED-PHONE]"));
        assert!(!sanitized.contains("98765"));
    }

    #[test]
    fn test_sanitize_cpf() {
        let sanitized = sanitize("CPF 123.456.789-09");
        assert!(sanitized.contains("[REDACTED-CPF]"));
        assert!(!sanitized.contains("789"));
    }

    #[test]
    fn test_sanitize_vector_dump() {
        let line = "FeatureVector { layout: CompactV1, values: [24.22, 2.0, 1.0, 3.0] }";
        let sanitized = sanitize(line);
        assert!(sanitized.contains("values: [REDACTED-VECTOR]"));
        assert!(!sanitized.contains("24.22"));
        assert!(sanitized.contains("CompactV1"));
    }

    #[test]
    fn test_sanitize_answer_fields() {
        let sanitized = sanitize("age: 45, weight_kg=70.5, layout=compact-v1");
        assert!(!sanitized.contains("45"));
        assert!(!sanitized.contains("70.5"));
        assert!(sanitized.contains("layout=compact-v1"));
    }

    #[test]
    fn test_contains_sensitive() {
        assert!(contains_sensitive("id 550e8400-e29b-41d4-a716-446655440000"));
        assert!(!contains_sensitive("Loaded model (layout=compact-v1, trees=2)"));
    }

    #[test]
    fn test_truncates_large_inputs() {
        let sanitized = sanitize_with_limit("ação ação ação ação", 6);
        assert!(sanitized.ends_with("[TRUNCATED]"));
    }

    #[test]
    fn test_writer_sanitizes_lines() {
        let mut writer = SanitizingWriter {
            inner: Vec::new(),
            buffer: Vec::new(),
        };
        writer.write_all(b"bmi: 31.2 ").expect("write");
        assert!(writer.inner.is_empty());
        writer.write_all(b"done\n").expect("write");
        writer.flush().expect("flush");
        let out = String::from_utf8(writer.inner).expect("utf8");
        assert_eq!(out, "bmi: [REDACTED] done\n");
    }
}
