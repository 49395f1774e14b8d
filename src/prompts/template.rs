//! Task templates with typed placeholders
//!
//! A template is parsed once into literal text and `{subject}` slots, so
//! rendering can only ever splice the subject in verbatim.

use crate::error::CrewError;
use crate::models::Subject;
use crate::Result;

const SUBJECT_PLACEHOLDER: &str = "subject";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Subject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse template text. `{{` and `}}` are literal braces; any other
    /// `{name}` must be `{subject}`, which must occur at least once.
    pub fn parse(source: &str) -> Result<Self> {
        let mut segments = Vec::new();
        let mut text = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    text.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    text.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => name.push(ch),
                            None => {
                                return Err(CrewError::Template(format!(
                                    "unterminated placeholder '{{{}'",
                                    name
                                )))
                            }
                        }
                    }

                    if name.trim() != SUBJECT_PLACEHOLDER {
                        return Err(CrewError::Template(format!(
                            "unknown placeholder '{{{}}}'",
                            name
                        )));
                    }

                    if !text.is_empty() {
                        segments.push(Segment::Text(std::mem::take(&mut text)));
                    }
                    segments.push(Segment::Subject);
                }
                '}' => {
                    return Err(CrewError::Template(
                        "unmatched '}' in template".to_string(),
                    ))
                }
                other => text.push(other),
            }
        }

        if !text.is_empty() {
            segments.push(Segment::Text(text));
        }

        if !segments.iter().any(|s| *s == Segment::Subject) {
            return Err(CrewError::Template(
                "template has no {subject} placeholder".to_string(),
            ));
        }

        Ok(Self { segments })
    }

    pub fn render(&self, subject: &Subject) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Subject => out.push_str(subject.as_str()),
            }
        }
        out
    }
}
