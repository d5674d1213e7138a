//! Macro tokenizer for `${NAME}` syntax.
//!
//! Splits a string into plain text, parameter and equality-sign segments.
//! Tokenizing never fails: unterminated parameters run to the end of input.

use serde::{Deserialize, Serialize};

/// Kind of a tokenized segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Literal text.
    PlainText,
    /// A `${...}` parameter, possibly unterminated.
    Parameter,
    /// The first top-level `=` when equals recognition is enabled.
    EqualitySign,
}

/// A contiguous slice of the tokenized input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroSegment {
    /// The raw text of this segment, exactly as it appears in the input.
    pub text: String,
    /// What this segment represents.
    pub kind: SegmentKind,
}

impl MacroSegment {
    /// Creates a new segment.
    #[must_use]
    pub fn new(text: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// Returns true if this segment is a closed `${...}` parameter.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.kind == SegmentKind::Parameter
            && self.text.len() > 2
            && self.text.ends_with('}')
            && !self.text[..self.text.len() - 1].ends_with('\\')
    }

    /// Returns the variable name referenced by a parameter segment.
    ///
    /// For an unterminated parameter the name runs to the end of the text.
    #[must_use]
    pub fn parameter_name(&self) -> Option<&str> {
        if self.kind != SegmentKind::Parameter {
            return None;
        }
        let inner = self.text.get(2..).unwrap_or("");
        if self.is_terminated() {
            Some(&inner[..inner.len() - 1])
        } else {
            Some(inner)
        }
    }
}

/// A tokenized string.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MacroText {
    segments: Vec<MacroSegment>,
}

impl MacroText {
    /// Tokenizes `input`.
    ///
    /// When `recognize_equals` is set, only the first `=` outside a parameter
    /// becomes an [`SegmentKind::EqualitySign`] segment, mirroring
    /// `key=value` splitting.
    ///
    /// # Examples
    ///
    /// ```
    /// use httpiness_domain::macro_text::{MacroText, SegmentKind};
    ///
    /// let text = MacroText::parse("key=${A}=b", true);
    /// let kinds: Vec<_> = text.segments().iter().map(|s| s.kind).collect();
    /// assert_eq!(
    ///     kinds,
    ///     vec![
    ///         SegmentKind::PlainText,
    ///         SegmentKind::EqualitySign,
    ///         SegmentKind::Parameter,
    ///         SegmentKind::PlainText,
    ///     ]
    /// );
    /// ```
    #[must_use]
    pub fn parse(input: &str, recognize_equals: bool) -> Self {
        let chars: Vec<(usize, char)> = input.char_indices().collect();
        let mut segments = Vec::new();
        let mut kind = SegmentKind::PlainText;
        let mut start = 0;
        let mut equals = recognize_equals;

        for (i, &(offset, ch)) in chars.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| chars[p].1);
            let next = chars.get(i + 1).map(|&(_, c)| c);

            if equals && kind != SegmentKind::Parameter && ch == '=' {
                push_pending(&mut segments, &input[start..offset], kind);
                segments.push(MacroSegment::new("=", SegmentKind::EqualitySign));
                start = offset + ch.len_utf8();
                equals = false;
                kind = SegmentKind::PlainText;
            } else if kind != SegmentKind::Parameter && ch == '$' && next == Some('{') {
                push_pending(&mut segments, &input[start..offset], kind);
                start = offset;
                kind = SegmentKind::Parameter;
            } else if kind == SegmentKind::Parameter && ch == '}' && prev != Some('\\') {
                let end = offset + ch.len_utf8();
                segments.push(MacroSegment::new(&input[start..end], SegmentKind::Parameter));
                start = end;
                kind = SegmentKind::PlainText;
            }
        }

        push_pending(&mut segments, &input[start..], kind);

        if segments.is_empty() {
            segments.push(MacroSegment::new("", SegmentKind::PlainText));
        }

        Self { segments }
    }

    /// Returns the segments in input order.
    #[must_use]
    pub fn segments(&self) -> &[MacroSegment] {
        &self.segments
    }

    /// Consumes the text, returning its segments.
    #[must_use]
    pub fn into_segments(self) -> Vec<MacroSegment> {
        self.segments
    }

    /// Returns true if any segment is a parameter.
    #[must_use]
    pub fn has_parameters(&self) -> bool {
        self.segments
            .iter()
            .any(|s| s.kind == SegmentKind::Parameter)
    }

    /// Returns the referenced variable names in order of first appearance.
    #[must_use]
    pub fn macro_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.segments.iter().filter_map(MacroSegment::parameter_name) {
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Shorthand for `MacroText::parse(input, false).macro_names()`.
    #[must_use]
    pub fn macro_names_in(input: &str) -> Vec<String> {
        Self::parse(input, false).macro_names()
    }
}

impl std::fmt::Display for MacroText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for segment in &self.segments {
            f.write_str(&segment.text)?;
        }
        Ok(())
    }
}

fn push_pending(segments: &mut Vec<MacroSegment>, text: &str, kind: SegmentKind) {
    if !text.is_empty() {
        segments.push(MacroSegment::new(text, kind));
    }
}
