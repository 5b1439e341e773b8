//! Recorded trace of a run.

/// Log target of trace lines.
pub const TARGET: &str = "kds";

/// Ordered trace lines of a run.
///
/// Each line is forwarded to the [`log`] facade at info level
/// and kept so the sequence can be inspected afterwards.
///
/// # Examples
///
/// ```
/// use kds::Trace;
///
/// let mut trace = Trace::new();
/// trace.emit("Begin linked list test:");
/// trace.emit("3");
/// trace.emit("End linked list test");
///
/// assert_eq!(trace.section("linked list"), Some(&["3".to_string()][..]));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Trace {
    lines: Vec<String>,
}

impl Trace {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs `line` and appends it.
    pub fn emit<S>(&mut self, line: S)
    where
        S: Into<String>,
    {
        let line = line.into();
        log::info!(target: TARGET, "{line}");
        self.lines.push(line);
    }

    /// Returns all lines in emission order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns the lines between the `Begin {name} test:` and `End {name} test` banners,
    /// or [`None`] if either banner is missing.
    pub fn section(&self, name: &str) -> Option<&[String]> {
        let begin = format!("Begin {name} test:");
        let end = format!("End {name} test");
        let start = self.lines.iter().position(|l| *l == begin)? + 1;
        let len = self.lines[start..].iter().position(|l| *l == end)?;
        Some(&self.lines[start..start + len])
    }

    /// Returns the number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Checks if nothing was emitted.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn test_section_missing_end() {
        let mut trace = Trace::new();
        trace.emit("Begin bitmap test:");
        trace.emit("1");
        assert_eq!(trace.section("bitmap"), None);
        assert_eq!(trace.section("hash table"), None);
        assert_eq!(trace.len(), 2);
    }

    #[test_log::test]
    fn test_nested_sections() {
        let mut trace = Trace::new();
        for line in [
            "Begin sparse array test:",
            "1",
            "Begin sparse array odd number test:",
            "1",
            "End sparse array odd number test",
            "End sparse array test",
        ] {
            trace.emit(line);
        }
        assert_eq!(trace.section("sparse array").map(<[_]>::len), Some(4));
        assert_eq!(
            trace.section("sparse array odd number"),
            Some(&["1".to_string()][..])
        );
    }
}
