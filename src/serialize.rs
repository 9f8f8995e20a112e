//! Bounded Command Serialization
//!
//! Turns opaque commands into human-readable trace tags with hard caps so
//! a pathological argument (or a huge pipeline) can never blow up span
//! payloads: each argument is truncated individually, pipelines stop
//! serializing past a fixed command count, and pipeline span names carry
//! at most a handful of unique command keywords.

use std::collections::HashSet;

use bytes::BytesMut;

use crate::command::{append_arg, Command};

/// Per-argument rendering cap, measured from the argument's own start
/// offset in the buffer.
pub const MAX_ARG_LEN: usize = 64;

/// Pipeline serialization stops once the command index exceeds this.
pub const MAX_PIPELINE_CMDS: usize = 100;

/// Cap on unique command names collected for a pipeline span name.
pub const MAX_UNIQUE_NAMES: usize = 10;

const ELLIPSIS: &[u8] = b"...";

/// Append one command's serialized form to `buf`.
///
/// Arguments are space-separated; any single rendering longer than
/// [`MAX_ARG_LEN`] bytes is cut at the cap and suffixed with `...`. A
/// terminal error on the command is appended as `": " + message`.
pub fn append_cmd(buf: &mut BytesMut, cmd: &dyn Command) {
    for (i, arg) in cmd.args().enumerate() {
        if i > 0 {
            buf.extend_from_slice(b" ");
        }

        let start = buf.len();
        append_arg(buf, &arg);
        if buf.len() - start > MAX_ARG_LEN {
            buf.truncate(start + MAX_ARG_LEN);
            buf.extend_from_slice(ELLIPSIS);
        }
    }

    if let Some(err) = cmd.err() {
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(err.to_string().as_bytes());
    }
}

/// Serialized view of a pipeline: one line per command plus the unique
/// command names that make up the span name.
pub struct PipelineSummary {
    /// Newline-joined per-command serializations, capped at
    /// [`MAX_PIPELINE_CMDS`] + 1 commands.
    pub cmds: BytesMut,
    /// Up to [`MAX_UNIQUE_NAMES`] distinct full names, first-seen order.
    pub names: Vec<String>,
}

impl PipelineSummary {
    /// Span name for the pipeline: the literal `pipeline` followed by the
    /// collected unique command names.
    pub fn span_name(&self) -> String {
        format!("pipeline {}", self.names.join(" "))
    }
}

/// Walk a pipeline's commands once, producing both the multi-line tag
/// value and the deduplicated name list.
pub fn summarize_pipeline(cmds: &[&dyn Command]) -> PipelineSummary {
    let mut seen = HashSet::with_capacity(cmds.len().min(MAX_UNIQUE_NAMES));
    let mut names = Vec::new();

    let mut buf = BytesMut::with_capacity(32 * cmds.len().min(MAX_PIPELINE_CMDS + 1));

    for (i, cmd) in cmds.iter().enumerate() {
        if i > MAX_PIPELINE_CMDS {
            break;
        }

        if i > 0 {
            buf.extend_from_slice(b"\n");
        }
        append_cmd(&mut buf, *cmd);

        if names.len() >= MAX_UNIQUE_NAMES {
            continue;
        }

        let name = cmd.full_name().into_owned();
        if seen.insert(name.clone()) {
            names.push(name);
        }
    }

    PipelineSummary { cmds: buf, names }
}

/// Finish a serialization buffer for use as a span attribute value.
///
/// Truncation happens at byte offsets, so a multi-byte sequence can be
/// split; lossy conversion keeps rendering total.
pub fn render(buf: BytesMut) -> String {
    String::from_utf8_lossy(&buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Arg;
    use std::borrow::Cow;
    use std::error::Error;

    struct TestCmd {
        name: String,
        args: Vec<String>,
        err: Option<std::io::Error>,
    }

    impl TestCmd {
        fn new(args: &[&str]) -> Self {
            TestCmd {
                name: args.first().copied().unwrap_or("").to_string(),
                args: args.iter().map(|s| s.to_string()).collect(),
                err: None,
            }
        }

        fn with_err(mut self, msg: &str) -> Self {
            self.err = Some(std::io::Error::new(std::io::ErrorKind::Other, msg.to_string()));
            self
        }
    }

    impl Command for TestCmd {
        fn full_name(&self) -> Cow<'_, str> {
            Cow::Borrowed(&self.name)
        }

        fn args(&self) -> Box<dyn Iterator<Item = Arg<'_>> + '_> {
            Box::new(self.args.iter().map(|s| Arg::Str(s)))
        }

        fn err(&self) -> Option<&(dyn Error + 'static)> {
            self.err.as_ref().map(|e| e as &(dyn Error + 'static))
        }
    }

    fn serialize(cmd: &TestCmd) -> String {
        let mut buf = BytesMut::new();
        append_cmd(&mut buf, cmd);
        render(buf)
    }

    #[test]
    fn space_separated_args() {
        let cmd = TestCmd::new(&["SET", "key", "value"]);
        assert_eq!(serialize(&cmd), "SET key value");
    }

    #[test]
    fn long_arg_is_truncated_with_ellipsis() {
        let long = "x".repeat(100);
        let cmd = TestCmd::new(&["SET", "key", long.as_str()]);
        let expected = format!("SET key {}...", "x".repeat(MAX_ARG_LEN));
        assert_eq!(serialize(&cmd), expected);
    }

    #[test]
    fn arg_at_exact_limit_is_untouched() {
        let exact = "y".repeat(MAX_ARG_LEN);
        let cmd = TestCmd::new(&["GET", exact.as_str()]);
        assert_eq!(serialize(&cmd), format!("GET {exact}"));
    }

    #[test]
    fn truncation_is_per_argument_not_whole_buffer() {
        let a = "a".repeat(70);
        let b = "b".repeat(70);
        let cmd = TestCmd::new(&["MSET", a.as_str(), b.as_str()]);
        let out = serialize(&cmd);
        assert_eq!(
            out,
            format!("MSET {}... {}...", "a".repeat(64), "b".repeat(64))
        );
    }

    #[test]
    fn terminal_error_is_appended() {
        let cmd = TestCmd::new(&["GET", "missing"]).with_err("connection reset");
        assert_eq!(serialize(&cmd), "GET missing: connection reset");
    }

    #[test]
    fn error_on_empty_command() {
        let cmd = TestCmd::new(&[]).with_err("boom");
        assert_eq!(serialize(&cmd), ": boom");
    }

    #[test]
    fn truncation_through_multibyte_char_stays_renderable() {
        // 63 ASCII bytes then a 3-byte char: the cut lands mid-sequence.
        let arg = format!("{}\u{4e16}{}", "z".repeat(63), "tail");
        let cmd = TestCmd::new(&["SET", "k", arg.as_str()]);
        let out = serialize(&cmd);
        assert!(out.starts_with(&format!("SET k {}", "z".repeat(63))));
        assert!(out.ends_with("..."));
    }

    #[test]
    fn pipeline_one_line_per_command() {
        let a = TestCmd::new(&["GET", "a"]);
        let b = TestCmd::new(&["GET", "b"]);
        let cmds: Vec<&dyn Command> = vec![&a, &b];

        let summary = summarize_pipeline(&cmds);
        assert_eq!(render(summary.cmds), "GET a\nGET b");
    }

    #[test]
    fn pipeline_names_dedupe_in_first_seen_order() {
        let a = TestCmd::new(&["GET", "a"]);
        let b = TestCmd::new(&["SET", "b", "1"]);
        let c = TestCmd::new(&["GET", "c"]);
        let cmds: Vec<&dyn Command> = vec![&a, &b, &c];

        let summary = summarize_pipeline(&cmds);
        assert_eq!(summary.names, vec!["GET", "SET"]);
        assert_eq!(summary.span_name(), "pipeline GET SET");
    }

    #[test]
    fn pipeline_name_list_caps_at_ten() {
        let keywords = [
            "GET", "SET", "DEL", "INCR", "DECR", "HGET", "HSET", "SADD", "SREM", "EXPIRE",
            "TTL", "LPUSH",
        ];
        let owned: Vec<TestCmd> = keywords.iter().map(|&k| TestCmd::new(&[k, "k"])).collect();
        let cmds: Vec<&dyn Command> = owned.iter().map(|c| c as &dyn Command).collect();

        let summary = summarize_pipeline(&cmds);
        assert_eq!(summary.names.len(), MAX_UNIQUE_NAMES);
        assert_eq!(summary.names.last().map(String::as_str), Some("EXPIRE"));
    }

    #[test]
    fn pipeline_serialization_stops_past_index_limit() {
        let owned: Vec<TestCmd> = (0..150).map(|_| TestCmd::new(&["PING"])).collect();
        let cmds: Vec<&dyn Command> = owned.iter().map(|c| c as &dyn Command).collect();

        let summary = summarize_pipeline(&cmds);
        let text = render(summary.cmds);
        // Indices 0..=100 serialize; index 101 breaks the loop.
        assert_eq!(text.lines().count(), MAX_PIPELINE_CMDS + 1);
    }

    #[test]
    fn empty_pipeline_summary() {
        let summary = summarize_pipeline(&[]);
        assert!(summary.names.is_empty());
        assert_eq!(summary.span_name(), "pipeline ");
        assert_eq!(render(summary.cmds), "");
    }
}
