//! redis-rs Integration
//!
//! Adapts `redis::Cmd` to the [`Command`] seam so the hook can trace real
//! redis-rs commands and pipelines without a wrapper type.

use std::borrow::Cow;

use redis::{Arg as RedisArg, Cmd, Pipeline};

use crate::command::{Arg, Command};

impl Command for Cmd {
    /// The first simple argument is the command keyword. Commands built
    /// without one (or starting with a cursor) report an empty name.
    fn full_name(&self) -> Cow<'_, str> {
        match self.args_iter().next() {
            Some(RedisArg::Simple(name)) => String::from_utf8_lossy(name),
            _ => Cow::Borrowed(""),
        }
    }

    fn args(&self) -> Box<dyn Iterator<Item = Arg<'_>> + '_> {
        Box::new(self.args_iter().map(|arg| match arg {
            RedisArg::Simple(bytes) => Arg::Bytes(bytes),
            // Scan cursors are filled in by the driver at send time.
            RedisArg::Cursor => Arg::Str("0"),
        }))
    }
}

/// Collect a pipeline's commands for the pipeline hook methods.
pub fn pipeline_commands(pipe: &Pipeline) -> Vec<&dyn Command> {
    pipe.cmd_iter().map(|cmd| cmd as &dyn Command).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::{append_cmd, render, summarize_pipeline};
    use bytes::BytesMut;

    #[test]
    fn cmd_full_name_is_first_arg() {
        let mut cmd = Cmd::new();
        cmd.arg("HSET").arg("user:1").arg("name").arg("alice");
        assert_eq!(cmd.full_name(), "HSET");
    }

    #[test]
    fn cmd_serializes_space_separated() {
        let mut cmd = Cmd::new();
        cmd.arg("SET").arg("key").arg("value");

        let mut buf = BytesMut::new();
        append_cmd(&mut buf, &cmd);
        assert_eq!(render(buf), "SET key value");
    }

    #[test]
    fn empty_cmd_has_empty_name() {
        let cmd = Cmd::new();
        assert_eq!(cmd.full_name(), "");
    }

    #[test]
    fn pipeline_commands_summarize() {
        let mut pipe = redis::pipe();
        pipe.cmd("GET").arg("a");
        pipe.cmd("GET").arg("b");

        let cmds = pipeline_commands(&pipe);
        let summary = summarize_pipeline(&cmds);
        assert_eq!(summary.span_name(), "pipeline GET");
        assert_eq!(render(summary.cmds), "GET a\nGET b");
    }
}
