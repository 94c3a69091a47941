//! Ripper subprocess producer
//!
//! Pipes Ruby source into an interpreter that prints
//! `JSON.generate(Ripper.sexp(source), max_nesting: false)`, then decodes the dump like any
//! other S-expression.

use super::framework::AstProducer;
use crate::ast::{AstNode, parse_program};
use crate::{Error, Result};
use std::io::Write;
use std::process::{Command, Stdio};

// `JSON.generate` refuses trees deeper than 100 levels unless told otherwise
const DUMP_SCRIPT: &str = "print JSON.generate(Ripper.sexp(STDIN.read), max_nesting: false)";

#[derive(Debug, Clone)]
pub struct RipperProducer {
    ruby: String,
}

impl RipperProducer {
    /// Use the interpreter at `ruby` (a path or a name on `PATH`)
    pub fn new(ruby: impl Into<String>) -> Self {
        Self { ruby: ruby.into() }
    }

    pub fn interpreter(&self) -> &str {
        &self.ruby
    }

    fn dump(&self, path: &str, content: &str) -> Result<String> {
        let mut child = Command::new(&self.ruby)
            .args(["-rripper", "-rjson", "-e", DUMP_SCRIPT])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Adapter(format!("failed to run `{}`: {}", self.ruby, e)))?;

        let written = match child.stdin.take() {
            // stdin is closed when dropped, before waiting on the child
            Some(mut stdin) => stdin.write_all(content.as_bytes()),
            None => Ok(()),
        };
        if let Err(e) = written {
            // The interpreter may have exited early; reap it either way
            child.kill().ok();
            let output = child.wait_with_output()?;
            return Err(Error::Adapter(format!(
                "{}: failed to send source to `{}`: {}: {}",
                path,
                self.ruby,
                e,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(Error::Adapter(format!(
                "{}: `{}` exited with {}: {}",
                path,
                self.ruby,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| Error::Adapter(format!("{}: non UTF-8 AST dump: {}", path, e)))
    }
}

impl AstProducer for RipperProducer {
    fn name(&self) -> &str {
        "ripper"
    }

    fn file_extensions(&self) -> &[&str] {
        &["rb"]
    }

    fn produce(&self, path: &str, content: &str) -> Result<AstNode> {
        let dump = self.dump(path, content)?;
        parse_program(&dump).map_err(|e| match e {
            Error::Parse(msg) => Error::Parse(format!("{}: {}", path, msg)),
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_handles_ruby_sources() {
        let producer = RipperProducer::new("ruby");
        assert!(producer.can_handle(Path::new("app/models/user.rb")));
        assert!(!producer.can_handle(Path::new("Gemfile")));
        assert_eq!(producer.interpreter(), "ruby");
    }

    #[test]
    fn test_missing_interpreter_is_an_adapter_error() {
        let producer = RipperProducer::new("/nonexistent/buildorder-ruby");
        let err = producer.produce("a.rb", "class A; end").unwrap_err();
        assert!(matches!(err, Error::Adapter(_)));
    }

    #[test]
    fn test_dump_script_lifts_nesting_limit() {
        assert!(DUMP_SCRIPT.contains("max_nesting: false"));
    }

    #[cfg(unix)]
    #[test]
    fn test_interpreter_exiting_early_is_reaped() {
        // `true` ignores its input and exits at once, so a large write hits
        // a closed pipe
        let producer = RipperProducer::new("true");
        let source = "A = 1\n".repeat(1 << 20);
        let err = producer.produce("big.rb", &source).unwrap_err();
        assert!(matches!(err, Error::Adapter(_)));
    }
}
