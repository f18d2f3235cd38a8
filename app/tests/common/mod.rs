//! Test helper module for E2E tests
//!
//! Provides `TestFixture`: a stub Hound server plus helpers for running `hq`.

#![allow(dead_code)] // Test helpers may not be used in all test modules
#![allow(deprecated)] // cargo_bin() deprecation - the new API requires more investigation

pub mod mcp;

use assert_cmd::Command;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::path::PathBuf;

/// One repo, one file, one match on line 10 of `a.js`.
pub const ONE_MATCH: &str = r#"{
    "Results": {
        "repoA": {
            "Matches": [{
                "Filename": "a.js",
                "Matches": [{
                    "LineNumber": 10,
                    "Line": "const foo = 1;",
                    "Before": ["// b1", "// b2"],
                    "After": ["// a1", "// a2"]
                }]
            }]
        }
    }
}"#;

/// Two repos, three matches, the second near the top of its file.
pub const THREE_MATCHES: &str = r#"{
    "Results": {
        "web": {
            "Matches": [
                {"Filename": "src/app.ts", "Matches": [
                    {"LineNumber": 40, "Line": "render(needle)", "Before": ["a", "b"], "After": ["c", "d"]},
                    {"LineNumber": 2, "Line": "import needle", "Before": ["// header"], "After": ["", "x"]}
                ]}
            ]
        },
        "api": {
            "Matches": [
                {"Filename": "main.go", "Matches": [
                    {"LineNumber": 7, "Line": "needle := 1", "Before": ["p", "q"], "After": ["r", "s"]}
                ]}
            ]
        }
    }
}"#;

/// Stub Hound server and scratch directory for config files.
pub struct TestFixture {
    pub server: ServerGuard,
    pub dir: TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            server: Server::new(),
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn base_uri(&self) -> String {
        self.server.url()
    }

    /// A config path that does not exist, so the user's real config is never read.
    pub fn no_config(&self) -> PathBuf {
        self.dir.path().join("missing.json")
    }

    /// Write a config file and return its path
    pub fn write_config(&self, body: &str) -> PathBuf {
        let file = self.dir.child("config.json");
        file.write_str(body).unwrap();
        file.path().to_path_buf()
    }

    /// Register a search response for `query` expected `hits` times.
    pub fn mock_search(&mut self, query: &str, body: &str, hits: usize) -> Mock {
        self.server
            .mock("GET", "/api/v1/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("stats".into(), "fosho".into()),
                Matcher::UrlEncoded("repos".into(), "*".into()),
                Matcher::UrlEncoded("q".into(), query.into()),
                Matcher::UrlEncoded("rng".into(), ":20".into()),
                Matcher::UrlEncoded("i".into(), "nope".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .expect(hits)
            .create()
    }

    /// Fail every search request with `status`.
    pub fn mock_failure(&mut self, status: usize) -> Mock {
        self.server
            .mock("GET", "/api/v1/search")
            .match_query(Matcher::Any)
            .with_status(status)
            .with_body("search backend unavailable")
            .create()
    }

    /// A `hq` command with no ambient configuration.
    pub fn hq(&self) -> Command {
        let mut cmd = Command::cargo_bin("hq").unwrap();
        cmd.env_remove("HOUND_BASE_URI")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Run `hq search` against the stub server and return the output
    pub fn search(&self, query: &str) -> std::process::Output {
        self.hq()
            .arg("search")
            .arg("--base-uri")
            .arg(self.base_uri())
            .arg("--config")
            .arg(self.no_config())
            .arg(query)
            .output()
            .expect("hq search failed")
    }

    /// Run `hq open`, feeding `input` on stdin, and return the output
    pub fn open(&self, input: &str) -> std::process::Output {
        self.hq()
            .arg("open")
            .arg("--base-uri")
            .arg(self.base_uri())
            .arg("--config")
            .arg(self.no_config())
            .write_stdin(input)
            .output()
            .expect("hq open failed")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
