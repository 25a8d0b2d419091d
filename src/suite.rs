//! Declarative test suites.
//!
//! A suite is a YAML or JSON document of nested modules, tests and
//! assertions. Running it drives a [`Session`] exactly the way hand-written
//! code would.
//!
//! ```yaml
//! modules:
//!   - name: Strings
//!     tests:
//!       - name: joins words
//!         assertions:
//!           - assert: assert-equal
//!             actual: "a b"
//!             expected: "a b"
//!           - assert: assert-output
//!             output: ".a { color: red; }"
//!             expect: ".a { color: red; }"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::context::{self, Directive, OutputContext};
use crate::diagnostics::{Result, VerityError};
use crate::session::Session;
use crate::value::Value;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Suite {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleSpec {
    pub name: String,
    #[serde(default)]
    pub tests: Vec<TestSpec>,
    #[serde(default)]
    pub modules: Vec<ModuleSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestSpec {
    pub name: String,
    #[serde(default)]
    pub assertions: Vec<AssertionSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "assert", rename_all = "kebab-case")]
pub enum AssertionSpec {
    AssertEqual {
        actual: Value,
        expected: Value,
        #[serde(default)]
        description: Option<String>,
    },
    AssertUnequal {
        actual: Value,
        expected: Value,
        #[serde(default)]
        description: Option<String>,
    },
    AssertTrue {
        value: Value,
        #[serde(default)]
        description: Option<String>,
    },
    AssertFalse {
        value: Value,
        #[serde(default)]
        description: Option<String>,
    },
    AssertOutput {
        #[serde(default)]
        output: Option<String>,
        #[serde(default)]
        expect: Option<String>,
        #[serde(default)]
        contains: Option<String>,
        #[serde(default)]
        description: Option<String>,
    },
    /// Replays a raw directive sequence through the structural validator.
    AssertDirectives {
        directives: Vec<String>,
        #[serde(default)]
        description: Option<String>,
    },
}

/// A compound assertion that would fail structural validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureIssue {
    pub path: String,
    pub message: String,
}

impl Suite {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).map_err(|e| VerityError::Suite {
            message: e.to_string(),
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| VerityError::Suite {
            message: e.to_string(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| VerityError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_yaml_str(&text),
        }
    }

    /// Runs every module depth-first, in document order.
    pub fn run(&self, session: &mut Session) -> Result<()> {
        for module in &self.modules {
            module.run(session)?;
        }
        Ok(())
    }

    /// Checks compound assertions without running any comparison.
    pub fn check(&self) -> Vec<StructureIssue> {
        let mut issues = Vec::new();
        for module in &self.modules {
            module.check(&mut Vec::new(), &mut issues);
        }
        issues
    }

    pub fn assertion_count(&self) -> usize {
        self.modules.iter().map(ModuleSpec::assertion_count).sum()
    }
}

impl ModuleSpec {
    fn run(&self, session: &mut Session) -> Result<()> {
        session.module(&self.name, |s| {
            for test in &self.tests {
                test.run(s)?;
            }
            for module in &self.modules {
                module.run(s)?;
            }
            Ok(())
        })
    }

    fn check<'a>(&'a self, path: &mut Vec<&'a str>, issues: &mut Vec<StructureIssue>) {
        path.push(&self.name);
        for test in &self.tests {
            path.push(&test.name);
            for (index, assertion) in test.assertions.iter().enumerate() {
                if let Err(err) = assertion.check_structure() {
                    issues.push(StructureIssue {
                        path: format!("{} #{}", path.join(" :: "), index + 1),
                        message: err.to_string(),
                    });
                }
            }
            path.pop();
        }
        for module in &self.modules {
            module.check(path, issues);
        }
        path.pop();
    }

    fn assertion_count(&self) -> usize {
        let own: usize = self.tests.iter().map(|t| t.assertions.len()).sum();
        own + self.modules.iter().map(ModuleSpec::assertion_count).sum::<usize>()
    }
}

impl TestSpec {
    fn run(&self, session: &mut Session) -> Result<()> {
        session.test(&self.name, |s| {
            for assertion in &self.assertions {
                assertion.run(s)?;
            }
            Ok(())
        })
    }
}

impl AssertionSpec {
    fn run(&self, session: &mut Session) -> Result<()> {
        match self {
            AssertionSpec::AssertEqual {
                actual,
                expected,
                description,
            } => {
                session.assert_equal(actual.clone(), expected.clone(), description.as_deref())?;
            }
            AssertionSpec::AssertUnequal {
                actual,
                expected,
                description,
            } => {
                session.assert_unequal(actual.clone(), expected.clone(), description.as_deref())?;
            }
            AssertionSpec::AssertTrue { value, description } => {
                session.assert_true(value.clone(), description.as_deref())?;
            }
            AssertionSpec::AssertFalse { value, description } => {
                session.assert_false(value.clone(), description.as_deref())?;
            }
            AssertionSpec::AssertOutput {
                output,
                expect,
                contains,
                description,
            } => {
                session.assert_output(description.as_deref(), |s| {
                    if let Some(text) = output {
                        s.output(|s| emit_block(s, text))?;
                    }
                    if let Some(text) = expect {
                        s.expect(|s| emit_block(s, text))?;
                    }
                    if let Some(text) = contains {
                        s.contains(|s| emit_block(s, text))?;
                    }
                    Ok(())
                })?;
            }
            AssertionSpec::AssertDirectives {
                directives,
                description,
            } => {
                session.assert_directives(description.as_deref(), directives)?;
            }
        }
        Ok(())
    }

    /// The directive sequence this assertion declares, fed through the
    /// validator and finalized.
    fn check_structure(&self) -> Result<()> {
        let finish = |state: OutputContext| context::validate(state, None).map(|_| ());
        match self {
            AssertionSpec::AssertOutput {
                output,
                expect,
                contains,
                ..
            } => {
                let declared = [
                    (true, Directive::Assert),
                    (output.is_some(), Directive::Output),
                    (expect.is_some(), Directive::Expect),
                    (contains.is_some(), Directive::Contains),
                ];
                let state = declared
                    .into_iter()
                    .filter(|(present, _)| *present)
                    .try_fold(OutputContext::new(), |state, (_, directive)| {
                        context::validate(state, Some(directive))
                    })?;
                finish(state)
            }
            AssertionSpec::AssertDirectives { directives, .. } => {
                let state = directives
                    .iter()
                    .try_fold(OutputContext::new(), |state, name| {
                        context::validate_named(state, Some(name))
                    })?;
                finish(state)
            }
            _ => Ok(()),
        }
    }
}

fn emit_block(session: &mut Session, text: &str) -> Result<()> {
    session.emit(text);
    Ok(())
}
