//! Applies the program's rules to each test case and scores its expectations.
//!
//! For every test, in source order:
//!
//! 1. a fresh [`Environment`] is filled from the `given` lines, each
//!    assignment seeing the ones before it;
//! 2. rules run top to bottom, and the first rule whose condition holds wins
//!    its target, later rules for an already assigned target are skipped;
//! 3. every `expect` is evaluated against the final environment.
//!
//! A test passes when all of its expectations hold.

use std::{collections::HashSet, fmt};

use tracing::{debug, debug_span, info};

use crate::{
    ast::{Node, Rule, TestCase},
    environment::{Environment, FieldPath},
    evaluator::{EvalError, Evaluator, ExprCache},
    value::Value,
};

/// Knobs for a test run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Record an evaluation error as a failure of the test it happened in
    /// and keep going, instead of aborting the whole run.
    pub isolate_failures: bool,
}

/// A rule whose condition held and whose value was written.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFiring {
    pub rule: String,
    pub target: String,
    pub value: Value,
}

/// Result of one `expect` line.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectOutcome {
    pub expression: String,
    pub passed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TestReport {
    pub name: String,
    pub firings: Vec<RuleFiring>,
    pub expects: Vec<ExpectOutcome>,
    /// Environment after rules ran (or as far as the test got).
    pub environment: Environment,
    /// Set only when failures are isolated and this test hit one.
    pub error: Option<EvalError>,
}

impl TestReport {
    fn new(name: &str) -> Self {
        TestReport {
            name: name.to_string(),
            firings: Vec::new(),
            expects: Vec::new(),
            environment: Environment::new(),
            error: None,
        }
    }

    pub fn passed(&self) -> bool {
        self.error.is_none() && self.expects.iter().all(|e| e.passed)
    }
}

/// Outcome of running every test of a program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunReport {
    pub tests: Vec<TestReport>,
}

impl RunReport {
    pub fn passed(&self) -> usize {
        self.tests.iter().filter(|t| t.passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.tests.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.failed() == 0
    }
}

impl fmt::Display for TestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Test: {}", self.name)?;
        for firing in &self.firings {
            writeln!(
                f,
                "  ✓ rule \"{}\" applied → {} = {}",
                firing.rule, firing.target, firing.value
            )?;
        }
        for outcome in &self.expects {
            if outcome.passed {
                writeln!(f, "  ✓ {} → PASS", outcome.expression)?;
            } else {
                writeln!(f, "  ✗ {} → FAIL", outcome.expression)?;
            }
        }
        if let Some(error) = &self.error {
            writeln!(f, "  ! error: {}", error)?;
        }
        writeln!(
            f,
            "→ RESULT: {}",
            if self.passed() { "PASS" } else { "FAIL" }
        )
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== BizSpec :: Run Tests ==")?;
        if self.tests.is_empty() {
            return writeln!(f, "(no tests)");
        }
        for test in &self.tests {
            writeln!(f)?;
            write!(f, "{}", test)?;
        }
        writeln!(f)?;
        writeln!(f, "Summary: {} PASS, {} FAIL", self.passed(), self.failed())
    }
}

/// Runs programs, keeping compiled expressions between tests.
#[derive(Debug, Default)]
pub struct Runner {
    options: RunOptions,
    cache: ExprCache,
}

impl Runner {
    pub fn new(options: RunOptions) -> Self {
        Runner {
            options,
            cache: ExprCache::new(),
        }
    }

    /// Runs every test of `program` against its rules.
    ///
    /// Unless failures are isolated, the first malformed expression aborts
    /// the run.
    pub fn run(&mut self, program: &Node) -> Result<RunReport, EvalError> {
        let rules = program.rules();
        let mut report = RunReport::default();

        for test in program.tests() {
            let _span = debug_span!("test", name = %test.name).entered();
            let mut test_report = TestReport::new(&test.name);

            if let Err(error) = self.run_test(&rules, &test, &mut test_report) {
                if !self.options.isolate_failures {
                    return Err(error);
                }
                debug!(%error, "test aborted");
                test_report.error = Some(error);
            }
            report.tests.push(test_report);
        }

        info!(
            passed = report.passed(),
            failed = report.failed(),
            "run finished"
        );
        Ok(report)
    }

    fn run_test(
        &mut self,
        rules: &[Rule],
        test: &TestCase,
        report: &mut TestReport,
    ) -> Result<(), EvalError> {
        let env = &mut report.environment;

        for given in &test.givens {
            let assignments = self
                .cache
                .assignments(&given.text)
                .map_err(|e| e.at(given.position))?;
            for assignment in assignments {
                let value = Evaluator::new(env).eval(&assignment.value);
                env.set(&assignment.path, value);
            }
        }

        let mut assigned: HashSet<String> = HashSet::new();
        for rule in rules {
            let target = FieldPath::parse(&rule.target).ok_or_else(|| {
                EvalError::new("invalid rule target", &rule.target, rule.position)
                    .at(rule.position)
            })?;
            let key = target.to_string();
            if assigned.contains(&key) {
                continue;
            }

            let condition = self
                .cache
                .expression(&rule.condition.text)
                .map_err(|e| e.at(rule.condition.position))?;
            if !Evaluator::new(env).eval(condition).is_truthy() {
                continue;
            }

            let value_expr = self
                .cache
                .expression(&rule.value.text)
                .map_err(|e| e.at(rule.value.position))?;
            let value = Evaluator::new(env).eval(value_expr);
            debug!(rule = %rule.name, target = %key, %value, "rule fired");

            env.set(&target, value.clone());
            report.firings.push(RuleFiring {
                rule: rule.name.clone(),
                target: key.clone(),
                value,
            });
            assigned.insert(key);
        }

        for expect in &test.expects {
            let expr = self
                .cache
                .expression(&expect.text)
                .map_err(|e| e.at(expect.position))?;
            let passed = Evaluator::new(&report.environment).eval(expr).is_truthy();
            report.expects.push(ExpectOutcome {
                expression: expect.text.clone(),
                passed,
            });
        }

        Ok(())
    }
}

/// Runs a program with default options.
pub fn run(program: &Node) -> Result<RunReport, EvalError> {
    Runner::default().run(program)
}
