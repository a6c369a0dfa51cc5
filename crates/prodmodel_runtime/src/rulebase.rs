//! Rulebase files: a line-oriented text format for facts, inputs and rules.
//!
//! ```text
//! # comment
//! facts: go to concert, invite friend, buy tickets
//! input: go to concert
//! rule invite: go to concert -> invite friend
//! rule: go to concert & invite friend -> buy tickets
//! echo buy tickets x2: tickets bought
//! ```
//!
//! Parsing checks syntax only. Fact names are resolved against the declared
//! vocabulary when the rulebase is turned into a [`Solver`].

use std::fs;
use std::path::Path;

use prodmodel_engine::{Rule, Solver, SolverConfig};
use prodmodel_foundation::{Error, ErrorContext, ErrorKind, FactRegistry, Result};

// =============================================================================
// Declarations
// =============================================================================

/// A fact name as written on a given line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameDecl {
    /// The trimmed fact name.
    pub name: String,
    /// Line number (1-indexed).
    pub line: u32,
}

/// A `rule` line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleDecl {
    /// Optional label between `rule` and the colon.
    pub label: Option<String>,
    /// Condition names, joined by `&` in the source.
    pub conditions: Vec<String>,
    /// Conclusion names, joined by `&` in the source.
    pub conclusions: Vec<String>,
    /// Line number (1-indexed).
    pub line: u32,
}

/// An `echo` line: prints a message when the fact's effect runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EchoDecl {
    /// The fact the effect is attached to.
    pub fact: String,
    /// How many times the message is printed per firing.
    pub repeat: u32,
    /// The message.
    pub message: String,
    /// Line number (1-indexed).
    pub line: u32,
}

/// A parsed rulebase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rulebase {
    /// Source name used in error context (usually the file path).
    pub source: Option<String>,
    /// Declared vocabulary, in declaration order.
    pub facts: Vec<NameDecl>,
    /// Initial working memory.
    pub inputs: Vec<NameDecl>,
    /// Rules, in declaration order.
    pub rules: Vec<RuleDecl>,
    /// Printing effects.
    pub echoes: Vec<EchoDecl>,
}

// =============================================================================
// Parsing
// =============================================================================

impl Rulebase {
    /// Parses rulebase text.
    ///
    /// # Errors
    ///
    /// Returns a parse error naming the first malformed line.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rulebase = Self::default();

        for (index, raw) in text.lines().enumerate() {
            let line = u32::try_from(index + 1).unwrap_or(u32::MAX);
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let Some((head, body)) = trimmed.split_once(':') else {
                return Err(Error::parse("expected '<directive>: ...'", line, raw));
            };
            let head = head.trim();
            let body = body.trim();

            let (keyword, argument) = match head.split_once(char::is_whitespace) {
                Some((keyword, argument)) => (keyword, Some(argument.trim())),
                None => (head, None),
            };

            match (keyword, argument) {
                ("facts", None) => {
                    rulebase.facts.extend(split_names(body, ',', line, raw)?);
                }
                ("input", None) => {
                    rulebase.inputs.extend(split_names(body, ',', line, raw)?);
                }
                ("rule", label) => rulebase.rules.push(parse_rule(label, body, line, raw)?),
                ("echo", Some(argument)) => {
                    rulebase.echoes.push(parse_echo(argument, body, line, raw)?);
                }
                ("echo", None) => return Err(Error::parse("echo needs a fact name", line, raw)),
                ("facts" | "input", Some(_)) => {
                    return Err(Error::parse(
                        format!("'{keyword}' takes no argument before the colon"),
                        line,
                        raw,
                    ));
                }
                _ => {
                    return Err(Error::parse(
                        format!("unknown directive '{keyword}'"),
                        line,
                        raw,
                    ));
                }
            }
        }

        Ok(rulebase)
    }

    /// Reads and parses a rulebase file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a parse error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| Error::io(format!("failed to read '{}': {e}", path.display())))?;
        let source = path.display().to_string();
        let mut rulebase = Self::parse(&text).map_err(|e| {
            let line = match &e.kind {
                ErrorKind::ParseError { line, .. } => Some(*line),
                _ => None,
            };
            e.with_context(context(Some(&source), line))
        })?;
        rulebase.source = Some(source);
        Ok(rulebase)
    }

    /// Sets the source name used in error context.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

fn split_names(body: &str, separator: char, line: u32, raw: &str) -> Result<Vec<NameDecl>> {
    if body.is_empty() {
        return Ok(Vec::new());
    }
    body.split(separator)
        .map(|name| {
            let name = name.trim();
            if name.is_empty() {
                Err(Error::parse("empty fact name", line, raw))
            } else {
                Ok(NameDecl {
                    name: name.to_string(),
                    line,
                })
            }
        })
        .collect()
}

fn parse_rule(label: Option<&str>, body: &str, line: u32, raw: &str) -> Result<RuleDecl> {
    let Some((conditions, conclusions)) = body.split_once("->") else {
        return Err(Error::parse("expected '->' between conditions and conclusions", line, raw));
    };

    let names = |part: &str| -> Result<Vec<String>> {
        Ok(split_names(part.trim(), '&', line, raw)?
            .into_iter()
            .map(|decl| decl.name)
            .collect())
    };
    let conditions = names(conditions)?;
    let conclusions = names(conclusions)?;
    if conclusions.is_empty() {
        return Err(Error::parse("rule has no conclusions", line, raw));
    }

    Ok(RuleDecl {
        label: label.filter(|l| !l.is_empty()).map(str::to_string),
        conditions,
        conclusions,
        line,
    })
}

fn parse_echo(argument: &str, message: &str, line: u32, raw: &str) -> Result<EchoDecl> {
    let (fact, repeat) = match argument.rsplit_once(char::is_whitespace) {
        Some((fact, count)) if is_repeat(count) => {
            let repeat = count[1..]
                .parse::<u32>()
                .map_err(|_| Error::parse(format!("bad repeat count '{count}'"), line, raw))?;
            (fact.trim(), repeat)
        }
        _ => (argument, 1),
    };

    Ok(EchoDecl {
        fact: fact.to_string(),
        repeat,
        message: message.to_string(),
        line,
    })
}

fn is_repeat(token: &str) -> bool {
    token.len() > 1 && token.starts_with('x') && token[1..].bytes().all(|b| b.is_ascii_digit())
}

fn context(source: Option<&str>, line: Option<u32>) -> ErrorContext {
    let mut context = ErrorContext::new();
    if let Some(source) = source {
        context = context.with_source(source);
    }
    if let Some(line) = line {
        context = context.with_line(usize::try_from(line).unwrap_or(usize::MAX));
    }
    context
}

// =============================================================================
// Building
// =============================================================================

impl Rulebase {
    /// Builds a solver whose echo effects print to stdout.
    ///
    /// # Errors
    ///
    /// See [`Rulebase::build_with`].
    pub fn build(&self, config: SolverConfig) -> Result<Solver> {
        self.build_with(config, |message: &str| println!("{message}"))
    }

    /// Builds a solver, routing echo messages to `echo`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank fact name or a zero repeat
    /// count, and a lookup error for any name outside the declared
    /// vocabulary. Errors carry the offending line.
    pub fn build_with<F>(&self, config: SolverConfig, echo: F) -> Result<Solver>
    where
        F: Fn(&str) + Clone + 'static,
    {
        let at = |line: u32| {
            let source = self.source.as_deref();
            move |e: Error| e.with_context(context(source, Some(line)))
        };

        let mut registry = FactRegistry::new();
        for decl in &self.facts {
            registry.register([&decl.name]).map_err(at(decl.line))?;
        }

        let inputs = self
            .inputs
            .iter()
            .map(|decl| registry.get(&decl.name).map_err(at(decl.line)))
            .collect::<Result<Vec<_>>>()?;

        let mut rules = Vec::with_capacity(self.rules.len());
        for decl in &self.rules {
            let conditions = registry.get_all(&decl.conditions).map_err(at(decl.line))?;
            let conclusions = registry.get_all(&decl.conclusions).map_err(at(decl.line))?;
            let mut rule = Rule::implies(conditions, conclusions);
            if let Some(label) = &decl.label {
                rule = rule.labelled(label.clone());
            }
            rules.push(rule);
        }

        for decl in &self.echoes {
            let fact = registry.fact_mut(&decl.fact).map_err(at(decl.line))?;
            fact.with_repeat(decl.repeat).map_err(at(decl.line))?;
            let out = echo.clone();
            let message = decl.message.clone();
            fact.with_effect(move |name, _| {
                if message.is_empty() {
                    out(name);
                } else {
                    out(&message);
                }
            });
        }

        Solver::with_config(registry, inputs, rules, config)
    }
}

// =============================================================================
// Tests
// =============================================================================
