//! Lint rules for ASC schematics.
//!
//! The format itself enforces almost nothing: a flag may float in empty
//! space, instance names may collide, wires may degenerate. Each rule checks
//! one such property and reports issues; parsing never fails for any of
//! them.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::parser::netlist::{pin_sites, Net, NetExtractor, PinConnection};
use crate::parser::schema::{Point, Schematic};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Suggestion,
    Info,
}

impl Severity {
    /// Higher is more severe.
    pub fn rank(self) -> u8 {
        match self {
            Self::Error => 3,
            Self::Warning => 2,
            Self::Suggestion => 1,
            Self::Info => 0,
        }
    }
}

/// A single finding from a lint rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub rule_id: String,
    pub severity: Severity,
    pub message: String,
    /// Instance or net name the issue is about, when there is one.
    pub object: Option<String>,
    pub at: Option<Point>,
    pub suggestion: Option<String>,
}

/// Precomputed connectivity shared by every rule.
pub struct LintContext {
    pub nets: Vec<Net>,
    pub pins: Vec<PinConnection>,
}

impl LintContext {
    pub fn build(schematic: &Schematic) -> Self {
        Self {
            nets: NetExtractor::extract(schematic),
            pins: pin_sites(schematic),
        }
    }

    /// True if some wire, pin, or both pass through `p`.
    fn anchored(&self, schematic: &Schematic, p: Point) -> bool {
        schematic.wires.iter().any(|w| w.contains(p)) || self.pins.iter().any(|pin| pin.at == p)
    }
}

pub trait Rule: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;
    fn severity(&self) -> Severity;
    fn check(&self, schematic: &Schematic, ctx: &LintContext) -> Vec<Issue>;
}

/// Runs a set of lint rules over a schematic.
pub struct RulesEngine {
    rules: Vec<Arc<dyn Rule>>,
}

impl RulesEngine {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_default_rules() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Arc::new(FloatingFlagRule));
        engine.add_rule(Arc::new(ConflictingNetNamesRule));
        engine.add_rule(Arc::new(DuplicateInstNameRule));
        engine.add_rule(Arc::new(MissingInstNameRule));
        engine.add_rule(Arc::new(MissingValueRule));
        engine.add_rule(Arc::new(ZeroLengthWireRule));
        engine.add_rule(Arc::new(DuplicateWireRule));
        engine.add_rule(Arc::new(DanglingWireRule));
        engine.add_rule(Arc::new(UnconnectedPinRule));
        engine.add_rule(Arc::new(NoDirectiveRule));
        engine
    }

    /// Keep only the rules whose id is in `ids`.
    pub fn retain(&mut self, ids: &[String]) {
        if !ids.is_empty() {
            self.rules.retain(|r| ids.iter().any(|id| id == r.id()));
        }
    }

    pub fn add_rule(&mut self, rule: Arc<dyn Rule>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules.iter().map(|r| r.as_ref())
    }

    pub fn analyze(&self, schematic: &Schematic) -> Vec<Issue> {
        let ctx = LintContext::build(schematic);
        self.analyze_with(schematic, &ctx)
    }

    pub fn analyze_with(&self, schematic: &Schematic, ctx: &LintContext) -> Vec<Issue> {
        let mut issues = Vec::new();
        for rule in &self.rules {
            issues.extend(rule.check(schematic, ctx));
        }
        issues
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

fn issue(
    rule: &dyn Rule,
    seq: usize,
    message: String,
    object: Option<String>,
    at: Option<Point>,
    suggestion: Option<&str>,
) -> Issue {
    Issue {
        id: format!("{}-{}", rule.id(), seq),
        rule_id: rule.id().to_string(),
        severity: rule.severity(),
        message,
        object,
        at,
        suggestion: suggestion.map(str::to_owned),
    }
}

/// A flag whose anchor coincides with no wire and no pin labels nothing.
pub struct FloatingFlagRule;

impl Rule for FloatingFlagRule {
    fn id(&self) -> &'static str {
        "floating_flag"
    }
    fn name(&self) -> &'static str {
        "Flags must anchor on a wire or pin"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn check(&self, schematic: &Schematic, ctx: &LintContext) -> Vec<Issue> {
        schematic
            .flags
            .iter()
            .filter(|f| !ctx.anchored(schematic, f.at))
            .enumerate()
            .map(|(seq, f)| {
                issue(
                    self,
                    seq,
                    format!(
                        "flag '{}' at ({}, {}) does not touch any wire or pin",
                        f.net, f.at.x, f.at.y
                    ),
                    Some(f.net.clone()),
                    Some(f.at),
                    Some("move the flag onto a wire endpoint"),
                )
            })
            .collect()
    }
}

/// Two differently named flags on one net short the labels together.
pub struct ConflictingNetNamesRule;

impl Rule for ConflictingNetNamesRule {
    fn id(&self) -> &'static str {
        "conflicting_net_names"
    }
    fn name(&self) -> &'static str {
        "One net, one name"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn check(&self, _schematic: &Schematic, ctx: &LintContext) -> Vec<Issue> {
        ctx.nets
            .iter()
            .filter(|n| n.names.len() > 1)
            .enumerate()
            .map(|(seq, n)| {
                issue(
                    self,
                    seq,
                    format!("net carries {} names: {}", n.names.len(), n.names.join(", ")),
                    Some(n.name.clone()),
                    None,
                    None,
                )
            })
            .collect()
    }
}

/// Instance names identify components and must be unique per circuit.
pub struct DuplicateInstNameRule;

impl Rule for DuplicateInstNameRule {
    fn id(&self) -> &'static str {
        "duplicate_inst_name"
    }
    fn name(&self) -> &'static str {
        "Unique instance names"
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn check(&self, schematic: &Schematic, _ctx: &LintContext) -> Vec<Issue> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for sym in &schematic.symbols {
            if let Some(name) = sym.inst_name() {
                *counts.entry(name).or_insert(0) += 1;
            }
        }
        let mut dups: Vec<(&str, usize)> =
            counts.into_iter().filter(|&(_, c)| c > 1).collect();
        dups.sort();
        dups.into_iter()
            .enumerate()
            .map(|(seq, (name, count))| {
                issue(
                    self,
                    seq,
                    format!("instance name '{name}' used by {count} symbols"),
                    Some(name.to_string()),
                    None,
                    Some("rename so every instance is unique"),
                )
            })
            .collect()
    }
}

pub struct MissingInstNameRule;

impl Rule for MissingInstNameRule {
    fn id(&self) -> &'static str {
        "missing_inst_name"
    }
    fn name(&self) -> &'static str {
        "Every symbol needs an InstName"
    }
    fn severity(&self) -> Severity {
        Severity::Error
    }
    fn check(&self, schematic: &Schematic, _ctx: &LintContext) -> Vec<Issue> {
        schematic
            .symbols
            .iter()
            .filter(|s| s.inst_name().is_none())
            .enumerate()
            .map(|(seq, s)| {
                issue(
                    self,
                    seq,
                    format!("'{}' at ({}, {}) has no InstName", s.symbol, s.at.x, s.at.y),
                    Some(s.symbol.clone()),
                    Some(s.at),
                    None,
                )
            })
            .collect()
    }
}

pub struct MissingValueRule;

impl Rule for MissingValueRule {
    fn id(&self) -> &'static str {
        "missing_value"
    }
    fn name(&self) -> &'static str {
        "Every symbol needs a Value"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn check(&self, schematic: &Schematic, _ctx: &LintContext) -> Vec<Issue> {
        schematic
            .symbols
            .iter()
            .filter(|s| s.value().is_none())
            .enumerate()
            .map(|(seq, s)| {
                let name = s.inst_name().unwrap_or(&s.symbol).to_string();
                issue(
                    self,
                    seq,
                    format!("'{name}' has no Value attribute"),
                    Some(name.clone()),
                    Some(s.at),
                    None,
                )
            })
            .collect()
    }
}

pub struct ZeroLengthWireRule;

impl Rule for ZeroLengthWireRule {
    fn id(&self) -> &'static str {
        "zero_length_wire"
    }
    fn name(&self) -> &'static str {
        "No degenerate wires"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn check(&self, schematic: &Schematic, _ctx: &LintContext) -> Vec<Issue> {
        schematic
            .wires
            .iter()
            .filter(|w| w.is_zero_length())
            .enumerate()
            .map(|(seq, w)| {
                issue(
                    self,
                    seq,
                    format!("zero-length wire at ({}, {})", w.a.x, w.a.y),
                    None,
                    Some(w.a),
                    None,
                )
            })
            .collect()
    }
}

/// Duplicate segments are legal in the format and merely redundant, so this
/// only informs.
pub struct DuplicateWireRule;

impl Rule for DuplicateWireRule {
    fn id(&self) -> &'static str {
        "duplicate_wire"
    }
    fn name(&self) -> &'static str {
        "Redundant duplicate wires"
    }
    fn severity(&self) -> Severity {
        Severity::Info
    }
    fn check(&self, schematic: &Schematic, _ctx: &LintContext) -> Vec<Issue> {
        let mut issues = Vec::new();
        for i in 0..schematic.wires.len() {
            for j in (i + 1)..schematic.wires.len() {
                if schematic.wires[i].same_segment(&schematic.wires[j]) {
                    let w = &schematic.wires[j];
                    issues.push(issue(
                        self,
                        issues.len(),
                        format!(
                            "wire ({}, {})-({}, {}) appears more than once",
                            w.a.x, w.a.y, w.b.x, w.b.y
                        ),
                        None,
                        Some(w.a),
                        None,
                    ));
                }
            }
        }
        issues
    }
}

/// A wire end that touches nothing usually means a drawing slipped off grid.
pub struct DanglingWireRule;

impl Rule for DanglingWireRule {
    fn id(&self) -> &'static str {
        "dangling_wire"
    }
    fn name(&self) -> &'static str {
        "Wire ends should connect"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn check(&self, schematic: &Schematic, ctx: &LintContext) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (i, wire) in schematic.wires.iter().enumerate() {
            for p in [wire.a, wire.b] {
                let touches_wire = schematic
                    .wires
                    .iter()
                    .enumerate()
                    .any(|(j, other)| j != i && other.contains(p));
                let touches_flag = schematic.flags.iter().any(|f| f.at == p);
                let touches_pin = ctx.pins.iter().any(|pin| pin.at == p);
                if !(touches_wire || touches_flag || touches_pin) {
                    issues.push(issue(
                        self,
                        issues.len(),
                        format!("wire end at ({}, {}) connects to nothing", p.x, p.y),
                        None,
                        Some(p),
                        None,
                    ));
                }
            }
        }
        issues
    }
}

/// Only checks symbols with known pin geometry; others are skipped.
pub struct UnconnectedPinRule;

impl Rule for UnconnectedPinRule {
    fn id(&self) -> &'static str {
        "unconnected_pin"
    }
    fn name(&self) -> &'static str {
        "Pins should land on a wire or flag"
    }
    fn severity(&self) -> Severity {
        Severity::Warning
    }
    fn check(&self, schematic: &Schematic, ctx: &LintContext) -> Vec<Issue> {
        ctx.pins
            .iter()
            .filter(|pin| {
                let on_wire = schematic.wires.iter().any(|w| w.contains(pin.at));
                let on_flag = schematic.flags.iter().any(|f| f.at == pin.at);
                !(on_wire || on_flag)
            })
            .enumerate()
            .map(|(seq, pin)| {
                issue(
                    self,
                    seq,
                    format!(
                        "pin {} of '{}' at ({}, {}) is unconnected",
                        pin.pin, pin.instance, pin.at.x, pin.at.y
                    ),
                    Some(pin.instance.clone()),
                    Some(pin.at),
                    None,
                )
            })
            .collect()
    }
}

/// A schematic without a `!` directive cannot drive a simulation run.
pub struct NoDirectiveRule;

impl Rule for NoDirectiveRule {
    fn id(&self) -> &'static str {
        "no_directive"
    }
    fn name(&self) -> &'static str {
        "Simulation directive present"
    }
    fn severity(&self) -> Severity {
        Severity::Info
    }
    fn check(&self, schematic: &Schematic, _ctx: &LintContext) -> Vec<Issue> {
        if schematic.directives().next().is_some() {
            return Vec::new();
        }
        vec![issue(
            self,
            0,
            "schematic has no simulation directive".to_string(),
            None,
            None,
            Some("add a TEXT record starting with '!', e.g. !.tran 10"),
        )]
    }
}
