//! Analysis pipeline - scan, merge, link
//!
//! Files are scanned in parallel on scoped crossbeam workers: each scan
//! only reads its own tree, so workers share nothing but the job and
//! result channels. Merging the symbol table is the one single-writer
//! step and runs on the coordinator after every scan has finished, in
//! input order. Linking and ordering then work on immutable data.

use crate::config::BuildorderConfig;
use crate::diagnostic::Diagnostic;
use crate::graph::DependencyGraph;
use crate::linker::{DependencyLinker, ExternalReferenceLog, LinkStats};
use crate::order::{BuildOrder, order};
use crate::scan::{ScanResult, Scanner};
use crate::symbol::SymbolTable;
use crate::ui::progress_message::{ProgressMessage, ProgressPhase};
use crate::unit::SourceUnit;
use crate::{Error, Result, ScanMessage};
use crossbeam::channel::{self, Sender};
use std::time::Instant;

/// Runs the whole analysis over a set of source units
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    scanner: Scanner,
    /// Scan worker count; 0 picks the available parallelism
    workers: usize,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &BuildorderConfig) -> Self {
        Self::new().strict(config.strict).workers(config.workers)
    }

    /// Fail the run on the first unrecognized node kind
    pub fn strict(mut self, strict: bool) -> Self {
        self.scanner = self.scanner.strict(strict);
        self
    }

    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    fn worker_count(&self, jobs: usize) -> usize {
        let wanted = if self.workers == 0 {
            std::thread::available_parallelism().map(usize::from).unwrap_or(1)
        } else {
            self.workers
        };
        wanted.clamp(1, jobs.max(1))
    }

    pub fn analyze(&self, units: &[SourceUnit]) -> Result<Analysis> {
        self.analyze_with_progress(units, None)
    }

    /// Analyze `units`, reporting per-file progress on `progress`
    pub fn analyze_with_progress(
        &self,
        units: &[SourceUnit],
        progress: Option<&Sender<ProgressMessage>>,
    ) -> Result<Analysis> {
        let started = Instant::now();

        let results = self.scan_all(units, progress)?;
        let scans: Vec<(String, ScanResult)> = units
            .iter()
            .map(|unit| unit.id.clone())
            .zip(results)
            .collect();

        notify(progress, ProgressMessage::Started { phase: ProgressPhase::Linking, total: scans.len() });

        let mut symbols = SymbolTable::new();
        for (unit, scan) in &scans {
            symbols.add_unit(unit, &scan.definitions);
        }

        let linked = DependencyLinker::new(&symbols)
            .link(scans.iter().map(|(unit, scan)| (unit.as_str(), scan.references.as_slice())));

        notify(progress, ProgressMessage::Finished { phase: ProgressPhase::Linking });

        tracing::info!(
            files = scans.len(),
            symbols = symbols.len(),
            edges = linked.graph.edge_count(),
            external = linked.externals.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "analysis complete"
        );

        Ok(Analysis {
            scans,
            symbols,
            graph: linked.graph,
            externals: linked.externals,
            stats: linked.stats,
        })
    }

    /// Scan every unit, returning results in input order.
    ///
    /// In strict mode the error of the first failing unit (by input order)
    /// is returned.
    pub fn scan_all(
        &self,
        units: &[SourceUnit],
        progress: Option<&Sender<ProgressMessage>>,
    ) -> Result<Vec<ScanResult>> {
        notify(progress, ProgressMessage::Started { phase: ProgressPhase::Scanning, total: units.len() });

        let (job_tx, job_rx) = channel::unbounded::<(usize, &SourceUnit)>();
        let (result_tx, result_rx) = channel::unbounded::<ScanMessage>();
        for job in units.iter().enumerate() {
            job_tx
                .send(job)
                .map_err(|e| Error::Worker(e.to_string()))?;
        }
        drop(job_tx);

        let scanner = &self.scanner;
        let workers = self.worker_count(units.len());

        let slots = crossbeam::thread::scope(|s| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                s.spawn(move |_| {
                    for (index, unit) in job_rx {
                        let message = match scanner.scan(unit) {
                            Ok(result) => ScanMessage::Scanned {
                                index,
                                unit: unit.id.clone(),
                                result: Box::new(result),
                            },
                            Err(error) => ScanMessage::Failed {
                                index,
                                unit: unit.id.clone(),
                                error,
                            },
                        };
                        if result_tx.send(message).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(result_tx);

            let mut slots: Vec<Option<Result<ScanResult>>> = (0..units.len()).map(|_| None).collect();
            for (current, message) in result_rx.iter().enumerate() {
                let (index, unit, outcome) = match message {
                    ScanMessage::Scanned { index, unit, result } => (index, unit, Ok(*result)),
                    ScanMessage::Failed { index, unit, error } => (index, unit, Err(error)),
                };
                notify(
                    progress,
                    ProgressMessage::Progress {
                        phase: ProgressPhase::Scanning,
                        current: current + 1,
                        file: Some(unit),
                    },
                );
                slots[index] = Some(outcome);
            }
            slots
        })
        .map_err(|_| Error::Worker("a scan worker panicked".to_string()))?;

        notify(progress, ProgressMessage::Finished { phase: ProgressPhase::Scanning });

        slots
            .into_iter()
            .zip(units)
            .map(|(slot, unit)| {
                slot.unwrap_or_else(|| Err(Error::Worker(format!("no scan result for {}", unit.id))))
            })
            .collect()
    }
}

fn notify(progress: Option<&Sender<ProgressMessage>>, message: ProgressMessage) {
    if let Some(tx) = progress {
        // The receiving UI may already be gone; progress is best-effort
        let _ = tx.send(message);
    }
}

/// Everything a run produced
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Per-file scan results, in input order
    pub scans: Vec<(String, ScanResult)>,
    pub symbols: SymbolTable,
    pub graph: DependencyGraph,
    pub externals: ExternalReferenceLog,
    pub stats: LinkStats,
}

impl Analysis {
    /// Order the analyzed files, failing on circular dependencies
    pub fn build_order(&self) -> Result<BuildOrder> {
        order(&self.graph)
    }

    /// Scan result of one unit
    pub fn scan(&self, unit: &str) -> Option<&ScanResult> {
        self.scans.iter().find(|(id, _)| id == unit).map(|(_, scan)| scan)
    }

    /// Scan diagnostics followed by duplicate-definition diagnostics
    pub fn diagnostics(&self) -> Vec<&Diagnostic> {
        self.scans
            .iter()
            .flat_map(|(_, scan)| scan.diagnostics.iter())
            .chain(self.symbols.diagnostics())
            .collect()
    }

    /// Would making `dependent` depend on `dependency` introduce a cycle?
    pub fn would_create_cycle(&self, dependent: &str, dependency: &str) -> Result<bool> {
        for unit in [dependent, dependency] {
            if !self.graph.contains_unit(unit) {
                return Err(Error::UnitNotFound(unit.to_string()));
            }
        }
        Ok(self.graph.would_create_cycle(dependent, dependency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{AstNode, decode};
    use crate::diagnostic::DiagnosticKind;
    use serde_json::{Value, json};

    fn unit(id: &str, stmts: Value) -> SourceUnit {
        let root: AstNode = decode(&json!(["program", stmts])).unwrap().as_node().unwrap().clone();
        SourceUnit::new(id, root)
    }

    fn body(stmts: Value) -> Value {
        json!(["bodystmt", stmts, null, null, null])
    }

    fn class(name: &str, superclass: Value, stmts: Value) -> Value {
        json!(["class", ["const_ref", ["@const", name, [1, 6]]], superclass, body(stmts)])
    }

    fn module(name: &str, stmts: Value) -> Value {
        json!(["module", ["const_ref", ["@const", name, [1, 7]]], body(stmts)])
    }

    fn constant(name: &str) -> Value {
        json!(["assign", ["var_field", ["@const", name, [1, 0]]], ["@int", "1", [1, 8]]])
    }

    fn var_ref(name: &str) -> Value {
        json!(["var_ref", ["@const", name, [2, 2]]])
    }

    fn top_ref(name: &str) -> Value {
        json!(["top_const_ref", ["@const", name, [2, 4]]])
    }

    #[test]
    fn test_files_without_mutual_references_are_omitted() {
        let units = vec![
            unit("a.rb", json!([class("A", Value::Null, json!([["void_stmt"]]))])),
            unit("b.rb", json!([class("B", Value::Null, json!([var_ref("UIView")]))])),
        ];
        let analysis = Analyzer::new().analyze(&units).unwrap();

        assert!(analysis.graph.is_empty());
        assert_eq!(analysis.graph.dependencies_of("a.rb"), None);
        assert_eq!(analysis.graph.dependencies_of("b.rb"), None);
    }

    #[test]
    fn test_pipeline_is_idempotent_and_respects_dependencies() {
        let units = vec![
            unit("app.rb", json!([class("App", var_ref("Base"), json!([var_ref("Store"), var_ref("View")]))])),
            unit("base.rb", json!([class("Base", Value::Null, json!([["void_stmt"]]))])),
            unit("store.rb", json!([class("Store", var_ref("Base"), json!([["void_stmt"]]))])),
            unit("view.rb", json!([class("View", var_ref("Base"), json!([var_ref("Store")]))])),
        ];

        let analyzer = Analyzer::new().workers(3);
        let first = analyzer.analyze(&units).unwrap().build_order().unwrap();
        let second = analyzer.analyze(&units).unwrap().build_order().unwrap();

        assert_eq!(first, second);
        assert_eq!(first.as_slice(), ["base.rb", "store.rb", "view.rb", "app.rb"]);

        let analysis = analyzer.analyze(&units).unwrap();
        assert!(first.satisfies(&analysis.graph));
        for (unit, deps) in analysis.graph.iter() {
            let at = first.position(unit).unwrap();
            assert!(deps.iter().all(|dep| first.position(dep).unwrap() < at));
        }
    }

    #[test]
    fn test_three_file_cycle() {
        let units = vec![
            unit("a.rb", json!([class("A", Value::Null, json!([var_ref("B")]))])),
            unit("b.rb", json!([class("B", Value::Null, json!([var_ref("C")]))])),
            unit("c.rb", json!([class("C", Value::Null, json!([var_ref("A")]))])),
        ];
        let analysis = Analyzer::new().analyze(&units).unwrap();

        match analysis.build_order() {
            Err(Error::CircularDependency { waiting, placed }) => {
                assert_eq!(waiting, vec!["a.rb", "b.rb", "c.rb"]);
                assert!(placed.is_empty());
            }
            other => panic!("expected a circular dependency, got {:?}", other),
        }

        let cycle = analysis.graph.find_cycle(analysis.graph.units()).unwrap();
        assert_eq!(cycle, vec!["a.rb", "b.rb", "c.rb", "a.rb"]);
    }

    #[test]
    fn test_scope_search_prefers_top_level_definition() {
        // f1.rb: Limit = 1
        // f2.rb: class Outer; class Inner; Limit; end; Limit = 2; end
        let units = vec![
            unit("f1.rb", json!([constant("Limit")])),
            unit("f2.rb", json!([class("Outer", Value::Null, json!([
                class("Inner", Value::Null, json!([var_ref("Limit")])),
                constant("Limit")
            ]))])),
        ];
        let analysis = Analyzer::new().analyze(&units).unwrap();

        let reference = &analysis.scan("f2.rb").unwrap().references[0];
        assert_eq!(reference.scope(), ["Outer".to_string(), "Inner".to_string()]);
        assert_eq!(
            crate::scope::search_order(reference),
            vec!["::Limit", "::Outer::Limit", "::Outer::Inner::Limit"]
        );

        // `::Limit` is tried first, so f2 depends on f1 despite `Outer::Limit`
        let deps: Vec<&String> = analysis.graph.dependencies_of("f2.rb").unwrap().iter().collect();
        assert_eq!(deps, vec!["f1.rb"]);
    }

    #[test]
    fn test_root_anchored_reference_skips_enclosing_scope() {
        // nested.rb: module App; Config = 1; end
        // user.rb:   module App; ::Config; end
        let units = vec![
            unit("nested.rb", json!([module("App", json!([constant("Config")]))])),
            unit("user.rb", json!([module("App", json!([top_ref("Config")]))])),
        ];
        let analysis = Analyzer::new().analyze(&units).unwrap();

        assert_eq!(analysis.graph.dependencies_of("user.rb"), None);
        let referencing: Vec<&String> = analysis.externals.referencing_units("::Config").unwrap().iter().collect();
        assert_eq!(referencing, vec!["user.rb"]);
    }

    #[test]
    fn test_external_reference_is_logged_not_linked() {
        let units = vec![unit("view.rb", json!([class("MyView", var_ref("UIView"), json!([["void_stmt"]]))]))];
        let analysis = Analyzer::new().analyze(&units).unwrap();

        let referencing: Vec<&String> = analysis.externals.referencing_units("UIView").unwrap().iter().collect();
        assert_eq!(referencing, vec!["view.rb"]);
        assert!(analysis.graph.is_empty());
        assert_eq!(analysis.stats.external, 1);
    }

    #[test]
    fn test_duplicate_definition_last_processed_wins() {
        let units = vec![
            unit("first.rb", json!([class("Foo", Value::Null, json!([["void_stmt"]]))])),
            unit("second.rb", json!([class("Foo", Value::Null, json!([["void_stmt"]]))])),
            unit("user.rb", json!([var_ref("Foo")])),
        ];
        let analysis = Analyzer::new().analyze(&units).unwrap();

        assert_eq!(analysis.symbols.owner("::Foo"), Some("second.rb"));
        let diagnostics = analysis.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::DuplicateDefinition);

        let deps: Vec<&String> = analysis.graph.dependencies_of("user.rb").unwrap().iter().collect();
        assert_eq!(deps, vec!["second.rb"]);
    }

    #[test]
    fn test_strict_mode_fails_the_run() {
        let units = vec![
            unit("ok.rb", json!([var_ref("Foo")])),
            unit("odd.rb", json!([["lambda", ["params"], []]])),
        ];

        let lenient = Analyzer::new().analyze(&units).unwrap();
        assert_eq!(lenient.diagnostics().len(), 1);

        let err = Analyzer::new().strict(true).analyze(&units).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedNode { ref unit, .. } if unit == "odd.rb"));
    }

    #[test]
    fn test_cycle_oracle_on_analysis() {
        let units = vec![
            unit("a.rb", json!([class("A", Value::Null, json!([var_ref("B")]))])),
            unit("b.rb", json!([class("B", Value::Null, json!([["void_stmt"]]))])),
        ];
        let analysis = Analyzer::new().analyze(&units).unwrap();

        assert!(analysis.would_create_cycle("b.rb", "a.rb").unwrap());
        assert!(!analysis.would_create_cycle("a.rb", "b.rb").unwrap());
        assert!(matches!(
            analysis.would_create_cycle("a.rb", "missing.rb"),
            Err(Error::UnitNotFound(_))
        ));
    }

    #[test]
    fn test_progress_messages() {
        let units = vec![unit("a.rb", json!([["void_stmt"]])), unit("b.rb", json!([["void_stmt"]]))];
        let (tx, rx) = channel::unbounded();
        Analyzer::new().analyze_with_progress(&units, Some(&tx)).unwrap();
        drop(tx);

        let scanned = rx
            .iter()
            .filter(|m| matches!(m, ProgressMessage::Progress { phase: ProgressPhase::Scanning, .. }))
            .count();
        assert_eq!(scanned, 2);
    }
}
