// src/graph/builder.rs

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::Arc;

use anyhow::anyhow;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::desc::model::{ConfigDecl, DescFile, TargetDecl};
use crate::errors::{GenError, Result};
use crate::graph::record::{BuilderRecord, Item, RecordState};
use crate::graph::target::{Config, DepEdge, DepKind, Target, TargetType, Toolchain};
use crate::label::Label;
use crate::path::{OutputFile, SourceDir, SourceFile};
use crate::scheduler::Scheduler;
use crate::settings::BuildSettings;

/// Invoked on the main thread exactly once per record when it reaches the
/// resolved-and-generated state. Must return quickly; in practice it only
/// enqueues work on the scheduler.
pub type ResolvedCallback = Box<dyn Fn(&BuilderRecord)>;

/// The incremental resolver. Owns every record, toolchain, and item in the
/// build; consumers hold frozen `Arc` references handed out from here.
pub struct Builder {
    settings: Arc<BuildSettings>,
    scheduler: Arc<Scheduler>,
    records: BTreeMap<Label, BuilderRecord>,
    toolchains: BTreeMap<String, Arc<Toolchain>>,
    default_toolchain: String,
    loaded_dirs: BTreeSet<String>,
    resolved_callback: Option<ResolvedCallback>,
}

impl Builder {
    pub fn new(settings: Arc<BuildSettings>, scheduler: Arc<Scheduler>) -> Self {
        Self {
            settings,
            scheduler,
            records: BTreeMap::new(),
            toolchains: BTreeMap::new(),
            default_toolchain: "default".to_string(),
            loaded_dirs: BTreeSet::new(),
            resolved_callback: None,
        }
    }

    pub fn set_resolved_and_generated_callback(&mut self, cb: ResolvedCallback) {
        self.resolved_callback = Some(cb);
    }

    pub fn settings(&self) -> &Arc<BuildSettings> {
        &self.settings
    }

    pub fn toolchains(&self) -> &BTreeMap<String, Arc<Toolchain>> {
        &self.toolchains
    }

    pub fn default_toolchain(&self) -> &str {
        &self.default_toolchain
    }

    /// Every resolved target, in label order.
    pub fn all_resolved_targets(&self) -> Vec<Arc<Target>> {
        self.records
            .values()
            .filter(|r| r.state >= RecordState::Resolved)
            .filter_map(|r| r.target().cloned())
            .collect()
    }

    pub fn target(&self, label: &Label) -> Option<&Arc<Target>> {
        self.records.get(label).and_then(BuilderRecord::target)
    }

    /// Load the description tree and drive every record to resolved,
    /// firing the callback per target. The whole pipeline: parse → define
    /// → resolve → callback.
    pub fn load_and_resolve(&mut self) -> Result<()> {
        self.load_tree()?;
        self.resolve_all()
    }

    // ----- loading ---------------------------------------------------------

    /// Load the root file and, transitively, every imported or referenced
    /// directory's file. Parses are fanned out to scheduler workers; records
    /// are defined on this thread once a batch is parsed.
    fn load_tree(&mut self) -> Result<()> {
        let mut to_load: VecDeque<String> = VecDeque::from([String::new()]);

        while !to_load.is_empty() {
            let batch: Vec<String> = {
                let mut seen = BTreeSet::new();
                to_load
                    .drain(..)
                    .filter(|d| !self.loaded_dirs.contains(d) && seen.insert(d.clone()))
                    .collect()
            };
            if batch.is_empty() {
                break;
            }

            for dir in &batch {
                let file = Self::desc_file_for_dir(dir)?;
                let cache = Arc::clone(self.scheduler.input_file_cache());
                let root = self.settings.source_root().to_path_buf();
                self.scheduler.schedule(move || {
                    // Warm the cache; the definition pass below re-reads the
                    // (now cached) result and reports any error.
                    let _ = cache.get_or_parse(&root, &file);
                });
            }
            self.scheduler.wait_for_all_work();

            for dir in batch {
                let file = Self::desc_file_for_dir(&dir)?;
                let desc = self
                    .scheduler
                    .input_file_cache()
                    .get_or_parse(self.settings.source_root(), &file)?;
                debug!(file = %file, "loaded description file");
                let new_dirs = self.define_file(&dir, &desc)?;
                self.loaded_dirs.insert(dir);
                to_load.extend(new_dirs);
            }
        }

        Ok(())
    }

    fn desc_file_for_dir(dir: &str) -> Result<SourceFile> {
        if dir.is_empty() {
            SourceFile::resolve("//BUILD.toml", "")
        } else {
            SourceFile::resolve(&format!("//{dir}/BUILD.toml"), "")
        }
    }

    /// Define every toolchain, config, and target a file declares. Returns
    /// the directories newly referenced from this file.
    fn define_file(&mut self, dir: &str, desc: &DescFile) -> Result<Vec<String>> {
        let is_root = dir.is_empty();
        if !desc.toolchain.is_empty() && !is_root {
            return Err(GenError::Setup(format!(
                "//{dir}/BUILD.toml declares toolchains; only the root file may"
            )));
        }
        if is_root {
            self.define_toolchains(desc)?;
        }

        let mut new_dirs = Vec::new();

        for imp in &desc.import {
            new_dirs.push(Self::parse_dir_ref(imp)?);
        }

        for (name, decl) in &desc.config {
            let label = Label::new(dir, name);
            let config = Self::make_config(&label, dir, decl)?;
            self.define_item(label, Item::Config(Arc::new(config)), Vec::new())?;
        }

        for (name, decl) in &desc.target {
            let label = Label::new(dir, name);
            let target = self.make_target(&label, dir, decl)?;
            let dep_labels: Vec<Label> = target
                .public_dep_labels
                .iter()
                .chain(&target.private_dep_labels)
                .chain(&target.data_dep_labels)
                .chain(&target.config_labels)
                .chain(&target.public_config_labels)
                .cloned()
                .collect();

            for dep in &dep_labels {
                self.reference_label(dep.clone(), &label);
                if !self.loaded_dirs.contains(dep.dir()) {
                    new_dirs.push(dep.dir().to_string());
                }
            }

            self.define_item(label, Item::Target(Arc::new(target)), dep_labels)?;
        }

        Ok(new_dirs)
    }

    fn define_toolchains(&mut self, desc: &DescFile) -> Result<()> {
        if desc.toolchain.is_empty() {
            let tc = Toolchain::builtin_default();
            self.default_toolchain = tc.name.clone();
            self.toolchains.insert(tc.name.clone(), Arc::new(tc));
            return Ok(());
        }

        let mut default = None;
        for (name, decl) in &desc.toolchain {
            let tc = Toolchain {
                name: name.clone(),
                cc: decl.cc.clone(),
                cxx: decl.cxx.clone(),
                ar: decl.ar.clone(),
                link: decl.link.clone().unwrap_or_else(|| decl.cxx.clone()),
                cflags: decl.cflags.clone(),
                is_default: decl.default,
            };
            if decl.default {
                if default.is_some() {
                    return Err(GenError::Setup(
                        "more than one toolchain is marked default".to_string(),
                    ));
                }
                default = Some(name.clone());
            }
            self.toolchains.insert(name.clone(), Arc::new(tc));
        }

        self.default_toolchain = default.ok_or_else(|| {
            GenError::Setup("no toolchain is marked default".to_string())
        })?;
        Ok(())
    }

    fn parse_dir_ref(raw: &str) -> Result<String> {
        let dir = raw
            .strip_prefix("//")
            .map(|d| d.trim_end_matches('/'))
            .filter(|d| !d.is_empty())
            .ok_or_else(|| GenError::BadLabel(raw.to_string()))?;
        Ok(dir.to_string())
    }

    fn make_config(label: &Label, dir: &str, decl: &ConfigDecl) -> Result<Config> {
        let include_dirs = decl
            .include_dirs
            .iter()
            .map(|raw| {
                if let Some(abs) = raw.strip_prefix("//") {
                    SourceDir::new(abs)
                } else if dir.is_empty() {
                    SourceDir::new(raw)
                } else {
                    SourceDir::new(&format!("{dir}/{raw}"))
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Config {
            label: label.clone(),
            cflags: decl.cflags.clone(),
            defines: decl.defines.clone(),
            include_dirs,
        })
    }

    fn make_target(&self, label: &Label, dir: &str, decl: &TargetDecl) -> Result<Target> {
        let toolchain = decl
            .toolchain
            .clone()
            .unwrap_or_else(|| self.default_toolchain.clone());
        if !self.toolchains.contains_key(&toolchain) {
            return Err(GenError::Setup(format!(
                "target {label} references unknown toolchain '{toolchain}'"
            )));
        }

        let files = |raws: &[String]| -> Result<Vec<SourceFile>> {
            raws.iter().map(|r| SourceFile::resolve(r, dir)).collect()
        };
        let labels = |raws: &[String]| -> Result<Vec<Label>> {
            raws.iter().map(|r| Label::parse(r, dir)).collect()
        };

        Ok(Target {
            label: label.clone(),
            target_type: decl.target_type,
            dir: SourceDir::new(dir)?,
            in_default_toolchain: toolchain == self.default_toolchain,
            toolchain,
            sources: files(&decl.sources)?,
            inputs: files(&decl.inputs)?,
            public_headers: files(&decl.public)?,
            public_dep_labels: labels(&decl.public_deps)?,
            private_dep_labels: labels(&decl.deps)?,
            data_dep_labels: labels(&decl.data_deps)?,
            config_labels: labels(&decl.configs)?,
            public_config_labels: labels(&decl.public_configs)?,
            declared_outputs: decl.outputs.clone(),
            script: decl
                .script
                .as_deref()
                .map(|s| SourceFile::resolve(s, dir))
                .transpose()?,
            script_args: decl.args.clone(),
            output_name: decl.output_name.clone(),
            write_runtime_deps: decl.write_runtime_deps.as_deref().map(OutputFile::new),
            data: decl.data.clone(),
            unity_allowed: decl.unity_allowed,
            settings: Arc::clone(&self.settings),
            computed_outputs: Vec::new(),
            resolved_deps: Vec::new(),
            resolved_configs: Vec::new(),
        })
    }

    fn reference_label(&mut self, label: Label, from: &Label) {
        self.records
            .entry(label.clone())
            .or_insert_with(|| BuilderRecord::referenced(label, Some(from.clone())));
    }

    fn define_item(&mut self, label: Label, item: Item, dep_labels: Vec<Label>) -> Result<()> {
        match self.records.get_mut(&label) {
            Some(record) => {
                if record.state >= RecordState::Defined {
                    return Err(GenError::DuplicateLabel(label.to_string()));
                }
                record.item = Some(item);
                record.dep_labels = dep_labels;
                record.advance(RecordState::Defined);
            }
            None => {
                let mut record = BuilderRecord::referenced(label.clone(), None);
                record.item = Some(item);
                record.dep_labels = dep_labels;
                record.advance(RecordState::Defined);
                self.records.insert(label, record);
            }
        }
        Ok(())
    }

    // ----- resolution ------------------------------------------------------

    /// Drive every defined record to resolved in deterministic topological
    /// order, firing the resolved callback per record.
    fn resolve_all(&mut self) -> Result<()> {
        for record in self.records.values() {
            if record.state < RecordState::Defined {
                let referenced_from = record
                    .referenced_from
                    .as_ref()
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "the command line".to_string());
                return Err(GenError::MissingTarget {
                    label: record.label.to_string(),
                    referenced_from,
                });
            }
        }

        for label in self.resolution_order()? {
            self.resolve_record(&label)?;
        }
        Ok(())
    }

    /// Topological order over the record graph (dependencies first). A cycle
    /// aborts with every label on it.
    fn resolution_order(&self) -> Result<Vec<Label>> {
        let mut graph: DiGraph<Label, ()> = DiGraph::new();
        let mut indices: BTreeMap<Label, NodeIndex> = BTreeMap::new();

        for label in self.records.keys() {
            let idx = graph.add_node(label.clone());
            indices.insert(label.clone(), idx);
        }
        for record in self.records.values() {
            let to = indices[&record.label];
            for dep in &record.dep_labels {
                graph.add_edge(indices[dep], to, ());
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().map(|i| graph[i].clone()).collect()),
            Err(_) => {
                let mut labels: Vec<String> = tarjan_scc(&graph)
                    .into_iter()
                    .find(|scc| {
                        scc.len() > 1
                            || scc
                                .first()
                                .is_some_and(|&n| graph.find_edge(n, n).is_some())
                    })
                    .map(|scc| scc.into_iter().map(|i| graph[i].to_string()).collect())
                    .unwrap_or_default();
                labels.sort();
                Err(GenError::Cycle { labels })
            }
        }
    }

    fn resolve_record(&mut self, label: &Label) -> Result<()> {
        let is_target = self
            .records
            .get(label)
            .is_some_and(|r| r.target().is_some());

        if is_target {
            let (dep_edges, configs) = self.collect_deps_and_configs(label)?;
            self.finalize_target(label, dep_edges, configs)?;
            self.run_local_checks(label)?;
        }

        self.advance_and_notify(label);
        Ok(())
    }

    /// Read phase: gather frozen references to this target's dependencies
    /// and effective configs, running the dep-kind checks on the way.
    fn collect_deps_and_configs(
        &self,
        label: &Label,
    ) -> Result<(Vec<DepEdge>, Vec<Arc<Config>>)> {
        let target = self
            .records
            .get(label)
            .and_then(BuilderRecord::target)
            .ok_or_else(|| anyhow!("resolving unknown target {label}"))?;

        let mut edges = Vec::new();
        let kinds = [
            (DepKind::Public, &target.public_dep_labels),
            (DepKind::Private, &target.private_dep_labels),
            (DepKind::Data, &target.data_dep_labels),
        ];
        for (kind, labels) in kinds {
            for dep_label in labels {
                let dep = self.lookup_dep_target(label, dep_label)?;
                self.check_dep_kind(target, kind, dep)?;
                edges.push(DepEdge {
                    label: dep_label.clone(),
                    kind,
                    target: Arc::clone(dep),
                });
            }
        }

        let mut configs = Vec::new();
        for config_label in target
            .config_labels
            .iter()
            .chain(&target.public_config_labels)
        {
            configs.push(self.lookup_config(label, config_label)?);
        }
        // Public configs of direct deps apply to this target too.
        for edge in edges.iter().filter(|e| e.kind != DepKind::Data) {
            for config_label in &edge.target.public_config_labels {
                configs.push(self.lookup_config(&edge.label, config_label)?);
            }
        }

        Ok((edges, configs))
    }

    fn lookup_dep_target(&self, from: &Label, dep: &Label) -> Result<&Arc<Target>> {
        let record = self
            .records
            .get(dep)
            .ok_or_else(|| anyhow!("unresolved reference {dep} from {from}"))?;
        match record.item.as_ref() {
            Some(Item::Target(t)) => {
                debug_assert!(record.state >= RecordState::Resolved);
                Ok(t)
            }
            _ => Err(GenError::DepKind {
                target: from.to_string(),
                dep: dep.to_string(),
                reason: "it is a config, not a target".to_string(),
            }),
        }
    }

    fn lookup_config(&self, from: &Label, config: &Label) -> Result<Arc<Config>> {
        match self.records.get(config).and_then(|r| r.item.as_ref()) {
            Some(Item::Config(c)) => Ok(Arc::clone(c)),
            _ => Err(GenError::DepKind {
                target: from.to_string(),
                dep: config.to_string(),
                reason: "it is not a config".to_string(),
            }),
        }
    }

    fn check_dep_kind(&self, target: &Target, kind: DepKind, dep: &Target) -> Result<()> {
        if dep.target_type == TargetType::Executable
            && kind != DepKind::Data
            && target.is_binary()
        {
            return Err(GenError::DepKind {
                target: target.label.to_string(),
                dep: dep.label.to_string(),
                reason: "an executable cannot be linked; use data_deps".to_string(),
            });
        }
        if dep.target_type == TargetType::BundleData
            && !matches!(
                target.target_type,
                TargetType::CreateBundle | TargetType::BundleData | TargetType::Group
            )
        {
            return Err(GenError::DepKind {
                target: target.label.to_string(),
                dep: dep.label.to_string(),
                reason: "bundle_data may only feed bundle or group targets".to_string(),
            });
        }
        Ok(())
    }

    /// Write phase: the record's target is still exclusively owned here, so
    /// the resolution results can be written through the Arc before any
    /// reference escapes to workers.
    fn finalize_target(
        &mut self,
        label: &Label,
        dep_edges: Vec<DepEdge>,
        configs: Vec<Arc<Config>>,
    ) -> Result<()> {
        let record = self
            .records
            .get_mut(label)
            .ok_or_else(|| anyhow!("resolving unknown target {label}"))?;
        let Some(Item::Target(arc)) = record.item.as_mut() else {
            return Err(anyhow!("record {label} is not a target").into());
        };
        let target = Arc::get_mut(arc)
            .ok_or_else(|| anyhow!("target {label} was shared before resolution"))?;

        target.resolved_deps = dep_edges;
        target.resolved_configs = configs;
        target.compute_outputs();
        Ok(())
    }

    /// Per-target validation that can be done locally once outputs and dep
    /// edges are final.
    fn run_local_checks(&self, label: &Label) -> Result<()> {
        let Some(target) = self.records.get(label).and_then(BuilderRecord::target) else {
            return Ok(());
        };

        self.scan_generated_inputs(target);

        if self.settings.check_public_headers {
            for header in &target.public_headers {
                if !target.dir.contains(header) {
                    return Err(GenError::PublicHeader {
                        target: label.to_string(),
                        header: header.to_string(),
                    });
                }
            }
        }
        if self.settings.check_system_includes {
            for config in &target.resolved_configs {
                for dir in &config.include_dirs {
                    if !dir.to_disk_path(self.settings.source_root()).is_dir() {
                        return Err(GenError::SystemInclude {
                            config: config.label.to_string(),
                            dir: dir.to_string(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Every source/input inside the build directory must be produced by a
    /// target reachable over public or private dependency edges. data_deps
    /// are runtime-only and never satisfy the requirement. Violations are
    /// collected on the scheduler and reported in one batch after the run.
    fn scan_generated_inputs(&self, target: &Arc<Target>) {
        let build_dir = self.settings.build_dir();
        for file in target.sources.iter().chain(&target.inputs) {
            let Some(output) = OutputFile::from_source_file(build_dir, file) else {
                continue;
            };
            if !Self::dep_closure_produces(target, &output) {
                debug!(label = %target.label, file = %file, "input not generated by any dependency");
                self.scheduler
                    .add_unknown_generated_input(file.clone(), Arc::clone(target));
            }
        }
    }

    fn dep_closure_produces(target: &Target, output: &OutputFile) -> bool {
        let mut visited: BTreeSet<Label> = BTreeSet::new();
        let mut stack: Vec<&Target> = vec![target];
        while let Some(current) = stack.pop() {
            for edge in current.deps_of_kind(&[DepKind::Public, DepKind::Private]) {
                if !visited.insert(edge.label.clone()) {
                    continue;
                }
                if edge.target.computed_outputs.contains(output) {
                    return true;
                }
                stack.push(&edge.target);
            }
        }
        false
    }

    /// Resolved → callback → resolved-and-generated, exactly once.
    fn advance_and_notify(&mut self, label: &Label) {
        if let Some(record) = self.records.get_mut(label) {
            record.advance(RecordState::Resolved);
        }
        if let (Some(cb), Some(record)) = (&self.resolved_callback, self.records.get(label)) {
            cb(record);
        }
        if let Some(record) = self.records.get_mut(label) {
            record.advance(RecordState::ResolvedAndGenerated);
        }
    }
}
