// crates/test-utils/src/builders.rs

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

/// Builder for one `[target.<name>]` declaration, emitted as TOML text.
#[derive(Debug, Clone)]
pub struct TargetDecl {
    name: String,
    target_type: String,
    sources: Vec<String>,
    inputs: Vec<String>,
    public: Vec<String>,
    public_deps: Vec<String>,
    deps: Vec<String>,
    data_deps: Vec<String>,
    configs: Vec<String>,
    public_configs: Vec<String>,
    outputs: Vec<String>,
    script: Option<String>,
    toolchain: Option<String>,
    write_runtime_deps: Option<String>,
    unity_allowed: Option<bool>,
    data: Vec<String>,
}

impl TargetDecl {
    pub fn new(name: &str, target_type: &str) -> Self {
        Self {
            name: name.to_string(),
            target_type: target_type.to_string(),
            sources: vec![],
            inputs: vec![],
            public: vec![],
            public_deps: vec![],
            deps: vec![],
            data_deps: vec![],
            configs: vec![],
            public_configs: vec![],
            outputs: vec![],
            script: None,
            toolchain: None,
            write_runtime_deps: None,
            unity_allowed: None,
            data: vec![],
        }
    }

    pub fn source(mut self, s: &str) -> Self {
        self.sources.push(s.to_string());
        self
    }

    pub fn input(mut self, s: &str) -> Self {
        self.inputs.push(s.to_string());
        self
    }

    pub fn public_header(mut self, s: &str) -> Self {
        self.public.push(s.to_string());
        self
    }

    pub fn public_dep(mut self, label: &str) -> Self {
        self.public_deps.push(label.to_string());
        self
    }

    pub fn dep(mut self, label: &str) -> Self {
        self.deps.push(label.to_string());
        self
    }

    pub fn data_dep(mut self, label: &str) -> Self {
        self.data_deps.push(label.to_string());
        self
    }

    pub fn config(mut self, label: &str) -> Self {
        self.configs.push(label.to_string());
        self
    }

    pub fn public_config(mut self, label: &str) -> Self {
        self.public_configs.push(label.to_string());
        self
    }

    pub fn output(mut self, path: &str) -> Self {
        self.outputs.push(path.to_string());
        self
    }

    pub fn script(mut self, path: &str) -> Self {
        self.script = Some(path.to_string());
        self
    }

    pub fn toolchain(mut self, name: &str) -> Self {
        self.toolchain = Some(name.to_string());
        self
    }

    pub fn write_runtime_deps(mut self, path: &str) -> Self {
        self.write_runtime_deps = Some(path.to_string());
        self
    }

    pub fn unity_allowed(mut self, allowed: bool) -> Self {
        self.unity_allowed = Some(allowed);
        self
    }

    pub fn data(mut self, entry: &str) -> Self {
        self.data.push(entry.to_string());
        self
    }

    fn to_toml(&self) -> String {
        let mut out = format!("[target.{}]\ntype = \"{}\"\n", self.name, self.target_type);
        let list = |out: &mut String, key: &str, values: &[String]| {
            if !values.is_empty() {
                let quoted: Vec<String> = values.iter().map(|v| format!("\"{v}\"")).collect();
                out.push_str(&format!("{key} = [{}]\n", quoted.join(", ")));
            }
        };
        list(&mut out, "sources", &self.sources);
        list(&mut out, "inputs", &self.inputs);
        list(&mut out, "public", &self.public);
        list(&mut out, "public_deps", &self.public_deps);
        list(&mut out, "deps", &self.deps);
        list(&mut out, "data_deps", &self.data_deps);
        list(&mut out, "configs", &self.configs);
        list(&mut out, "public_configs", &self.public_configs);
        list(&mut out, "outputs", &self.outputs);
        list(&mut out, "data", &self.data);
        if let Some(script) = &self.script {
            out.push_str(&format!("script = \"{script}\"\n"));
        }
        if let Some(toolchain) = &self.toolchain {
            out.push_str(&format!("toolchain = \"{toolchain}\"\n"));
        }
        if let Some(path) = &self.write_runtime_deps {
            out.push_str(&format!("write_runtime_deps = \"{path}\"\n"));
        }
        if let Some(allowed) = self.unity_allowed {
            out.push_str(&format!("unity_allowed = {allowed}\n"));
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
struct DirFile {
    imports: Vec<String>,
    sections: Vec<String>,
}

/// Builder for a whole description tree: one `BUILD.toml` per directory,
/// written under a temp (or caller-provided) root.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    dirs: BTreeMap<String, DirFile>,
}

impl TreeBuilder {
    /// A tree whose root file exists but declares nothing yet.
    pub fn new() -> Self {
        let mut dirs = BTreeMap::new();
        dirs.insert(String::new(), DirFile::default());
        Self { dirs }
    }

    /// Add an `import = ["//dir"]` entry to `dir`'s file.
    pub fn import(mut self, dir: &str, imported: &str) -> Self {
        self.dirs
            .entry(dir.to_string())
            .or_default()
            .imports
            .push(imported.to_string());
        self
    }

    pub fn target(mut self, dir: &str, decl: TargetDecl) -> Self {
        self.dirs
            .entry(dir.to_string())
            .or_default()
            .sections
            .push(decl.to_toml());
        self
    }

    /// Append raw TOML (a `[config.x]` or `[toolchain.x]` section, say) to
    /// `dir`'s file.
    pub fn raw(mut self, dir: &str, toml: &str) -> Self {
        self.dirs
            .entry(dir.to_string())
            .or_default()
            .sections
            .push(toml.trim_start().to_string());
        self
    }

    /// Write every `BUILD.toml` under `root`.
    pub fn write_to(&self, root: &Path) -> io::Result<()> {
        for (dir, file) in &self.dirs {
            let dir_path = if dir.is_empty() {
                root.to_path_buf()
            } else {
                root.join(dir)
            };
            fs::create_dir_all(&dir_path)?;

            let mut contents = String::new();
            if !file.imports.is_empty() {
                let quoted: Vec<String> =
                    file.imports.iter().map(|i| format!("\"{i}\"")).collect();
                contents.push_str(&format!("import = [{}]\n\n", quoted.join(", ")));
            }
            for section in &file.sections {
                contents.push_str(section);
                contents.push('\n');
            }
            fs::write(dir_path.join("BUILD.toml"), contents)?;
        }
        Ok(())
    }

    /// Write the tree into a fresh temp directory and return it.
    pub fn build(&self) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("creating temp source tree");
        self.write_to(dir.path()).expect("writing description tree");
        dir
    }
}
