// src/setup.rs

//! The top-level owner of one generation run: build settings, the
//! scheduler, and the builder live here for the duration of the process.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::debug;

use crate::errors::{GenError, Result};
use crate::graph::builder::Builder;
use crate::scheduler::Scheduler;
use crate::settings::BuildSettings;

/// Knobs fixed before the run starts.
#[derive(Debug, Clone, Default)]
pub struct SetupOptions {
    pub check_public_headers: bool,
    pub check_system_includes: bool,
    /// `--args` override; written to the build-args file verbatim.
    pub build_args: Option<String>,
    /// Write an empty build-args file when no override was passed and none
    /// exists yet.
    pub gen_empty_args: bool,
    /// Worker count override, mainly for tests; hardware parallelism
    /// otherwise.
    pub threads: Option<usize>,
}

pub struct Setup {
    settings: Arc<BuildSettings>,
    scheduler: Arc<Scheduler>,
    builder: Builder,
    build_args: Option<String>,
    gen_empty_args: bool,
}

impl Setup {
    /// Validate the source root and output directory and wire up the
    /// scheduler and builder. Does not touch the description tree yet.
    pub fn new(source_root: PathBuf, out_dir: &str, options: SetupOptions) -> Result<Self> {
        let root_file = source_root.join("BUILD.toml");
        if !root_file.is_file() {
            return Err(GenError::Setup(format!(
                "no BUILD.toml found in {}",
                source_root.display()
            )));
        }

        let mut settings = BuildSettings::new(source_root, out_dir)?;
        settings.check_public_headers = options.check_public_headers;
        settings.check_system_includes = options.check_system_includes;
        let settings = Arc::new(settings);

        let scheduler = Scheduler::new(options.threads);
        let builder = Builder::new(Arc::clone(&settings), Arc::clone(&scheduler));

        Ok(Self {
            settings,
            scheduler,
            builder,
            build_args: options.build_args,
            gen_empty_args: options.gen_empty_args,
        })
    }

    pub fn settings(&self) -> &Arc<BuildSettings> {
        &self.settings
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    pub fn builder(&self) -> &Builder {
        &self.builder
    }

    pub fn builder_mut(&mut self) -> &mut Builder {
        &mut self.builder
    }

    /// Create the output directory, write the build-args file, then load
    /// and resolve the whole description tree. Resolved callbacks fire from
    /// inside this call.
    pub fn run(&mut self) -> Result<()> {
        let build_dir = self.settings.build_dir_path();
        fs::create_dir_all(build_dir)
            .with_context(|| format!("creating build directory {}", build_dir.display()))?;
        self.write_build_args_file()?;
        self.builder.load_and_resolve()
    }

    fn write_build_args_file(&self) -> Result<()> {
        let path = self.settings.build_dir_path().join("args.toml");
        if let Some(args) = &self.build_args {
            let mut contents = args.clone();
            if !contents.ends_with('\n') {
                contents.push('\n');
            }
            fs::write(&path, contents)
                .with_context(|| format!("writing {}", path.display()))?;
            debug!(file = %path.display(), "wrote build args");
        } else if self.gen_empty_args && !path.exists() {
            fs::write(&path, "# Build arguments. Set values here or pass --args.\n")
                .with_context(|| format!("writing {}", path.display()))?;
            debug!(file = %path.display(), "wrote empty build args");
        }
        Ok(())
    }
}
