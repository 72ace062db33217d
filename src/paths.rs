use anyhow::Result;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static EXE_DIR: OnceLock<PathBuf> = OnceLock::new();

const SLUG_SEPARATORS: &str = r"[^a-z0-9]+";

/// Returns the directory containing the executable.
pub fn get_exe_dir() -> &'static PathBuf {
    EXE_DIR.get_or_init(|| {
        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
    })
}

/// Default config location: `<exe_dir>/pipeline.json`
pub fn default_config_path() -> PathBuf {
    get_exe_dir().join("pipeline.json")
}

/// Normalises a technology name or file stem: lowercase, runs of anything
/// that is not a letter or digit become a single hyphen.
pub fn technology_slug(name: &str) -> Result<String> {
    let separators = Regex::new(SLUG_SEPARATORS)?;
    let lower = name.to_lowercase();
    Ok(separators.replace_all(&lower, "-").trim_matches('-').to_string())
}

/// Directory tree written under the `--out` root.
#[derive(Clone, Debug)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<out>/logs/`
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// `<out>/data/`
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    /// `<out>/charts/`
    pub fn charts_dir(&self) -> PathBuf {
        self.root.join("charts")
    }

    /// `<out>/converted/`
    pub fn converted_dir(&self) -> PathBuf {
        self.root.join("converted")
    }

    /// `<out>/debug/`
    pub fn debug_dir(&self) -> PathBuf {
        self.root.join("debug")
    }

    /// `<out>/debug/masks/`
    pub fn masks_dir(&self) -> PathBuf {
        self.debug_dir().join("masks")
    }

    pub fn data_path(&self, slug: &str) -> PathBuf {
        self.data_dir().join(format!("{slug}.json"))
    }

    pub fn chart_path(&self, slug: &str) -> PathBuf {
        self.charts_dir().join(format!("{slug}.png"))
    }

    pub fn converted_path(&self, slug: &str) -> PathBuf {
        self.converted_dir().join(format!("{slug}.png"))
    }

    pub fn summary_path(&self) -> PathBuf {
        self.root.join("summary.json")
    }

    /// Ensures all output directories exist. Call at startup.
    pub fn ensure_directories(&self, debug: bool) -> std::io::Result<()> {
        std::fs::create_dir_all(self.logs_dir())?;
        std::fs::create_dir_all(self.data_dir())?;
        std::fs::create_dir_all(self.charts_dir())?;
        std::fs::create_dir_all(self.converted_dir())?;
        if debug {
            std::fs::create_dir_all(self.masks_dir())?;
        }
        Ok(())
    }
}
