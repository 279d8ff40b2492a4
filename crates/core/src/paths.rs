use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Paths {
    pub base: PathBuf,
}

impl Paths {
    pub fn new() -> Self {
        let base = dirs::home_dir()
            .map(|h| h.join(".unburden"))
            .unwrap_or_else(|| PathBuf::from(".unburden"));
        Self { base }
    }

    pub fn with_base(base: PathBuf) -> Self {
        Self { base }
    }

    pub fn config_file(&self) -> PathBuf {
        self.base.join("config.json")
    }

    /// Directory where rendered reports are written by the CLI.
    pub fn reports_dir(&self) -> PathBuf {
        self.base.join("reports")
    }

    pub fn report_file(&self, date: &str) -> PathBuf {
        let safe = date.replace([':', '/', '\\'], "_");
        self.reports_dir().join(format!("{}.txt", safe))
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.base)?;
        std::fs::create_dir_all(self.reports_dir())?;
        Ok(())
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}
