use mugsmith_core::editor::EditorConfig;

const DOCUMENTATION: &str = r##"# Mugsmith server settings. You may edit this file, but be aware that formatting and comments
# will not be preserved, and all keys are case sensitive.

# bind = "127.0.0.1:3000"
# Public base of AR viewer links. Falls back to $NEXT_PUBLIC_APP_URL, then https://$VERCEL_URL.
# public-url = "https://mugs.example"
# [editor]
# history-depth = 20
# max-dimension = 1024
# background-threshold = 240
# canvas = { width = 900, height = 300, color = "#ffffff" }

"##;

/// Overrides the bind address from the settings file.
pub const BIND_VAR: &str = "MUGSMITH_BIND";

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    pub bind: std::net::SocketAddr,
    pub public_url: Option<String>,
    /// Largest accepted request body, in bytes. Designs carry their image inline.
    pub body_limit: usize,
    pub editor: EditorConfig,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: std::net::SocketAddr::from(([127, 0, 0, 1], 3000)),
            public_url: None,
            body_limit: 32 * 1024 * 1024,
            editor: EditorConfig::default(),
        }
    }
}
impl Settings {
    pub const FILENAME: &'static str = "mugsmith.toml";
    /// Load from `path`, or the user preferences if None. Anything missing or unreadable
    /// falls back to defaults. Environment overrides are applied last.
    #[must_use]
    pub fn load(path: Option<std::path::PathBuf>) -> Self {
        let explicit = path.is_some();
        let path = path.or_else(|| {
            let mut dir = preferences_dir()?;
            dir.push(Self::FILENAME);
            Some(dir)
        });
        let mut settings = match path.as_deref() {
            None => {
                log::warn!("No preferences dir, using default settings.");
                Self::default()
            }
            Some(path) => Self::load_or_default(path, !explicit),
        };
        settings.apply_env(|var| std::env::var(var).ok());
        settings
    }
    fn load_or_default(path: &std::path::Path, save_default: bool) -> Self {
        let loaded: anyhow::Result<Self> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let settings: Self = toml::from_str(&string)?;
            Ok(settings)
        };
        match loaded {
            Ok(settings) => {
                log::info!("Loaded settings from {path:?}");
                settings
            }
            Err(e) => {
                log::warn!("Failed to load settings from {path:?}, defaulting:\n{e:#}");
                let settings = Self::default();
                if save_default && !path.exists() {
                    if let Err(e) = settings.save(path) {
                        log::warn!("Failed to save default settings:\n{e:?}");
                    }
                }
                settings
            }
        }
    }
    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(bind) = env(BIND_VAR) {
            match bind.parse() {
                Ok(bind) => self.bind = bind,
                Err(e) => log::warn!("Ignoring {BIND_VAR}={bind:?}: {e}"),
            }
        }
    }
    pub fn save(&self, path: &std::path::Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            // Explicity do *not* create recursively. If not found, the user probably has a good reason.
            // Ignore errors (could already exist). Any real errors will be emitted by file access below.
            let _ = std::fs::DirBuilder::new().create(parent);
        }
        let string = DOCUMENTATION.to_owned() + &toml::ser::to_string_pretty(self)?;
        std::fs::write(path, string)?;
        Ok(())
    }
}
