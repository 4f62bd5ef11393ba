//! Global singletons.

pub mod settings;

use mugsmith_core::repositories::fonts::Fonts;
use std::sync::Arc;

/// The shared font database, scanned once on first use.
pub fn fonts() -> &'static Arc<Fonts> {
    static ONCE: std::sync::OnceLock<Arc<Fonts>> = std::sync::OnceLock::new();
    ONCE.get_or_init(|| Arc::new(Fonts::new_system()))
}
