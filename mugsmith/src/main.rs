#![warn(clippy::pedantic)]

mod global;
mod routes;

use anyhow::Result as AnyResult;
use std::sync::Arc;

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    // A single optional arg names the settings file, otherwise the user preferences are used.
    let settings = global::settings::Settings::load(std::env::args_os().nth(1).map(Into::into));
    let ar = mugsmith_core::ar::ArLinkBuilder::from_env(settings.public_url.as_deref())?;
    let state = routes::AppState {
        ar: Arc::new(ar),
        fonts: global::fonts().clone(),
        editor: settings.editor.clone(),
    };
    let app = routes::router(state, settings.body_limit);

    // Requests only await IO, rendering happens on the blocking pool.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()?;
    runtime.block_on(async move {
        let listener = tokio::net::TcpListener::bind(settings.bind).await?;
        log::info!("Listening on http://{}", listener.local_addr()?);
        axum::serve(listener, app).await?;
        Ok(())
    })
}
