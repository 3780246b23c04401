//! Request preparation, execution and reporting for the CLI.
mod output;
mod prepare;
mod request_file;
mod runner;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::args::{Command, PokeArgs};
use crate::config::load_dotenv;
use crate::domain::RequestSpec;
use crate::error::AppResult;
use crate::history::{FileHistoryStore, HistoryStore};
use crate::http::{ClientSettings, ReqwestTransport, SendContext, build_client};
use crate::payload::{self, ExternalEditor};
use crate::template::{TemplateContext, render_template};

pub use output::{
    format_body, print_benchmark, print_request, print_response, render_benchmark,
    render_request, render_response, status_line,
};
pub use prepare::{
    apply_default_content_type, infer_content_type, payload_sources, template_from_args,
};
pub use request_file::{load_request_file, save_request_file, template_for_save};
pub use runner::{Engine, ExecutionReport};

/// Builds the request described by `args` (flags or a request file) and executes it.
///
/// # Errors
///
/// Returns an error when the request cannot be built, the body cannot be
/// resolved, or a single request fails.
pub async fn run(args: PokeArgs) -> AppResult<()> {
    let (template, edit) = match args.command.as_ref() {
        Some(Command::Send(send)) => (load_request_file(Path::new(&send.path))?, false),
        None => (template_from_args(&args)?, args.edit),
    };

    let dotenv = load_dotenv(Path::new(&args.env_file)).unwrap_or_else(|err| {
        warn!("Ignoring env file: {}", err);
        BTreeMap::new()
    });
    let history_store = Arc::new(FileHistoryStore::new(&args.history_path));
    let history = history_store.load().await.unwrap_or_else(|err| {
        warn!("Ignoring last response: {}", err);
        None
    });
    let context =
        TemplateContext::from_sources(&template, &dotenv, |key| std::env::var(key).ok(), history);
    let mut rendered = render_template(&template, &context);

    let sources = payload_sources(&rendered, edit);
    let body = payload::resolve(
        &sources,
        &mut std::io::stdin().lock(),
        &ExternalEditor::from_env(),
    )?;
    apply_default_content_type(&mut rendered, &body);

    if let Some(path) = args.save.as_deref()
        && args.command.is_none()
    {
        let interactive = (sources.stdin || sources.edit).then_some(body.as_slice());
        let mut saved = template_for_save(&template, interactive);
        apply_default_content_type(&mut saved, &body);
        save_request_file(&saved, Path::new(path))?;
        info!("Request saved to {}", path);
    }

    let request = RequestSpec::from_template(&rendered, body)?;
    if args.dry_run {
        print_request(&request);
        return Ok(());
    }

    let client = build_client(&ClientSettings {
        request_timeout: args.request_timeout,
        connect_timeout: args.connect_timeout,
        user_agent: args.user_agent.clone(),
    })?;
    let send_context = SendContext::new(Arc::new(ReqwestTransport::new(client)))
        .with_history(history_store as Arc<dyn HistoryStore>);
    let engine = Engine::new(send_context, args.verbose);
    engine.execute(&request).await?;
    Ok(())
}
