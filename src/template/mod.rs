//! `{{env.KEY}}` / `{{history.a.b}}` placeholder rendering.
//!
//! Rendering is best-effort text substitution: lookups that miss degrade to
//! pass-through text, so nothing here returns an error.
mod context;
mod scanner;
mod value;


use tracing::trace;

use crate::domain::{Multimap, RequestTemplate};

pub use context::TemplateContext;
pub use scanner::Reference;
pub use value::TemplateValue;

pub(crate) use scanner::references;

/// Renders every placeholder in `input` against `context` in a single pass.
#[must_use]
pub fn render(input: &str, context: &TemplateContext) -> String {
    if !input.contains("{{") {
        return input.to_owned();
    }
    let mut output = String::with_capacity(input.len());
    for token in scanner::Scanner::new(input) {
        match token {
            scanner::Token::Text(text) => output.push_str(text),
            scanner::Token::Placeholder { raw, reference } => match reference {
                Reference::Env(key) => {
                    output.push_str(context.env(key).unwrap_or_default());
                }
                Reference::History(path) => match context.history_lookup(&path) {
                    Some(value) => output.push_str(&value.render()),
                    None => {
                        trace!("History placeholder {} did not resolve", raw);
                        output.push_str(raw);
                    }
                },
            },
        }
    }
    output
}

/// Renders the URL parts, body, body file path, headers and query parameters
/// of a request template. Other fields are copied unchanged.
#[must_use]
pub fn render_template(template: &RequestTemplate, context: &TemplateContext) -> RequestTemplate {
    RequestTemplate {
        url: render(&template.url, context),
        scheme: render(&template.scheme, context),
        host: render(&template.host, context),
        path: render(&template.path, context),
        headers: render_multimap(&template.headers, context),
        query_params: render_multimap(&template.query_params, context),
        body: render(&template.body, context),
        body_file: render(&template.body_file, context),
        ..template.clone()
    }
}

fn render_multimap(map: &Multimap, context: &TemplateContext) -> Multimap {
    let mut rendered = Multimap::new();
    for (key, values) in map {
        rendered
            .entry(render(key, context))
            .or_default()
            .extend(values.iter().map(|value| render(value, context)));
    }
    rendered
}

/// Every text field of a template that takes part in rendering.
pub(crate) fn template_texts(template: &RequestTemplate) -> Vec<&str> {
    let mut texts = vec![
        template.url.as_str(),
        template.scheme.as_str(),
        template.host.as_str(),
        template.path.as_str(),
        template.body.as_str(),
        template.body_file.as_str(),
    ];
    for map in [&template.headers, &template.query_params] {
        for (key, values) in map {
            texts.push(key.as_str());
            texts.extend(values.iter().map(String::as_str));
        }
    }
    texts
}
