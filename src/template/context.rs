use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::RequestTemplate;

use super::scanner::Reference;
use super::value::TemplateValue;
use super::{references, template_texts};

/// Read-only data a render pass draws from. Built once per invocation.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    env: BTreeMap<String, String>,
    history: Option<TemplateValue>,
}

impl TemplateContext {
    #[must_use]
    pub const fn new(env: BTreeMap<String, String>, history: Option<TemplateValue>) -> Self {
        Self { env, history }
    }

    /// Builds a context holding only the environment keys `template` refers to.
    ///
    /// Each key comes from `process_env` when it yields a non-empty value,
    /// otherwise from the dotfile, otherwise it is empty.
    pub fn from_sources<F>(
        template: &RequestTemplate,
        dotenv: &BTreeMap<String, String>,
        process_env: F,
        history: Option<TemplateValue>,
    ) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut env = BTreeMap::new();
        for text in template_texts(template) {
            for reference in references(text) {
                let Reference::Env(key) = reference else {
                    continue;
                };
                if env.contains_key(key) {
                    continue;
                }
                let value = process_env(key)
                    .filter(|value| !value.is_empty())
                    .or_else(|| dotenv.get(key).cloned())
                    .unwrap_or_default();
                debug!("[env] {} resolved ({} bytes)", key, value.len());
                env.insert(key.to_owned(), value);
            }
        }
        Self { env, history }
    }

    #[must_use]
    pub fn env(&self, key: &str) -> Option<&str> {
        self.env.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn history_lookup(&self, path: &[&str]) -> Option<&TemplateValue> {
        self.history.as_ref()?.lookup(path)
    }
}
