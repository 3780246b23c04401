use std::collections::BTreeMap;

use serde_json::Value;

/// Decoded history data, walked by `{{history.*}}` placeholders.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<TemplateValue>),
    Map(BTreeMap<String, TemplateValue>),
}

impl TemplateValue {
    /// Decodes a last-response snapshot. A string `body` that parses as JSON is
    /// replaced by the parsed tree so paths can reach into it.
    #[must_use]
    pub fn from_snapshot(snapshot: Value) -> Self {
        let mut value = TemplateValue::from(snapshot);
        if let TemplateValue::Map(fields) = &mut value
            && let Some(TemplateValue::String(body)) = fields.get("body")
            && let Ok(parsed) = serde_json::from_str::<Value>(body)
        {
            fields.insert("body".to_owned(), TemplateValue::from(parsed));
        }
        value
    }

    /// Walks map keys one segment at a time. Any missing key, or a non-map
    /// value with segments left, yields `None`.
    #[must_use]
    pub fn lookup(&self, path: &[&str]) -> Option<&TemplateValue> {
        let mut current = self;
        for segment in path {
            current = match current {
                TemplateValue::Map(fields) => fields.get(*segment)?,
                TemplateValue::Null
                | TemplateValue::Bool(_)
                | TemplateValue::Number(_)
                | TemplateValue::String(_)
                | TemplateValue::List(_) => return None,
            };
        }
        Some(current)
    }

    /// Text substituted for a placeholder: strings verbatim, anything else as compact JSON.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            TemplateValue::String(text) => text.clone(),
            TemplateValue::Null
            | TemplateValue::Bool(_)
            | TemplateValue::Number(_)
            | TemplateValue::List(_)
            | TemplateValue::Map(_) => self.to_json().to_string(),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            TemplateValue::Null => Value::Null,
            TemplateValue::Bool(flag) => Value::Bool(*flag),
            TemplateValue::Number(number) => Value::Number(number.clone()),
            TemplateValue::String(text) => Value::String(text.clone()),
            TemplateValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            TemplateValue::Map(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<Value> for TemplateValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => TemplateValue::Null,
            Value::Bool(flag) => TemplateValue::Bool(flag),
            Value::Number(number) => TemplateValue::Number(number),
            Value::String(text) => TemplateValue::String(text),
            Value::Array(items) => {
                TemplateValue::List(items.into_iter().map(TemplateValue::from).collect())
            }
            Value::Object(fields) => TemplateValue::Map(
                fields
                    .into_iter()
                    .map(|(key, field)| (key, TemplateValue::from(field)))
                    .collect(),
            ),
        }
    }
}
