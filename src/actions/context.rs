use serde_json::Value as JsonValue;

/// Receives named outputs emitted by an action.
pub trait OutputSink: Send {
    fn emit(&mut self, name: &str, value: JsonValue);
}

impl<F> OutputSink for F
where
    F: FnMut(&str, JsonValue) + Send,
{
    fn emit(&mut self, name: &str, value: JsonValue) {
        self(name, value);
    }
}

/// Collects outputs in emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedOutputs {
    entries: Vec<(String, JsonValue)>,
}

impl RecordedOutputs {
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(String, JsonValue)] {
        &self.entries
    }

    /// Render as a JSON object. A name emitted twice keeps its last value.
    pub fn to_json(&self) -> JsonValue {
        let map: serde_json::Map<String, JsonValue> = self.entries.iter().cloned().collect();
        JsonValue::Object(map)
    }
}

impl OutputSink for RecordedOutputs {
    fn emit(&mut self, name: &str, value: JsonValue) {
        self.entries.push((name.to_owned(), value));
    }
}

/// Everything an action handler gets for one invocation.
pub struct ActionContext<'a, I> {
    pub input: I,
    output: &'a mut dyn OutputSink,
}

impl<'a, I> ActionContext<'a, I> {
    pub fn new(input: I, output: &'a mut dyn OutputSink) -> Self {
        Self { input, output }
    }

    pub fn output(&mut self, name: &str, value: impl Into<JsonValue>) {
        let value = value.into();
        tracing::debug!("action: output {name} = {value}");
        self.output.emit(name, value);
    }
}
