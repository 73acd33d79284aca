// ============================================================================
// Fan-Out Data Model
// ============================================================================
//
// Wire format towards the summarization endpoint:
//
//   request:  {"data": {"<provider>": [{"model": "...", "messages": [{role, content}, ...]}]}}
//   response: {"model": "...", "<providerTag>": {"role": "assistant", "content": "..."}}
//
// ============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Catalog entry: a provider and the models it offers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub name: String,
    pub models: Vec<String>,
}

// ============================================================================
// Selection
// ============================================================================

/// Which models are selected, per provider.
///
/// Models keep the order in which they were selected and never repeat.
/// Providers iterate in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct ProviderSelection {
    selected: BTreeMap<String, Vec<String>>,
}

impl ProviderSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip a model on or off. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, provider: &str, model: &str) -> bool {
        if self.is_selected(provider, model) {
            self.deselect(provider, model);
            false
        } else {
            self.select(provider, model);
            true
        }
    }

    pub fn select(&mut self, provider: &str, model: &str) {
        let models = self.selected.entry(provider.to_string()).or_default();
        if !models.iter().any(|m| m == model) {
            models.push(model.to_string());
        }
    }

    pub fn deselect(&mut self, provider: &str, model: &str) {
        if let Some(models) = self.selected.get_mut(provider) {
            models.retain(|m| m != model);
            if models.is_empty() {
                self.selected.remove(provider);
            }
        }
    }

    pub fn is_selected(&self, provider: &str, model: &str) -> bool {
        self.selected
            .get(provider)
            .map(|models| models.iter().any(|m| m == model))
            .unwrap_or(false)
    }

    /// True when at least one model is selected somewhere
    pub fn has_any(&self) -> bool {
        self.selected.values().any(|models| !models.is_empty())
    }

    /// Number of requests a submission will issue
    pub fn request_count(&self) -> usize {
        self.selected.values().map(Vec::len).sum()
    }

    /// Every selected `(provider, model)` pair exactly once
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.selected.iter().flat_map(|(provider, models)| {
            models
                .iter()
                .map(move |model| (provider.as_str(), model.as_str()))
        })
    }

    /// First selected pair the catalog does not offer
    pub fn first_unlisted<'a>(&'a self, catalog: &[Provider]) -> Option<(&'a str, &'a str)> {
        self.pairs().find(|(provider, model)| {
            !catalog
                .iter()
                .any(|p| p.name == *provider && p.models.iter().any(|m| m == *model))
        })
    }
}

impl From<BTreeMap<String, Vec<String>>> for ProviderSelection {
    fn from(raw: BTreeMap<String, Vec<String>>) -> Self {
        let mut selection = Self::new();
        for (provider, models) in raw {
            for model in models {
                selection.select(&provider, &model);
            }
        }
        selection
    }
}

impl From<ProviderSelection> for BTreeMap<String, Vec<String>> {
    fn from(selection: ProviderSelection) -> Self {
        selection.selected
    }
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Fixed framing placed in front of the user's content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preamble {
    pub system: String,
    pub task: String,
}

impl Preamble {
    pub fn new(system: impl Into<String>, task: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            task: task.into(),
        }
    }
}

/// One unit of fan-out work: a single model asked to summarize the content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    provider: String,
    model: String,
    messages: Vec<ChatMessage>,
}

impl SummaryRequest {
    pub fn new(provider: &str, model: &str, content: &str, preamble: &Preamble) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            messages: vec![
                ChatMessage::new(Role::System, preamble.system.clone()),
                ChatMessage::new(Role::User, preamble.task.clone()),
                ChatMessage::new(Role::User, content),
            ],
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The user's content, always the last message
    pub fn content(&self) -> &str {
        self.messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }

    /// Body sent to the summarization endpoint
    pub fn to_payload(&self) -> SummaryPayload<'_> {
        let mut data = BTreeMap::new();
        data.insert(
            self.provider.as_str(),
            vec![ModelRequest {
                model: &self.model,
                messages: &self.messages,
            }],
        );
        SummaryPayload { data }
    }
}

#[derive(Debug, Serialize)]
pub struct SummaryPayload<'a> {
    pub data: BTreeMap<&'a str, Vec<ModelRequest<'a>>>,
}

#[derive(Debug, Serialize)]
pub struct ModelRequest<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
}

// ============================================================================
// Results
// ============================================================================

/// Provider-shaped payload a result can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Claude,
    Google,
    Azure,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::OpenAi,
        ProviderKind::Claude,
        ProviderKind::Google,
        ProviderKind::Azure,
    ];

    /// JSON key of this payload in a summary response
    pub fn tag(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Claude => "claude",
            ProviderKind::Google => "google",
            ProviderKind::Azure => "azure",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantReply {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Summary response exactly as it travels on the wire
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<AssistantReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude: Option<AssistantReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google: Option<AssistantReply>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<AssistantReply>,
}

impl SummaryResponse {
    fn slot(&self, kind: ProviderKind) -> Option<&AssistantReply> {
        match kind {
            ProviderKind::OpenAi => self.openai.as_ref(),
            ProviderKind::Claude => self.claude.as_ref(),
            ProviderKind::Google => self.google.as_ref(),
            ProviderKind::Azure => self.azure.as_ref(),
        }
    }
}

/// Payload of a successful summary, tagged with its provider shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPayload {
    pub kind: ProviderKind,
    pub reply: AssistantReply,
}

/// One successfully completed summary.
///
/// A single provider payload is expected; a response carrying none is kept
/// with an empty payload so that it still shows up in exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SummaryResponse", into = "SummaryResponse")]
pub struct SummaryResult {
    pub model: String,
    pub payload: Option<ProviderPayload>,
}

impl SummaryResult {
    pub fn new(model: impl Into<String>, kind: ProviderKind, content: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            payload: Some(ProviderPayload {
                kind,
                reply: AssistantReply {
                    role: "assistant".to_string(),
                    content: content.into(),
                },
            }),
        }
    }

    pub fn provider_kind(&self) -> Option<ProviderKind> {
        self.payload.as_ref().map(|p| p.kind)
    }

    /// Summary text, empty when no payload was populated
    pub fn response_text(&self) -> &str {
        self.payload
            .as_ref()
            .map(|p| p.reply.content.as_str())
            .unwrap_or_default()
    }
}

impl From<SummaryResponse> for SummaryResult {
    fn from(response: SummaryResponse) -> Self {
        let payload = ProviderKind::ALL.iter().find_map(|kind| {
            response.slot(*kind).map(|reply| ProviderPayload {
                kind: *kind,
                reply: reply.clone(),
            })
        });

        Self {
            model: response.model.unwrap_or_default(),
            payload,
        }
    }
}

impl From<SummaryResult> for SummaryResponse {
    fn from(result: SummaryResult) -> Self {
        let mut response = SummaryResponse {
            model: Some(result.model),
            ..Default::default()
        };
        if let Some(payload) = result.payload {
            let slot = match payload.kind {
                ProviderKind::OpenAi => &mut response.openai,
                ProviderKind::Claude => &mut response.claude,
                ProviderKind::Google => &mut response.google,
                ProviderKind::Azure => &mut response.azure,
            };
            *slot = Some(payload.reply);
        }
        response
    }
}

/// Results of one submission, in the order their requests completed.
///
/// Completion order varies from run to run; consumers must not expect
/// submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet(Vec<SummaryResult>);

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SummaryResult> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[SummaryResult] {
        &self.0
    }
}

impl From<Vec<SummaryResult>> for ResultSet {
    fn from(results: Vec<SummaryResult>) -> Self {
        Self(results)
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a SummaryResult;
    type IntoIter = std::slice::Iter<'a, SummaryResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = SummaryResult;
    type IntoIter = std::vec::IntoIter<SummaryResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut selection = ProviderSelection::new();

        assert!(selection.toggle("openai", "gpt-4"));
        assert!(selection.is_selected("openai", "gpt-4"));
        assert!(selection.has_any());

        assert!(!selection.toggle("openai", "gpt-4"));
        assert!(!selection.is_selected("openai", "gpt-4"));
        assert!(!selection.has_any());
    }

    #[test]
    fn test_select_is_idempotent_and_keeps_order() {
        let mut selection = ProviderSelection::new();
        selection.select("openai", "gpt-4o");
        selection.select("openai", "gpt-4");
        selection.select("openai", "gpt-4o");

        let pairs: Vec<_> = selection.pairs().collect();
        assert_eq!(pairs, [("openai", "gpt-4o"), ("openai", "gpt-4")]);
        assert_eq!(selection.request_count(), 2);
    }

    #[test]
    fn test_pairs_cover_every_selection_once() {
        let mut selection = ProviderSelection::new();
        selection.select("openai", "gpt-4");
        selection.select("openai", "gpt-4o");
        selection.select("claude", "claude-3");

        let pairs: Vec<_> = selection.pairs().collect();
        assert_eq!(pairs.len(), 3);
        assert!(pairs.contains(&("openai", "gpt-4")));
        assert!(pairs.contains(&("openai", "gpt-4o")));
        assert!(pairs.contains(&("claude", "claude-3")));
    }

    #[test]
    fn test_selection_deserialize_drops_duplicates_and_empty_providers() {
        let selection: ProviderSelection = serde_json::from_value(json!({
            "openai": ["gpt-4", "gpt-4"],
            "google": []
        }))
        .unwrap();

        assert_eq!(selection.request_count(), 1);
        assert!(selection.pairs().all(|(provider, _)| provider != "google"));
        assert!(selection.has_any());
    }

    #[test]
    fn test_first_unlisted_checks_provider_and_model() {
        let catalog = vec![Provider {
            name: "openai".to_string(),
            models: vec!["gpt-4".to_string()],
        }];

        let mut selection = ProviderSelection::new();
        selection.select("openai", "gpt-4");
        assert_eq!(selection.first_unlisted(&catalog), None);

        selection.select("openai", "gpt-5");
        assert_eq!(selection.first_unlisted(&catalog), Some(("openai", "gpt-5")));

        selection.deselect("openai", "gpt-5");
        selection.select("claude", "gpt-4");
        assert_eq!(selection.first_unlisted(&catalog), Some(("claude", "gpt-4")));
    }

    #[test]
    fn test_empty_selection_has_nothing() {
        let selection: ProviderSelection = serde_json::from_value(json!({"openai": []})).unwrap();
        assert!(!selection.has_any());
        assert_eq!(selection.pairs().count(), 0);
    }

    #[test]
    fn test_request_carries_preamble_and_content() {
        let preamble = Preamble::new("You are a tutor.", "Summarize this.");
        let request = SummaryRequest::new("openai", "gpt-4", "Hello world", &preamble);

        let messages = request.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, "You are a tutor.");
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "Summarize this.");
        assert_eq!(messages[2].role, Role::User);
        assert_eq!(request.content(), "Hello world");
    }

    #[test]
    fn test_payload_wire_shape() {
        let preamble = Preamble::new("sys", "task");
        let request = SummaryRequest::new("claude", "claude-3", "text", &preamble);

        let value = serde_json::to_value(request.to_payload()).unwrap();
        assert_eq!(
            value,
            json!({
                "data": {
                    "claude": [{
                        "model": "claude-3",
                        "messages": [
                            {"role": "system", "content": "sys"},
                            {"role": "user", "content": "task"},
                            {"role": "user", "content": "text"}
                        ]
                    }]
                }
            })
        );
    }

    #[test]
    fn test_result_from_wire_picks_populated_payload() {
        let result: SummaryResult = serde_json::from_value(json!({
            "model": "gemini-pro",
            "google": {"role": "assistant", "content": "short summary"}
        }))
        .unwrap();

        assert_eq!(result.model, "gemini-pro");
        assert_eq!(result.provider_kind(), Some(ProviderKind::Google));
        assert_eq!(result.response_text(), "short summary");
    }

    #[test]
    fn test_result_without_payload_has_empty_text() {
        let result: SummaryResult = serde_json::from_value(json!({"model": "gpt-4"})).unwrap();
        assert_eq!(result.provider_kind(), None);
        assert_eq!(result.response_text(), "");
    }

    #[test]
    fn test_result_serializes_to_wire_shape() {
        let result = SummaryResult::new("gpt-4", ProviderKind::OpenAi, "done");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({"model": "gpt-4", "openai": {"role": "assistant", "content": "done"}})
        );
    }
}
