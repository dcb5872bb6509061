//! Tool registry for name-based dispatch.

use std::collections::HashMap;
use std::sync::Arc;

use zdesk_api::ZendeskClient;
use zdesk_types::{Tool, ToolDefinition};

/// Registry of available tools. Populated once at startup and immutable
/// afterwards.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Create a registry with all built-in tools bound to the given client.
    pub fn with_builtins(zendesk: Arc<ZendeskClient>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::GetTicketTool::new(Arc::clone(&zendesk))));
        registry.register(Arc::new(super::ListTicketsTool::new(Arc::clone(&zendesk))));
        registry.register(Arc::new(super::CreateTicketTool::new(Arc::clone(&zendesk))));
        registry.register(Arc::new(super::UpdateTicketTool::new(Arc::clone(&zendesk))));
        registry.register(Arc::new(super::AddCommentTool::new(Arc::clone(&zendesk))));
        registry.register(Arc::new(super::GetTicketCommentsTool::new(Arc::clone(
            &zendesk,
        ))));
        registry.register(Arc::new(super::GetUserTool::new(zendesk)));
        registry
    }

    /// Register a tool.
    ///
    /// Panics if a tool with the same name is already registered: a
    /// duplicate is a startup programming error, not a runtime condition.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        let previous = self.tools.insert(name.clone(), tool);
        assert!(
            previous.is_none(),
            "duplicate tool registration: '{name}'"
        );
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// All tool definitions, sorted by name for a stable advertisement.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> = self.tools.values().map(|t| t.definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
