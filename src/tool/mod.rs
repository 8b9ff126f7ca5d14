pub mod base;
pub mod web_search;

use crate::search::SearchEngine;
use base::Tool;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Tool registry - manages the tools exposed to the host
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a registry with the search tool registered
    pub fn new(engine: SearchEngine) -> Self {
        let mut registry = Self::empty();
        registry.insert_tool(Arc::new(web_search::WebSearchTool::new(engine)));
        registry
    }

    pub fn empty() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Tool definitions in the shape hosts register them, sorted by name
    pub fn list_tool_definitions(&self) -> Vec<serde_json::Value> {
        let mut tools: Vec<&Arc<dyn Tool>> = self.tools.values().collect();
        tools.sort_by(|a, b| a.id().cmp(b.id()));
        tools
            .into_iter()
            .map(|tool| {
                json!({
                    "name": tool.id(),
                    "description": tool.description(),
                    "input_schema": tool.input_schema(),
                })
            })
            .collect()
    }

    /// Get all tool names
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Register a tool under its own id
    pub fn insert_tool(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.id().to_string(), tool);
    }
}
