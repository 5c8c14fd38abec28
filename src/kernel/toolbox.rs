//! Toolbox category tree and its localization.
//!
//! The canonical schema only ever carries language independent keys
//! (`CAT_LOGIC`, ...). A localized copy is derived from it for every language
//! change; `raw_name_key` is never touched, so translating again from any
//! copy gives the same result as translating the canonical schema.

use serde::{Deserialize, Serialize};

use super::language::{self, LanguageCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Category,
    Separator,
    BlockGroup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub kind: NodeKind,
    #[serde(default)]
    pub raw_name_key: String,
    #[serde(default)]
    pub localized_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn category(key: &str, style: &str, children: Vec<CategoryNode>) -> Self {
        Self {
            kind: NodeKind::Category,
            raw_name_key: key.to_string(),
            localized_name: key.to_string(),
            style: Some(style.to_string()),
            children,
        }
    }

    pub fn separator() -> Self {
        Self {
            kind: NodeKind::Separator,
            raw_name_key: String::new(),
            localized_name: String::new(),
            style: None,
            children: Vec::new(),
        }
    }

    pub fn block_group(block_type: &str) -> Self {
        Self {
            kind: NodeKind::BlockGroup,
            raw_name_key: block_type.to_string(),
            localized_name: block_type.to_string(),
            style: None,
            children: Vec::new(),
        }
    }

    fn localized(&self, code: &LanguageCode) -> Self {
        let localized_name = language::translate(code, &self.raw_name_key)
            .map(str::to_string)
            .unwrap_or_else(|| self.localized_name.clone());
        Self {
            kind: self.kind,
            raw_name_key: self.raw_name_key.clone(),
            localized_name,
            style: self.style.clone(),
            children: self.children.iter().map(|c| c.localized(code)).collect(),
        }
    }

    fn visit<'a>(&'a self, out: &mut Vec<&'a CategoryNode>) {
        out.push(self);
        for child in &self.children {
            child.visit(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolboxSchema {
    pub nodes: Vec<CategoryNode>,
}

impl ToolboxSchema {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Depth-first, pre-order view over every node.
    pub fn flatten(&self) -> Vec<&CategoryNode> {
        let mut out = Vec::new();
        for node in &self.nodes {
            node.visit(&mut out);
        }
        out
    }

    pub fn find(&self, raw_name_key: &str) -> Option<&CategoryNode> {
        self.flatten()
            .into_iter()
            .find(|node| node.raw_name_key == raw_name_key)
    }
}

/// Copy of `schema` with every translatable `localized_name` replaced by its
/// translation under `code`. Nodes without a translation keep their name.
pub fn localize(schema: &ToolboxSchema, code: &LanguageCode) -> ToolboxSchema {
    ToolboxSchema {
        nodes: schema.nodes.iter().map(|node| node.localized(code)).collect(),
    }
}

/// The editor's built-in category tree.
pub fn basic_toolbox() -> ToolboxSchema {
    let group = |types: &[&str]| -> Vec<CategoryNode> {
        types.iter().map(|t| CategoryNode::block_group(t)).collect()
    };
    ToolboxSchema {
        nodes: vec![
            CategoryNode::category(
                "CAT_LOGIC",
                "logic_category",
                group(&[
                    "controls_if",
                    "logic_compare",
                    "logic_operation",
                    "logic_negate",
                    "logic_boolean",
                ]),
            ),
            CategoryNode::category(
                "CAT_LOOPS",
                "loop_category",
                group(&[
                    "controls_repeat_ext",
                    "controls_whileUntil",
                    "controls_for",
                    "controls_flow_statements",
                ]),
            ),
            CategoryNode::category(
                "CAT_MATHS",
                "math_category",
                group(&["math_number", "math_arithmetic", "math_single", "math_random_int"]),
            ),
            CategoryNode::category(
                "CAT_TEXT",
                "text_category",
                group(&["text", "text_join", "text_length", "text_print"]),
            ),
            CategoryNode::category(
                "CAT_LISTS",
                "list_category",
                group(&["lists_create_with", "lists_length", "lists_getIndex"]),
            ),
            CategoryNode::category(
                "CAT_COLOR",
                "colour_category",
                group(&["colour_picker", "colour_random", "colour_rgb"]),
            ),
            CategoryNode::separator(),
            CategoryNode::category("CAT_VARIABLES", "variable_category", Vec::new()),
            CategoryNode::category("CAT_FUNCTIONS", "procedure_category", Vec::new()),
        ],
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/toolbox.rs"]
mod tests;
