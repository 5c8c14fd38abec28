//! Headless toolkit: a workspace that keeps its block graph in memory.
//!
//! Used by the demo binary and by tests; it fires the same kind of change
//! events a rendering toolkit fires, honours event suppression and keeps
//! track of capabilities attached by plugins.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::kernel::plugins::PluginId;
use crate::kernel::services::ports::{
    CapabilityToken, EventKind, SnapshotError, Toolkit, WorkspaceEvent, WorkspaceInstance,
    WorkspaceOptions,
};
use crate::kernel::state::{ThemeId, ToolboxMode};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    #[serde(rename = "type")]
    pub block_type: String,
    #[serde(default)]
    pub x: i32,
    #[serde(default)]
    pub y: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inputs: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

/// Serialized form of a headless workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockGraph {
    #[serde(default)]
    pub blocks: BTreeMap<String, Block>,
}

impl BlockGraph {
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// `(parent, slot, child)` triples, `slot` being `next` or an input name.
    pub fn connections(&self) -> Vec<(String, String, String)> {
        let mut out = Vec::new();
        for (id, block) in &self.blocks {
            if let Some(next) = &block.next {
                out.push((id.clone(), "next".to_string(), next.clone()));
            }
            for (input, child) in &block.inputs {
                out.push((id.clone(), input.clone(), child.clone()));
            }
        }
        out
    }

    pub fn top_blocks(&self) -> Vec<&str> {
        let children: BTreeSet<&str> = self
            .blocks
            .values()
            .flat_map(|b| b.next.iter().chain(b.inputs.values()))
            .map(String::as_str)
            .collect();
        self.blocks
            .keys()
            .map(String::as_str)
            .filter(|id| !children.contains(id))
            .collect()
    }

    fn validate(&self) -> Result<(), SnapshotError> {
        for (id, block) in &self.blocks {
            for child in block.next.iter().chain(block.inputs.values()) {
                if !self.blocks.contains_key(child) {
                    return Err(SnapshotError::Malformed(format!(
                        "block {id} points at missing block {child}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn render(&self, id: &str, depth: usize, seen: &mut BTreeSet<String>, out: &mut String) {
        let mut cursor = Some(id.to_string());
        while let Some(id) = cursor.take() {
            if !seen.insert(id.clone()) {
                return;
            }
            let Some(block) = self.blocks.get(&id) else {
                return;
            };
            let fields: Vec<String> = block
                .fields
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            out.push_str(&"  ".repeat(depth));
            out.push_str(&block.block_type);
            out.push('(');
            out.push_str(&fields.join(", "));
            out.push_str(")\n");
            for child in block.inputs.values() {
                self.render(child, depth + 1, seen, out);
            }
            cursor = block.next.clone();
        }
    }
}

#[derive(Debug, Default)]
struct ToolkitLog {
    created: usize,
    disposed: usize,
    last_options: Option<WorkspaceOptions>,
}

#[derive(Debug, Clone)]
pub struct HeadlessToolkit {
    log: Rc<RefCell<ToolkitLog>>,
    theme_swap: bool,
}

impl HeadlessToolkit {
    pub fn new() -> Self {
        Self {
            log: Rc::new(RefCell::new(ToolkitLog::default())),
            theme_swap: true,
        }
    }

    /// Toolkit whose workspaces cannot change theme in place.
    pub fn without_theme_swap() -> Self {
        Self {
            theme_swap: false,
            ..Self::new()
        }
    }

    pub fn created_count(&self) -> usize {
        self.log.borrow().created
    }

    pub fn disposed_count(&self) -> usize {
        self.log.borrow().disposed
    }

    pub fn live_count(&self) -> usize {
        let log = self.log.borrow();
        log.created - log.disposed
    }

    pub fn last_options(&self) -> Option<WorkspaceOptions> {
        self.log.borrow().last_options.clone()
    }
}

impl Default for HeadlessToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl Toolkit for HeadlessToolkit {
    type Instance = HeadlessWorkspace;

    fn create(&mut self, options: &WorkspaceOptions) -> HeadlessWorkspace {
        let generation = {
            let mut log = self.log.borrow_mut();
            log.created += 1;
            log.last_options = Some(options.clone());
            log.created as u64
        };
        HeadlessWorkspace {
            generation,
            options: options.clone(),
            graph: BlockGraph::default(),
            events: Vec::new(),
            events_enabled: true,
            change_count: 0,
            dragging: false,
            theme_swap: self.theme_swap,
            toolbox_mode: None,
            centered: false,
            capabilities: BTreeMap::new(),
            next_token: 0,
            overlays: BTreeSet::new(),
            next_block: 0,
            log: Rc::clone(&self.log),
        }
    }
}

#[derive(Debug)]
pub struct HeadlessWorkspace {
    generation: u64,
    options: WorkspaceOptions,
    graph: BlockGraph,
    events: Vec<WorkspaceEvent>,
    events_enabled: bool,
    change_count: u64,
    dragging: bool,
    theme_swap: bool,
    toolbox_mode: Option<ToolboxMode>,
    centered: bool,
    capabilities: BTreeMap<CapabilityToken, PluginId>,
    next_token: u64,
    overlays: BTreeSet<PluginId>,
    next_block: u64,
    log: Rc<RefCell<ToolkitLog>>,
}

impl HeadlessWorkspace {
    /// Creation order of this instance within its toolkit, starting at 1.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn options(&self) -> &WorkspaceOptions {
        &self.options
    }

    pub fn graph(&self) -> &BlockGraph {
        &self.graph
    }

    pub fn add_block(&mut self, block_type: &str) -> String {
        let id = loop {
            self.next_block += 1;
            let id = format!("b{}", self.next_block);
            if !self.graph.blocks.contains_key(&id) {
                break id;
            }
        };
        self.graph.blocks.insert(
            id.clone(),
            Block {
                block_type: block_type.to_string(),
                x: 0,
                y: 0,
                next: None,
                inputs: BTreeMap::new(),
                fields: BTreeMap::new(),
            },
        );
        self.content_changed(EventKind::BlockCreate, &id);
        id
    }

    pub fn connect_next(&mut self, parent: &str, child: &str) -> bool {
        if !self.graph.blocks.contains_key(child) {
            return false;
        }
        let Some(block) = self.graph.blocks.get_mut(parent) else {
            return false;
        };
        block.next = Some(child.to_string());
        self.content_changed(EventKind::BlockMove, child);
        true
    }

    pub fn connect_input(&mut self, parent: &str, input: &str, child: &str) -> bool {
        if !self.graph.blocks.contains_key(child) {
            return false;
        }
        let Some(block) = self.graph.blocks.get_mut(parent) else {
            return false;
        };
        block.inputs.insert(input.to_string(), child.to_string());
        self.content_changed(EventKind::BlockMove, child);
        true
    }

    pub fn set_field(&mut self, id: &str, name: &str, value: &str) -> bool {
        let Some(block) = self.graph.blocks.get_mut(id) else {
            return false;
        };
        block.fields.insert(name.to_string(), value.to_string());
        self.content_changed(EventKind::BlockChange, id);
        true
    }

    pub fn move_block(&mut self, id: &str, x: i32, y: i32) -> bool {
        let Some(block) = self.graph.blocks.get_mut(id) else {
            return false;
        };
        block.x = x;
        block.y = y;
        self.content_changed(EventKind::BlockMove, id);
        true
    }

    pub fn delete_block(&mut self, id: &str) -> bool {
        if self.graph.blocks.remove(id).is_none() {
            return false;
        }
        for block in self.graph.blocks.values_mut() {
            if block.next.as_deref() == Some(id) {
                block.next = None;
            }
            block.inputs.retain(|_, child| child != id);
        }
        self.content_changed(EventKind::BlockDelete, id);
        true
    }

    /// Viewport pan; a UI-only change.
    pub fn scroll(&mut self) {
        self.centered = false;
        self.fire(WorkspaceEvent::new(EventKind::ViewportChange));
    }

    pub fn begin_drag(&mut self, id: &str) {
        self.dragging = true;
        self.fire(WorkspaceEvent::for_block(EventKind::DragStart, id));
    }

    /// Drops the dragged block; the drop itself is reported as a move.
    pub fn end_drag(&mut self, id: &str) {
        self.dragging = false;
        if self.graph.blocks.contains_key(id) {
            self.content_changed(EventKind::BlockMove, id);
        }
        self.fire(WorkspaceEvent::for_block(EventKind::DragStop, id));
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_capability_enabled(&self, id: PluginId) -> bool {
        self.capabilities.values().any(|cap| *cap == id)
    }

    pub fn capability_count(&self) -> usize {
        self.capabilities.len()
    }

    pub fn is_overlay_visible(&self, id: PluginId) -> bool {
        self.overlays.contains(&id)
    }

    /// Layout applied after creation, `None` until the session applies one.
    pub fn toolbox_mode(&self) -> Option<ToolboxMode> {
        self.toolbox_mode
    }

    pub fn is_centered(&self) -> bool {
        self.centered
    }

    pub fn theme(&self) -> &ThemeId {
        &self.options.theme
    }

    fn content_changed(&mut self, kind: EventKind, id: &str) {
        self.change_count += 1;
        self.fire(WorkspaceEvent::for_block(kind, id));
    }

    fn fire(&mut self, mut event: WorkspaceEvent) {
        if self.events_enabled {
            event.during_drag = self.dragging;
            self.events.push(event);
        }
    }
}

impl WorkspaceInstance for HeadlessWorkspace {
    fn save(&self) -> serde_json::Value {
        serde_json::to_value(&self.graph).unwrap_or_default()
    }

    fn load(&mut self, snapshot: &serde_json::Value) -> Result<(), SnapshotError> {
        let graph: BlockGraph = serde_json::from_value(snapshot.clone())
            .map_err(|err| SnapshotError::Malformed(err.to_string()))?;
        graph.validate()?;

        let ids: Vec<String> = graph.blocks.keys().cloned().collect();
        self.graph = graph;
        for id in ids {
            self.content_changed(EventKind::BlockCreate, &id);
        }
        self.fire(WorkspaceEvent::new(EventKind::FinishedLoading));
        Ok(())
    }

    fn set_events_enabled(&mut self, enabled: bool) {
        self.events_enabled = enabled;
    }

    fn take_events(&mut self) -> Vec<WorkspaceEvent> {
        std::mem::take(&mut self.events)
    }

    fn change_count(&self) -> u64 {
        self.change_count
    }

    fn supports_theme_swap(&self) -> bool {
        self.theme_swap
    }

    fn set_theme(&mut self, theme: &ThemeId) {
        self.options.theme = theme.clone();
        self.fire(WorkspaceEvent::new(EventKind::ThemeChange));
    }

    fn apply_toolbox_mode(&mut self, mode: ToolboxMode) {
        self.toolbox_mode = Some(mode);
    }

    fn scroll_center(&mut self) {
        self.centered = true;
    }

    fn generate_code(&self) -> String {
        let mut out = String::new();
        let mut seen = BTreeSet::new();
        for id in self.graph.top_blocks() {
            self.graph.render(id, 0, &mut seen, &mut out);
        }
        out
    }

    fn enable_capability(&mut self, id: PluginId) -> CapabilityToken {
        self.next_token += 1;
        let token = CapabilityToken(self.next_token);
        self.capabilities.insert(token, id);
        token
    }

    fn disable_capability(&mut self, token: CapabilityToken) {
        self.capabilities.remove(&token);
    }

    fn set_overlay_visible(&mut self, id: PluginId, visible: bool) {
        if visible {
            self.overlays.insert(id);
        } else {
            self.overlays.remove(&id);
        }
    }

    fn dispose(self) {
        self.log.borrow_mut().disposed += 1;
    }
}

#[cfg(test)]
#[path = "../../../../tests/unit/kernel/services/adapters/headless.rs"]
mod tests;
