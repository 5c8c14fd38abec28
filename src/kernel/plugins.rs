use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;

use super::services::ports::{CapabilityToken, WorkspaceInstance};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginId {
    Minimap,
    KeyboardNav,
    ContentHighlight,
    WorkspaceSearch,
    ZoomToFit,
    Backpack,
    ContinuousFlyout,
}

impl PluginId {
    pub const ALL: [PluginId; 7] = [
        PluginId::Minimap,
        PluginId::KeyboardNav,
        PluginId::ContentHighlight,
        PluginId::WorkspaceSearch,
        PluginId::ZoomToFit,
        PluginId::Backpack,
        PluginId::ContinuousFlyout,
    ];

    /// Token used in the `options` query parameter.
    pub fn url_token(self) -> &'static str {
        match self {
            Self::Minimap => "minimap",
            Self::KeyboardNav => "keybnav",
            Self::ContentHighlight => "highlight",
            Self::WorkspaceSearch => "search",
            Self::ZoomToFit => "zoomfit",
            Self::Backpack => "backpack",
            Self::ContinuousFlyout => "cflyout",
        }
    }

    /// Session storage key of the per-plugin flag.
    pub fn storage_key(self) -> &'static str {
        match self {
            Self::Minimap => "pluginMinimap",
            Self::KeyboardNav => "pluginKeyboardNav",
            Self::ContentHighlight => "pluginHighlight",
            Self::WorkspaceSearch => "pluginWorkspaceSearch",
            Self::ZoomToFit => "pluginZoomToFit",
            Self::Backpack => "pluginBackpack",
            Self::ContinuousFlyout => "pluginContinuousToolboxFlyout",
        }
    }

    pub fn from_url_token(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|id| id.url_token().eq_ignore_ascii_case(token.trim()))
    }

    /// Stateful plugins hold per-instance state and must not be initialized
    /// twice on the same workspace.
    pub fn is_stateful(self) -> bool {
        !matches!(self, Self::ZoomToFit)
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url_token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PluginError {
    #[error("plugin already active: {0}")]
    AlreadyActive(PluginId),
    #[error("plugin not registered: {0}")]
    NotRegistered(PluginId),
    #[error("plugin already registered: {0}")]
    AlreadyRegistered(PluginId),
}

/// Opaque value returned by [`Plugin::init`] and handed back to
/// [`Plugin::dispose`].
pub struct CapabilityHandle(Box<dyn Any>);

impl CapabilityHandle {
    pub fn new<T: Any>(value: T) -> Self {
        Self(Box::new(value))
    }

    pub fn empty() -> Self {
        Self::new(())
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    pub fn into_inner<T: Any>(self) -> Option<T> {
        self.0.downcast::<T>().ok().map(|boxed| *boxed)
    }
}

impl fmt::Debug for CapabilityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CapabilityHandle(..)")
    }
}

/// Init/dispose contract of an optional workspace capability.
pub trait Plugin<W: ?Sized> {
    fn id(&self) -> PluginId;

    fn is_stateful(&self) -> bool {
        self.id().is_stateful()
    }

    fn init(&mut self, workspace: &mut W) -> CapabilityHandle;

    fn dispose(&mut self, workspace: &mut W, handle: CapabilityHandle);
}

struct PluginEntry<W: ?Sized> {
    plugin: Box<dyn Plugin<W>>,
    handle: Option<CapabilityHandle>,
}

/// Keyed set of plugin descriptors plus the activation state of each one
/// against the current workspace instance.
pub struct PluginRegistry<W: ?Sized> {
    by_id: FxHashMap<PluginId, PluginEntry<W>>,
    order: Vec<PluginId>,
}

impl<W: ?Sized> Default for PluginRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: ?Sized> PluginRegistry<W> {
    pub fn new() -> Self {
        Self {
            by_id: FxHashMap::default(),
            order: Vec::new(),
        }
    }

    pub fn register(&mut self, plugin: Box<dyn Plugin<W>>) -> Result<(), PluginError> {
        let id = plugin.id();
        if self.by_id.contains_key(&id) {
            return Err(PluginError::AlreadyRegistered(id));
        }
        self.order.push(id);
        self.by_id.insert(
            id,
            PluginEntry {
                plugin,
                handle: None,
            },
        );
        Ok(())
    }

    pub fn is_registered(&self, id: PluginId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn is_active(&self, id: PluginId) -> bool {
        self.by_id
            .get(&id)
            .is_some_and(|entry| entry.handle.is_some())
    }

    /// Active plugins in registration order.
    pub fn active_ids(&self) -> Vec<PluginId> {
        self.order
            .iter()
            .copied()
            .filter(|id| self.is_active(*id))
            .collect()
    }

    pub fn activate(&mut self, id: PluginId, workspace: &mut W) -> Result<(), PluginError> {
        let entry = self
            .by_id
            .get_mut(&id)
            .ok_or(PluginError::NotRegistered(id))?;

        if entry.handle.is_some() {
            if entry.plugin.is_stateful() {
                return Err(PluginError::AlreadyActive(id));
            }
            return Ok(());
        }

        entry.handle = Some(entry.plugin.init(workspace));
        tracing::debug!(plugin = %id, "plugin activated");
        Ok(())
    }

    /// Disposes the plugin if it is active; returns whether anything ran.
    pub fn deactivate(&mut self, id: PluginId, workspace: &mut W) -> bool {
        let Some(entry) = self.by_id.get_mut(&id) else {
            return false;
        };
        let Some(handle) = entry.handle.take() else {
            return false;
        };
        entry.plugin.dispose(workspace, handle);
        tracing::debug!(plugin = %id, "plugin deactivated");
        true
    }

    pub fn teardown_all(&mut self, workspace: &mut W) -> usize {
        let order = self.order.clone();
        order
            .into_iter()
            .filter(|id| self.deactivate(*id, workspace))
            .count()
    }

    /// Activates every plugin of `enabled` that is not active yet, in
    /// registration order. Ids without a descriptor are skipped.
    pub fn restore_all(&mut self, workspace: &mut W, enabled: &BTreeSet<PluginId>) -> usize {
        for id in enabled {
            if !self.is_registered(*id) {
                tracing::warn!(plugin = %id, "enabled plugin has no descriptor");
            }
        }

        let order = self.order.clone();
        let mut activated = 0;
        for id in order {
            if !enabled.contains(&id) || self.is_active(id) {
                continue;
            }
            if self.activate(id, workspace).is_ok() {
                activated += 1;
            }
        }
        activated
    }
}

impl<W: WorkspaceInstance> PluginRegistry<W> {
    /// Registry holding a [`ToolkitPlugin`] for every known plugin id.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for id in PluginId::ALL {
            // ids are unique, registration cannot fail
            let _ = registry.register(Box::new(ToolkitPlugin::new(id)));
        }
        registry
    }
}

/// Plugin backed by a capability of the toolkit itself.
///
/// The minimap additionally owns the visibility of its overlay container.
#[derive(Debug, Clone, Copy)]
pub struct ToolkitPlugin {
    id: PluginId,
}

impl ToolkitPlugin {
    pub fn new(id: PluginId) -> Self {
        Self { id }
    }

    fn has_overlay(&self) -> bool {
        self.id == PluginId::Minimap
    }
}

impl<W: WorkspaceInstance> Plugin<W> for ToolkitPlugin {
    fn id(&self) -> PluginId {
        self.id
    }

    fn init(&mut self, workspace: &mut W) -> CapabilityHandle {
        let token = workspace.enable_capability(self.id);
        if self.has_overlay() {
            workspace.set_overlay_visible(self.id, true);
        }
        CapabilityHandle::new(token)
    }

    fn dispose(&mut self, workspace: &mut W, handle: CapabilityHandle) {
        if self.has_overlay() {
            workspace.set_overlay_visible(self.id, false);
        }
        if let Some(token) = handle.into_inner::<CapabilityToken>() {
            workspace.disable_capability(token);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/plugins.rs"]
mod tests;
