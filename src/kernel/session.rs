//! Session lifecycle: owns the single live workspace and runs its
//! teardown/recreation cycle whenever configuration invalidates it.
//!
//! Reboot order, each step a precondition for the next:
//! snapshot, plugin teardown, dispose, create, plugin restore, snapshot load
//! (events suppressed), layout affordances, listeners back on.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use super::action::{Action, LanguageSource};
use super::effect::Effect;
use super::error::SessionError;
use super::gate::{Phase, RebootGate};
use super::language::{self, LanguageCode, DEFAULT_LANGUAGE};
use super::persistence::{OptionSet, PersistenceBridge};
use super::plugins::{PluginId, PluginRegistry};
use super::services::ports::{
    CodePreview, ConfigField, ControlPanel, EventKind, PageLocation, SessionStorage, Settings,
    Toolkit, WorkspaceEvent, WorkspaceInstance, WorkspaceOptions,
};
use super::state::{
    ConfigPatch, PanelLayout, RendererId, SessionConfig, ThemeId, ToolboxMode, DEFAULT_RENDERER,
    DEFAULT_THEME,
};
use super::store::ConfigStore;
use super::toolbox::{self, ToolboxSchema};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

/// Page-side collaborators handed to the session at boot.
pub struct SessionServices {
    pub storage: Box<dyn SessionStorage>,
    pub location: Box<dyn PageLocation>,
    pub controls: Box<dyn ControlPanel>,
    pub preview: Box<dyn CodePreview>,
}

pub struct SessionManager<T: Toolkit> {
    toolkit: T,
    settings: Settings,
    store: ConfigStore,
    bridge: PersistenceBridge,
    controls: Box<dyn ControlPanel>,
    preview: Box<dyn CodePreview>,
    plugins: PluginRegistry<T::Instance>,
    canonical_toolbox: ToolboxSchema,
    toolbox: ToolboxSchema,
    workspace: Option<T::Instance>,
    gate: RebootGate,
    saved_change_count: Option<u64>,
    listening: bool,
    effects: Vec<Effect>,
}

impl<T: Toolkit> SessionManager<T> {
    /// Boots with every built-in plugin and the basic toolbox.
    pub fn boot(toolkit: T, services: SessionServices, settings: Settings) -> Self {
        Self::boot_with(
            toolkit,
            services,
            settings,
            PluginRegistry::with_builtin(),
            toolbox::basic_toolbox(),
        )
    }

    pub fn boot_with(
        toolkit: T,
        services: SessionServices,
        settings: Settings,
        plugins: PluginRegistry<T::Instance>,
        canonical_toolbox: ToolboxSchema,
    ) -> Self {
        let SessionServices {
            storage,
            location,
            controls,
            preview,
        } = services;

        let mut manager = Self {
            toolkit,
            settings,
            store: ConfigStore::default(),
            bridge: PersistenceBridge::new(storage, location),
            controls,
            preview,
            plugins,
            toolbox: canonical_toolbox.clone(),
            canonical_toolbox,
            workspace: None,
            gate: RebootGate::new(),
            saved_change_count: None,
            listening: false,
            effects: Vec::new(),
        };

        manager.bridge.begin_url_batch();
        let language = LanguageCode::new(manager.sync_scalar(ConfigField::Language, None));
        let theme = ThemeId::new(manager.sync_scalar(ConfigField::Theme, None));
        let renderer = RendererId::new(manager.sync_scalar(ConfigField::Renderer, None));
        let fallback = manager.default_options();
        let options = manager.bridge.sync_options(None, &*manager.controls, &fallback);
        manager.bridge.commit_url_batch();
        manager.store = ConfigStore::new(SessionConfig::new(
            language,
            theme,
            renderer,
            options.plugins(),
            options.toolbox_mode(),
            options.code_editor(),
        ));

        let instance = manager.create_instance();
        manager.install(instance);
        manager.publish_code();

        manager.push_language_effects();
        manager.push_control_effects();
        let layout = manager.bridge.read_panel_layout();
        if !layout.is_empty() {
            manager.effects.push(Effect::RestorePanelLayout(layout));
        }
        let code_editor = manager.config().code_editor();
        manager.effects.push(Effect::ShowCodeEditor(code_editor));

        let config = manager.config();
        info!(
            language = %config.language(),
            theme = %config.theme(),
            renderer = %config.renderer(),
            options = %OptionSet::from_config(config).to_param(),
            "session booted"
        );
        manager
    }

    pub fn config(&self) -> &SessionConfig {
        self.store.get()
    }

    pub fn workspace(&self) -> Option<&T::Instance> {
        self.workspace.as_ref()
    }

    /// Live instance, for the embedder's own edits. Borrow it only between
    /// session calls; change events it queues are handled by
    /// [`SessionManager::process_events`].
    pub fn workspace_mut(&mut self) -> Option<&mut T::Instance> {
        self.workspace.as_mut()
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn toolbox(&self) -> &ToolboxSchema {
        &self.toolbox
    }

    pub fn plugins(&self) -> &PluginRegistry<T::Instance> {
        &self.plugins
    }

    pub fn phase(&self) -> Phase {
        self.gate.phase()
    }

    pub fn gate(&self) -> RebootGate {
        self.gate.clone()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Drains effects queued since the last call.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn dispatch(&mut self, action: Action) -> Result<DispatchResult, SessionError> {
        debug!(?action, "dispatch");
        let state_changed = match action {
            Action::ChangeLanguage(source) => self.change_language(source)?,
            Action::ChangeTheme(choice) => self.change_theme(choice.as_deref())?,
            Action::ChangeRenderer(choice) => self.change_renderer(choice.as_deref())?,
            Action::SetToolboxMode(mode) => self.set_toolbox_mode(mode)?,
            Action::TogglePlugin { id, enabled } => self.toggle_plugin(id, enabled)?,
            Action::SetCodeEditor(enabled) => self.set_code_editor(enabled)?,
            Action::Reboot => {
                self.reboot()?;
                true
            }
            Action::WorkspaceChanged => {
                self.gate.check()?;
                self.process_events() > 0
            }
            Action::HistoryNavigated => self.on_history_navigation()?,
            Action::Unload(layout) => {
                self.on_unload(layout)?;
                true
            }
        };
        Ok(DispatchResult {
            effects: self.take_effects(),
            state_changed,
        })
    }

    // --- lifecycle ---

    pub fn reboot(&mut self) -> Result<(), SessionError> {
        self.process_events();
        let _guard = self.gate.enter()?;
        let mut old = self.workspace.take().ok_or(SessionError::NoWorkspace)?;

        self.save_if_changed(&old);
        self.listening = false;
        let torn_down = self.plugins.teardown_all(&mut old);
        old.dispose();

        let instance = self.create_instance();
        self.install(instance);

        let config = self.store.get();
        info!(
            language = %config.language(),
            theme = %config.theme(),
            renderer = %config.renderer(),
            plugins = torn_down,
            "workspace rebooted"
        );
        Ok(())
    }

    /// Final save before the page goes away. Every later request fails with
    /// [`SessionError::Unloaded`].
    pub fn on_unload(&mut self, layout: PanelLayout) -> Result<(), SessionError> {
        self.gate.check()?;
        self.process_events();
        self.listening = false;
        if let Some(mut instance) = self.workspace.take() {
            self.save_if_changed(&instance);
            self.plugins.teardown_all(&mut instance);
            instance.dispose();
        }
        self.bridge.write_panel_layout(&layout);
        self.gate.close();
        info!("session unloaded");
        Ok(())
    }

    // --- setters ---

    pub fn change_language(&mut self, source: LanguageSource) -> Result<bool, SessionError> {
        self.gate.check()?;
        let explicit = match source {
            LanguageSource::Menu => self.controls.value(ConfigField::Language),
            LanguageSource::Url => self.bridge.read_url(ConfigField::Language.url_param()),
        };
        let value = self.sync_scalar(ConfigField::Language, explicit.as_deref());
        self.push_sync_effect(ConfigField::Language, value.clone());

        let language = LanguageCode::new(&value);
        if &language == self.config().language() {
            return Ok(false);
        }
        self.store.set(ConfigPatch::language(language));
        self.push_language_effects();
        self.reboot()?;
        Ok(true)
    }

    /// Hot-swaps the theme when the live instance can, reboots otherwise.
    pub fn change_theme(&mut self, choice: Option<&str>) -> Result<bool, SessionError> {
        self.gate.check()?;
        let explicit = choice
            .map(str::to_string)
            .or_else(|| self.controls.value(ConfigField::Theme));
        let value = self.sync_scalar(ConfigField::Theme, explicit.as_deref());
        self.push_sync_effect(ConfigField::Theme, value.clone());

        let theme = ThemeId::new(&value);
        if &theme == self.config().theme() {
            return Ok(false);
        }
        self.store.set(ConfigPatch::theme(theme.clone()));
        self.apply_theme(&theme)?;
        Ok(true)
    }

    pub fn change_renderer(&mut self, choice: Option<&str>) -> Result<bool, SessionError> {
        self.gate.check()?;
        let explicit = choice
            .map(str::to_string)
            .or_else(|| self.controls.value(ConfigField::Renderer));
        let value = self.sync_scalar(ConfigField::Renderer, explicit.as_deref());
        self.push_sync_effect(ConfigField::Renderer, value.clone());

        let renderer = RendererId::new(&value);
        if &renderer == self.config().renderer() {
            return Ok(false);
        }
        self.store.set(ConfigPatch::renderer(renderer));
        self.reboot()?;
        Ok(true)
    }

    pub fn set_toolbox_mode(&mut self, mode: ToolboxMode) -> Result<bool, SessionError> {
        self.gate.check()?;
        if mode == self.config().toolbox_mode() {
            return Ok(false);
        }
        self.store.set(ConfigPatch::toolbox_mode(mode));
        self.write_options();
        self.reboot()?;
        Ok(true)
    }

    /// Activates or deactivates a plugin on the live instance; no reboot.
    pub fn toggle_plugin(&mut self, id: PluginId, enabled: bool) -> Result<bool, SessionError> {
        self.gate.check()?;
        let instance = self.workspace.as_mut().ok_or(SessionError::NoWorkspace)?;
        if enabled {
            self.plugins.activate(id, instance)?;
        } else {
            self.plugins.deactivate(id, instance);
        }

        let mut plugins = self.config().enabled_plugins().clone();
        let changed = if enabled {
            plugins.insert(id)
        } else {
            plugins.remove(&id)
        };
        self.store.set(ConfigPatch::enabled_plugins(plugins));
        self.write_options();
        Ok(changed)
    }

    pub fn set_code_editor(&mut self, enabled: bool) -> Result<bool, SessionError> {
        self.gate.check()?;
        if enabled == self.config().code_editor() {
            return Ok(false);
        }
        self.store.set(ConfigPatch::code_editor(enabled));
        self.write_options();
        self.effects.push(Effect::ShowCodeEditor(enabled));
        Ok(true)
    }

    /// Back/forward navigation: re-resolves every field from the URL and
    /// applies whatever differs, rebooting at most once.
    pub fn on_history_navigation(&mut self) -> Result<bool, SessionError> {
        self.gate.check()?;
        let current = self.config().clone();

        // write-backs for fields the entry lacks go out as one history entry
        self.bridge.begin_url_batch();
        let language = LanguageCode::new(self.sync_scalar(ConfigField::Language, None));
        let theme = ThemeId::new(self.sync_scalar(ConfigField::Theme, None));
        let renderer = RendererId::new(self.sync_scalar(ConfigField::Renderer, None));
        let fallback = self.default_options();
        let options = self.bridge.sync_options(None, &*self.controls, &fallback);
        self.bridge.commit_url_batch();
        let plugins = options.plugins();

        let language_changed = &language != current.language();
        let theme_changed = &theme != current.theme();
        let renderer_changed = &renderer != current.renderer();
        let mode_changed = options.toolbox_mode() != current.toolbox_mode();
        let plugins_changed = &plugins != current.enabled_plugins();
        let editor_changed = options.code_editor() != current.code_editor();
        if !(language_changed
            || theme_changed
            || renderer_changed
            || mode_changed
            || plugins_changed
            || editor_changed)
        {
            return Ok(false);
        }

        self.store.set(ConfigPatch {
            language: Some(language),
            theme: Some(theme.clone()),
            renderer: Some(renderer),
            enabled_plugins: Some(plugins.clone()),
            toolbox_mode: Some(options.toolbox_mode()),
            code_editor: Some(options.code_editor()),
        });
        self.push_control_effects();
        if language_changed {
            self.push_language_effects();
        }
        if editor_changed {
            self.effects.push(Effect::ShowCodeEditor(options.code_editor()));
        }

        if language_changed || renderer_changed || mode_changed {
            // the fresh instance picks up the new plugin set and theme
            self.reboot()?;
        } else {
            if plugins_changed {
                self.apply_plugin_diff(current.enabled_plugins(), &plugins);
            }
            if theme_changed {
                self.apply_theme(&theme)?;
            }
        }
        info!(search = %self.bridge.search(), "configuration restored from history");
        Ok(true)
    }

    // --- steady-state listeners ---

    /// Runs the change listeners over one event. Returns whether the event
    /// counted as a content change.
    pub fn handle_workspace_event(&mut self, event: &WorkspaceEvent) -> bool {
        if !self.listening || event.is_ui() {
            return false;
        }
        let Some(instance) = self.workspace.as_ref() else {
            return false;
        };

        let snapshot = instance.save();
        self.saved_change_count = Some(instance.change_count());
        self.bridge.save_snapshot(&self.settings.storage_key, &snapshot);

        if event.kind != EventKind::FinishedLoading && !event.during_drag {
            let code = instance.generate_code();
            self.preview.publish(&code);
        }
        true
    }

    /// Drains the live instance's event queue through the listeners.
    pub fn process_events(&mut self) -> usize {
        let events = match self.workspace.as_mut() {
            Some(instance) => instance.take_events(),
            None => return 0,
        };
        events
            .iter()
            .filter(|event| self.handle_workspace_event(event))
            .count()
    }

    // --- internals ---

    fn create_instance(&mut self) -> T::Instance {
        self.toolbox = toolbox::localize(&self.canonical_toolbox, self.store.get().language());
        let options = WorkspaceOptions::new(self.store.get(), self.toolbox.clone());
        self.toolkit.create(&options)
    }

    /// Plugin restore, snapshot load, affordances and listeners for a fresh
    /// instance, which then becomes the live one.
    fn install(&mut self, mut instance: T::Instance) {
        let enabled = self.store.get().enabled_plugins().clone();
        self.plugins.restore_all(&mut instance, &enabled);

        instance.set_events_enabled(false);
        if let Some(snapshot) = self.bridge.load_snapshot(&self.settings.storage_key) {
            if let Err(err) = instance.load(&snapshot) {
                warn!(error = %err, "stored workspace could not be loaded, starting empty");
            }
        }
        instance.set_events_enabled(true);
        self.saved_change_count = Some(instance.change_count());

        instance.apply_toolbox_mode(self.store.get().toolbox_mode());
        instance.scroll_center();

        let stale = instance.take_events();
        if !stale.is_empty() {
            debug!(count = stale.len(), "dropped events fired during setup");
        }
        self.workspace = Some(instance);
        self.listening = true;
    }

    fn save_if_changed(&mut self, instance: &T::Instance) {
        let count = instance.change_count();
        if self.saved_change_count == Some(count) {
            debug!("workspace unchanged since last snapshot");
            return;
        }
        let snapshot = instance.save();
        self.bridge.save_snapshot(&self.settings.storage_key, &snapshot);
        self.saved_change_count = Some(count);
    }

    fn publish_code(&mut self) {
        if let Some(instance) = self.workspace.as_ref() {
            let code = instance.generate_code();
            self.preview.publish(&code);
        }
    }

    fn apply_theme(&mut self, theme: &ThemeId) -> Result<(), SessionError> {
        let hot_swap = self
            .workspace
            .as_ref()
            .is_some_and(|instance| instance.supports_theme_swap());
        if !hot_swap {
            return self.reboot();
        }
        if let Some(instance) = self.workspace.as_mut() {
            instance.set_theme(theme);
            info!(theme = %theme, "theme swapped in place");
        }
        Ok(())
    }

    fn apply_plugin_diff(&mut self, before: &BTreeSet<PluginId>, after: &BTreeSet<PluginId>) {
        let Some(instance) = self.workspace.as_mut() else {
            return;
        };
        for id in before.difference(after) {
            self.plugins.deactivate(*id, instance);
        }
        for id in after.difference(before) {
            if let Err(err) = self.plugins.activate(*id, instance) {
                warn!(plugin = %id, error = %err, "plugin not restored");
            }
        }
    }

    /// Resolves a scalar field (explicit value, else URL, storage, control,
    /// default), replaces unknown values by the default and writes the result
    /// to URL and storage.
    fn sync_scalar(&mut self, field: ConfigField, explicit: Option<&str>) -> String {
        let raw = match explicit.filter(|value| !value.trim().is_empty()) {
            Some(value) => value.to_string(),
            None => self
                .bridge
                .resolve_field(field, &*self.controls)
                .unwrap_or_else(|| self.default_value(field)),
        };
        let value = self.validate(field, &raw);
        self.bridge
            .sync_field(field, Some(&value), &*self.controls, &value)
    }

    fn validate(&self, field: ConfigField, raw: &str) -> String {
        let raw = raw.trim();
        let known = match field {
            ConfigField::Language => LanguageCode::new(raw).is_supported(),
            ConfigField::Theme => self.settings.is_known_theme(raw),
            ConfigField::Renderer => self.settings.is_known_renderer(raw),
            ConfigField::Options => true,
        };
        if known {
            return match field {
                ConfigField::Language => LanguageCode::new(raw).to_string(),
                _ => raw.to_string(),
            };
        }
        let fallback = self.default_value(field);
        warn!(%field, value = raw, fallback = %fallback, "unknown value, using default");
        fallback
    }

    fn default_value(&self, field: ConfigField) -> String {
        let defaults = &self.settings.defaults;
        match field {
            ConfigField::Language => {
                let code = LanguageCode::new(&defaults.language);
                if code.is_supported() {
                    code.to_string()
                } else {
                    DEFAULT_LANGUAGE.to_string()
                }
            }
            ConfigField::Theme if self.settings.is_known_theme(&defaults.theme) => {
                defaults.theme.clone()
            }
            ConfigField::Theme => DEFAULT_THEME.to_string(),
            ConfigField::Renderer if self.settings.is_known_renderer(&defaults.renderer) => {
                defaults.renderer.clone()
            }
            ConfigField::Renderer => DEFAULT_RENDERER.to_string(),
            ConfigField::Options => self.default_options().to_param(),
        }
    }

    fn default_options(&self) -> OptionSet {
        OptionSet::from_tokens(&self.settings.defaults.options)
    }

    fn write_options(&mut self) {
        let options = OptionSet::from_config(self.store.get());
        self.bridge.write_options(&options);
        self.push_sync_effect(ConfigField::Options, options.to_param());
    }

    fn push_sync_effect(&mut self, field: ConfigField, value: String) {
        self.effects.push(Effect::SyncControl { field, value });
    }

    fn push_control_effects(&mut self) {
        let config = self.store.get();
        let values = [
            (ConfigField::Language, config.language().to_string()),
            (ConfigField::Theme, config.theme().to_string()),
            (ConfigField::Renderer, config.renderer().to_string()),
            (ConfigField::Options, OptionSet::from_config(config).to_param()),
        ];
        for (field, value) in values {
            self.push_sync_effect(field, value);
        }
    }

    fn push_language_effects(&mut self) {
        let config = self.store.get();
        let language = config.language().clone();
        let rtl = config.is_right_to_left();
        let labels = language::language_pack(&language)
            .map(|pack| pack.page_labels())
            .unwrap_or_default();
        self.effects.push(Effect::SetDocumentDirection { language, rtl });
        self.effects.push(Effect::TranslateLabels(labels));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/session.rs"]
mod tests;
