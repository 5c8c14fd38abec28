use super::*;
use crate::kernel::services::adapters::{HeadlessToolkit, HeadlessWorkspace};
use crate::kernel::services::ports::{Toolkit, WorkspaceOptions};
use crate::kernel::state::SessionConfig;
use crate::kernel::toolbox::ToolboxSchema;
use std::cell::RefCell;
use std::rc::Rc;

fn workspace() -> HeadlessWorkspace {
    let options = WorkspaceOptions::new(&SessionConfig::default(), ToolboxSchema::default());
    HeadlessToolkit::new().create(&options)
}

struct Recording {
    id: PluginId,
    log: Rc<RefCell<Vec<String>>>,
}

impl Plugin<HeadlessWorkspace> for Recording {
    fn id(&self) -> PluginId {
        self.id
    }

    fn init(&mut self, _workspace: &mut HeadlessWorkspace) -> CapabilityHandle {
        self.log.borrow_mut().push(format!("init {}", self.id));
        CapabilityHandle::new(self.id)
    }

    fn dispose(&mut self, _workspace: &mut HeadlessWorkspace, handle: CapabilityHandle) {
        assert_eq!(handle.into_inner::<PluginId>(), Some(self.id));
        self.log.borrow_mut().push(format!("dispose {}", self.id));
    }
}

fn recording_registry(
    ids: &[PluginId],
) -> (PluginRegistry<HeadlessWorkspace>, Rc<RefCell<Vec<String>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut registry = PluginRegistry::new();
    for id in ids {
        registry
            .register(Box::new(Recording {
                id: *id,
                log: Rc::clone(&log),
            }))
            .unwrap();
    }
    (registry, log)
}

#[test]
fn url_tokens_and_storage_keys_are_unique() {
    let tokens: BTreeSet<_> = PluginId::ALL.iter().map(|id| id.url_token()).collect();
    let keys: BTreeSet<_> = PluginId::ALL.iter().map(|id| id.storage_key()).collect();
    assert_eq!(tokens.len(), PluginId::ALL.len());
    assert_eq!(keys.len(), PluginId::ALL.len());

    assert_eq!(PluginId::from_url_token(" Minimap "), Some(PluginId::Minimap));
    assert_eq!(PluginId::from_url_token("keybnav"), Some(PluginId::KeyboardNav));
    assert_eq!(PluginId::from_url_token("ctoolbox"), None);
}

#[test]
fn activating_a_stateful_plugin_twice_is_rejected() {
    let mut registry = PluginRegistry::with_builtin();
    let mut ws = workspace();

    registry.activate(PluginId::Backpack, &mut ws).unwrap();
    assert_eq!(
        registry.activate(PluginId::Backpack, &mut ws),
        Err(PluginError::AlreadyActive(PluginId::Backpack))
    );
    assert_eq!(ws.capability_count(), 1);
}

#[test]
fn reactivating_a_stateless_plugin_is_a_no_op() {
    let mut registry = PluginRegistry::with_builtin();
    let mut ws = workspace();

    registry.activate(PluginId::ZoomToFit, &mut ws).unwrap();
    registry.activate(PluginId::ZoomToFit, &mut ws).unwrap();
    assert_eq!(ws.capability_count(), 1);
    assert!(registry.is_active(PluginId::ZoomToFit));
}

#[test]
fn unknown_plugin_is_not_registered() {
    let mut registry: PluginRegistry<HeadlessWorkspace> = PluginRegistry::new();
    let mut ws = workspace();
    assert_eq!(
        registry.activate(PluginId::Minimap, &mut ws),
        Err(PluginError::NotRegistered(PluginId::Minimap))
    );
}

#[test]
fn registering_the_same_id_twice_fails() {
    let (mut registry, log) = recording_registry(&[PluginId::Minimap]);
    let again = registry.register(Box::new(Recording {
        id: PluginId::Minimap,
        log,
    }));
    assert_eq!(again, Err(PluginError::AlreadyRegistered(PluginId::Minimap)));
}

#[test]
fn deactivating_an_inactive_plugin_does_nothing() {
    let (mut registry, log) = recording_registry(&[PluginId::Backpack]);
    let mut ws = workspace();

    assert!(!registry.deactivate(PluginId::Backpack, &mut ws));
    assert!(!registry.deactivate(PluginId::Minimap, &mut ws));
    assert!(log.borrow().is_empty());
}

#[test]
fn minimap_owns_its_overlay_visibility() {
    let mut registry = PluginRegistry::with_builtin();
    let mut ws = workspace();

    registry.activate(PluginId::Minimap, &mut ws).unwrap();
    assert!(ws.is_overlay_visible(PluginId::Minimap));
    assert!(ws.is_capability_enabled(PluginId::Minimap));

    assert!(registry.deactivate(PluginId::Minimap, &mut ws));
    assert!(!ws.is_overlay_visible(PluginId::Minimap));
    assert!(!ws.is_capability_enabled(PluginId::Minimap));
}

#[test]
fn teardown_runs_in_registration_order() {
    let (mut registry, log) = recording_registry(&[
        PluginId::Backpack,
        PluginId::Minimap,
        PluginId::WorkspaceSearch,
    ]);
    let mut ws = workspace();

    registry.activate(PluginId::WorkspaceSearch, &mut ws).unwrap();
    registry.activate(PluginId::Backpack, &mut ws).unwrap();
    log.borrow_mut().clear();

    assert_eq!(registry.teardown_all(&mut ws), 2);
    assert_eq!(
        *log.borrow(),
        vec!["dispose backpack".to_string(), "dispose search".to_string()]
    );
    assert!(registry.active_ids().is_empty());
}

#[test]
fn restore_activates_exactly_the_enabled_set() {
    let (mut registry, log) = recording_registry(&[
        PluginId::Minimap,
        PluginId::KeyboardNav,
        PluginId::Backpack,
    ]);
    let mut ws = workspace();
    registry.activate(PluginId::Backpack, &mut ws).unwrap();
    log.borrow_mut().clear();

    let enabled: BTreeSet<_> = [PluginId::Minimap, PluginId::Backpack, PluginId::ZoomToFit]
        .into_iter()
        .collect();
    assert_eq!(registry.restore_all(&mut ws, &enabled), 1);

    assert_eq!(*log.borrow(), vec!["init minimap".to_string()]);
    assert_eq!(
        registry.active_ids(),
        vec![PluginId::Minimap, PluginId::Backpack]
    );
}

#[test]
fn capability_handle_downcasts_to_its_value() {
    let handle = CapabilityHandle::new(42_u32);
    assert_eq!(handle.downcast_ref::<u32>(), Some(&42));
    assert!(handle.downcast_ref::<u64>().is_none());
    assert_eq!(handle.into_inner::<u32>(), Some(42));
    assert!(CapabilityHandle::empty().into_inner::<()>().is_some());
}
