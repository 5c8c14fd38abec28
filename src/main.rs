//! Replays an editor session against the headless toolkit.
//!
//! ```text
//! blockdesk [--query=?lang=fr&theme=dark] [--settings=path.json]
//!           [--log] [--log-filter=blockdesk=debug] [--log-dir=DIR] STEP...
//! ```
//!
//! Steps: `lang=CODE`, `theme=NAME`, `renderer=NAME`, `plugin=+ID` / `plugin=-ID`,
//! `toolbox=flat|tree`, `editor=on|off`, `add=BLOCK_TYPE`, `reboot`, `back`,
//! `forward`, `unload`.

use std::error::Error;
use std::path::PathBuf;

use blockdesk::kernel::services::adapters::{
    get_settings_path, load_settings_or_default, HeadlessToolkit, MemoryControls, MemoryLocation,
    MemoryPreview, MemoryStorage,
};
use blockdesk::kernel::services::ports::ConfigField;
use blockdesk::kernel::{
    Action, LanguageSource, OptionSet, PanelLayout, PluginId, SessionHandle, SessionManager,
    SessionServices, ToolboxMode,
};

mod logging;

struct Page {
    storage: MemoryStorage,
    location: MemoryLocation,
    controls: MemoryControls,
    preview: MemoryPreview,
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut query = String::new();
    let mut settings_path: Option<PathBuf> = None;
    let mut echo_log = false;
    let mut log_options = logging::LogOptions::default();
    let mut steps = Vec::new();

    for arg in std::env::args().skip(1) {
        if let Some(value) = arg.strip_prefix("--query=") {
            query = value.to_string();
        } else if let Some(value) = arg.strip_prefix("--settings=") {
            settings_path = Some(PathBuf::from(value));
        } else if arg == "--log" {
            echo_log = true;
        } else if let Some(value) = arg.strip_prefix("--log-filter=") {
            log_options.filter = Some(value.to_string());
        } else if let Some(value) = arg.strip_prefix("--log-dir=") {
            log_options.dir = Some(PathBuf::from(value));
        } else {
            steps.push(arg);
        }
    }

    let log_guard = logging::init(log_options);

    let settings_path = settings_path.unwrap_or_else(get_settings_path);
    let settings = load_settings_or_default(&settings_path)?;

    let page = Page {
        storage: MemoryStorage::new(),
        location: MemoryLocation::new(&query),
        controls: MemoryControls::from_defaults(&settings.defaults),
        preview: MemoryPreview::new(),
    };
    let services = SessionServices {
        storage: Box::new(page.storage.clone()),
        location: Box::new(page.location.clone()),
        controls: Box::new(page.controls.clone()),
        preview: Box::new(page.preview.clone()),
    };
    let manager = SessionManager::boot(HeadlessToolkit::new(), services, settings);
    let session = SessionHandle::new(manager);
    println!("boot          {}", page.location.current());

    for step in &steps {
        let Some(action) = parse_step(step, &page, &session)? else {
            continue;
        };
        let result = session.dispatch(action)?;
        println!(
            "{step:<14}{} changed={} effects={}",
            page.location.current(),
            result.state_changed,
            result.effects.len()
        );
    }

    print_summary(&page, &session)?;

    if echo_log {
        if let Some(guard) = &log_guard {
            println!("-- log ({}) --", guard.log_dir().display());
            for line in guard.tail().snapshot() {
                println!("{line}");
            }
        }
    }
    Ok(())
}

/// Turns one command line step into an action. Steps that act on the page
/// itself (menu values, history, edits) are applied here first.
fn parse_step(
    step: &str,
    page: &Page,
    session: &SessionHandle<HeadlessToolkit>,
) -> Result<Option<Action>, Box<dyn Error>> {
    let (name, value) = step.split_once('=').unwrap_or((step, ""));
    let action = match name {
        "lang" => {
            page.controls.set(ConfigField::Language, value);
            Action::ChangeLanguage(LanguageSource::Menu)
        }
        "theme" => Action::ChangeTheme(Some(value.to_string())),
        "renderer" => Action::ChangeRenderer(Some(value.to_string())),
        "plugin" => {
            let (enabled, token) = match value.strip_prefix('-') {
                Some(token) => (false, token),
                None => (true, value.trim_start_matches('+')),
            };
            let id = PluginId::from_url_token(token)
                .ok_or_else(|| format!("unknown plugin `{token}`"))?;
            Action::TogglePlugin { id, enabled }
        }
        "toolbox" => match value {
            "flat" => Action::SetToolboxMode(ToolboxMode::Flat),
            "tree" => Action::SetToolboxMode(ToolboxMode::CategoryTree),
            other => return Err(format!("unknown toolbox mode `{other}`").into()),
        },
        "editor" => Action::SetCodeEditor(matches!(value, "on" | "true" | "1")),
        "add" => {
            session.with_mut(|manager| {
                if let Some(workspace) = manager.workspace_mut() {
                    workspace.add_block(value);
                }
            })?;
            Action::WorkspaceChanged
        }
        "reboot" => Action::Reboot,
        "back" => {
            if !page.location.back() {
                println!("{step:<14}(no earlier entry)");
                return Ok(None);
            }
            Action::HistoryNavigated
        }
        "forward" => {
            if !page.location.forward() {
                println!("{step:<14}(no later entry)");
                return Ok(None);
            }
            Action::HistoryNavigated
        }
        "unload" => Action::Unload(PanelLayout::default()),
        other => return Err(format!("unknown step `{other}`").into()),
    };
    Ok(Some(action))
}

fn print_summary(
    page: &Page,
    session: &SessionHandle<HeadlessToolkit>,
) -> Result<(), Box<dyn Error>> {
    let storage_key = session.with(|manager| {
        let config = manager.config();
        println!("-- session --");
        println!("language  {} (rtl={})", config.language(), config.is_right_to_left());
        println!("theme     {}", config.theme());
        println!("renderer  {}", config.renderer());
        println!("options   {}", OptionSet::from_config(config).to_param());
        println!("phase     {:?}", manager.phase());
        println!("instances {}", manager.toolkit().created_count());
        manager.settings().storage_key.clone()
    })?;
    println!("url       {}", page.location.current());
    println!("history   {} entries", page.location.history_len());
    println!("snapshot  {}", page.storage.get(&storage_key).unwrap_or_default());
    if let Some(code) = page.preview.last() {
        println!("-- code --");
        print!("{code}");
    }
    Ok(())
}
