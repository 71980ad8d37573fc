use bson::Document;

/// Default MongoDB wire port.
pub const DEFAULT_PORT: u16 = 27017;

/// Database holding replica-set configuration.
pub const LOCAL_DB: &str = "local";

/// Collection holding the replica-set configuration document.
pub const REPL_SET_COLLECTION: &str = "system.replset";

/// Field of the replica-set config document holding cluster settings.
pub const REPL_SET_SETTINGS: &str = "settings";

/// Settings field enumerating custom write-durability modes.
pub const REPL_SET_LAST_ERROR_MODES: &str = "getLastErrorModes";

/// Enumerate the custom getLastError mode names defined in a
/// `local.system.replset` configuration document.
///
/// The modes live under `settings.getLastErrorModes`, keyed by mode name.
/// A document without that subtree defines no custom modes.
pub fn last_error_modes(replset_config: &Document) -> Vec<String> {
    let Ok(settings) = replset_config.get_document(REPL_SET_SETTINGS) else {
        return Vec::new();
    };
    let Ok(modes) = settings.get_document(REPL_SET_LAST_ERROR_MODES) else {
        return Vec::new();
    };
    modes.keys().cloned().collect()
}
