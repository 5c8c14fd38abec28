use super::plugins::PluginError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("a workspace reboot is already in progress")]
    RebootInProgress,
    #[error("session is busy handling another request")]
    Busy,
    #[error("session has been unloaded")]
    Unloaded,
    #[error("no live workspace")]
    NoWorkspace,
    #[error(transparent)]
    Plugin(#[from] PluginError),
}
