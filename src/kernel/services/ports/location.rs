/// The page URL query string plus push-style history.
pub trait PageLocation {
    /// Current query string, with its leading `?` when non-empty.
    fn search(&self) -> String;

    /// Pushes a new history entry carrying `search` as query string.
    fn push_search(&mut self, search: &str);
}
