/// Code preview pane. Pure sink: nothing flows back into the session.
pub trait CodePreview {
    fn publish(&mut self, code: &str);
}
