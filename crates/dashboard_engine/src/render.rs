use crate::view::DashboardView;

/// Presentation collaborator. Receives the complete view after every state
/// change; never called once the session has been halted.
pub trait Renderer: Send {
    fn render(&mut self, view: &DashboardView);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _view: &DashboardView) {}
}

/// Interactive yes/no confirmation, used before destructive actions.
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}
