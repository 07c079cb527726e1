//! Renderer-facing contract. The core knows nothing about painting; it pushes
//! per-body transform attributes into an opaque visual proxy and asks the
//! renderer for one repaint at the end of each step.

/// Attribute keys pushed into a body's visual proxy after integration.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum VisualAttr {
    X,
    Y,
    Rotate,
}

/// Per-body handle owned by the renderer. The core calls `set_attr` whenever
/// the body's position or orientation changes.
pub trait VisualProxy {
    fn set_attr(&mut self, attr: VisualAttr, value: f64);
}

/// Pointer-style event handler forwarded through `World::bind`.
pub type EventHandler = Box<dyn FnMut(f64, f64)>;

/// Host renderer handle. `repaint` is invoked exactly once per step.
pub trait Renderer {
    fn repaint(&mut self);

    /// Event wiring is renderer business; the default ignores it.
    fn bind(&mut self, _event: &str, _handler: EventHandler) {}
}
