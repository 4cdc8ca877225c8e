/// Height of a scrollable table adjusted by dragging its bottom handle.
/// Heights are in terminal rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResizablePanel {
    height: u16,
    min_height: u16,
    drag: Option<Drag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Drag {
    start_y: u16,
    start_height: u16,
}

impl ResizablePanel {
    pub fn new(height: u16, min_height: u16) -> Self {
        Self {
            height: height.max(min_height),
            min_height,
            drag: None,
        }
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn min_height(&self) -> u16 {
        self.min_height
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    pub fn begin_drag(&mut self, y: u16) {
        self.drag = Some(Drag {
            start_y: y,
            start_height: self.height,
        });
    }

    /// Moving up grows the panel, moving down shrinks it, never below the minimum.
    /// Ignored unless a drag is in progress.
    pub fn drag_to(&mut self, y: u16) {
        let Some(drag) = self.drag else {
            return;
        };
        let delta = i32::from(drag.start_y) - i32::from(y);
        let next = (i32::from(drag.start_height) + delta)
            .clamp(i32::from(self.min_height), i32::from(u16::MAX));
        self.height = next as u16;
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    pub fn grow(&mut self, step: u16) {
        self.height = self.height.saturating_add(step);
    }

    pub fn shrink(&mut self, step: u16) {
        self.height = self.height.saturating_sub(step).max(self.min_height);
    }
}
