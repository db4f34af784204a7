use super::registry::WidgetId;

/// Tab order over the focusable widgets of the active panel.
#[derive(Clone, Debug, Default)]
pub struct FocusRing {
    order: Vec<WidgetId>,
    index: usize,
}

impl FocusRing {
    pub fn new(order: Vec<WidgetId>) -> Self {
        Self { order, index: 0 }
    }

    pub fn current(&self) -> Option<WidgetId> {
        self.order.get(self.index).copied()
    }

    pub fn next(&mut self) {
        if !self.order.is_empty() {
            self.index = (self.index + 1) % self.order.len();
        }
    }

    pub fn prev(&mut self) {
        if !self.order.is_empty() {
            self.index = (self.index + self.order.len() - 1) % self.order.len();
        }
    }

    /// Move focus to `id` if it is part of the ring.
    #[cfg(test)]
    pub fn focus(&mut self, id: WidgetId) -> bool {
        match self.order.iter().position(|w| *w == id) {
            Some(i) => {
                self.index = i;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self, order: Vec<WidgetId>) {
        self.order = order;
        self.index = 0;
    }
}
