use serde::{Deserialize, Serialize};

/// Which page of the document is shown, and how many there are once known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPosition {
    pub page_number: u32,
    pub page_count: Option<u32>,
}

impl Default for DocumentPosition {
    fn default() -> Self {
        Self { page_number: 1, page_count: None }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageAction {
    Previous,
    Next,
    GoTo(u32),
}

impl DocumentPosition {
    /// Page count callback from the renderer. Clamps the current page into the new range.
    pub fn set_page_count(&mut self, page_count: u32) {
        self.page_count = Some(page_count);
        self.page_number = self.page_number.max(1).min(self.last_page());
    }

    /// Load failed: the count is unknown again.
    pub fn clear_page_count(&mut self) {
        self.page_count = None;
        self.page_number = 1;
    }

    /// Last reachable page. An unknown count behaves like a single page.
    pub fn last_page(&self) -> u32 {
        self.page_count.unwrap_or(1).max(1)
    }

    pub fn can_go_previous(&self) -> bool {
        self.page_number > 1
    }

    pub fn can_go_next(&self) -> bool {
        self.page_number < self.last_page()
    }

    pub fn label(&self) -> String {
        match self.page_count {
            Some(count) => format!("Page {} of {count}", self.page_number),
            None => format!("Page {} of ", self.page_number),
        }
    }
}

/// Applies a navigation action. Returns whether the page changed.
pub fn apply_page_action(position: &mut DocumentPosition, action: PageAction) -> bool {
    let before = position.page_number;

    match action {
        PageAction::Previous => {
            if position.can_go_previous() {
                position.page_number -= 1;
            }
        }
        PageAction::Next => {
            if position.can_go_next() {
                position.page_number += 1;
            }
        }
        PageAction::GoTo(page) => {
            position.page_number = page.max(1).min(position.last_page());
        }
    }

    position.page_number != before
}
