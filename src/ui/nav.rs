/// Rows reserved under the list for the footer separator and status line
pub const FOOTER_LINES: usize = 2;

/// Cursor, scroll offset and viewport geometry for a separator-spaced list.
///
/// Every rendered item takes its own line plus a separator line, except the
/// last one on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Navigation {
    cursor: usize,
    scroll: usize,
    width: u16,
    height: u16,
}

impl Navigation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.ensure_visible();
    }

    /// Lines available for items once the footer is taken out
    pub fn available_lines(&self) -> usize {
        usize::from(self.height).saturating_sub(FOOTER_LINES).max(1)
    }

    /// How many items fit in the viewport
    pub fn max_visible_items(&self) -> usize {
        self.available_lines().div_ceil(2).max(1)
    }

    /// Keep the cursor inside `[0, len)`, or at 0 for an empty list.
    pub fn clamp(&mut self, len: usize) {
        if self.cursor >= len {
            self.cursor = len.saturating_sub(1);
        }
        if self.scroll > self.cursor {
            self.scroll = self.cursor;
        }
    }

    pub fn move_down(&mut self, len: usize) {
        self.cursor = self.cursor.saturating_add(1);
        self.clamp(len);
        self.ensure_visible();
    }

    pub fn move_up(&mut self, len: usize) {
        self.cursor = self.cursor.saturating_sub(1);
        self.clamp(len);
        self.ensure_visible();
    }

    pub fn first(&mut self) {
        self.cursor = 0;
        self.scroll = 0;
    }

    pub fn last(&mut self, len: usize) {
        self.cursor = len.saturating_sub(1);
        self.ensure_visible();
    }

    /// Jump straight to `index` if it exists in a list of `len` items.
    pub fn jump(&mut self, index: usize, len: usize) -> bool {
        if index >= len {
            return false;
        }
        self.cursor = index;
        self.ensure_visible();
        true
    }

    /// Scroll just enough to keep the cursor on screen.
    pub fn ensure_visible(&mut self) {
        let max_visible = self.max_visible_items();
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        }
        if self.cursor >= self.scroll + max_visible {
            self.scroll = self.cursor + 1 - max_visible;
        }
    }

    /// Index range of the items currently on screen
    pub fn window(&self, len: usize) -> std::ops::Range<usize> {
        let start = self.scroll.min(len);
        let end = (start + self.max_visible_items()).min(len);
        start..end
    }

    /// Item under the cursor
    pub fn selected<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        items.get(self.cursor)
    }
}
