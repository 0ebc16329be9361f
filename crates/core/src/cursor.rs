//! Navigation cursor over the currently loaded page of groups.
//!
//! The cursor owns a zero-based index into the page's group ids plus the
//! page's prev/next flags. Moving past a page boundary does not fetch
//! anything itself; it hands the caller a [`CursorMove::FetchPage`] request
//! and expects a [`GroupCursor::load_page`] call with the new page.

/// Which neighbouring page a boundary move needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    Previous,
    Next,
}

/// Where the cursor should land after a new page is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOn {
    First,
    Last,
}

/// Result of an advance/retreat request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorMove {
    /// A group on the current page was selected (new index).
    Selected(usize),
    /// The move crossed the page boundary; the caller must fetch the
    /// neighbouring page and call [`GroupCursor::load_page`].
    FetchPage(PageDirection),
    /// The page is empty; nothing to select.
    Empty,
}

/// Result of selecting a group directly by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected(usize),
    /// The group is not in the loaded page. The cursor is unchanged; the
    /// caller decides whether to refetch or surface an error.
    NotFound,
}

/// Cursor over one loaded page of grouped results.
#[derive(Debug, Clone, Default)]
pub struct GroupCursor {
    group_ids: Vec<String>,
    index: usize,
    has_prev: bool,
    has_next: bool,
}

impl GroupCursor {
    /// Replace the loaded page and position the cursor at its first or
    /// last group.
    pub fn load_page(
        &mut self,
        group_ids: Vec<String>,
        has_prev: bool,
        has_next: bool,
        select: SelectOn,
    ) {
        self.index = match select {
            SelectOn::First => 0,
            SelectOn::Last => group_ids.len().saturating_sub(1),
        };
        self.group_ids = group_ids;
        self.has_prev = has_prev;
        self.has_next = has_next;
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Id of the currently selected group, if the page is non-empty.
    pub fn current(&self) -> Option<&str> {
        self.group_ids.get(self.index).map(String::as_str)
    }

    pub fn page_len(&self) -> usize {
        self.group_ids.len()
    }

    /// Move to the next group. At the last group of the page this either
    /// requests the next page or, when there is none, wraps to the first
    /// group of the current page.
    pub fn advance(&mut self) -> CursorMove {
        if self.group_ids.is_empty() {
            return CursorMove::Empty;
        }
        if self.index + 1 < self.group_ids.len() {
            self.index += 1;
            CursorMove::Selected(self.index)
        } else if self.has_next {
            CursorMove::FetchPage(PageDirection::Next)
        } else {
            self.index = 0;
            CursorMove::Selected(0)
        }
    }

    /// Move to the previous group. At the first group of the page this
    /// either requests the previous page (which selects its last group) or
    /// wraps to the last group of the current page.
    pub fn retreat(&mut self) -> CursorMove {
        if self.group_ids.is_empty() {
            return CursorMove::Empty;
        }
        if self.index > 0 {
            self.index -= 1;
            CursorMove::Selected(self.index)
        } else if self.has_prev {
            CursorMove::FetchPage(PageDirection::Previous)
        } else {
            self.index = self.group_ids.len() - 1;
            CursorMove::Selected(self.index)
        }
    }

    /// Select a group by id, e.g. from a list-view click.
    ///
    /// A group missing from the loaded page yields an explicit
    /// [`SelectOutcome::NotFound`] and leaves the cursor untouched.
    pub fn select_by_id(&mut self, group_id: &str) -> SelectOutcome {
        match self.group_ids.iter().position(|g| g == group_id) {
            Some(index) => {
                self.index = index;
                SelectOutcome::Selected(index)
            }
            None => SelectOutcome::NotFound,
        }
    }
}

/* --------------------------------------------------------------------------
Tests
-------------------------------------------------------------------------- */
