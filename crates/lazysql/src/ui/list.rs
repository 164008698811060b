//! Filterable, scrollable list used for databases, tables, history and hosts.

use std::time::{Duration, Instant};

use crate::ui::input::{Input, InputEvent, Key, PointerKind};
use crate::ui::key_sequence::{KeySequenceHandler, SequenceStep, DEFAULT_SEQUENCE_TIMEOUT};

/// Something a [`SelectableList`] can show and commit.
pub trait ListItem: Clone {
    /// Text shown in the list and matched by the filter.
    fn display(&self) -> String;

    /// Identity used to detect that the committed item was committed again.
    fn same_item(&self, other: &Self) -> bool;
}

impl ListItem for String {
    fn display(&self) -> String {
        self.clone()
    }

    fn same_item(&self, other: &Self) -> bool {
        self == other
    }
}

/// Result of an input handled by the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListAction<T> {
    None,
    /// A different item was committed.
    Selected(T),
    /// The already committed item was committed again.
    Reselected(T),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListCommand {
    Top,
}

const LIST_SEQUENCES: &[(&str, ListCommand)] = &[("gg", ListCommand::Top)];

/// Returns true if `text` contains every space-separated token of `filter`.
pub fn filter_matches(text: &str, filter: &str) -> bool {
    filter
        .split(' ')
        .filter(|token| !token.is_empty())
        .all(|token| text.contains(token))
}

pub struct SelectableList<T: ListItem> {
    title: String,
    items: Vec<T>,
    filter: String,
    /// Indices into `items` that match `filter`, in order.
    filtered: Vec<usize>,
    cursor: usize,
    scroll_offset: usize,
    viewport_height: usize,
    selected: Option<T>,
    editing_filter: bool,
    sequences: KeySequenceHandler<ListCommand>,
    last_click: Option<(usize, Instant)>,
}

impl<T: ListItem> SelectableList<T> {
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_timeout(title, DEFAULT_SEQUENCE_TIMEOUT)
    }

    pub fn with_timeout(title: impl Into<String>, sequence_timeout: Duration) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
            filter: String::new(),
            filtered: Vec::new(),
            cursor: 0,
            scroll_offset: 0,
            viewport_height: 1,
            selected: None,
            editing_filter: false,
            sequences: KeySequenceHandler::new(LIST_SEQUENCES, sequence_timeout),
            last_click: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Items matching the filter, in their original order.
    pub fn filtered_items(&self) -> impl Iterator<Item = &T> + '_ {
        self.filtered.iter().map(|&i| &self.items[i])
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn is_editing_filter(&self) -> bool {
        self.editing_filter
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn viewport_height(&self) -> usize {
        self.viewport_height
    }

    /// The item under the cursor.
    pub fn cursor_item(&self) -> Option<&T> {
        self.filtered.get(self.cursor).map(|&i| &self.items[i])
    }

    /// The last committed item. Filtering never clears it.
    pub fn selected(&self) -> Option<&T> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, item: &T) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|selected| selected.same_item(item))
    }

    pub fn set_selected(&mut self, item: Option<T>) {
        self.selected = item;
    }

    /// Replaces the items, keeping the filter and the committed item.
    pub fn set_content(&mut self, items: Vec<T>) {
        self.items = items;
        self.last_click = None;
        self.refilter();
        self.clamp_cursor();
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.filter = filter.to_string();
        self.refilter();
        self.cursor = 0;
        self.clamp_cursor();
    }

    pub fn clear_filter(&mut self) {
        self.editing_filter = false;
        self.set_filter("");
    }

    pub fn set_viewport_height(&mut self, height: usize) {
        self.viewport_height = height.max(1);
        self.clamp_cursor();
    }

    pub fn move_up(&mut self) {
        self.move_to(self.cursor.saturating_sub(1));
    }

    pub fn move_down(&mut self) {
        self.move_to(self.cursor + 1);
    }

    pub fn jump_top(&mut self) {
        self.move_to(0);
    }

    pub fn jump_bottom(&mut self) {
        self.move_to(self.filtered.len().saturating_sub(1));
    }

    /// Commits the item under the cursor.
    pub fn commit(&mut self) -> ListAction<T> {
        let Some(item) = self.cursor_item().cloned() else {
            return ListAction::None;
        };
        if self.is_selected(&item) {
            return ListAction::Reselected(item);
        }
        self.selected = Some(item.clone());
        ListAction::Selected(item)
    }

    /// Click on the `row`-th visible line. Clicking the cursor row again
    /// within the sequence window commits it.
    pub fn click_row(&mut self, row: usize, at: Instant) -> ListAction<T> {
        let index = self.scroll_offset + row;
        if index >= self.filtered.len() {
            return ListAction::None;
        }

        let repeated = matches!(
            self.last_click,
            Some((last, when)) if last == index
                && index == self.cursor
                && at.saturating_duration_since(when) <= self.sequences.window()
        );
        if repeated {
            self.last_click = None;
            return self.commit();
        }

        self.move_to(index);
        self.last_click = Some((index, at));
        ListAction::None
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> ListAction<T> {
        match event.input {
            Input::Pointer(pointer) => {
                match pointer.kind {
                    PointerKind::ScrollUp => self.move_up(),
                    PointerKind::ScrollDown => self.move_down(),
                    PointerKind::Click => {}
                }
                ListAction::None
            }
            Input::Key(key) if self.editing_filter => {
                self.handle_filter_key(key);
                ListAction::None
            }
            Input::Key(key) => self.handle_key(key, event.at),
        }
    }

    fn handle_key(&mut self, key: Key, at: Instant) -> ListAction<T> {
        if let Key::Char(c) = key {
            match self.sequences.feed(c, at) {
                SequenceStep::Matched(ListCommand::Top) => {
                    self.jump_top();
                    return ListAction::None;
                }
                SequenceStep::Pending | SequenceStep::Rejected => return ListAction::None,
                SequenceStep::Unhandled => {}
            }
        } else {
            self.sequences.cancel();
        }

        let half_page = (self.viewport_height / 2).max(1);
        match key {
            Key::Char('j') | Key::Down => self.move_down(),
            Key::Char('k') | Key::Up => self.move_up(),
            Key::Char('G') | Key::End => self.jump_bottom(),
            Key::Home => self.jump_top(),
            Key::PageDown | Key::Ctrl('d') => self.move_to(self.cursor + half_page),
            Key::PageUp | Key::Ctrl('u') => self.move_to(self.cursor.saturating_sub(half_page)),
            Key::Char(' ') | Key::Enter => return self.commit(),
            Key::Char('/') => self.editing_filter = true,
            Key::Esc if !self.filter.is_empty() => self.clear_filter(),
            _ => {}
        }
        ListAction::None
    }

    fn handle_filter_key(&mut self, key: Key) {
        match key {
            Key::Esc => self.clear_filter(),
            Key::Enter => self.editing_filter = false,
            Key::Backspace => {
                let mut filter = self.filter.clone();
                filter.pop();
                self.set_filter(&filter);
            }
            Key::Ctrl('u') => self.set_filter(""),
            Key::Char(c) => {
                let mut filter = self.filter.clone();
                filter.push(c);
                self.set_filter(&filter);
            }
            Key::Down => self.move_down(),
            Key::Up => self.move_up(),
            _ => {}
        }
    }

    fn refilter(&mut self) {
        self.filtered = self
            .items
            .iter()
            .enumerate()
            .filter(|(_, item)| filter_matches(&item.display(), &self.filter))
            .map(|(i, _)| i)
            .collect();
    }

    fn move_to(&mut self, index: usize) {
        self.cursor = index;
        self.clamp_cursor();
    }

    /// Clamps the cursor into the filtered items and slides the scroll
    /// offset by the minimal amount that keeps it visible.
    fn clamp_cursor(&mut self) {
        if self.filtered.is_empty() {
            self.cursor = 0;
            self.scroll_offset = 0;
            return;
        }
        self.cursor = self.cursor.min(self.filtered.len() - 1);

        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + self.viewport_height {
            self.scroll_offset = self.cursor + 1 - self.viewport_height;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(items: &[&str]) -> SelectableList<String> {
        let mut list = SelectableList::new("Test");
        list.set_content(items.iter().map(|s| s.to_string()).collect());
        list
    }

    fn filtered(list: &SelectableList<String>) -> Vec<String> {
        list.filtered_items().cloned().collect()
    }

    fn key(k: Key) -> InputEvent {
        InputEvent::key(k, Instant::now())
    }

    #[test]
    fn test_filter_tokens() {
        let mut list = list_of(&["alpha", "beta", "gamma"]);
        list.set_filter("a");
        assert_eq!(filtered(&list), vec!["alpha", "beta", "gamma"]);
        list.set_filter("am");
        assert_eq!(filtered(&list), vec!["gamma"]);
        list.set_filter("ga  ma");
        assert_eq!(filtered(&list), vec!["gamma"]);
        list.set_filter("A");
        assert!(filtered(&list).is_empty());
    }

    #[test]
    fn test_clearing_filter_restores_order() {
        let mut list = list_of(&["c", "a", "b"]);
        list.set_filter("a");
        list.clear_filter();
        assert_eq!(filtered(&list), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_navigation_clamps_without_wrap() {
        let mut list = list_of(&["a", "b", "c"]);
        list.move_up();
        assert_eq!(list.cursor(), 0);
        for _ in 0..5 {
            list.move_down();
        }
        assert_eq!(list.cursor(), 2);
    }

    #[test]
    fn test_gg_requires_two_quick_presses() {
        let mut list = list_of(&["a", "b", "c"]);
        list.jump_bottom();
        let t0 = Instant::now();
        list.handle_input(&InputEvent::char('g', t0));
        assert_eq!(list.cursor(), 2);
        list.handle_input(&InputEvent::char('g', t0 + Duration::from_millis(700)));
        assert_eq!(list.cursor(), 2);
        list.handle_input(&InputEvent::char('g', t0 + Duration::from_millis(800)));
        assert_eq!(list.cursor(), 0);
    }

    #[test]
    fn test_commit_and_reselect() {
        let mut list = list_of(&["a", "b"]);
        list.move_down();
        assert_eq!(
            list.handle_input(&key(Key::Char(' '))),
            ListAction::Selected("b".to_string())
        );
        assert_eq!(
            list.handle_input(&key(Key::Enter)),
            ListAction::Reselected("b".to_string())
        );
        assert_eq!(list.selected(), Some(&"b".to_string()));
    }

    #[test]
    fn test_selected_survives_filter_and_content() {
        let mut list = list_of(&["users", "orders"]);
        list.commit();
        list.set_filter("ord");
        assert_eq!(list.selected(), Some(&"users".to_string()));
        list.set_content(vec!["orders".to_string()]);
        assert_eq!(list.selected(), Some(&"users".to_string()));
        assert_eq!(list.filter(), "ord");
    }

    #[test]
    fn test_scroll_follows_cursor_minimally() {
        let names: Vec<String> = (0..10).map(|i| format!("item{i}")).collect();
        let mut list = SelectableList::new("Test");
        list.set_content(names);
        list.set_viewport_height(3);

        for _ in 0..4 {
            list.move_down();
        }
        assert_eq!(list.cursor(), 4);
        assert_eq!(list.scroll_offset(), 2);

        list.move_up();
        list.move_up();
        // Still visible: no scroll.
        assert_eq!(list.scroll_offset(), 2);

        list.move_up();
        assert_eq!(list.scroll_offset(), 1);
    }

    #[test]
    fn test_set_content_clamps_cursor() {
        let mut list = list_of(&["a", "b", "c", "d"]);
        list.jump_bottom();
        list.set_content(vec!["x".to_string()]);
        assert_eq!(list.cursor(), 0);
        list.set_content(Vec::new());
        assert_eq!(list.cursor(), 0);
        assert_eq!(list.commit(), ListAction::None);
    }

    #[test]
    fn test_filter_editing_keys() {
        let mut list = list_of(&["alpha", "beta"]);
        list.handle_input(&key(Key::Char('/')));
        assert!(list.is_editing_filter());
        list.handle_input(&key(Key::Char('b')));
        list.handle_input(&key(Key::Char('x')));
        assert_eq!(list.filtered_len(), 0);
        list.handle_input(&key(Key::Backspace));
        assert_eq!(filtered(&list), vec!["beta"]);
        list.handle_input(&key(Key::Enter));
        assert!(!list.is_editing_filter());
        assert_eq!(list.filter(), "b");

        list.handle_input(&key(Key::Esc));
        assert_eq!(list.filter(), "");
        assert_eq!(list.filtered_len(), 2);
    }

    #[test]
    fn test_second_click_commits() {
        let mut list = list_of(&["a", "b", "c"]);
        let t0 = Instant::now();
        assert_eq!(list.click_row(1, t0), ListAction::None);
        assert_eq!(list.cursor(), 1);
        assert_eq!(
            list.click_row(1, t0 + Duration::from_millis(100)),
            ListAction::Selected("b".to_string())
        );
        assert_eq!(list.click_row(7, t0), ListAction::None);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Properties
    // ─────────────────────────────────────────────────────────────────────

    use proptest::prelude::*;

    fn list_key_strategy() -> impl Strategy<Value = Key> {
        prop::sample::select(vec![
            Key::Char('j'),
            Key::Char('k'),
            Key::Char('g'),
            Key::Char('G'),
            Key::Char('/'),
            Key::Char('a'),
            Key::Char(' '),
            Key::Down,
            Key::Up,
            Key::Home,
            Key::End,
            Key::PageDown,
            Key::PageUp,
            Key::Backspace,
            Key::Enter,
            Key::Esc,
        ])
    }

    proptest! {
        #[test]
        fn test_narrowing_filter_never_grows_matches(
            items in prop::collection::vec("[a-c]{0,5}", 0..20),
            base in "[a-c ]{0,4}",
            extra in "[a-c ]{1,4}",
        ) {
            let mut list = SelectableList::new("Test");
            list.set_content(items);
            list.set_filter(&base);
            let wide = list.filtered_len();
            list.set_filter(&format!("{base}{extra}"));
            prop_assert!(list.filtered_len() <= wide);
        }

        #[test]
        fn test_cursor_stays_in_view(
            items in prop::collection::vec("[a-c]{1,4}", 0..40),
            height in 1usize..8,
            keys in prop::collection::vec(list_key_strategy(), 0..60),
        ) {
            let mut list = SelectableList::new("Test");
            list.set_viewport_height(height);
            list.set_content(items);
            let start = Instant::now();
            for (i, k) in keys.iter().enumerate() {
                let at = start + Duration::from_millis(10 * i as u64);
                list.handle_input(&InputEvent::key(*k, at));
                if list.is_empty() {
                    prop_assert_eq!(list.cursor(), 0);
                } else {
                    prop_assert!(list.cursor() < list.filtered_len());
                    prop_assert!(list.scroll_offset() <= list.cursor());
                    prop_assert!(list.cursor() < list.scroll_offset() + list.viewport_height());
                }
            }
        }
    }
}
