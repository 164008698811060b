//! Browsing scenarios for the selectable list and the result grid.

mod common;

use std::time::Duration;

use common::KeyClock;
use lazysql::db::TableRef;
use lazysql::ui::{DataGrid, GridAction, GridError, Key, ListAction, SelectableList};

fn tables() -> Vec<TableRef> {
    vec![
        TableRef::new("public", "users"),
        TableRef::new("public", "user_roles"),
        TableRef::new("audit", "users"),
        TableRef::new("public", "orders"),
    ]
}

#[test]
fn test_filter_then_commit_table() {
    let mut clock = KeyClock::new();
    let mut list = SelectableList::new("Tables");
    list.set_viewport_height(10);
    list.set_content(tables());

    list.handle_input(&clock.key(Key::Char('/')));
    for event in clock.chars("audit user") {
        list.handle_input(&event);
    }
    list.handle_input(&clock.key(Key::Enter));
    assert_eq!(list.filtered_len(), 1);
    assert!(!list.is_editing_filter());

    let action = list.handle_input(&clock.key(Key::Enter));
    assert_eq!(action, ListAction::Selected(TableRef::new("audit", "users")));

    let action = list.handle_input(&clock.key(Key::Enter));
    assert_eq!(action, ListAction::Reselected(TableRef::new("audit", "users")));
}

#[test]
fn test_reloading_keeps_committed_item() {
    let mut clock = KeyClock::new();
    let mut list = SelectableList::new("Tables");
    list.set_content(tables());
    list.handle_input(&clock.key(Key::Enter));

    list.set_content(tables());
    assert_eq!(list.selected(), Some(&TableRef::new("public", "users")));
}

#[test]
fn test_list_scrolls_with_cursor() {
    let mut clock = KeyClock::new();
    let mut list = SelectableList::new("Databases");
    list.set_viewport_height(2);
    list.set_content((0..6).map(|i| format!("db{i}")).collect());

    list.handle_input(&clock.key(Key::Char('G')));
    assert_eq!(list.cursor(), 5);
    assert_eq!(list.scroll_offset(), 4);

    list.handle_input(&clock.key(Key::Char('g')));
    list.handle_input(&clock.key(Key::Char('g')));
    assert_eq!(list.cursor(), 0);
    assert_eq!(list.scroll_offset(), 0);
}

#[test]
fn test_double_click_commits() {
    let clock = KeyClock::new();
    let mut list = SelectableList::new("Databases");
    list.set_viewport_height(5);
    list.set_content(vec!["app".to_string(), "postgres".to_string()]);

    let first = clock.at();
    assert_eq!(list.click_row(1, first), ListAction::None);
    assert_eq!(list.cursor(), 1);
    assert_eq!(
        list.click_row(1, first + Duration::from_millis(200)),
        ListAction::Selected("postgres".to_string())
    );
}

fn sample_grid(columns: usize, rows: usize) -> DataGrid {
    let mut grid = DataGrid::new();
    let headers = (0..columns).map(|c| format!("col{c}")).collect();
    let data = (0..rows)
        .map(|r| (0..columns).map(|c| format!("r{r}c{c}")).collect())
        .collect();
    grid.set_content(headers, data).unwrap();
    grid
}

#[test]
fn test_grid_column_layout() {
    let mut grid = sample_grid(3, 1);
    grid.set_viewport(80, 10);
    // (80 - 5 - 2) / 3 = 24
    assert_eq!(grid.column_width(), 24);
    assert_eq!(grid.visible_column_count(), 3);

    let mut grid = sample_grid(10, 1);
    grid.set_viewport(60, 10);
    // (60 - 5 - 9) / 10 = 4, raised to the minimum.
    assert_eq!(grid.column_width(), 12);
    assert_eq!(grid.visible_column_count(), 3);
}

#[test]
fn test_grid_navigation_scrolls_both_axes() {
    let mut clock = KeyClock::new();
    let mut grid = sample_grid(10, 50);
    grid.set_viewport(60, 12);

    for _ in 0..4 {
        grid.handle_input(&clock.key(Key::Char('l')));
    }
    assert_eq!(grid.cursor(), (4, 0));
    assert_eq!(grid.visible_columns(), 2..5);

    grid.handle_input(&clock.key(Key::Char('G')));
    assert_eq!(grid.cursor(), (4, 49));
    assert_eq!(grid.visible_rows(), 40..50);

    grid.handle_input(&clock.key(Key::Char('g')));
    grid.handle_input(&clock.key(Key::Char('g')));
    assert_eq!(grid.cursor(), (4, 0));
    assert_eq!(grid.offsets(), (2, 0));
}

#[test]
fn test_grid_copy_returns_raw_value() {
    let mut clock = KeyClock::new();
    let mut grid = DataGrid::new();
    grid.set_content(
        vec!["note".to_string()],
        vec![vec!["line one\r\nline two".to_string()]],
    )
    .unwrap();

    assert_eq!(
        grid.handle_input(&clock.key(Key::Char('y'))),
        GridAction::CopyCell("line one\r\nline two".to_string())
    );
    assert_eq!(grid.display_value("line one\r\nline two"), "line one⏎line two");
}

#[test]
fn test_grid_rejects_ragged_rows() {
    let mut grid = sample_grid(2, 3);
    let err = grid
        .set_content(
            vec!["a".to_string(), "b".to_string()],
            vec![
                vec!["1".to_string(), "2".to_string()],
                vec!["3".to_string()],
            ],
        )
        .unwrap_err();
    assert_eq!(
        err,
        GridError::RowLength {
            row: 1,
            expected: 2,
            found: 1
        }
    );
    // Previous content is untouched.
    assert_eq!(grid.row_count(), 3);
    assert_eq!(grid.columns()[0], "col0");
}
