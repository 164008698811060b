//! Editor commands and motions.
//!
//! Single-key motions are dispatched directly by the editor. Multi-key
//! commands are recognized through [`EDITOR_SEQUENCES`] and the debounce
//! window in `ui::key_sequence`.

/// A cursor-only movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    /// Start of the next word (`w`).
    WordForward,
    /// Start of the previous word (`b`).
    WordBack,
    /// End of the next word (`e`).
    WordEnd,
    LineStart,
    LineEnd,
}

impl Motion {
    /// Maps a Normal/Visual mode character to its motion, if any.
    pub fn from_char(c: char) -> Option<Self> {
        let motion = match c {
            'h' => Motion::Left,
            'l' => Motion::Right,
            'k' => Motion::Up,
            'j' => Motion::Down,
            'w' => Motion::WordForward,
            'b' => Motion::WordBack,
            'e' => Motion::WordEnd,
            '0' => Motion::LineStart,
            '$' => Motion::LineEnd,
            _ => return None,
        };
        Some(motion)
    }

    /// Vertical motions keep the preferred column across consecutive moves.
    pub fn is_vertical(&self) -> bool {
        matches!(self, Motion::Up | Motion::Down)
    }
}

/// A command typed as a sequence of Normal mode keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    /// `dd`: delete the current line.
    DeleteLine,
    /// `cc`: clear the current line and enter Insert at its start.
    ChangeLine,
    /// `ciw`: delete the word under the cursor and enter Insert.
    ChangeInnerWord,
    /// `gv`: enter Visual with a fresh selection at the cursor.
    ReselectVisual,
}

/// Multi-key commands recognized in Normal mode.
pub const EDITOR_SEQUENCES: &[(&str, EditorCommand)] = &[
    ("dd", EditorCommand::DeleteLine),
    ("cc", EditorCommand::ChangeLine),
    ("ciw", EditorCommand::ChangeInnerWord),
    ("gv", EditorCommand::ReselectVisual),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_from_char() {
        assert_eq!(Motion::from_char('w'), Some(Motion::WordForward));
        assert_eq!(Motion::from_char('$'), Some(Motion::LineEnd));
        assert_eq!(Motion::from_char('d'), None);
    }

    #[test]
    fn test_sequences_are_prefix_free() {
        for (i, (a, _)) in EDITOR_SEQUENCES.iter().enumerate() {
            for (j, (b, _)) in EDITOR_SEQUENCES.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a), "{a} is a prefix of {b}");
                }
            }
        }
    }
}
