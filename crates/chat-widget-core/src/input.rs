/// Single-line text input with a character-based cursor
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputField {
    value: String,
    cursor: usize,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl InputField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Cursor position in characters, not bytes
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    /// Replace the whole value and park the cursor at the end
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.value, self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let byte_pos = char_to_byte_index(&self.value, self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputField {
        let mut input = InputField::new();
        for c in text.chars() {
            input.insert(c);
        }
        input
    }

    #[test]
    fn editing_handles_multibyte_characters() {
        let mut input = typed("Üzgün");
        input.move_home();
        input.delete();
        assert_eq!(input.value(), "zgün");

        input.move_end();
        input.backspace();
        assert_eq!(input.value(), "zgü");
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn insert_in_the_middle() {
        let mut input = typed("helo");
        input.move_left();
        input.insert('l');
        assert_eq!(input.value(), "hello");
        assert_eq!(input.cursor(), 4);
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut input = typed("ab");
        input.move_right();
        input.move_right();
        assert_eq!(input.cursor(), 2);

        input.move_home();
        input.move_left();
        input.backspace();
        assert_eq!(input.cursor(), 0);
        assert_eq!(input.value(), "ab");
    }

    #[test]
    fn set_value_moves_cursor_to_end() {
        let mut input = typed("draft");
        input.move_home();
        input.set_value("/help");
        assert_eq!(input.value(), "/help");
        assert_eq!(input.cursor(), 5);

        input.clear();
        assert_eq!(input.value(), "");
        assert_eq!(input.cursor(), 0);
    }
}
