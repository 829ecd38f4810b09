//! Open/select state for the custom language dropdown.
//!
//! The widget mirrors a styled `<select>`: clicking the header toggles the
//! option list, clicking an option selects it and collapses the list, a
//! click anywhere else closes it, and Enter/Space/Escape work while the
//! widget has keyboard focus. The hidden value tracks the selected option's
//! token and feeds the submission payload.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

impl DropdownOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownKey {
    Enter,
    Space,
    Escape,
}

#[derive(Debug, Clone)]
pub struct DropdownState {
    open: bool,
    selected_label: String,
    selected_value: String,
    hidden_value: String,
    options: Vec<DropdownOption>,
}

impl DropdownState {
    /// `default_value` is whatever the markup pre-seeds into the hidden
    /// input; it stays in place until the first selection.
    pub fn new(
        placeholder: impl Into<String>,
        default_value: impl Into<String>,
        options: Vec<DropdownOption>,
    ) -> Self {
        let default_value = default_value.into();
        Self {
            open: false,
            selected_label: placeholder.into(),
            selected_value: default_value.clone(),
            hidden_value: default_value,
            options,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn options(&self) -> &[DropdownOption] {
        &self.options
    }

    pub fn selected_label(&self) -> &str {
        &self.selected_label
    }

    pub fn selected_value(&self) -> &str {
        &self.selected_value
    }

    /// Token the form submits for the current selection.
    pub fn hidden_value(&self) -> &str {
        &self.hidden_value
    }

    /// Header click.
    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Option click: the label and value follow the option, the hidden
    /// value mirrors it, and the open list collapses.
    pub fn select(&mut self, index: usize) {
        let Some(option) = self.options.get(index) else {
            return;
        };
        self.selected_label = option.label.clone();
        self.selected_value = option.value.clone();
        self.hidden_value = option.value.clone();
        self.open = false;
    }

    /// Select by token, used when restoring a persisted choice. Returns
    /// false when no option carries the token.
    pub fn select_value(&mut self, value: &str) -> bool {
        match self.options.iter().position(|option| option.value == value) {
            Some(index) => {
                self.select(index);
                true
            }
            None => false,
        }
    }

    /// Click anywhere outside the widget.
    pub fn handle_click_outside(&mut self) {
        self.close();
    }

    /// Keyboard input while the widget has focus. Returns true when the
    /// caller must suppress the key's default action (Enter would submit
    /// the surrounding form, Space would scroll).
    pub fn handle_key(&mut self, key: DropdownKey) -> bool {
        match key {
            DropdownKey::Enter | DropdownKey::Space => {
                self.toggle();
                true
            }
            DropdownKey::Escape => {
                self.close();
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/dropdown_tests.rs"]
mod tests;
