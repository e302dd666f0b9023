//! Type-specific editing of a placed field's label and options.
//!
//! None of these operations touch the field's geometry. Operations that do not
//! apply to the field's type return `false` and leave the field unchanged.

use crate::field::{Assignee, Field, FieldType};

impl Field {
    /// Change the label shown to the signer.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.field_name = name.into();
    }

    /// Change whether the signer must fill in the field.
    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    /// Change which signer category fills in the field.
    pub fn set_assigned_to(&mut self, assignee: Assignee) {
        self.assigned_to = assignee;
    }

    /// The label the next appended option would get by default, `Option <n>`.
    pub fn next_option_label(&self) -> String {
        let count = self.options.as_ref().map_or(0, Vec::len);
        format!("Option {}", count + 1)
    }

    /// Append an option.
    pub fn add_option(&mut self, option: impl Into<String>) -> bool {
        let Some(options) = self.options_mut() else {
            return false;
        };
        options.push(option.into());
        true
    }

    /// Replace the option at `index`.
    ///
    /// A select field's default option follows the edit if it referred to the
    /// replaced string.
    pub fn edit_option(&mut self, index: usize, option: impl Into<String>) -> bool {
        let option = option.into();
        let Some(slot) = self.options_mut().and_then(|options| options.get_mut(index)) else {
            return false;
        };
        let previous = std::mem::replace(slot, option.clone());

        if self.default_option.as_deref() == Some(previous.as_str()) && !self.lists(&previous) {
            self.default_option = Some(option);
        }
        true
    }

    /// Remove the option at `index`.
    ///
    /// A select field's default option is cleared once no option with the same
    /// text remains.
    pub fn remove_option(&mut self, index: usize) -> bool {
        let Some(options) = self.options_mut() else {
            return false;
        };
        if index >= options.len() {
            return false;
        }
        let removed = options.remove(index);

        if self.default_option.as_deref() == Some(removed.as_str()) && !self.lists(&removed) {
            self.default_option = None;
        }
        true
    }

    /// Set or clear the preselected option of a select field.
    ///
    /// The option must be one of the field's options.
    pub fn set_default_option(&mut self, option: Option<String>) -> bool {
        if self.field_type != FieldType::Select {
            return false;
        }
        match option {
            Some(option) if !self.lists(&option) => false,
            option => {
                self.default_option = option;
                true
            }
        }
    }

    fn options_mut(&mut self) -> Option<&mut Vec<String>> {
        if !self.field_type.has_options() {
            return None;
        }
        Some(self.options.get_or_insert_with(Vec::new))
    }

    fn lists(&self, option: &str) -> bool {
        self.options
            .as_ref()
            .is_some_and(|options| options.iter().any(|o| o == option))
    }
}
