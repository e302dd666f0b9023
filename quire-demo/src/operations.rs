use quire_fields::Field;

const MAX_SNAPSHOTS: usize = 100;

/// Undo/redo over snapshots of the field collection.
#[derive(Default)]
pub(crate) struct EditHistory {
    undo_stack: Vec<Vec<Field>>,
    redo_stack: Vec<Vec<Field>>,
}

impl EditHistory {
    pub(crate) fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Record the state before an edit.
    pub(crate) fn push(&mut self, before: Vec<Field>) {
        if self.undo_stack.len() == MAX_SNAPSHOTS {
            self.undo_stack.remove(0);
        }
        self.undo_stack.push(before);
        self.redo_stack.clear();
    }

    /// Step back, returning the state to restore.
    pub(crate) fn undo(&mut self, current: &[Field]) -> Option<Vec<Field>> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current.to_vec());
        Some(previous)
    }

    /// Step forward again, returning the state to restore.
    pub(crate) fn redo(&mut self, current: &[Field]) -> Option<Vec<Field>> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current.to_vec());
        Some(next)
    }

    pub(crate) fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub(crate) fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
