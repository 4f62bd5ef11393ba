/// Scoped, mutable access to a draft of the present. See [`super::History::write_with`].
///
/// Derefs to the draft. It is committed when the writer drops, unless it turned out equal to
/// the present or [`HistoryWriter::discard`] was called.
pub struct HistoryWriter<'a, T: Clone + PartialEq> {
    history: &'a mut super::History<T>,
    draft: Option<T>,
}
impl<'a, T: Clone + PartialEq> HistoryWriter<'a, T> {
    pub(super) fn new(history: &'a mut super::History<T>) -> Self {
        let draft = Some(history.present().clone());
        Self { history, draft }
    }
    /// The snapshot this draft started from.
    #[must_use]
    pub fn present(&self) -> &T {
        self.history.present()
    }
    #[must_use]
    pub fn changed(&self) -> bool {
        self.draft
            .as_ref()
            .is_some_and(|draft| draft != self.history.present())
    }
    /// Throw away every change made through this writer.
    pub fn discard(&mut self) {
        // Restore instead of taking, so deref stays valid for the rest of the scope.
        self.draft = Some(self.history.present().clone());
    }
}
impl<T: Clone + PartialEq> std::ops::Deref for HistoryWriter<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        // Only ever None during drop.
        self.draft.as_ref().unwrap_or_else(|| self.history.present())
    }
}
impl<T: Clone + PartialEq> std::ops::DerefMut for HistoryWriter<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        let history = &*self.history;
        self.draft.get_or_insert_with(|| history.present().clone())
    }
}
impl<T: Clone + PartialEq> Drop for HistoryWriter<'_, T> {
    fn drop(&mut self) {
        // A panic midway through an edit leaves a half-applied draft. Never commit that.
        if std::thread::panicking() {
            return;
        }
        if !self.changed() {
            return;
        }
        if let Some(draft) = self.draft.take() {
            self.history.commit(draft);
        }
    }
}
