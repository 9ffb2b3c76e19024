/// Wraps data that needs a redraw once it has been written.
///
/// Writers only mark the flag, the frame loop consumes it with [`DirtyFlag::take_dirty`]
/// on the next tick. Nothing is notified synchronously, so a writer can never re-enter
/// the renderer.
pub struct DirtyFlag<T> {
    is_dirty: bool,
    data: T,
}

impl<T> DirtyFlag<T> {
    pub fn new(data: T) -> Self {
        Self { is_dirty: false, data }
    }

    /// Starts dirty, so the first tick renders it.
    pub fn new_dirty(data: T) -> Self {
        Self { is_dirty: true, data }
    }

    pub fn read(&self) -> &T {
        &self.data
    }

    pub fn write(&mut self) -> &mut T {
        self.is_dirty = true;
        &mut self.data
    }

    pub fn get_all(&mut self) -> (&mut T, &mut bool) {
        (&mut self.data, &mut self.is_dirty)
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Returns whether the data was dirty and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.is_dirty, false)
    }

    pub fn clean_flag(&mut self) {
        self.is_dirty = false;
    }

    pub fn set_dirty(&mut self) {
        self.is_dirty = true;
    }
}

impl<T: Default> Default for DirtyFlag<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
