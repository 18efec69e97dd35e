/// An unsafe cell slice.
///
/// It can be used to acquire multiple mutable references to a slice enabling writing from multiple threads.
/// This is inherently unsafe and it is the responsibility of the caller to ensure safety.
#[derive(Copy, Clone)]
pub struct UnsafeCellSlice<'a, T>(&'a [std::cell::UnsafeCell<T>]);

unsafe impl<'a, T: Send + Sync> Send for UnsafeCellSlice<'a, T> {}
unsafe impl<'a, T: Send + Sync> Sync for UnsafeCellSlice<'a, T> {}

impl<'a, T: Copy> UnsafeCellSlice<'a, T> {
    /// Create a new [`UnsafeCellSlice`].
    #[must_use]
    pub fn new(slice: &'a mut [T]) -> Self {
        let ptr = slice as *mut [T] as *const [std::cell::UnsafeCell<T>];
        Self(unsafe { &*ptr })
    }

    /// Copy `src` into the slice starting at `offset`.
    ///
    /// # Safety
    /// No other thread may access `offset..offset + src.len()` concurrently.
    ///
    /// # Panics
    /// Panics if `offset + src.len()` exceeds the length of the slice.
    pub unsafe fn copy_from(&self, offset: usize, src: &[T]) {
        let dst = &self.0[offset..offset + src.len()];
        std::ptr::copy_nonoverlapping(
            src.as_ptr(),
            std::cell::UnsafeCell::raw_get(dst.as_ptr()),
            src.len(),
        );
    }

    /// Get the length of the slice.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the slice has a length of 0.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
