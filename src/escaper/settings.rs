/// Specifies the memory settings of an [`Escaper`](crate::Escaper).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemorySettings {
    /// Preallocated size of the buffer that holds literal text whose context can't be decided
    /// until more text arrives.
    ///
    /// ### Default
    ///
    /// `1024` bytes.
    pub preallocated_buffer_size: usize,

    /// Maximum number of bytes the buffer may hold. Exceeding the limit puts the stream into
    /// the error state with [`ErrorKind::BufferCapacityExceeded`].
    ///
    /// A buffer only grows past a few bytes on unusual input, like a megabyte long attribute
    /// name written in many chunks.
    ///
    /// ### Default
    ///
    /// `65536` bytes.
    ///
    /// [`ErrorKind::BufferCapacityExceeded`]: crate::ErrorKind::BufferCapacityExceeded
    pub max_blocked_bytes: usize,
}

impl Default for MemorySettings {
    #[inline]
    fn default() -> Self {
        MemorySettings {
            preallocated_buffer_size: 1024,
            max_blocked_bytes: 64 * 1024,
        }
    }
}

/// Specifies settings of an [`Escaper`](crate::Escaper).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// ### Default
    ///
    /// See [`MemorySettings::default`].
    pub memory_settings: MemorySettings,
}
