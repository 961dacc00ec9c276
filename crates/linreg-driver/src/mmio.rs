//! Memory-mapped CSR window access
//!
//! Maps the accelerator CSR window from a resource file — `/dev/mem` with
//! the SoC CSR base as offset, or a UIO map node — and provides volatile,
//! bounds-asserted 32-bit access.

// MMIO registers are naturally aligned by the gateware, so pointer casts are safe
#![allow(clippy::cast_ptr_alignment)]

use crate::bus::{BusType, CsrBus};
use crate::error::{LinregError, Result};
use linreg_chip::regs::WINDOW_SIZE;
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::os::unix::io::AsFd;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

/// Memory-mapped accelerator CSR window.
///
/// Unsafe operations are confined to construction, the volatile accessors,
/// and `Drop`; the public API is bounds-checked.
pub struct MmioBus {
    ptr: NonNull<u8>,
    _file: File,
    path: PathBuf,
}

impl std::fmt::Debug for MmioBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MmioBus")
            .field("ptr", &format_args!("{:p}", self.ptr))
            .field("path", &self.path)
            .finish()
    }
}

// SAFETY: Send - MmioBus owns the mapping exclusively and keeps the backing
// fd open for its lifetime. Moving between threads does not invalidate an
// mmap'd region (mappings are process-wide). No thread-local state.
unsafe impl Send for MmioBus {}

// SAFETY: Sync - reads use &self and are bounds-asserted; writes require
// &mut self (exclusive access via the borrow checker). Volatile CSR reads
// are idempotent on this block, so concurrent reads are safe.
unsafe impl Sync for MmioBus {}

impl MmioBus {
    /// Map the CSR window from `path` at byte offset `base`.
    ///
    /// `base` must be page-aligned (it is passed straight to mmap). For
    /// `/dev/mem` this is the physical CSR base of the accelerator block;
    /// for a UIO map node it is usually 0.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource file cannot be opened or the
    /// mapping fails.
    pub fn map(path: impl AsRef<Path>, base: u64) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!("Mapping CSR window: {} @ {base:#x}", path.display());

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                LinregError::map_failed(path, format!("cannot open: {e}"))
            })?;

        // SAFETY: mmap is unsafe but all preconditions are validated:
        // - fd is valid (just opened read/write)
        // - length WINDOW_SIZE is non-zero and constant
        // - PROT_READ|PROT_WRITE + MAP_SHARED is the required mode for CSRs
        // - base comes from the caller's SoC memory map; a bad offset fails
        //   here with an error rather than faulting later
        // - the file is stored in the struct so the fd outlives the mapping
        // - the region is unmapped exactly once, in Drop
        let ptr = unsafe {
            let addr = mmap(
                std::ptr::null_mut(),
                WINDOW_SIZE,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                file.as_fd(),
                base,
            )
            .map_err(|e| LinregError::map_failed(path, format!("mmap failed: {e}")))?;

            NonNull::new(addr.cast::<u8>())
                .ok_or_else(|| LinregError::map_failed(path, "mmap returned null"))?
        };

        tracing::info!(
            "Mapped CSR window at {ptr:p} ({WINDOW_SIZE:#x} bytes from {})",
            path.display()
        );

        Ok(Self {
            ptr,
            _file: file,
            path: path.to_path_buf(),
        })
    }

    /// Resource file this window was mapped from.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CsrBus for MmioBus {
    fn read32(&self, offset: usize) -> u32 {
        assert!(offset + 4 <= WINDOW_SIZE, "CSR offset out of window");
        // SAFETY: Volatile read from a memory-mapped register.
        // - ptr is valid for WINDOW_SIZE bytes (from successful mmap)
        // - offset + 4 <= WINDOW_SIZE asserted above
        // - CSRs are 4-byte aligned, so the u32 cast is aligned
        // - read_volatile is required: the gateware can change the value
        //   and the compiler must not elide or reorder the read
        let value = unsafe {
            self.ptr.as_ptr().add(offset).cast::<u32>().read_volatile()
        };
        tracing::trace!("csr rd {offset:#05x} = {value:#010x}");
        value
    }

    fn write32(&mut self, offset: usize, value: u32) {
        assert!(offset + 4 <= WINDOW_SIZE, "CSR offset out of window");
        tracing::trace!("csr wr {offset:#05x} = {value:#010x}");
        // SAFETY: Volatile write to a memory-mapped register.
        // - ptr is valid for WINDOW_SIZE bytes (from successful mmap)
        // - offset + 4 <= WINDOW_SIZE asserted above
        // - CSRs are 4-byte aligned
        // - write_volatile is required: CSR writes have side effects
        //   (operand latches, start pulses) that must not be reordered
        unsafe {
            self.ptr.as_ptr().add(offset).cast::<u32>().write_volatile(value);
        }
    }

    fn bus_type(&self) -> BusType {
        BusType::Mmio
    }
}

impl Drop for MmioBus {
    fn drop(&mut self) {
        // SAFETY: ptr/WINDOW_SIZE are exactly what mmap returned in map();
        // Drop runs at most once and no other references exist.
        unsafe {
            if let Err(e) = munmap(self.ptr.as_ptr().cast(), WINDOW_SIZE) {
                tracing::error!("munmap failed during drop: {e}");
            }
        }
        tracing::debug!("Unmapped CSR window for {}", self.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_of_missing_resource_reports_path() {
        let err = MmioBus::map("/nonexistent/csr-window", 0).unwrap_err();
        match err {
            LinregError::MapFailed { path, reason } => {
                assert_eq!(path, PathBuf::from("/nonexistent/csr-window"));
                assert!(reason.contains("cannot open"), "{reason}");
            }
            other => panic!("expected MapFailed, got {other:?}"),
        }
    }
}
