//! Host-memory stand-ins for memory-mapped register blocks.

use std::alloc::{Layout, alloc_zeroed};

/// Leaks a zeroed allocation shaped like the register block `T`.
///
/// Register cells are `UnsafeCell`s underneath, so a zeroed block behaves like
/// powered-on hardware and every access still goes through the volatile path.
pub(crate) fn fake<T>() -> &'static T {
    let layout = Layout::new::<T>();
    assert!(layout.size() > 0);
    unsafe {
        let ptr = alloc_zeroed(layout) as *const T;
        assert!(!ptr.is_null());
        &*ptr
    }
}

/// Reads the 16-bit word at `index` of a register block, bypassing its
/// access type. Used to observe write-only cells in tests.
pub(crate) fn peek<T>(block: &T, index: usize) -> u16 {
    assert!((index + 1) * 2 <= size_of::<T>());
    unsafe { (block as *const T as *const u16).add(index).read_volatile() }
}
