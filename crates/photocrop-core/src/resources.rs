//! Host resources the editor borrows while open: temporary object URLs for
//! local files, and the page-wide scroll lock.
//!
//! Both are released on every exit path. Temporary URLs are revoked by the
//! editor when an image is replaced or the session ends; the scroll lock is
//! an RAII guard, so dropping the editor is enough to unlock the page.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::acquire::SelectedFile;

/// Creates and revokes temporary URLs for locally selected files
/// (`URL.createObjectURL` in a browser).
pub trait TempUrlStore {
    /// Create a URL for `file`, or `None` if the host has no use for one.
    fn create(&mut self, file: &SelectedFile) -> Option<String>;

    /// Release a URL previously returned by [`create`](Self::create).
    fn revoke(&mut self, url: &str);
}

/// Store for hosts without object URLs (native tools, tests).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTempUrls;

impl TempUrlStore for NoTempUrls {
    fn create(&mut self, _file: &SelectedFile) -> Option<String> {
        None
    }

    fn revoke(&mut self, _url: &str) {}
}

/// The host page whose scrolling is suspended while an editor is open.
pub trait PageScroll {
    fn set_scroll_locked(&self, locked: bool);
}

/// Page without scrolling to lock.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPageScroll;

impl PageScroll for NoPageScroll {
    fn set_scroll_locked(&self, _locked: bool) {}
}

/// Reference-counted scroll lock shared by every editor on a page.
///
/// The page is locked when the first guard is acquired and unlocked when
/// the last one drops.
#[derive(Clone)]
pub struct ScrollLock {
    holders: Rc<Cell<usize>>,
    page: Rc<dyn PageScroll>,
}

impl ScrollLock {
    pub fn new(page: Rc<dyn PageScroll>) -> Self {
        Self {
            holders: Rc::new(Cell::new(0)),
            page,
        }
    }

    /// A lock that never touches a page.
    pub fn detached() -> Self {
        Self::new(Rc::new(NoPageScroll))
    }

    /// Take a hold on the lock.
    pub fn acquire(&self) -> ScrollGuard {
        let holders = self.holders.get();
        if holders == 0 {
            self.page.set_scroll_locked(true);
            log::debug!("Page scroll locked");
        }
        self.holders.set(holders + 1);
        ScrollGuard { lock: self.clone() }
    }

    /// Number of live guards.
    pub fn holders(&self) -> usize {
        self.holders.get()
    }

    pub fn is_locked(&self) -> bool {
        self.holders.get() > 0
    }
}

impl fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLock")
            .field("holders", &self.holders.get())
            .finish()
    }
}

/// One hold on a [`ScrollLock`]; releases it on drop.
#[derive(Debug)]
pub struct ScrollGuard {
    lock: ScrollLock,
}

impl Drop for ScrollGuard {
    fn drop(&mut self) {
        let remaining = self.lock.holders.get().saturating_sub(1);
        self.lock.holders.set(remaining);
        if remaining == 0 {
            self.lock.page.set_scroll_locked(false);
            log::debug!("Page scroll restored");
        }
    }
}
