//! Execution-space notifications.
//!
//! A memory manager that stages data between host and device wants to know
//! which space is about to run. Instead of a global "current space" the
//! entry points take a hook and hold an [`ExecSpaceScope`] for the duration
//! of the call; dropping the scope (normal return, `?`, or unwinding) always
//! sends the matching `exit`.

use std::fmt;

/// Where a `forall` or `launch` executes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecSpace {
    Host,
    Device,
}

impl fmt::Display for ExecSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecSpace::Host => write!(f, "host"),
            ExecSpace::Device => write!(f, "device"),
        }
    }
}

/// Receiver for execution-space transitions.
pub trait ExecSpaceHook {
    fn enter(&self, space: ExecSpace);
    fn exit(&self, space: ExecSpace);
}

/// The no-op hook.
impl ExecSpaceHook for () {
    fn enter(&self, _space: ExecSpace) {}
    fn exit(&self, _space: ExecSpace) {}
}

/// Guard that reports `enter` on creation and `exit` on drop.
pub struct ExecSpaceScope<'h, H: ExecSpaceHook + ?Sized> {
    hook: &'h H,
    space: ExecSpace,
}

impl<'h, H: ExecSpaceHook + ?Sized> ExecSpaceScope<'h, H> {
    pub fn enter(hook: &'h H, space: ExecSpace) -> Self {
        tracing::trace!(%space, "enter execution space");
        hook.enter(space);
        Self { hook, space }
    }

    pub fn space(&self) -> ExecSpace {
        self.space
    }
}

impl<H: ExecSpaceHook + ?Sized> Drop for ExecSpaceScope<'_, H> {
    fn drop(&mut self) {
        tracing::trace!(space = %self.space, "exit execution space");
        self.hook.exit(self.space);
    }
}
