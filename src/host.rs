//! The host-primitive seam.
//!
//! `start_cpu` needs to spawn the execution thread, and `panic_cpu` needs
//! to end the process, but neither of those should be hard-wired to
//! `std::thread`/`std::process::exit` inside `Cpu` itself — that would make
//! both untestable without actually spawning OS threads or killing the
//! test binary. [`HostEnvironment`] is the seam; [`StdHostEnvironment`] is
//! the production implementation, and tests supply their own.

/// Thread-spawn and process-quit-request primitives a [`crate::cpu::Cpu`]
/// needs from its host, abstracted so both can be faked in tests.
pub trait HostEnvironment: Send + Sync + std::fmt::Debug {
    /// Run `task` on a new thread of execution.
    fn spawn(&self, task: Box<dyn FnOnce() + Send + 'static>);

    /// Ask the host to end the process with `exit_code`. Production
    /// implementations never return; test fakes may simply record the
    /// request.
    fn request_quit(&self, exit_code: i32);
}

/// The production [`HostEnvironment`], backed directly by `std::thread`
/// and `std::process::exit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdHostEnvironment;

impl HostEnvironment for StdHostEnvironment {
    fn spawn(&self, task: Box<dyn FnOnce() + Send + 'static>) {
        std::thread::spawn(task);
    }

    fn request_quit(&self, exit_code: i32) {
        std::process::exit(exit_code);
    }
}
