//! Printing statements to stderr, for warnings and (switchable)
//! tracing.

use std::sync::atomic::{AtomicBool, Ordering};

/// Whether `trace!` prints anything. Off by default; flipped by the
/// binary from its configuration.
pub static TRACE: AtomicBool = AtomicBool::new(false);

pub fn set_trace(on: bool) {
    TRACE.store(on, Ordering::SeqCst);
}

pub fn trace_enabled() -> bool {
    TRACE.load(Ordering::Relaxed)
}

#[macro_export]
macro_rules! warn {
    ($formatstr:expr $(,$arg:expr)*) => { {
        use std::io::Write;
        let mut outp = std::io::BufWriter::new(std::io::stderr().lock());
        let _ = write!(&mut outp, "W: ");
        let _ = write!(&mut outp, $formatstr $(,$arg)*);
        let _ = writeln!(&mut outp, " at {:?} line {}", file!(), line!());
        let _ = outp.flush();
    } }
}

/// Like `warn!` but only prints when `TRACE` is set (see
/// `set_trace`). The arguments are only evaluated when tracing.
#[macro_export]
macro_rules! trace {
    ($formatstr:expr $(,$arg:expr)*) => { {
        if $crate::warn::trace_enabled() {
            use std::io::Write;
            let mut outp = std::io::BufWriter::new(std::io::stderr().lock());
            let _ = write!(&mut outp, "T: ");
            let _ = write!(&mut outp, $formatstr $(,$arg)*);
            let _ = writeln!(&mut outp, " at {:?} line {}", file!(), line!());
            let _ = outp.flush();
        }
    } }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_trace_switch() {
        set_trace(true);
        assert!(trace_enabled());
        trace!("tracing {} {}", 1, "two");
        set_trace(false);
        assert!(!trace_enabled());
        let mut evaluated = false;
        trace!("{}", { evaluated = true; 1 });
        assert!(!evaluated);
    }
}
