//! Optional memory usage capability.
//!
//! With the `memory_profiling` feature the `heap_mb` column is live heap
//! bytes as tracked by dhat. Without it the column falls back to resident
//! set size. Hosts that cannot report memory return `None`, which leaves
//! the column empty.

#[cfg(feature = "memory_profiling")]
use std::sync::atomic::{AtomicBool, Ordering};

/// Reports the process's current memory use in bytes
pub trait MemoryProbe {
    fn used_bytes(&self) -> Option<u64>;
}

/// Probe for environments without a memory API
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMemoryProbe;

impl MemoryProbe for NoMemoryProbe {
    fn used_bytes(&self) -> Option<u64> {
        None
    }
}

/// Resident set size of the current process.
///
/// Linux reads `VmRSS` from `/proc/self/status`; other platforms report
/// nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResidentMemoryProbe;

impl MemoryProbe for ResidentMemoryProbe {
    fn used_bytes(&self) -> Option<u64> {
        resident_bytes()
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn resident_bytes() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    parse_vm_rss(&status)
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
fn resident_bytes() -> Option<u64> {
    None
}

#[cfg(feature = "memory_profiling")]
static HEAP_PROFILING: AtomicBool = AtomicBool::new(false);

/// Running dhat heap profiler.
///
/// Needs `dhat::Alloc` installed as the global allocator. While this guard
/// is alive [`DhatMemoryProbe`] reports live heap bytes; dropping it writes
/// `dhat-heap.json`.
#[cfg(feature = "memory_profiling")]
pub struct HeapProfiler {
    _profiler: dhat::Profiler,
}

#[cfg(feature = "memory_profiling")]
impl HeapProfiler {
    /// Start heap profiling. Only one profiler can be active at a time.
    pub fn start() -> Self {
        let profiler = dhat::Profiler::new_heap();
        HEAP_PROFILING.store(true, Ordering::Release);
        Self {
            _profiler: profiler,
        }
    }

    pub fn is_running() -> bool {
        HEAP_PROFILING.load(Ordering::Acquire)
    }
}

#[cfg(feature = "memory_profiling")]
impl Drop for HeapProfiler {
    fn drop(&mut self) {
        HEAP_PROFILING.store(false, Ordering::Release);
    }
}

/// Live heap bytes from dhat; `None` while no [`HeapProfiler`] runs
#[cfg(feature = "memory_profiling")]
#[derive(Debug, Default, Clone, Copy)]
pub struct DhatMemoryProbe;

#[cfg(feature = "memory_profiling")]
impl MemoryProbe for DhatMemoryProbe {
    fn used_bytes(&self) -> Option<u64> {
        if !HeapProfiler::is_running() {
            return None;
        }
        Some(dhat::HeapStats::get().curr_bytes as u64)
    }
}

/// Heap probe with the `memory_profiling` feature, resident memory otherwise
pub fn default_memory_probe() -> Box<dyn MemoryProbe + Send + Sync> {
    #[cfg(feature = "memory_profiling")]
    {
        Box::new(DhatMemoryProbe)
    }
    #[cfg(not(feature = "memory_profiling"))]
    {
        Box::new(ResidentMemoryProbe)
    }
}

/// Parse `VmRSS:   123456 kB` into bytes
#[cfg_attr(not(any(target_os = "linux", target_os = "android")), allow(dead_code))]
fn parse_vm_rss(status: &str) -> Option<u64> {
    status.lines().find_map(|line| {
        let rest = line.strip_prefix("VmRSS:")?;
        let kb: u64 = rest.split_whitespace().next()?.parse().ok()?;
        Some(kb * 1024)
    })
}

/// Bytes to mebibytes
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}
