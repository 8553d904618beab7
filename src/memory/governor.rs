use std::fs;
use std::mem::MaybeUninit;

/// Tracks resident memory and decides when the in-memory partial index must
/// spill. A fractional budget is resolved to an absolute byte
/// limit once, at construction; `None` falls back to host-available memory,
/// re-read on every call since availability changes as the process runs.
pub struct MemoryGovernor {
    limit: Option<u64>,
}

impl MemoryGovernor {
    pub fn new(budget_fraction: Option<f64>) -> Self {
        let limit = budget_fraction.map(|fraction| (total_memory_bytes() as f64 * fraction) as u64);
        MemoryGovernor { limit }
    }

    /// Resident set size of the current process, in bytes.
    pub fn current_usage(&self) -> u64 {
        resident_set_size()
    }

    pub fn can_afford(&self, extra_bytes: u64) -> bool {
        let projected = self.current_usage() + extra_bytes;
        match self.limit {
            Some(limit) => projected < limit,
            None => projected < available_memory_bytes(),
        }
    }

    /// Given the memory delta observed after ingesting a probe batch of
    /// `probe_batch_size` documents, find the largest inflation factor `f`
    /// (searched in steps of 0.05 down from 1.0) such that affording
    /// `delta * (1 + f)` more still holds, and return the inflated batch
    /// size. Mirrors `examples/original_source/indexer.py::check_max_iter`.
    pub fn inflate_batch_size(&self, probe_batch_size: usize, memory_delta: u64) -> usize {
        let mut factor = 1.0f64;
        while factor >= 0.05 {
            let extra = (memory_delta as f64 * (1.0 + factor)) as u64;
            if self.can_afford(extra) {
                let inflated = probe_batch_size as f64 * (1.0 + factor);
                return inflated as usize;
            }
            factor -= 0.05;
        }
        probe_batch_size
    }
}

#[cfg(target_os = "linux")]
fn resident_set_size() -> u64 {
    let mut usage = MaybeUninit::<libc::rusage>::zeroed();
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if rc != 0 {
        return 0;
    }
    // On Linux, ru_maxrss is reported in kilobytes.
    let usage = unsafe { usage.assume_init() };
    usage.ru_maxrss as u64 * 1024
}

#[cfg(not(target_os = "linux"))]
fn resident_set_size() -> u64 {
    let mut usage = MaybeUninit::<libc::rusage>::zeroed();
    let rc = unsafe { libc::getrusage(libc::RUSAGE_SELF, usage.as_mut_ptr()) };
    if rc != 0 {
        return 0;
    }
    let usage = unsafe { usage.assume_init() };
    usage.ru_maxrss as u64
}

fn total_memory_bytes() -> u64 {
    unsafe {
        let pages = libc::sysconf(libc::_SC_PHYS_PAGES);
        let page_size = libc::sysconf(libc::_SC_PAGE_SIZE);
        if pages <= 0 || page_size <= 0 {
            return u64::MAX;
        }
        pages as u64 * page_size as u64
    }
}

#[cfg(target_os = "linux")]
fn available_memory_bytes() -> u64 {
    let Ok(contents) = fs::read_to_string("/proc/meminfo") else {
        return total_memory_bytes();
    };
    for line in contents.lines() {
        if let Some(rest) = line.strip_prefix("MemAvailable:") {
            let kb: u64 = rest.trim().trim_end_matches(" kB").trim().parse().unwrap_or(0);
            return kb * 1024;
        }
    }
    total_memory_bytes()
}

#[cfg(not(target_os = "linux"))]
fn available_memory_bytes() -> u64 {
    total_memory_bytes()
}
