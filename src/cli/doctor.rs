//! Environment readiness check.

use crate::audit;
use crate::renderer::chromium::find_chromium;
use anyhow::Result;

/// Check Chromium availability, harvest log location, and available memory.
pub async fn run() -> Result<()> {
    println!("Partfetch Doctor");
    println!("================");
    println!();

    // OS and architecture
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    // Check Chromium
    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install Chrome or set PARTFETCH_CHROMIUM_PATH."
        ),
    }

    // Check harvest log location
    let log_path = audit::default_log_path();
    match log_path.parent() {
        Some(parent) if parent.exists() => {
            println!("[OK] Harvest log directory exists: {}", parent.display());
        }
        Some(parent) => {
            println!(
                "[--] Harvest log directory will be created at {}",
                parent.display()
            );
        }
        None => println!("[??] Harvest log path has no parent: {}", log_path.display()),
    }

    // Check available memory
    match get_available_memory_mb() {
        Some(mb) => {
            if mb >= 512 {
                println!("[OK] Available memory: {mb}MB (>= 512MB required for Chromium)");
            } else {
                println!("[!!] Available memory: {mb}MB (< 512MB, Chromium may not start)");
            }
        }
        None => println!("[??] Could not determine available memory"),
    }

    println!();
    if chromium_path.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
        println!("  Install Google Chrome or point PARTFETCH_CHROMIUM_PATH at a Chromium binary.");
    }

    Ok(())
}

/// Get available memory in MB (platform-specific).
fn get_available_memory_mb() -> Option<u64> {
    #[cfg(target_os = "linux")]
    {
        let meminfo = std::fs::read_to_string("/proc/meminfo").ok()?;
        for line in meminfo.lines() {
            if let Some(rest) = line.strip_prefix("MemAvailable:") {
                let kb: u64 = rest.trim().trim_end_matches(" kB").trim().parse().ok()?;
                return Some(kb / 1024);
            }
        }
        None
    }
    #[cfg(target_os = "macos")]
    {
        let output = std::process::Command::new("sysctl")
            .args(["-n", "hw.memsize"])
            .output()
            .ok()?;
        let s = String::from_utf8_lossy(&output.stdout);
        let bytes: u64 = s.trim().parse().ok()?;
        Some(bytes / 1_048_576)
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        None
    }
}
