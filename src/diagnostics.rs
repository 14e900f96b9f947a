use sysinfo::System;
use tracing::info;

pub struct SystemDiagnostics;

impl SystemDiagnostics {
    pub fn log_startup_info() {
        let mut sys = System::new_all();
        sys.refresh_all();

        let unknown = || "unknown".to_string();
        info!(
            os = %System::name().unwrap_or_else(unknown),
            version = %System::os_version().unwrap_or_default(),
            kernel = %System::kernel_version().unwrap_or_else(unknown),
            host = %System::host_name().unwrap_or_else(unknown),
            "system"
        );

        let cpus = sys.cpus();
        if let Some(cpu) = cpus.first() {
            info!(brand = cpu.brand().trim(), logical_cores = cpus.len(), "cpu");
        }

        let gib = |bytes: u64| format!("{:.2}", bytes as f64 / 1024.0 / 1024.0 / 1024.0);
        info!(used_gib = %gib(sys.used_memory()), total_gib = %gib(sys.total_memory()), "memory");
        info!(threads = rayon::current_num_threads(), "mesh worker pool");
    }

    /// Called once the adapter is picked.
    pub fn log_gpu(info: &wgpu::AdapterInfo) {
        info!(
            name = %info.name,
            backend = ?info.backend,
            driver = %info.driver,
            vendor = info.vendor,
            "gpu"
        );
    }
}
