use hetexec::{ContextConfig, DeviceExecutionContext, ExecutionContext, InfoDevice};
use tracing::warn;
use tracing_subscriber::EnvFilter;

fn print_device(label: &str, info: &InfoDevice) {
    println!("{}: {}", label, info.name);
    println!("  cpu:                 {}", info.is_cpu);
    println!("  max work-group size: {}", info.max_work_group_size);
    println!("  max allocation:      {} bytes", info.max_mem_alloc_size);
    println!("  global memory:       {} bytes", info.global_mem_size);
    println!("  local memory:        {} bytes", info.local_mem_size);
    if info.compute_units > 0 {
        println!("  compute units:       {}", info.compute_units);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let context = DeviceExecutionContext::new(ContextConfig::default())?;
    print_device("reference device", &context.info_device());

    // Adapters are informational, a missing Vulkan loader is not fatal.
    match InfoDevice::vulkan_adapters() {
        Ok(adapters) if adapters.is_empty() => println!("no Vulkan adapters found"),
        Ok(adapters) => {
            for (i, adapter) in adapters.iter().enumerate() {
                print_device(&format!("vulkan adapter {}", i), adapter);
            }
        }
        Err(status) => warn!(%status, "Vulkan adapters unavailable"),
    }

    Ok(())
}
