use candle_core::Device;
use tracing::info;

/// Metal when the feature is enabled and available, CPU otherwise. The
/// reference deployment is CPU-only.
pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(dev) = Device::new_metal(0) {
            info!("device: Metal (MPS)");
            return dev;
        }
    }
    info!("device: CPU");
    Device::Cpu
}
