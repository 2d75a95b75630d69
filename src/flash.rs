// SPDX-License-Identifier: GPL-3.0-only

//! Flash control
//!
//! The flash is a toggle on the camera body. When enabled, every accepted
//! shutter press fires a short full-surface flash pulse on screen and, on
//! devices that expose them, lights the flash LEDs at
//! `/sys/class/leds/*:flash` for the duration of the pulse.

use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const LEDS_DIR: &str = "/sys/class/leds";

/// A flash LED discovered via sysfs
#[derive(Debug, Clone)]
pub struct FlashLed {
    /// Sysfs path, e.g. `/sys/class/leds/white:flash`
    path: PathBuf,
    max_brightness: u32,
    name: String,
}

impl FlashLed {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn set_brightness(&self, value: u32) -> io::Result<()> {
        std::fs::write(
            self.path.join("brightness"),
            value.min(self.max_brightness).to_string(),
        )
    }
}

/// Scan a sysfs LED directory for writable `*:flash` entries
///
/// LEDs whose brightness file cannot be opened for writing are skipped; the
/// second value counts them so the caller can explain the missing flash.
pub fn discover_leds(leds_dir: &Path) -> (Vec<FlashLed>, usize) {
    let Ok(entries) = std::fs::read_dir(leds_dir) else {
        debug!(dir = %leds_dir.display(), "No LED class directory");
        return (Vec::new(), 0);
    };

    let mut leds = Vec::new();
    let mut not_writable = 0;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.ends_with(":flash") {
            continue;
        }
        let path = entry.path();

        let max_brightness = match std::fs::read_to_string(path.join("max_brightness"))
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
        {
            Some(v) if v > 0 => v,
            _ => {
                warn!(led = %name, "Invalid or unreadable max_brightness");
                continue;
            }
        };

        if let Err(e) = std::fs::OpenOptions::new()
            .write(true)
            .open(path.join("brightness"))
        {
            warn!(led = %name, error = %e, "Flash LED found but not writable");
            not_writable += 1;
            continue;
        }

        info!(led = %name, max_brightness, "Discovered flash LED");
        leds.push(FlashLed {
            path,
            max_brightness,
            name,
        });
    }

    leds.sort_by(|a, b| a.name.cmp(&b.name));
    (leds, not_writable)
}

/// Flash toggle plus any hardware LEDs
#[derive(Debug, Default)]
pub struct Flash {
    enabled: bool,
    leds: Vec<FlashLed>,
    lit: bool,
}

impl Flash {
    /// Flash with LEDs discovered from sysfs
    pub fn detect(enabled: bool) -> Self {
        let (leds, not_writable) = discover_leds(Path::new(LEDS_DIR));
        if leds.is_empty() && not_writable > 0 {
            warn!(
                count = not_writable,
                "Flash LEDs present but not controllable; on-screen flash only"
            );
        }
        Self::with_leds(enabled, leds)
    }

    pub fn with_leds(enabled: bool, leds: Vec<FlashLed>) -> Self {
        Self {
            enabled,
            leds,
            lit: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Flip the toggle and return the new state
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        if !self.enabled {
            self.release();
        }
        self.enabled
    }

    pub fn has_leds(&self) -> bool {
        !self.leds.is_empty()
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }

    /// Light every LED at full brightness
    pub fn fire(&mut self) {
        if !self.enabled || self.lit {
            return;
        }
        for led in &self.leds {
            if let Err(e) = led.set_brightness(led.max_brightness) {
                warn!(led = %led.name, error = %e, "Failed to light flash LED");
            }
        }
        self.lit = true;
    }

    /// Turn every LED off
    pub fn release(&mut self) {
        if !self.lit {
            return;
        }
        for led in &self.leds {
            if let Err(e) = led.set_brightness(0) {
                warn!(led = %led.name, error = %e, "Failed to turn off flash LED");
            }
        }
        self.lit = false;
    }
}

impl Drop for Flash {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_sysfs() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("retrocam-leds-{}", uuid::Uuid::new_v4()));
        let led = dir.join("white:flash");
        std::fs::create_dir_all(&led).unwrap();
        std::fs::write(led.join("max_brightness"), "255\n").unwrap();
        std::fs::write(led.join("brightness"), "0\n").unwrap();
        std::fs::create_dir_all(dir.join("input0::capslock")).unwrap();
        dir
    }

    #[test]
    fn test_discovers_only_flash_leds() {
        let dir = fake_sysfs();
        let (leds, not_writable) = discover_leds(&dir);
        assert_eq!(leds.len(), 1);
        assert_eq!(leds[0].name(), "white:flash");
        assert_eq!(not_writable, 0);
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_fire_and_release_write_brightness() {
        let dir = fake_sysfs();
        let (leds, _) = discover_leds(&dir);
        let mut flash = Flash::with_leds(true, leds);

        flash.fire();
        let level = std::fs::read_to_string(dir.join("white:flash/brightness")).unwrap();
        assert_eq!(level, "255");

        flash.release();
        let level = std::fs::read_to_string(dir.join("white:flash/brightness")).unwrap();
        assert_eq!(level, "0");
        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_disabled_flash_never_lights() {
        let mut flash = Flash::with_leds(false, Vec::new());
        flash.fire();
        assert!(!flash.is_lit());
        assert!(flash.toggle());
        flash.fire();
        assert!(flash.is_lit());
        assert!(!flash.toggle());
        assert!(!flash.is_lit());
    }
}
