// SampleRig - S32K Analog Peripheral Simulation Bench
// Copyright (C) 2026 SampleRig contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Default schema version for YAML configs
fn default_schema_version() -> String {
    "1.0".to_string()
}

fn default_repeat() -> u32 {
    1
}

/// Window size assumed for peripherals whose descriptor omits `size`.
pub const DEFAULT_WINDOW_BYTES: u64 = 0x1000;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PeripheralConfig {
    pub id: String,
    pub r#type: String, // "adc", "sim", "pcc"
    pub base_address: u64,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub irq: Option<u32>,
    #[serde(default)]
    pub config: HashMap<String, serde_yaml::Value>,
}

impl PeripheralConfig {
    pub fn window_bytes(&self) -> u64 {
        self.size.unwrap_or(DEFAULT_WINDOW_BYTES)
    }
}

/// Top-level description of a bench: the set of memory-mapped peripherals a
/// harness drives.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BenchDescriptor {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub name: String,
    pub peripherals: Vec<PeripheralConfig>,
}

impl BenchDescriptor {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read bench descriptor at {:?}", path))?;
        let bench: Self =
            serde_yaml::from_str(&content).context("Failed to parse Bench Descriptor YAML")?;
        bench.validate()?;
        tracing::debug!(
            "Loaded bench descriptor '{}' with {} peripherals",
            bench.name,
            bench.peripherals.len()
        );
        Ok(bench)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != "1.0" {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '1.0'",
                self.schema_version
            );
        }

        if self.peripherals.is_empty() {
            anyhow::bail!("Bench '{}' declares no peripherals", self.name);
        }

        let mut seen = HashSet::new();
        for p in &self.peripherals {
            if p.id.trim().is_empty() {
                anyhow::bail!("Peripheral id cannot be empty");
            }
            if !seen.insert(p.id.as_str()) {
                anyhow::bail!("Duplicate peripheral id '{}'", p.id);
            }
            if p.base_address % 4 != 0 {
                anyhow::bail!(
                    "Peripheral '{}' base address {:#x} is not word aligned",
                    p.id,
                    p.base_address
                );
            }
            if p.window_bytes() == 0 {
                anyhow::bail!("Peripheral '{}' has a zero-sized window", p.id);
            }
        }

        // Overlapping windows would make bus decode order-dependent.
        let mut windows: Vec<(&str, u64, u64)> = self
            .peripherals
            .iter()
            .map(|p| (p.id.as_str(), p.base_address, p.window_bytes()))
            .collect();
        windows.sort_by_key(|w| w.1);
        for pair in windows.windows(2) {
            let (lo_id, lo_base, lo_size) = pair[0];
            let (hi_id, hi_base, _) = pair[1];
            if lo_base + lo_size > hi_base {
                anyhow::bail!(
                    "Peripheral windows '{}' and '{}' overlap ({:#x}+{:#x} > {:#x})",
                    lo_id,
                    hi_id,
                    lo_base,
                    lo_size,
                    hi_base
                );
            }
        }

        Ok(())
    }
}

/// One step of a stimulus script. Steps execute strictly in order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum StimulusStep {
    /// Enqueue `repeat` copies of `value` on one ADC channel.
    Feed {
        peripheral: String,
        channel: u32,
        value: u32,
        #[serde(default = "default_repeat")]
        repeat: u32,
    },
    /// Enqueue a line-oriented sample file, sequence repeated `repeat` times.
    /// Relative paths resolve against the script file's directory.
    FeedFile {
        peripheral: String,
        channel: u32,
        path: String,
        #[serde(default = "default_repeat")]
        repeat: u32,
    },
    Write {
        address: u64,
        value: u32,
    },
    Read {
        address: u64,
    },
    Run {
        cycles: u64,
    },
    Reset,
    /// Read `address` and compare against `value` under `mask` (default all
    /// bits). A mismatch is an expectation failure, not an abort.
    Expect {
        address: u64,
        value: u32,
        #[serde(default)]
        mask: Option<u32>,
    },
    ExpectReady {
        peripheral: String,
        ready: bool,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct StimulusScript {
    pub schema_version: String,
    #[serde(default)]
    pub steps: Vec<StimulusStep>,
}

impl StimulusScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read stimulus script at {:?}", path.as_ref()))?;
        let script: Self =
            serde_yaml::from_str(&content).context("Failed to parse Stimulus Script YAML")?;
        script.validate()?;
        tracing::debug!("Loaded stimulus script with {} steps", script.steps.len());
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != "1.0" {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '1.0'",
                self.schema_version
            );
        }

        if self.steps.is_empty() {
            anyhow::bail!("Stimulus script has no steps");
        }

        for (i, step) in self.steps.iter().enumerate() {
            let n = i + 1;
            match step {
                StimulusStep::Feed {
                    peripheral, repeat, ..
                }
                | StimulusStep::FeedFile {
                    peripheral, repeat, ..
                } => {
                    if peripheral.trim().is_empty() {
                        anyhow::bail!("Step {}: peripheral id cannot be empty", n);
                    }
                    if *repeat == 0 {
                        anyhow::bail!("Step {}: repeat must be at least 1", n);
                    }
                }
                StimulusStep::Run { cycles } => {
                    if *cycles == 0 {
                        anyhow::bail!("Step {}: run cycles must be at least 1", n);
                    }
                }
                StimulusStep::Write { address, .. }
                | StimulusStep::Read { address }
                | StimulusStep::Expect { address, .. } => {
                    if address % 4 != 0 {
                        anyhow::bail!("Step {}: address {:#x} is not word aligned", n, address);
                    }
                }
                StimulusStep::ExpectReady { peripheral, .. } => {
                    if peripheral.trim().is_empty() {
                        anyhow::bail!("Step {}: peripheral id cannot be empty", n);
                    }
                }
                StimulusStep::Reset => {}
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    const BENCH_YAML: &str = r#"
schema_version: "1.0"
name: "s32k148-adc-bench"
peripherals:
  - id: "adc0"
    type: "adc"
    base_address: 0x4003b000
    irq: 39
    config:
      conversion_cycles: 100
  - id: "sim"
    type: "sim"
    base_address: 0x40048000
  - id: "pcc"
    type: "pcc"
    base_address: 0x40065000
    size: 0x200
"#;

    #[test]
    fn test_valid_bench() {
        let bench: BenchDescriptor = serde_yaml::from_str(BENCH_YAML).unwrap();
        assert!(bench.validate().is_ok());
        assert_eq!(bench.name, "s32k148-adc-bench");
        assert_eq!(bench.peripherals.len(), 3);
        assert_eq!(bench.peripherals[0].base_address, 0x4003_b000);
        assert_eq!(bench.peripherals[0].window_bytes(), DEFAULT_WINDOW_BYTES);
        assert_eq!(bench.peripherals[2].window_bytes(), 0x200);
        assert_eq!(bench.peripherals[0].irq, Some(39));
    }

    #[test]
    fn test_duplicate_peripheral_id() {
        let yaml = r#"
name: "dup"
peripherals:
  - id: "adc0"
    type: "adc"
    base_address: 0x40000000
  - id: "adc0"
    type: "adc"
    base_address: 0x40010000
"#;
        let bench: BenchDescriptor = serde_yaml::from_str(yaml).unwrap();
        let err = bench.validate().unwrap_err();
        assert!(err.to_string().contains("Duplicate peripheral id"));
    }

    #[test]
    fn test_overlapping_windows() {
        let yaml = r#"
name: "overlap"
peripherals:
  - id: "adc0"
    type: "adc"
    base_address: 0x40000000
  - id: "adc1"
    type: "adc"
    base_address: 0x40000800
"#;
        let bench: BenchDescriptor = serde_yaml::from_str(yaml).unwrap();
        let err = bench.validate().unwrap_err();
        assert!(err.to_string().contains("overlap"));
    }

    #[test]
    fn test_unaligned_base() {
        let yaml = r#"
name: "unaligned"
peripherals:
  - id: "adc0"
    type: "adc"
    base_address: 0x40000002
"#;
        let bench: BenchDescriptor = serde_yaml::from_str(yaml).unwrap();
        let err = bench.validate().unwrap_err();
        assert!(err.to_string().contains("not word aligned"));
    }

    #[test]
    fn test_invalid_bench_schema_version() {
        let yaml = r#"
schema_version: "2.0"
name: "future"
peripherals:
  - id: "adc0"
    type: "adc"
    base_address: 0x40000000
"#;
        let bench: BenchDescriptor = serde_yaml::from_str(yaml).unwrap();
        let err = bench.validate().unwrap_err();
        assert!(err.to_string().contains("Unsupported schema_version"));
    }

    #[test]
    fn test_valid_script_all_steps() {
        let yaml = r#"
schema_version: "1.0"
steps:
  - feed: { peripheral: "adc0", channel: 3, value: 512 }
  - feed_file: { peripheral: "adc0", channel: 3, path: "ramp.txt", repeat: 2 }
  - write: { address: 0x4003b090, value: 0x40 }
  - write: { address: 0x4003b000, value: 3 }
  - run: { cycles: 100 }
  - read: { address: 0x4003b108 }
  - expect: { address: 0x4003b048, value: 512, mask: 0xfff }
  - expect_ready: { peripheral: "adc0", ready: true }
  - reset
"#;
        let script: StimulusScript = serde_yaml::from_str(yaml).unwrap();
        assert!(script.validate().is_ok());
        assert_eq!(script.steps.len(), 9);
        assert_eq!(
            script.steps[0],
            StimulusStep::Feed {
                peripheral: "adc0".to_string(),
                channel: 3,
                value: 512,
                repeat: 1,
            }
        );
        assert_eq!(script.steps[8], StimulusStep::Reset);
    }

    #[test]
    fn test_script_rejects_unknown_step_field() {
        let yaml = r#"
schema_version: "1.0"
steps:
  - feed: { peripheral: "adc0", channel: 0, value: 1, bogus: 7 }
"#;
        assert!(serde_yaml::from_str::<StimulusScript>(yaml).is_err());
    }

    #[test]
    fn test_script_zero_repeat() {
        let yaml = r#"
schema_version: "1.0"
steps:
  - feed: { peripheral: "adc0", channel: 0, value: 1, repeat: 0 }
"#;
        let script: StimulusScript = serde_yaml::from_str(yaml).unwrap();
        let err = script.validate().unwrap_err();
        assert!(err.to_string().contains("repeat"));
    }

    #[test]
    fn test_script_empty_steps() {
        let yaml = r#"
schema_version: "1.0"
steps: []
"#;
        let script: StimulusScript = serde_yaml::from_str(yaml).unwrap();
        assert!(script.validate().is_err());
    }

    fn write_temp_file(prefix: &str, contents: &str) -> std::path::PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push("samplerig-config-tests");
        let _ = std::fs::create_dir_all(&dir);

        let nonce = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = dir.join(format!("{}-{}.yaml", prefix, nonce));
        std::fs::write(&path, contents).expect("Failed to write temp file");
        path
    }

    #[test]
    fn test_bench_from_file() {
        let path = write_temp_file("bench", BENCH_YAML);
        let bench = BenchDescriptor::from_file(&path).unwrap();
        assert_eq!(bench.peripherals[0].id, "adc0");
        let cycles = bench.peripherals[0]
            .config
            .get("conversion_cycles")
            .and_then(|v| v.as_u64());
        assert_eq!(cycles, Some(100));
    }

    #[test]
    fn test_script_from_file_reports_validation_error() {
        let path = write_temp_file(
            "script-bad",
            r#"
schema_version: "1.0"
steps:
  - run: { cycles: 0 }
"#,
        );
        let err = StimulusScript::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("cycles"));
    }
}
