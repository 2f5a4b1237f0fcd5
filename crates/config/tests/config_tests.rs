// SampleRig - S32K Analog Peripheral Simulation Bench
// Copyright (C) 2026 SampleRig contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use samplerig_config::{BenchDescriptor, DEFAULT_WINDOW_BYTES};

#[test]
fn test_minimal_yaml_still_parses() {
    let yaml = r#"
name: "test-bench"
peripherals:
  - id: "adc0"
    type: "adc"
    base_address: 0x4003b000
"#;
    let desc: BenchDescriptor = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(desc.schema_version, "1.0");
    assert_eq!(desc.peripherals.len(), 1);
    assert_eq!(desc.peripherals[0].id, "adc0");
    assert_eq!(desc.peripherals[0].size, None);
    assert_eq!(desc.peripherals[0].window_bytes(), DEFAULT_WINDOW_BYTES);
    assert_eq!(desc.peripherals[0].irq, None);
    assert!(desc.peripherals[0].config.is_empty());
}

#[test]
fn test_new_fields_parse() {
    let yaml = r#"
name: "test-bench"
peripherals:
  - id: "adc0"
    type: "adc"
    base_address: 0x4003b000
    size: 0x1000
    irq: 39
    config:
      conversion_cycles: 48
"#;
    let desc: BenchDescriptor = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(desc.peripherals.len(), 1);
    assert_eq!(desc.peripherals[0].size, Some(0x1000));
    assert_eq!(desc.peripherals[0].irq, Some(39));
    let cycles = desc.peripherals[0]
        .config
        .get("conversion_cycles")
        .and_then(|v| v.as_u64());
    assert_eq!(cycles, Some(48));
}
