//! Parsing of Kubernetes resource quantity strings.

use crate::{Error, Result};

const MIB: f64 = 1024.0 * 1024.0;

/// Parse a quantity (`"250m"`, `"1.5"`, `"512Mi"`, `"1G"`, `"1e3"`) into its
/// value in base units (cores or bytes).
pub fn parse_quantity(raw: &str) -> Result<f64> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
        .unwrap_or(raw.len());
    let (number, suffix) = raw.split_at(split);

    let multiplier = match suffix {
        "" => 1.0,
        "n" => 1e-9,
        "u" => 1e-6,
        "m" => 1e-3,
        "k" => 1e3,
        "M" => 1e6,
        "G" => 1e9,
        "T" => 1e12,
        "P" => 1e15,
        "Ki" => 1024.0,
        "Mi" => MIB,
        "Gi" => MIB * 1024.0,
        "Ti" => MIB * 1024.0 * 1024.0,
        "Pi" => MIB * 1024.0 * 1024.0 * 1024.0,
        "Ei" => MIB * 1024.0 * 1024.0 * 1024.0 * 1024.0,
        other => {
            return Err(Error::collector(format!(
                "unknown quantity suffix '{other}' in '{raw}'"
            )));
        }
    };

    let value: f64 = number
        .parse()
        .map_err(|_| Error::collector(format!("invalid quantity '{raw}'")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(Error::collector(format!("invalid quantity '{raw}'")));
    }

    Ok(value * multiplier)
}

/// CPU quantity in millicores.
pub fn cpu_millicores(raw: &str) -> Result<u64> {
    Ok((parse_quantity(raw)? * 1000.0).round() as u64)
}

/// Memory quantity in mebibytes.
pub fn memory_mib(raw: &str) -> Result<u64> {
    Ok((parse_quantity(raw)? / MIB).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_quantities() {
        assert_eq!(cpu_millicores("250m").unwrap(), 250);
        assert_eq!(cpu_millicores("1").unwrap(), 1000);
        assert_eq!(cpu_millicores("0.5").unwrap(), 500);
        assert_eq!(cpu_millicores("150000000n").unwrap(), 150);
        assert_eq!(cpu_millicores("2000u").unwrap(), 2);
    }

    #[test]
    fn test_memory_quantities() {
        assert_eq!(memory_mib("512Mi").unwrap(), 512);
        assert_eq!(memory_mib("1Gi").unwrap(), 1024);
        assert_eq!(memory_mib("1048576Ki").unwrap(), 1024);
        assert_eq!(memory_mib("1G").unwrap(), 954);
        assert_eq!(memory_mib("134217728").unwrap(), 128);
        assert_eq!(memory_mib("1e9").unwrap(), 954);
    }

    #[test]
    fn test_rejects_malformed_quantities() {
        assert!(parse_quantity("").is_err());
        assert!(parse_quantity("abc").is_err());
        assert!(parse_quantity("12Qi").is_err());
        assert!(parse_quantity("-1").is_err());
    }
}
