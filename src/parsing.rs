//! Kubernetes resource quantity parsing, used only for the end-of-run summary.
//! Samples and output rows keep the raw strings.

// Divisors down to millicores.
const CPU_SUFFIXES: &[(&str, i64)] = &[("n", 1_000_000), ("u", 1_000), ("m", 1)];

const MEMORY_SUFFIXES: &[(&str, f64)] = &[
    ("Ki", 1024.0),
    ("Mi", 1_048_576.0),
    ("Gi", 1_073_741_824.0),
    ("Ti", 1_099_511_627_776.0),
    ("Pi", 1_125_899_906_842_624.0),
    ("Ei", 1_152_921_504_606_846_976.0),
    ("m", 1e-3),
    ("k", 1e3),
    ("K", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

fn split_suffix<'a, T: Copy>(q: &'a str, table: &[(&str, T)]) -> (&'a str, Option<T>) {
    for (suffix, factor) in table {
        if let Some(number) = q.strip_suffix(suffix) {
            return (number, Some(*factor));
        }
    }
    (q, None)
}

/// Parses a CPU quantity (`250000000n`, `500u`, `5m`, `0.5`) into millicores.
/// Sub-millicore values are truncated.
pub fn parse_cpu_millicores(q: &str) -> Option<i64> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }
    match split_suffix(q, CPU_SUFFIXES) {
        (number, Some(divisor)) => {
            let value: i64 = number.parse().ok()?;
            Some(value / divisor)
        }
        (number, None) => {
            let cores: f64 = number.parse().ok()?;
            Some((cores * 1000.0).round() as i64)
        }
    }
}

/// Parses a memory quantity (`128Mi`, `1G`, `4096`) into bytes.
pub fn parse_memory_bytes(q: &str) -> Option<i64> {
    let q = q.trim();
    if q.is_empty() {
        return None;
    }
    let (number, factor) = split_suffix(q, MEMORY_SUFFIXES);
    let value: f64 = number.parse().ok()?;
    Some((value * factor.unwrap_or(1.0)).round() as i64)
}
