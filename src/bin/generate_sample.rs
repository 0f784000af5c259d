use std::path::PathBuf;

use anyhow::{Context, Result};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// One simulated bench measurement.
struct Reading {
    time_s: f64,
    temperature: f64,
    voltage: f64,
    operator: &'static str,
}

fn simulate(rng: &mut SimpleRng, n: usize) -> Vec<Reading> {
    let operators = ["Alice", "Bob"];
    (0..n)
        .map(|i| {
            let t = i as f64 * 0.5;
            Reading {
                time_s: t,
                // Linear heating with sensor noise.
                temperature: 20.0 + 0.8 * t + rng.gauss(0.0, 0.3),
                // Quadratic response.
                voltage: 0.05 * t * t - 0.4 * t + 1.2 + rng.gauss(0.0, 0.05),
                operator: operators[i % operators.len()],
            }
        })
        .collect()
}

/// Rows joined by `sep`, header first.
fn render(readings: &[Reading], sep: &str) -> String {
    let mut out = ["time_s", "temperature", "voltage", "operator"].join(sep);
    out.push('\n');
    for r in readings {
        out.push_str(&format!(
            "{:.1}{sep}{:.3}{sep}{:.4}{sep}{}\n",
            r.time_s, r.temperature, r.voltage, r.operator
        ));
    }
    out
}

fn main() -> Result<()> {
    env_logger::init();

    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_data"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let readings = simulate(&mut rng, 40);

    // Clean comma-separated export.
    let clean = out_dir.join("bench_clean.csv");
    let mut writer = csv::Writer::from_path(&clean).context("creating clean CSV")?;
    writer.write_record(["time_s", "temperature", "voltage", "operator"])?;
    for r in &readings {
        writer.write_record([
            format!("{:.1}", r.time_s),
            format!("{:.3}", r.temperature),
            format!("{:.4}", r.voltage),
            r.operator.to_string(),
        ])?;
    }
    writer.flush()?;

    // Tab-separated export saved with a .csv name.
    let tabbed = out_dir.join("bench_tabs.csv");
    std::fs::write(&tabbed, render(&readings, "\t")).context("writing tab CSV")?;

    // Export whose tabs were escaped to literal `\t` upstream.
    let escaped = out_dir.join("bench_escaped.csv");
    std::fs::write(&escaped, render(&readings, "\\t")).context("writing escaped CSV")?;

    println!(
        "Wrote {} readings to {}, {} and {}",
        readings.len(),
        clean.display(),
        tabbed.display(),
        escaped.display()
    );
    Ok(())
}
