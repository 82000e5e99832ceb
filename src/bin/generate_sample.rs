use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

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

/// Salary band and points-per-thousand for one role sheet.
struct RoleProfile {
    sheet: &'static str,
    prefix: &'static str,
    count: usize,
    salary_range: (f64, f64),
    points_per_k: f64,
}

const PROFILES: [RoleProfile; 3] = [
    RoleProfile { sheet: "Jockeys", prefix: "J", count: 24, salary_range: (8_000.0, 22_000.0), points_per_k: 2.4 },
    RoleProfile { sheet: "Trainers", prefix: "T", count: 18, salary_range: (6_000.0, 18_000.0), points_per_k: 1.8 },
    RoleProfile { sheet: "Sires", prefix: "S", count: 12, salary_range: (4_000.0, 12_000.0), points_per_k: 1.2 },
];

/// Write one meeting workbook. `sheets` limits which role sheets are written.
fn write_meeting(path: &Path, rng: &mut SimpleRng, noise: f64, sheets: &[&str]) -> Result<()> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    for profile in PROFILES.iter().filter(|p| sheets.contains(&p.sheet)) {
        let ws = workbook.add_worksheet();
        ws.set_name(profile.sheet)?;
        for (col, header) in ["Name", "Final_Salary", "Total_Points", "Starts"].iter().enumerate() {
            ws.write_string_with_format(0, col as u16, *header, &bold)?;
        }

        let (lo, hi) = profile.salary_range;
        for i in 0..profile.count {
            let row = i as u32 + 1;
            let salary = ((lo + rng.next_f64() * (hi - lo)) / 100.0).round() * 100.0;
            let points = (salary / 1000.0 * profile.points_per_k + rng.gauss(0.0, noise)).max(0.0);
            let starts = 1 + (rng.next_u64() % 6) as u32;

            ws.write_string(row, 0, format!("{} {:02}", profile.prefix, i + 1))?;
            ws.write_number(row, 1, salary)?;
            // Leave an occasional gap, as real exports do.
            if i % 11 != 10 {
                ws.write_number(row, 2, points.round())?;
            }
            ws.write_number(row, 3, starts)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("samples"));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let all = ["Jockeys", "Trainers", "Sires"];

    write_meeting(&out_dir.join("meeting_tight.xlsx"), &mut rng, 3.0, &all)?;
    write_meeting(&out_dir.join("meeting_loose.xlsx"), &mut rng, 15.0, &all)?;
    // Missing the Sires sheet: rejected at ingestion.
    write_meeting(&out_dir.join("meeting_no_sires.xlsx"), &mut rng, 5.0, &all[..2])?;

    Ok(())
}
