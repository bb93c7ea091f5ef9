//! Synthetic admission records.
//!
//! Used by `hdash demo` to produce a realistic CSV without a database, and by
//! tests that need a dataset larger than a handful of hand-written rows.
//! Output is fully determined by `(count, seed, start)`.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::{LogNormal, Normal};

use crate::domain::{Insurance, Record};
use crate::error::AppError;

const DOCTORS: [&str; 6] = [
    "Dr. Mehta",
    "Dr. Rao",
    "Dr. Iyer",
    "Dr. Kapoor",
    "Dr. Singh",
    "Dr. Das",
];

const BED_TYPES: [&str; 3] = ["General", "Private", "ICU"];

/// Diagnosis, typical test, and median bill (INR).
const DIAGNOSES: [(&str, &str, f64); 6] = [
    ("Viral Infection", "Blood Test", 8_000.0),
    ("Fracture", "X-Ray", 25_000.0),
    ("Pneumonia", "CT Scan", 40_000.0),
    ("Typhoid", "Widal Test", 12_000.0),
    ("Malaria", "Blood Smear", 10_000.0),
    ("Flu", "Blood Test", 6_000.0),
];

/// Admission dates span this many days from the start date.
const DATE_SPAN_DAYS: i64 = 365;

/// Share of records billed through insurance.
const INSURED_SHARE: f64 = 0.6;

/// Generate `count` synthetic records starting at `start`.
pub fn generate_sample(count: usize, seed: u64, start: NaiveDate) -> Result<Vec<Record>, AppError> {
    if count == 0 {
        return Err(AppError::usage("Sample count must be > 0."));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let bill_noise = LogNormal::new(0.0, 0.35)
        .map_err(|e| AppError::usage(format!("Billing distribution error: {e}")))?;
    let feedback_noise =
        Normal::new(0.0, 0.8).map_err(|e| AppError::usage(format!("Feedback distribution error: {e}")))?;

    let mut records = Vec::with_capacity(count);
    for i in 0..count {
        let admit_date = start + Duration::days(rng.gen_range(0..DATE_SPAN_DAYS));

        let (diagnosis, test, median_bill) = DIAGNOSES[rng.gen_range(0..DIAGNOSES.len())];
        let bed_idx = rng.gen_range(0..BED_TYPES.len());
        let bed = BED_TYPES[bed_idx];
        let doctor = DOCTORS[rng.gen_range(0..DOCTORS.len())];

        // Sicker patients land in better-equipped beds and stay longer.
        let stay = rng.gen_range(1..=4) + 3 * bed_idx as i64;
        let discharge_date = admit_date + Duration::days(stay);

        let bed_factor = 1.0 + 0.5 * bed_idx as f64;
        let billing = (median_bill * bed_factor * bill_noise.sample(&mut rng) + 1_500.0 * stay as f64).round();

        let insurance = if rng.r#gen::<f64>() < INSURED_SHARE {
            Insurance::Amount((billing * rng.gen_range(0.5..0.9)).round())
        } else {
            Insurance::Amount(0.0)
        };

        let feedback = (4.0 - 0.3 * bed_idx as f64 + feedback_noise.sample(&mut rng))
            .round()
            .clamp(1.0, 5.0);

        records.push(Record {
            patient_id: format!("P{:05}", i + 1),
            admit_date,
            discharge_date: Some(discharge_date),
            doctor: Some(doctor.to_string()),
            diagnosis: Some(diagnosis.to_string()),
            bed_occupancy: Some(bed.to_string()),
            test: Some(test.to_string()),
            billing_amount: Some(billing),
            health_insurance: Some(insurance),
            feedback: Some(feedback),
            length_of_stay: Some(stay as f64),
        });
    }

    Ok(records)
}
