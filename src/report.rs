use std::io::Write;
use std::time::Duration;

use crate::dataset::FeatureVector;
use crate::evaluation::{EvaluationTracker, Outcome};
use crate::{Pixel, Result};

// Summary of one evaluation run
#[derive(Debug, Clone)]
pub struct Report {
    pub training_percent: f64,
    pub training_size: usize,
    pub test_size: usize,
    pub counts: Vec<(usize, usize)>,
    pub chosen_k: usize,
    pub testing_time: Duration,
}

impl Report {
    pub fn new(
        tracker: &EvaluationTracker,
        training_percent: f64,
        training_size: usize,
        testing_time: Duration,
    ) -> Self {
        Report {
            training_percent,
            training_size,
            test_size: tracker.evaluated(),
            counts: tracker.counts().to_vec(),
            chosen_k: tracker.best_k(),
            testing_time,
        }
    }

    pub fn chosen_count(&self) -> usize {
        self.counts
            .iter()
            .find(|(k, _)| *k == self.chosen_k)
            .map_or(0, |(_, count)| *count)
    }

    // Accuracy of the chosen k, in percent
    pub fn chosen_percent(&self) -> f64 {
        if self.test_size == 0 {
            return 0.0;
        }
        self.chosen_count() as f64 / self.test_size as f64 * 100.0
    }

    // Write the summary block. The per-k lines only appear when several k were tried.
    pub fn write_to(&self, out: &mut impl Write) -> Result<()> {
        writeln!(
            out,
            "{:.1}% [{} training, {} testing]",
            self.training_percent, self.training_size, self.test_size
        )?;
        if self.counts.len() > 1 {
            let by_k: Vec<String> = self
                .counts
                .iter()
                .map(|(k, count)| format!("{}: {}", k, count))
                .collect();
            writeln!(out, "Correct Guesses by k-value: {{{}}}", by_k.join(", "))?;
            writeln!(out, "Chosen k-value: {}", self.chosen_k)?;
        }
        writeln!(
            out,
            "{} correct out of {} ({:.2}%).",
            self.chosen_count(),
            self.test_size,
            self.chosen_percent()
        )?;
        let seconds = self.testing_time.as_secs_f64();
        let per_sample = if self.test_size == 0 {
            0.0
        } else {
            seconds / self.test_size as f64
        };
        writeln!(out, "Testing duration : {:.2} seconds", seconds)?;
        writeln!(out, "Testing Time per Test Sample: {:.2} seconds", per_sample)?;
        Ok(())
    }
}

// CSV of every test example's headline guess next to its true label
pub fn write_predictions(out: impl Write, outcomes: &[Outcome]) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["index", "predicted", "actual"])?;
    for (i, outcome) in outcomes.iter().enumerate() {
        writer.write_record([
            i.to_string(),
            outcome.predicted.to_string(),
            outcome.actual.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn pixel_char(pixel: Pixel) -> char {
    match pixel {
        1 => '+',
        2 => '#',
        _ => ' ',
    }
}

// Draw an image back as text under its guess/actual caption
pub fn render_sample(vector: &FeatureVector, width: usize, outcome: &Outcome) -> String {
    let mut text = format!("Guess: {} Actual: {}\n", outcome.predicted, outcome.actual);
    for row in vector.chunks(width.max(1)) {
        text.extend(row.iter().map(|&p| pixel_char(p)));
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(counts: Vec<(usize, usize)>, chosen_k: usize) -> Report {
        Report {
            training_percent: 50.0,
            training_size: 2500,
            test_size: 4,
            counts,
            chosen_k,
            testing_time: Duration::from_millis(2000),
        }
    }

    #[test]
    fn test_single_k_report() {
        let mut out = Vec::new();
        report(vec![(1, 3)], 1).write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "50.0% [2500 training, 4 testing]\n\
             3 correct out of 4 (75.00%).\n\
             Testing duration : 2.00 seconds\n\
             Testing Time per Test Sample: 0.50 seconds\n"
        );
    }

    #[test]
    fn test_multi_k_report() {
        let mut out = Vec::new();
        report(vec![(5, 2), (1, 4)], 1).write_to(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Correct Guesses by k-value: {5: 2, 1: 4}\n"));
        assert!(text.contains("Chosen k-value: 1\n"));
        assert!(text.contains("4 correct out of 4 (100.00%)."));
    }

    #[test]
    fn test_write_predictions() {
        let outcomes = [
            Outcome {
                predicted: 3,
                actual: 3,
            },
            Outcome {
                predicted: 8,
                actual: 0,
            },
        ];
        let mut out = Vec::new();
        write_predictions(&mut out, &outcomes).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "index,predicted,actual\n0,3,3\n1,8,0\n"
        );
    }

    #[test]
    fn test_render_sample() {
        let vector = FeatureVector::new(vec![0, 1, 2, 2, 1, 0]).unwrap();
        let outcome = Outcome {
            predicted: 1,
            actual: 0,
        };
        assert_eq!(
            render_sample(&vector, 3, &outcome),
            "Guess: 1 Actual: 0\n +#\n#+ \n"
        );
    }
}
