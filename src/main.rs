use std::error::Error;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};
// For sampling the training and test sets
use rand::{rngs::SmallRng, SeedableRng};

use bitmap_knn::bitmap::DatasetKind;
use bitmap_knn::classifier::{CandidateKs, MultiKClassifier};
use bitmap_knn::distance::{Euclidean, Manhattan, Metric, SquaredEuclidean};
use bitmap_knn::evaluation::{evaluate, evaluate_parallel};
use bitmap_knn::report::{render_sample, write_predictions, Report};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MetricArg {
    SquaredEuclidean,
    Euclidean,
    Manhattan,
}

impl MetricArg {
    fn build(self) -> Box<dyn Metric> {
        match self {
            MetricArg::SquaredEuclidean => Box::new(SquaredEuclidean),
            MetricArg::Euclidean => Box::new(Euclidean),
            MetricArg::Manhattan => Box::new(Manhattan),
        }
    }
}

/// Classify ASCII-art digit and face images with k-nearest neighbors
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Which image collection to use
    dataset: DatasetKind,

    /// Percent of the training data to use (ex: 15.5)
    #[arg(short, long, default_value_t = 100.0)]
    percent: f64,

    /// k values to test, separated by commas (ex: '35,20,15,1'); defaults to 1 for digits, 5 for faces
    #[arg(short = 'k', long = "kvals", value_delimiter = ',')]
    kvals: Vec<usize>,

    /// Append results to the knn_test_results_<dataset> file
    #[arg(short, long)]
    file: bool,

    /// Test on a random subset of 4 samples and draw them
    #[arg(short, long)]
    samples: bool,

    /// Print progress messages
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding digitdata/ and facedata/
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Seed for the sampling RNG
    #[arg(long, default_value_t = 0)]
    seed: u64,

    #[arg(long, value_enum, default_value_t = MetricArg::SquaredEuclidean)]
    metric: MetricArg,

    /// Spread the test set over all cores
    #[arg(long)]
    parallel: bool,

    /// Write every headline guess to this CSV file
    #[arg(long)]
    predictions: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let level = if args.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_target(false)
        .init();

    let mut rng = SmallRng::seed_from_u64(args.seed);

    // Largest k first, so the smallest one is the headline guess
    let mut kvals = args.kvals.clone();
    if kvals.is_empty() {
        kvals.push(args.dataset.default_k());
    }
    kvals.sort_unstable_by(|a, b| b.cmp(a));
    let ks = CandidateKs::new(kvals)?;

    // Load the images and labels
    info!("Getting data...");
    let now = Instant::now();
    let (training, test) = args.dataset.load(&args.data_dir)?;
    info!(
        "Loaded {} training and {} test examples [{}ms]",
        training.len(),
        test.len(),
        now.elapsed().as_millis()
    );

    let training = training.sample_fraction(args.percent, &mut rng)?;
    let test = if args.samples {
        test.sample_count(4, &mut rng)?
    } else {
        test
    };

    info!("Training KNN model...");
    let training_size = training.len();
    let classifier = MultiKClassifier::new(training, ks, args.metric.build())?;
    info!("Done!");

    // Classify the test data and count correct guesses for every k
    info!("Testing on {:.2}% of training data", args.percent);
    let now = Instant::now();
    let tracker = if args.parallel {
        evaluate_parallel(&classifier, &test)?
    } else {
        // No progress milestones for the handful of samples
        evaluate(&classifier, &test, !args.samples)?
    };
    let testing_time = now.elapsed();
    info!("Done!");

    if args.samples {
        for (example, outcome) in test.iter().zip(tracker.outcomes()) {
            println!("{}", render_sample(&example.vector, args.dataset.width(), outcome));
        }
    }

    if let Some(path) = &args.predictions {
        write_predictions(BufWriter::new(File::create(path)?), tracker.outcomes())?;
        info!("Wrote predictions to {}", path.display());
    }

    let report = Report::new(&tracker, args.percent, training_size, testing_time);
    if args.file {
        let filename = format!("knn_test_results_{}", args.dataset);
        let mut file = OpenOptions::new().create(true).append(true).open(&filename)?;
        report.write_to(&mut file)?;
        writeln!(file, "\n")?;
        println!("Printed results to file {}", filename);
    } else {
        println!("\n\nResults:");
        report.write_to(&mut io::stdout().lock())?;
    }

    info!("Accuracy of chosen k: {:.2}%", report.chosen_percent());
    Ok(())
}
