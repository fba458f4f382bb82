use std::ops::Range;
use std::time::Instant;

use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::{Dataset, ImageSet};
use crate::error::{Error, Result};
use crate::train::epoch_stats::EpochStats;
use crate::train::learner::Learner;
use crate::train::metrics::WeightedMean;
use crate::train::train_config::TrainConfig;

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Minibatch index ranges `[start, min(start + batch_size, n))` covering
/// `0..n` exactly once, in order. The last range is short when `batch_size`
/// does not divide `n`.
///
/// # Panics
/// Panics if `batch_size == 0`.
pub fn batch_ranges(n: usize, batch_size: usize) -> impl Iterator<Item = Range<usize>> {
    (0..n).step_by(batch_size).map(move |start| start..(start + batch_size).min(n))
}

/// Trains `learner` for `config.epochs` epochs, then saves it once to
/// `config.output`.
///
/// Each epoch shuffles the training set, runs one `train_step` per minibatch,
/// reports sample-weighted mean loss/accuracy and throughput, then evaluates
/// the test set in stored order with `eval_step`. Returns the statistics of
/// every epoch.
///
/// # Errors
/// Fails before training on a zero batch size or an empty train/test set.
/// Any learner error aborts the run, as does a non-finite training loss;
/// nothing is saved in that case.
pub fn train_loop<L, R>(
    learner: &mut L,
    dataset: &Dataset,
    config: &TrainConfig,
    rng: &mut R,
) -> Result<Vec<EpochStats>>
where
    L: Learner + ?Sized,
    R: Rng + ?Sized,
{
    if config.batch_size == 0 {
        return Err(Error::InvalidConfig("batch size must be at least 1".to_owned()));
    }
    if dataset.train.is_empty() || dataset.test.is_empty() {
        return Err(Error::InvalidConfig(format!(
            "train and test sets must be non-empty (got {} and {} samples)",
            dataset.train.len(),
            dataset.test.len()
        )));
    }

    let mut history = Vec::with_capacity(config.epochs);

    for epoch in 1..=config.epochs {
        println!("epoch {}", epoch);

        // ── One shuffled pass over the training data ──────────────────────
        let perm = shuffled_indices(dataset.train.len(), rng);
        let t_start = Instant::now();
        let train = run_train_epoch(learner, &dataset.train, &perm, config.batch_size, epoch)?;
        let elapsed = t_start.elapsed();
        let throughput = dataset.train.len() as f64 / elapsed.as_secs_f64();

        println!(
            "train mean loss={}, accuracy={}, throughput={} images/sec",
            train.mean_loss(),
            train.mean_accuracy(),
            throughput
        );

        // ── Evaluation ────────────────────────────────────────────────────
        let test = run_eval(learner, &dataset.test, config.batch_size)?;
        println!("test  mean loss={}, accuracy={}", test.mean_loss(), test.mean_accuracy());

        let stats = EpochStats {
            epoch,
            total_epochs: config.epochs,
            train_loss: train.mean_loss(),
            train_accuracy: train.mean_accuracy(),
            throughput,
            elapsed_ms: elapsed.as_millis() as u64,
            test_loss: test.mean_loss(),
            test_accuracy: test.mean_accuracy(),
        };

        if let Some(ref tx) = config.progress_tx {
            if tx.send(stats.clone()).is_err() {
                debug!("progress receiver dropped; continuing without it");
            }
        }
        history.push(stats);
    }

    println!("save the model");
    learner.save(&config.output)?;
    info!("model written to {}", config.output.display());

    Ok(history)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

/// A fresh uniformly random permutation of `0..n`.
fn shuffled_indices<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(rng);
    perm
}

/// One epoch of minibatch updates over `set`, visited in `perm` order.
fn run_train_epoch<L>(
    learner: &mut L,
    set: &ImageSet,
    perm: &[usize],
    batch_size: usize,
    epoch: usize,
) -> Result<WeightedMean>
where
    L: Learner + ?Sized,
{
    let mut acc = WeightedMean::default();
    for range in batch_ranges(set.len(), batch_size) {
        // Images and labels are gathered through the same indices.
        let (images, labels) = set.gather(&perm[range]);
        let step = learner.train_step(&images, &labels)?;
        if !step.loss.is_finite() {
            return Err(Error::Diverged { epoch, loss: step.loss });
        }
        acc.add(step, labels.len());
    }
    Ok(acc)
}

/// Forward-only pass over `set` in stored order.
fn run_eval<L>(learner: &L, set: &ImageSet, batch_size: usize) -> Result<WeightedMean>
where
    L: Learner + ?Sized,
{
    let mut acc = WeightedMean::default();
    for range in batch_ranges(set.len(), batch_size) {
        let (images, labels) = set.slice(range);
        acc.add(learner.eval_step(images, labels)?, labels.len());
    }
    Ok(acc)
}
