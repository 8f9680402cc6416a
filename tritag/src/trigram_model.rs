use hashbrown::HashMap;
use log::info;

use crate::errors::{Result, TritagError};
use crate::model::Model;
use crate::ngram::{Bigram, Trigram, Unigram};

/// Estimator of tag transition probabilities.
pub trait TransitionModel {
    /// Returns the log-probability of `P(t3|t1,t2)`.
    ///
    /// # Errors
    ///
    /// If `t3` is not known to the model, [`TritagError::UnknownTag`] is returned.
    fn trigram_prob(&self, trigram: Trigram) -> Result<f64>;
}

impl<T> TransitionModel for &T
where
    T: TransitionModel + ?Sized,
{
    fn trigram_prob(&self, trigram: Trigram) -> Result<f64> {
        (**self).trigram_prob(trigram)
    }
}

/// Weights of the unigram, bigram and trigram estimates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingParameters {
    pub l1: f64,
    pub l2: f64,
    pub l3: f64,
}

/// Transition model smoothed by deleted interpolation (Brants, 2000).
///
/// The smoothed log-probabilities of all observed n-grams are computed on construction.
#[derive(Debug, Clone)]
pub struct LinearInterpolationModel {
    smoothing_parameters: SmoothingParameters,
    unigram_probs: HashMap<Unigram, f64>,
    bigram_probs: HashMap<Bigram, f64>,
    trigram_probs: HashMap<Trigram, f64>,
}

impl LinearInterpolationModel {
    /// Creates a new transition model.
    ///
    /// # Arguments
    ///
    /// * `model` - A model with n-gram frequencies.
    ///
    /// # Errors
    ///
    /// If the model has no trigrams, the smoothing weights are undefined and an error
    /// variant will be returned.
    pub fn new(model: &Model) -> Result<Self> {
        let corpus_size: usize = model.unigram_freqs.values().sum();
        let smoothing_parameters = calculate_lambdas(corpus_size, model)?;
        info!(
            "smoothing parameters: l1 = {:.4}, l2 = {:.4}, l3 = {:.4}",
            smoothing_parameters.l1, smoothing_parameters.l2, smoothing_parameters.l3
        );

        let SmoothingParameters { l1, l2, l3 } = smoothing_parameters;
        let unigram_p = |unigram: &Unigram| {
            model.unigram_freqs.get(unigram).copied().unwrap_or(0) as f64 / corpus_size as f64
        };
        let bigram_p = |bigram: &Bigram| {
            let freq = model.bigram_freqs.get(bigram).copied().unwrap_or(0);
            freq as f64 / model.unigram_freqs.get(&Unigram(bigram.0)).copied().unwrap_or(0) as f64
        };

        let unigram_probs = model
            .unigram_freqs
            .keys()
            .map(|unigram| (*unigram, (l1 * unigram_p(unigram)).ln()))
            .collect();
        let bigram_probs = model
            .bigram_freqs
            .keys()
            .map(|bigram| {
                let p = l1 * unigram_p(&Unigram(bigram.1)) + l2 * bigram_p(bigram);
                (*bigram, p.ln())
            })
            .collect();
        let trigram_probs = model
            .trigram_freqs
            .iter()
            .map(|(trigram, &freq)| {
                let t1t2 = model
                    .bigram_freqs
                    .get(&trigram.prefix_bigram())
                    .copied()
                    .unwrap_or(0);
                let p = l1 * unigram_p(&Unigram(trigram.2))
                    + l2 * bigram_p(&trigram.suffix_bigram())
                    + l3 * (freq as f64 / t1t2 as f64);
                (*trigram, p.ln())
            })
            .collect();

        Ok(Self {
            smoothing_parameters,
            unigram_probs,
            bigram_probs,
            trigram_probs,
        })
    }

    /// Returns the smoothing weights (λ1, λ2, λ3).
    pub fn smoothing_parameters(&self) -> SmoothingParameters {
        self.smoothing_parameters
    }
}

impl TransitionModel for LinearInterpolationModel {
    fn trigram_prob(&self, trigram: Trigram) -> Result<f64> {
        if let Some(&p) = self.trigram_probs.get(&trigram) {
            return Ok(p);
        }
        if let Some(&p) = self.bigram_probs.get(&trigram.suffix_bigram()) {
            return Ok(p);
        }
        self.unigram_probs
            .get(&Unigram(trigram.2))
            .copied()
            .ok_or(TritagError::UnknownTag(trigram.2))
    }
}

/// Leave-one-out estimate `(freq - 1) / (total - 1)`; 0 when the denominator vanishes.
fn held_out(freq: usize, total: usize) -> f64 {
    if total <= 1 {
        0.
    } else {
        freq.saturating_sub(1) as f64 / (total - 1) as f64
    }
}

fn calculate_lambdas(corpus_size: usize, model: &Model) -> Result<SmoothingParameters> {
    let mut l1f = 0;
    let mut l2f = 0;
    let mut l3f = 0;

    for (trigram, &t1t2t3_freq) in &model.trigram_freqs {
        let l3p = model
            .bigram_freqs
            .get(&trigram.prefix_bigram())
            .map_or(0., |&t1t2_freq| held_out(t1t2t3_freq, t1t2_freq));

        let l2p = match (
            model.bigram_freqs.get(&trigram.suffix_bigram()),
            model.unigram_freqs.get(&Unigram(trigram.1)),
        ) {
            (Some(&t2t3_freq), Some(&t2_freq)) => held_out(t2t3_freq, t2_freq),
            _ => 0.,
        };

        let l1p = model
            .unigram_freqs
            .get(&Unigram(trigram.2))
            .map_or(0., |&t3_freq| held_out(t3_freq, corpus_size));

        if l1p >= l2p && l1p >= l3p {
            l1f += t1t2t3_freq;
        } else if l2p > l3p {
            l2f += t1t2t3_freq;
        } else {
            l3f += t1t2t3_freq;
        }
    }

    let total = l1f + l2f + l3f;
    if total == 0 {
        return Err(TritagError::invalid_model("the model has no trigrams"));
    }
    let total = total as f64;
    Ok(SmoothingParameters {
        l1: l1f as f64 / total,
        l2: l2f as f64 / total,
        l3: l3f as f64 / total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::ngram::Tag;
    use crate::utils::tests::{toy_model, train_model};

    #[test]
    fn test_lambdas_sum_to_one() {
        let model = train_model(&[
            "The/DT dog/NN barks/VBZ ./.",
            "A/DT cat/NN sleeps/VBZ ./.",
            "The/DT old/JJ dog/NN sleeps/VBZ ./.",
            "Dogs/NNS bark/VBP ./.",
        ]);
        let tm = LinearInterpolationModel::new(&model).unwrap();
        let SmoothingParameters { l1, l2, l3 } = tm.smoothing_parameters();

        assert!((l1 + l2 + l3 - 1.).abs() < 1e-9);
        assert!(l1 >= 0. && l2 >= 0. && l3 >= 0.);
    }

    #[test]
    fn test_lambdas_bigram_trigram_tie_goes_to_trigram() {
        // Every bigram and trigram estimate is 1, the unigram estimates are lower.
        let model = train_model(&["a/X b/Y", "a/X b/Y"]);
        let tm = LinearInterpolationModel::new(&model).unwrap();

        assert_eq!(
            SmoothingParameters {
                l1: 0.,
                l2: 0.,
                l3: 1.,
            },
            tm.smoothing_parameters()
        );
    }

    #[test]
    fn test_observed_trigram_is_finite_and_negative() {
        let model = toy_model();
        let tm = LinearInterpolationModel::new(&model).unwrap();

        for &trigram in model.trigram_freqs().keys() {
            let p = tm.trigram_prob(trigram).unwrap();
            assert!(p.is_finite(), "{trigram:?}");
            assert!(p <= 0., "{trigram:?}");
        }
    }

    #[test]
    fn test_unseen_trigram_falls_back_to_bigram() {
        let model = toy_model();
        let tm = LinearInterpolationModel::new(&model).unwrap();
        let noun = Tag::new(model.tag_numberer().get("NOUN").unwrap(), false);
        let verb = Tag::new(model.tag_numberer().get("VERB").unwrap(), false);

        // (VERB, NOUN) never precedes NOUN, but (NOUN, VERB) is a bigram.
        let unseen = Trigram(verb, noun, verb);
        assert!(!model.trigram_freqs().contains_key(&unseen));
        assert!(model.bigram_freqs().contains_key(&unseen.suffix_bigram()));
        assert_eq!(
            tm.bigram_probs[&unseen.suffix_bigram()],
            tm.trigram_prob(unseen).unwrap()
        );
    }

    #[test]
    fn test_unseen_bigram_falls_back_to_unigram() {
        let model = toy_model();
        let tm = LinearInterpolationModel::new(&model).unwrap();
        let noun = Tag::new(model.tag_numberer().get("NOUN").unwrap(), false);

        let unseen = Trigram(noun, noun, noun);
        assert!(!model.bigram_freqs().contains_key(&unseen.suffix_bigram()));
        assert_eq!(
            tm.unigram_probs[&Unigram(noun)],
            tm.trigram_prob(unseen).unwrap()
        );
    }

    #[test]
    fn test_unknown_tag() {
        let model = toy_model();
        let tm = LinearInterpolationModel::new(&model).unwrap();
        let noun = Tag::new(model.tag_numberer().get("NOUN").unwrap(), false);
        let unknown = Tag::new(42, false);

        let result = tm.trigram_prob(Trigram(noun, noun, unknown));
        assert!(matches!(result, Err(TritagError::UnknownTag(t)) if t == unknown));
    }

    #[test]
    fn test_no_trigrams() {
        let result = LinearInterpolationModel::new(&Model::default());

        assert_eq!(
            "InvalidModelError: the model has no trigrams",
            &result.err().unwrap().to_string()
        );
    }
}
