#[cfg(feature = "multithreading")]
use std::sync::Arc;
#[cfg(feature = "multithreading")]
use std::thread;

#[cfg(feature = "multithreading")]
use crossbeam_channel::{Receiver, Sender};

use crate::config::{TaggerConfig, UnknownWordStrategy};
use crate::emission::EmissionModel;
use crate::errors::{Result, TritagError};
use crate::lexicon::Lexicon;
use crate::model::Model;
use crate::ngram::{Tag, Trigram, END_TOKEN};
use crate::numberer::TagNumberer;
use crate::sentence::Sentence;
use crate::suffix_model::SuffixModel;
use crate::trigram_model::{LinearInterpolationModel, TransitionModel};

/// Best path into a state from one predecessor state.
#[derive(Debug, Clone, Copy)]
struct Link {
    score: f64,

    /// Index of the best state two columns back. `None` only for the initial state.
    t1: Option<usize>,
}

/// State `(t2, tag)` of the trellis, where `t2` ranges over the previous column.
#[derive(Debug)]
struct State {
    tag: Tag,

    /// Indexed by the state in the previous column; `None` if that pair was not reachable.
    backpointers: Vec<Option<Link>>,
}

/// Trigram HMM tagger.
///
/// A tagger is read-only, so one instance can tag sentences from several threads.
pub struct Tagger<T = LinearInterpolationModel> {
    tag_numberer: TagNumberer,
    start_tag: Tag,
    emission: EmissionModel,
    transition: T,
    beam: f64,
}

impl Tagger<LinearInterpolationModel> {
    /// Creates a tagger with the transition model, a lexicon and the suffix model.
    ///
    /// # Arguments
    ///
    /// * `model` - A trained model.
    /// * `config` - Tagger configuration.
    ///
    /// # Errors
    ///
    /// If the model is invalid or the configuration has an invalid value, an error variant
    /// will be returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use tritag::{Sentence, Tagger, TaggerConfig, Trainer};
    ///
    /// let mut trainer = Trainer::new();
    /// for line in [
    ///     "the/DT dog/NN walks/VBZ",
    ///     "a/DT cat/NN talks/VBZ",
    ///     "the/DT kid/NN runs/VBZ",
    /// ] {
    ///     trainer.push_sentence(&Sentence::from_tagged(line).unwrap()).unwrap();
    /// }
    /// let model = trainer.train();
    /// let tagger = Tagger::from_config(&model, TaggerConfig::default()).unwrap();
    ///
    /// let (tags, score) = tagger.tag(&["The", "bird", "sings"]).unwrap();
    /// assert_eq!(vec!["DT", "NN", "VBZ"], tags);
    /// assert!(score < 0.);
    /// ```
    pub fn from_config(model: &Model, config: TaggerConfig) -> Result<Self> {
        let transition = LinearInterpolationModel::new(model)?;
        let suffix = SuffixModel::new(config.suffix, model)?;
        let fallback = match config.unknown_words {
            UnknownWordStrategy::Tree => EmissionModel::from(suffix),
            UnknownWordStrategy::Lookup => EmissionModel::from(suffix.lookup()),
        };
        let lexicon = Lexicon::new(model)
            .with_substitutions(config.substitutions)
            .with_fallback(fallback);
        Self::new(model, lexicon.into(), transition, config.beam_factor)
    }
}

impl<T> Tagger<T>
where
    T: TransitionModel,
{
    /// Creates a new tagger.
    ///
    /// # Arguments
    ///
    /// * `model` - A trained model. Only the tag labels are kept.
    /// * `emission` - Emission estimator.
    /// * `transition` - Transition estimator.
    /// * `beam_factor` - Paths less probable than the best path of the previous position by
    ///   this factor are pruned. `f64::INFINITY` disables pruning.
    ///
    /// # Errors
    ///
    /// This function will return an error variant when:
    ///
    /// * `beam_factor` is NaN or less than 1.
    /// * the model has no start marker.
    pub fn new(
        model: &Model,
        emission: EmissionModel,
        transition: T,
        beam_factor: f64,
    ) -> Result<Self> {
        if beam_factor.is_nan() || beam_factor < 1. {
            return Err(TritagError::invalid_argument(
                "beam_factor",
                "must be at least 1",
            ));
        }
        Ok(Self {
            tag_numberer: model.tag_numberer.clone(),
            start_tag: model.start_tag()?,
            emission,
            transition,
            beam: beam_factor.ln(),
        })
    }

    /// Returns the emission estimator.
    pub fn emission(&self) -> &EmissionModel {
        &self.emission
    }

    /// Tags a sequence of tokens.
    ///
    /// # Arguments
    ///
    /// * `tokens` - Words of a sentence.
    ///
    /// # Returns
    ///
    /// The most probable tags, one for each token, and the log-probability of the path.
    ///
    /// # Errors
    ///
    /// This function will return an error variant when:
    ///
    /// * a token has no candidate tags ([`TritagError::EmptyEmission`]).
    /// * the transition model does not know a candidate tag ([`TritagError::UnknownTag`]).
    /// * the beam pruned every path ([`TritagError::NoPath`]).
    pub fn tag<S>(&self, tokens: &[S]) -> Result<(Vec<String>, f64)>
    where
        S: AsRef<str>,
    {
        let words = tokens
            .iter()
            .map(AsRef::as_ref)
            .chain(core::iter::once(END_TOKEN));

        let mut columns = Vec::with_capacity(tokens.len() + 3);
        columns.push(vec![State {
            tag: self.start_tag,
            backpointers: vec![],
        }]);
        columns.push(vec![State {
            tag: self.start_tag,
            backpointers: vec![Some(Link {
                score: 0.,
                t1: None,
            })],
        }]);

        let mut threshold = f64::NEG_INFINITY;
        for word in words {
            let tag_probs = self.emission.tag_probs(word);
            if tag_probs.is_empty() {
                return Err(TritagError::EmptyEmission(word.to_string()));
            }
            let mut candidates: Vec<(Tag, f64)> =
                tag_probs.iter().map(|(&tag, &p)| (tag, p)).collect();
            candidates.sort_unstable_by(|a, b| a.0.cmp(&b.0));

            let n = columns.len();
            let (prev_prev, prev) = (&columns[n - 2], &columns[n - 1]);
            let mut column = Vec::with_capacity(candidates.len());
            let mut column_best = f64::NEG_INFINITY;
            for (tag, emission_prob) in candidates {
                let mut backpointers = Vec::with_capacity(prev.len());
                for t2 in prev {
                    let mut best: Option<Link> = None;
                    for (k, t1_link) in t2.backpointers.iter().enumerate() {
                        let Some(t1_link) = t1_link else {
                            continue;
                        };
                        if t1_link.score < threshold {
                            continue;
                        }
                        let t1 = &prev_prev[k];
                        let score = self.transition.trigram_prob(Trigram(t1.tag, t2.tag, tag))?
                            + emission_prob
                            + t1_link.score;
                        if score > best.map_or(f64::NEG_INFINITY, |b| b.score) {
                            best = Some(Link {
                                score,
                                t1: Some(k),
                            });
                        }
                    }
                    if let Some(best) = best {
                        column_best = column_best.max(best.score);
                    }
                    backpointers.push(best);
                }
                column.push(State { tag, backpointers });
            }
            columns.push(column);
            threshold = column_best - self.beam;
        }

        let (tags, score) = self.highest_probability_sequence(&columns)?;
        let labels: Vec<String> = tags[2..tags.len() - 1]
            .iter()
            .map(|tag| {
                self.tag_numberer
                    .label(tag.id)
                    .map(str::to_string)
                    .ok_or_else(|| TritagError::invalid_model(format!("unnamed tag: {tag}")))
            })
            .collect::<Result<_>>()?;
        Ok((labels, score))
    }

    /// Finds the best terminal state and follows the backpointers to the initial state.
    fn highest_probability_sequence(&self, columns: &[Vec<State>]) -> Result<(Vec<Tag>, f64)> {
        let mut col = columns.len() - 1;
        let mut best: Option<(usize, usize, f64)> = None;
        for (i, state) in columns[col].iter().enumerate() {
            for (j, link) in state.backpointers.iter().enumerate() {
                if let Some(link) = link {
                    if link.score > best.map_or(f64::NEG_INFINITY, |b| b.2) {
                        best = Some((i, j, link.score));
                    }
                }
            }
        }
        let (mut cur, prev, score) = best.ok_or(TritagError::NoPath)?;

        let mut prev = Some(prev);
        let mut tags = Vec::with_capacity(columns.len());
        loop {
            let state = &columns[col][cur];
            tags.push(state.tag);
            let Some(p) = prev else {
                break;
            };
            let link = state.backpointers[p].ok_or(TritagError::NoPath)?;
            cur = p;
            prev = link.t1;
            col = col.checked_sub(1).ok_or(TritagError::NoPath)?;
        }
        if tags.len() != columns.len() {
            return Err(TritagError::NoPath);
        }
        tags.reverse();
        Ok((tags, score))
    }

    /// Tags a sentence and stores the tags in it.
    ///
    /// # Returns
    ///
    /// The log-probability of the path.
    ///
    /// # Errors
    ///
    /// See [`Tagger::tag()`].
    pub fn tag_sentence(&self, sentence: &mut Sentence) -> Result<f64> {
        let (tags, score) = self.tag(sentence.forms())?;
        sentence.set_tags(tags)?;
        Ok(score)
    }

    /// Creates a multithreading tagger.
    ///
    /// # Arguments
    ///
    /// * `n_threads` - The number of threads.
    ///
    /// # Returns
    ///
    /// A multithread tagger.
    #[cfg(feature = "multithreading")]
    #[cfg_attr(docsrs, doc(cfg(feature = "multithreading")))]
    pub fn multithreading(self, n_threads: usize) -> MultithreadTagger
    where
        T: Send + Sync + 'static,
    {
        MultithreadTagger::new(self, n_threads)
    }
}

#[cfg(feature = "multithreading")]
type TagResult = Result<(Vec<String>, f64)>;

/// Tagger for multithreading.
///
/// Every sentence is decoded on one worker thread with its own trellis.
#[cfg(feature = "multithreading")]
#[cfg_attr(docsrs, doc(cfg(feature = "multithreading")))]
pub struct MultithreadTagger {
    task_tx: Sender<(usize, Vec<String>)>,
    result_rx: Receiver<(usize, TagResult)>,
}

#[cfg(feature = "multithreading")]
impl MultithreadTagger {
    /// Creates a multithreading tagger.
    ///
    /// # Arguments
    ///
    /// * `tagger` - A normal tagger.
    /// * `n_threads` - The number of threads.
    ///
    /// # Returns
    ///
    /// A multithread tagger.
    pub fn new<T>(tagger: Tagger<T>, n_threads: usize) -> Self
    where
        T: TransitionModel + Send + Sync + 'static,
    {
        let tagger = Arc::new(tagger);

        let (result_tx, result_rx) = crossbeam_channel::unbounded();
        let (task_tx, task_rx) = crossbeam_channel::unbounded::<(usize, Vec<String>)>();
        for _ in 0..n_threads.max(1) {
            let tagger = Arc::clone(&tagger);
            let result_tx = result_tx.clone();
            let task_rx = task_rx.clone();
            thread::spawn(move || {
                for (i, tokens) in task_rx {
                    let result = tagger.tag(&tokens);
                    if result_tx.send((i, result)).is_err() {
                        break;
                    }
                }
            });
        }

        Self { task_tx, result_rx }
    }

    /// Tags a batch of sentences.
    ///
    /// # Arguments
    ///
    /// * `sentences` - Tokens of each sentence.
    ///
    /// # Returns
    ///
    /// Tags and scores in the order of `sentences`.
    ///
    /// # Errors
    ///
    /// The first error in input order is returned. If the worker threads have stopped,
    /// [`TritagError::Disconnected`] is returned.
    pub fn tag_batch(&self, sentences: Vec<Vec<String>>) -> Result<Vec<(Vec<String>, f64)>> {
        let n = sentences.len();
        for (i, tokens) in sentences.into_iter().enumerate() {
            self.task_tx
                .send((i, tokens))
                .map_err(|_| TritagError::Disconnected)?;
        }
        let mut results: Vec<Option<TagResult>> = (0..n).map(|_| None).collect();
        for _ in 0..n {
            let (i, result) = self
                .result_rx
                .recv()
                .map_err(|_| TritagError::Disconnected)?;
            results[i] = Some(result);
        }
        results
            .into_iter()
            .map(|result| result.unwrap_or(Err(TritagError::Disconnected)))
            .collect()
    }
}
